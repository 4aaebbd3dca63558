//! Undo/redo journal
//!
//! An in-memory, boundary-grouped sequence of primitive changes. Each
//! boundary is what one user action produced, derived lifeline changes
//! included; undo and redo replay a whole boundary inside one store
//! transaction.
//!
//! History is linear: recording a new boundary while the cursor sits in
//! the past discards everything ahead of it.

pub mod change;
pub mod statistics;

use modelx_core_types::RequestId;

use crate::errors::Result;
use crate::store::{Store, Writer};

pub use change::Change;
pub use statistics::{Outcome, Statistics};

/// How an operation's changes join the journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Boundary {
    /// Close the open boundary and start a fresh one
    #[default]
    StartNew,
    /// Extend the open boundary; starts a fresh one when none is open
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalState {
    Empty,
    AtHead,
    InPast,
}

/// A boundary that was replayed by undo or redo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replayed {
    pub request_id: RequestId,
    /// Changes as applied to the store, in application order
    pub changes: Vec<Change>,
    pub statistics: Statistics,
}

/// Result of undo/redo
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replay {
    Applied(Replayed),
    /// No boundary behind (undo) or ahead (redo) of the cursor
    NothingToDo,
}

impl Replay {
    pub fn statistics(&self) -> Option<&Statistics> {
        match self {
            Replay::Applied(replayed) => Some(&replayed.statistics),
            Replay::NothingToDo => None,
        }
    }

    pub fn is_nothing_to_do(&self) -> bool {
        matches!(self, Replay::NothingToDo)
    }
}

#[derive(Debug, Clone)]
struct BoundaryRecord {
    request_id: RequestId,
    changes: Vec<Change>,
}

#[derive(Debug, Clone, Default)]
pub struct Journal {
    boundaries: Vec<BoundaryRecord>,
    /// Number of boundaries currently applied
    cursor: usize,
    /// Whether the boundary at `cursor - 1` still accepts appends
    open: bool,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the changes of one committed operation
    ///
    /// Returns the request id of the boundary the changes joined, or
    /// `None` when there was nothing to record. An empty `StartNew` still
    /// closes the open boundary but leaves any redo history in place.
    pub fn record(
        &mut self,
        boundary: Boundary,
        request_id: RequestId,
        changes: Vec<Change>,
    ) -> Option<RequestId> {
        if changes.is_empty() {
            if boundary == Boundary::StartNew {
                self.open = false;
            }
            return None;
        }
        if self.cursor < self.boundaries.len() {
            self.boundaries.truncate(self.cursor);
            self.open = false;
        }

        if boundary == Boundary::Append && self.open {
            if let Some(last) = self.boundaries.last_mut() {
                last.changes.extend(changes);
                return Some(last.request_id.clone());
            }
        }

        self.boundaries.push(BoundaryRecord {
            request_id: request_id.clone(),
            changes,
        });
        self.cursor = self.boundaries.len();
        self.open = true;
        Some(request_id)
    }

    /// Undo the boundary behind the cursor
    ///
    /// Inverse changes are applied in reverse order inside one store
    /// transaction. On failure the transaction is rolled back and the
    /// cursor stays put.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn undo<S: Store + ?Sized>(&mut self, store: &mut S) -> Result<Replay> {
        let Some(index) = self.cursor.checked_sub(1) else {
            return Ok(Replay::NothingToDo);
        };
        let record = &self.boundaries[index];
        let changes: Vec<Change> = record.changes.iter().rev().map(Change::inverse).collect();
        let request_id = record.request_id.clone();

        replay(store, &changes)?;
        self.cursor = index;
        self.open = false;
        Ok(Replay::Applied(Replayed {
            request_id,
            statistics: Statistics::from_changes(&changes),
            changes,
        }))
    }

    /// Redo the boundary ahead of the cursor
    ///
    /// # Errors
    ///
    /// Propagates store failures; the cursor stays put on failure.
    pub fn redo<S: Store + ?Sized>(&mut self, store: &mut S) -> Result<Replay> {
        let Some(record) = self.boundaries.get(self.cursor) else {
            return Ok(Replay::NothingToDo);
        };
        let changes = record.changes.clone();
        let request_id = record.request_id.clone();

        replay(store, &changes)?;
        self.cursor += 1;
        self.open = false;
        Ok(Replay::Applied(Replayed {
            request_id,
            statistics: Statistics::from_changes(&changes),
            changes,
        }))
    }

    pub fn state(&self) -> JournalState {
        if self.cursor == 0 {
            JournalState::Empty
        } else if self.cursor == self.boundaries.len() {
            JournalState::AtHead
        } else {
            JournalState::InPast
        }
    }

    /// Number of recorded boundaries, including those ahead of the cursor
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Number of boundaries currently applied
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.boundaries.len()
    }

    /// Number of changes in the boundary behind the cursor
    pub fn current_boundary_len(&self) -> usize {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.boundaries.get(i))
            .map_or(0, |b| b.changes.len())
    }

    pub fn clear(&mut self) {
        self.boundaries.clear();
        self.cursor = 0;
        self.open = false;
    }
}

fn replay<W: Writer + ?Sized>(store: &mut W, changes: &[Change]) -> Result<()> {
    store.begin_transaction()?;
    for change in changes {
        if let Err(err) = change.apply(store) {
            rollback(store, "rollback after failed replay also failed");
            return Err(err);
        }
    }
    if let Err(err) = store.commit_transaction() {
        rollback(store, "rollback after failed replay commit also failed");
        return Err(err);
    }
    Ok(())
}

fn rollback<W: Writer + ?Sized>(store: &mut W, message: &str) {
    if let Err(err) = store.rollback_transaction() {
        tracing::error!(component = module_path!(), error = %err, "{}", message);
    }
}
