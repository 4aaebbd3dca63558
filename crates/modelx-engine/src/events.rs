//! Change notifications
//!
//! After every committed transaction the controller emits one
//! notification per primitive change so dependent views can refresh.
//! Closing a model emits the table-less `DbPrepareClose` and `DbClosed`.

use modelx_core::journal::Change;
use modelx_core::model::{RowId, Table};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeEvent {
    Created,
    Updated,
    Deleted,
    DbPrepareClose,
    DbClosed,
}

/// One `(table, row_id, event)` message
///
/// Lifecycle events carry no table and a VOID row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub table: Option<Table>,
    pub row_id: RowId,
    pub event: ChangeEvent,
}

impl Notification {
    pub fn for_change(change: &Change) -> Self {
        let event = match change {
            Change::Insert { .. } => ChangeEvent::Created,
            Change::Update { .. } => ChangeEvent::Updated,
            Change::Delete { .. } => ChangeEvent::Deleted,
        };
        Self {
            table: Some(change.table()),
            row_id: change.row_id(),
            event,
        }
    }

    pub fn lifecycle(event: ChangeEvent) -> Self {
        Self {
            table: None,
            row_id: RowId::VOID,
            event,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&Notification) + Send>;

/// Typed publish/subscribe bus owned by the controller
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&Notification) + Send + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler; returns false if it was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sid, _)| *sid != id);
        self.handlers.len() != before
    }

    /// Deliver to every handler in subscription order
    pub fn emit(&mut self, notification: &Notification) {
        for (_, handler) in &mut self.handlers {
            handler(notification);
        }
    }

    pub fn emit_changes(&mut self, changes: &[Change]) {
        for change in changes {
            self.emit(&Notification::for_change(change));
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}
