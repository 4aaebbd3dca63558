//! Transactional change collection
//!
//! A `Batch` wraps the store for the duration of one controller operation.
//! Every write goes through it so the primitive changes, with their
//! pre- and post-images, are collected in application order for the
//! journal and the change notifications.

use modelx_core::errors::Result;
use modelx_core::journal::Change;
use modelx_core::model::{Row, RowId};
use modelx_core::store::Store;

pub struct Batch<'s, S: Store + ?Sized> {
    store: &'s mut S,
    changes: Vec<Change>,
}

impl<'s, S: Store + ?Sized> Batch<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self {
            store,
            changes: Vec::new(),
        }
    }

    /// Reads see the batch's own writes
    pub fn reader(&self) -> &S {
        self.store
    }

    /// Insert a draft; the recorded image carries the assigned id
    pub fn insert(&mut self, row: Row) -> Result<RowId> {
        let id = self.store.insert_row(&row)?;
        self.changes.push(Change::Insert {
            row: row.with_id(id),
        });
        Ok(id)
    }

    /// Replace `before` with `after`; identical images record nothing
    pub fn update(&mut self, before: Row, after: Row) -> Result<()> {
        if before == after {
            return Ok(());
        }
        self.store.update_row(&after)?;
        self.changes.push(Change::Update { before, after });
        Ok(())
    }

    pub fn delete(&mut self, row: Row) -> Result<()> {
        self.store.delete_row(row.table(), row.id())?;
        self.changes.push(Change::Delete { row });
        Ok(())
    }

    /// Apply a planned change
    pub fn apply(&mut self, change: Change) -> Result<()> {
        match change {
            Change::Insert { row } => self.insert(row).map(|_| ()),
            Change::Update { before, after } => self.update(before, after),
            Change::Delete { row } => self.delete(row),
        }
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }
}

/// Run `f` inside one store transaction
///
/// Commits only when `f` succeeds; any failure rolls back every write
/// made so far. Returns the value of `f` with the collected changes.
pub fn run<S, T, F>(store: &mut S, f: F) -> Result<(T, Vec<Change>)>
where
    S: Store + ?Sized,
    F: FnOnce(&mut Batch<'_, S>) -> Result<T>,
{
    store.begin_transaction()?;
    let mut batch = Batch::new(&mut *store);
    let result = f(&mut batch);
    let changes = batch.into_changes();

    match result {
        Ok(value) => {
            if let Err(err) = store.commit_transaction() {
                rollback(store);
                return Err(err);
            }
            Ok((value, changes))
        }
        Err(err) => {
            rollback(store);
            Err(err)
        }
    }
}

fn rollback<S: Store + ?Sized>(store: &mut S) {
    if let Err(err) = store.rollback_transaction() {
        tracing::error!(
            component = module_path!(),
            error = %err,
            "rollback after failed operation also failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelx_core::errors::ModelError;
    use modelx_core::model::{Classifier, ClassifierType, Table};
    use modelx_core::store::{MemoryStore, Reader, Writer};

    #[test]
    fn test_run_commits_and_collects() {
        let mut store = MemoryStore::new();
        let (id, changes) = run(&mut store, |batch| {
            batch.insert(Classifier::new(ClassifierType::Block, "a").into())
        })
        .unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].row_id(), id);
        assert!(!store.in_transaction());
        assert!(store.get_classifier(id).is_ok());
    }

    #[test]
    fn test_run_rolls_back_on_error() {
        let mut store = MemoryStore::new();
        let result: Result<((), Vec<Change>)> = run(&mut store, |batch| {
            batch.insert(Classifier::new(ClassifierType::Block, "a").into())?;
            Err(ModelError::invalid("abort"))
        });

        assert!(result.is_err());
        assert_eq!(store.count_rows(Table::Classifier).unwrap(), 0);
    }

    #[test]
    fn test_identical_update_records_nothing() {
        let mut store = MemoryStore::new();
        let id = store
            .insert_row(&Classifier::new(ClassifierType::Block, "a").into())
            .unwrap();
        let row = store.get_row(Table::Classifier, id).unwrap();

        let ((), changes) = run(&mut store, |batch| batch.update(row.clone(), row.clone())).unwrap();
        assert!(changes.is_empty());
    }
}
