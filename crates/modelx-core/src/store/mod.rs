//! Reader / Writer contracts of the persistent store
//!
//! The controllers only ever talk to the store through these traits. Two
//! implementations exist: `MemoryStore` here and `SqliteStore` in the
//! `modelx-store` crate.

pub mod memory;

use serde::Deserialize;

use crate::errors::{ExErrorKind, Result};
use crate::model::{
    Classifier, Diagram, DiagramElement, Feature, Relationship, Row, RowId, Table,
};

pub use memory::MemoryStore;

/// Limits applied to list lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct ReadLimits {
    /// Maximum rows returned by one list lookup; `None` means unlimited
    pub max_rows_per_query: Option<usize>,
}

/// Result of a list lookup
///
/// `truncated` is set when the store dropped rows because of its
/// `ReadLimits`. Callers treat that as non-fatal and log it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSet<T> {
    pub rows: Vec<T>,
    pub truncated: bool,
}

impl<T> RowSet<T> {
    pub fn complete(rows: Vec<T>) -> Self {
        Self {
            rows,
            truncated: false,
        }
    }

    /// Apply a row limit, marking the set truncated if rows were dropped
    pub fn limited(mut rows: Vec<T>, limits: ReadLimits) -> Self {
        let mut truncated = false;
        if let Some(max) = limits.max_rows_per_query {
            if rows.len() > max {
                rows.truncate(max);
                truncated = true;
            }
        }
        Self { rows, truncated }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    /// Unwrap the rows, logging a warning if the lookup was truncated
    pub fn warn_if_truncated(self, op: &str, table: Table) -> Vec<T> {
        if self.truncated {
            tracing::warn!(
                component = module_path!(),
                op = op,
                table = table.name(),
                rows = self.rows.len(),
                err.code = ExErrorKind::Truncated.code(),
                "list lookup truncated; continuing with reduced data"
            );
        }
        self.rows
    }
}

impl<T> IntoIterator for RowSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Point and list lookups
///
/// Point lookups fail with `RowNotFound` / `UuidNotFound`. List lookups
/// are ordered by `list_order` then id where rows have a list order, and
/// by id otherwise. The `get_all_*` scans ignore read limits; only the
/// repair scan uses them.
pub trait Reader {
    fn get_diagram(&self, id: RowId) -> Result<Diagram>;
    fn get_diagram_by_uuid(&self, uuid: &str) -> Result<Diagram>;
    fn get_diagrams_by_parent_id(&self, parent_id: Option<RowId>) -> Result<RowSet<Diagram>>;
    fn get_diagram_ids_by_parent_id(&self, parent_id: Option<RowId>) -> Result<RowSet<RowId>>;

    fn get_classifier(&self, id: RowId) -> Result<Classifier>;
    fn get_classifier_by_name(&self, name: &str) -> Result<Option<Classifier>>;
    fn get_classifier_by_uuid(&self, uuid: &str) -> Result<Classifier>;

    fn get_feature(&self, id: RowId) -> Result<Feature>;
    fn get_features_by_classifier_id(&self, classifier_id: RowId) -> Result<RowSet<Feature>>;

    fn get_relationship(&self, id: RowId) -> Result<Relationship>;
    fn get_relationships_by_classifier_id(
        &self,
        classifier_id: RowId,
    ) -> Result<RowSet<Relationship>>;
    fn get_relationships_by_feature_id(&self, feature_id: RowId) -> Result<RowSet<Relationship>>;

    fn get_diagramelement(&self, id: RowId) -> Result<DiagramElement>;
    fn get_diagramelements_by_diagram_id(
        &self,
        diagram_id: RowId,
    ) -> Result<RowSet<DiagramElement>>;
    fn get_diagramelements_by_classifier_id(
        &self,
        classifier_id: RowId,
    ) -> Result<RowSet<DiagramElement>>;
    fn get_diagramelements_by_focused_feature_id(
        &self,
        feature_id: RowId,
    ) -> Result<RowSet<DiagramElement>>;

    fn get_all_diagrams(&self) -> Result<Vec<Diagram>>;
    fn get_all_classifiers(&self) -> Result<Vec<Classifier>>;
    fn get_all_features(&self) -> Result<Vec<Feature>>;
    fn get_all_relationships(&self) -> Result<Vec<Relationship>>;
    fn get_all_diagramelements(&self) -> Result<Vec<DiagramElement>>;

    fn count_rows(&self, table: Table) -> Result<usize>;

    /// Point lookup by table tag
    fn get_row(&self, table: Table, id: RowId) -> Result<Row> {
        Ok(match table {
            Table::Diagram => Row::Diagram(self.get_diagram(id)?),
            Table::Classifier => Row::Classifier(self.get_classifier(id)?),
            Table::Feature => Row::Feature(self.get_feature(id)?),
            Table::Relationship => Row::Relationship(self.get_relationship(id)?),
            Table::DiagramElement => Row::DiagramElement(self.get_diagramelement(id)?),
        })
    }
}

/// Primitive mutations and transaction control
///
/// `insert_row` assigns the next id when the row's id is VOID; a non-VOID
/// id re-inserts that exact id (undo/redo only) and fails if it is taken.
/// `update_row` replaces the stored row with the given post-image.
pub trait Writer {
    fn insert_row(&mut self, row: &Row) -> Result<RowId>;
    fn update_row(&mut self, row: &Row) -> Result<()>;
    fn delete_row(&mut self, table: Table, id: RowId) -> Result<()>;

    fn begin_transaction(&mut self) -> Result<()>;
    fn commit_transaction(&mut self) -> Result<()>;
    fn rollback_transaction(&mut self) -> Result<()>;
}

/// A store the controllers can own
pub trait Store: Reader + Writer {}

impl<T: Reader + Writer> Store for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rowset_limited_marks_truncation() {
        let limits = ReadLimits {
            max_rows_per_query: Some(2),
        };
        let set = RowSet::limited(vec![1, 2, 3], limits);
        assert!(set.truncated);
        assert_eq!(set.rows, vec![1, 2]);

        let set = RowSet::limited(vec![1, 2], limits);
        assert!(!set.truncated);
    }

    #[test]
    fn test_rowset_unlimited() {
        let set = RowSet::limited(vec![1; 1000], ReadLimits::default());
        assert!(!set.truncated);
        assert_eq!(set.len(), 1000);
    }
}
