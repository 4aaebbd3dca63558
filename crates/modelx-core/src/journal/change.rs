use serde::Serialize;

use crate::errors::{ModelError, Result};
use crate::model::{Row, RowId, Table};
use crate::store::Writer;

use super::statistics::Outcome;

/// One primitive change with the images needed to replay it either way
///
/// Inserts keep the post-image, deletes the pre-image, updates both. The
/// stored rows always carry their real ids, so replay never consults the
/// store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    Insert { row: Row },
    Update { before: Row, after: Row },
    Delete { row: Row },
}

impl Change {
    pub fn table(&self) -> Table {
        match self {
            Change::Insert { row } | Change::Delete { row } => row.table(),
            Change::Update { after, .. } => after.table(),
        }
    }

    pub fn row_id(&self) -> RowId {
        match self {
            Change::Insert { row } | Change::Delete { row } => row.id(),
            Change::Update { after, .. } => after.id(),
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            Change::Insert { .. } => Outcome::Created,
            Change::Update { .. } => Outcome::Modified,
            Change::Delete { .. } => Outcome::Deleted,
        }
    }

    /// The change that undoes this one
    pub fn inverse(&self) -> Change {
        match self {
            Change::Insert { row } => Change::Delete { row: row.clone() },
            Change::Delete { row } => Change::Insert { row: row.clone() },
            Change::Update { before, after } => Change::Update {
                before: after.clone(),
                after: before.clone(),
            },
        }
    }

    /// Replay this change through a writer
    ///
    /// Inserts re-use the recorded id; a store that hands back a different
    /// id is reported as `Internal`.
    ///
    /// # Errors
    ///
    /// Propagates writer failures.
    pub fn apply<W: Writer + ?Sized>(&self, writer: &mut W) -> Result<()> {
        match self {
            Change::Insert { row } => {
                let id = writer.insert_row(row)?;
                if id != row.id() {
                    return Err(ModelError::Internal {
                        message: format!(
                            "replayed insert into {} expected id {}, store assigned {}",
                            row.table(),
                            row.id(),
                            id
                        ),
                    });
                }
                Ok(())
            }
            Change::Update { after, .. } => writer.update_row(after),
            Change::Delete { row } => writer.delete_row(row.table(), row.id()),
        }
    }
}
