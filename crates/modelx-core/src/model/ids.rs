use serde::{Deserialize, Serialize};

/// Row identifier assigned by the store at insert time
///
/// Ids are monotonic and never reused. `RowId::VOID` is the sentinel the
/// outer layers pass when no object is meant; optional references inside
/// rows use `Option<RowId>` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(i64);

impl RowId {
    /// Sentinel meaning "no object"
    pub const VOID: RowId = RowId(-1);

    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    pub const fn is_void(self) -> bool {
        self.0 == Self::VOID.0
    }

    /// Map the sentinel to `None`
    pub fn as_option(self) -> Option<RowId> {
        if self.is_void() {
            None
        } else {
            Some(self)
        }
    }
}

impl Default for RowId {
    fn default() -> Self {
        Self::VOID
    }
}

impl From<i64> for RowId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_void() {
            write!(f, "VOID")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Fresh UUID for a new row draft
pub fn new_uuid() -> String {
    uuid::Uuid::now_v7().to_string()
}
