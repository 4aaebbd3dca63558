use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::model::Table;

use super::change::Change;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Created,
    Modified,
    Deleted,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Created, Outcome::Modified, Outcome::Deleted];

    pub fn name(self) -> &'static str {
        match self {
            Outcome::Created => "created",
            Outcome::Modified => "modified",
            Outcome::Deleted => "deleted",
        }
    }
}

/// Rows affected per (table, outcome)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    counts: BTreeMap<Table, BTreeMap<Outcome, usize>>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_changes<'a>(changes: impl IntoIterator<Item = &'a Change>) -> Self {
        let mut stats = Self::new();
        for change in changes {
            stats.record(change);
        }
        stats
    }

    pub fn record(&mut self, change: &Change) {
        self.add(change.table(), change.outcome(), 1);
    }

    pub fn add(&mut self, table: Table, outcome: Outcome, count: usize) {
        if count == 0 {
            return;
        }
        *self
            .counts
            .entry(table)
            .or_default()
            .entry(outcome)
            .or_default() += count;
    }

    pub fn get(&self, table: Table, outcome: Outcome) -> usize {
        self.counts
            .get(&table)
            .and_then(|per_table| per_table.get(&outcome))
            .copied()
            .unwrap_or(0)
    }

    pub fn created(&self, table: Table) -> usize {
        self.get(table, Outcome::Created)
    }

    pub fn modified(&self, table: Table) -> usize {
        self.get(table, Outcome::Modified)
    }

    pub fn deleted(&self, table: Table) -> usize {
        self.get(table, Outcome::Deleted)
    }

    pub fn total(&self) -> usize {
        self.counts.values().flat_map(|per_table| per_table.values()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn merge(&mut self, other: &Statistics) {
        for (table, per_table) in &other.counts {
            for (outcome, count) in per_table {
                self.add(*table, *outcome, *count);
            }
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (table, per_table) in &self.counts {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}:", table)?;
            for (outcome, count) in per_table {
                write!(f, " {}={}", outcome.name(), count)?;
            }
        }
        if first {
            f.write_str("no changes")?;
        }
        write!(f, " (total {})", self.total())
    }
}
