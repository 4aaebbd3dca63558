//! Uniform per-table dispatch
//!
//! `Row` is the single sum type that the writer, the journal replay, the
//! statistics and the change notifications all match on.

use serde::{Deserialize, Serialize};

use super::{Classifier, Diagram, DiagramElement, Feature, Relationship, RowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Diagram,
    Classifier,
    Feature,
    Relationship,
    DiagramElement,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Diagram,
        Table::Classifier,
        Table::Feature,
        Table::Relationship,
        Table::DiagramElement,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::Diagram => "diagram",
            Table::Classifier => "classifier",
            Table::Feature => "feature",
            Table::Relationship => "relationship",
            Table::DiagramElement => "diagramelement",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "table", content = "row", rename_all = "snake_case")]
pub enum Row {
    Diagram(Diagram),
    Classifier(Classifier),
    Feature(Feature),
    Relationship(Relationship),
    DiagramElement(DiagramElement),
}

impl Row {
    pub fn table(&self) -> Table {
        match self {
            Row::Diagram(_) => Table::Diagram,
            Row::Classifier(_) => Table::Classifier,
            Row::Feature(_) => Table::Feature,
            Row::Relationship(_) => Table::Relationship,
            Row::DiagramElement(_) => Table::DiagramElement,
        }
    }

    pub fn id(&self) -> RowId {
        match self {
            Row::Diagram(r) => r.id,
            Row::Classifier(r) => r.id,
            Row::Feature(r) => r.id,
            Row::Relationship(r) => r.id,
            Row::DiagramElement(r) => r.id,
        }
    }

    pub fn uuid(&self) -> &str {
        match self {
            Row::Diagram(r) => &r.uuid,
            Row::Classifier(r) => &r.uuid,
            Row::Feature(r) => &r.uuid,
            Row::Relationship(r) => &r.uuid,
            Row::DiagramElement(r) => &r.uuid,
        }
    }

    /// Same row under a different id (used when the store assigns one)
    pub fn with_id(mut self, id: RowId) -> Self {
        match &mut self {
            Row::Diagram(r) => r.id = id,
            Row::Classifier(r) => r.id = id,
            Row::Feature(r) => r.id = id,
            Row::Relationship(r) => r.id = id,
            Row::DiagramElement(r) => r.id = id,
        }
        self
    }
}

impl From<Diagram> for Row {
    fn from(r: Diagram) -> Self {
        Row::Diagram(r)
    }
}

impl From<Classifier> for Row {
    fn from(r: Classifier) -> Self {
        Row::Classifier(r)
    }
}

impl From<Feature> for Row {
    fn from(r: Feature) -> Self {
        Row::Feature(r)
    }
}

impl From<Relationship> for Row {
    fn from(r: Relationship) -> Self {
        Row::Relationship(r)
    }
}

impl From<DiagramElement> for Row {
    fn from(r: DiagramElement) -> Self {
        Row::DiagramElement(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassifierType, FeatureType};

    #[test]
    fn test_row_dispatch() {
        let row: Row = Feature::new(RowId::new(1), FeatureType::Operation, "run").into();
        assert_eq!(row.table(), Table::Feature);
        assert!(row.id().is_void());

        let row = row.with_id(RowId::new(12));
        assert_eq!(row.id(), RowId::new(12));
    }

    #[test]
    fn test_row_serializes_with_table_tag() {
        let row: Row = Classifier::new(ClassifierType::Block, "engine").into();
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["table"], "classifier");
        assert_eq!(json["row"]["name"], "engine");
    }
}
