//! Row hydration
//!
//! Column lists and mappers turning SQLite rows into model rows. Column
//! order in each `*_COLUMNS` list matches the index used by its mapper.

use modelx_core::errors::ModelError;
use modelx_core::model::{
    Classifier, ClassifierType, Diagram, DiagramElement, DiagramType, Feature, FeatureType,
    Relationship, RelationshipType, RowId, Table,
};
use rusqlite::types::Type;

pub const DIAGRAM_COLUMNS: &str =
    "id, parent_id, diagram_type, name, description, list_order, flags, uuid";
pub const CLASSIFIER_COLUMNS: &str =
    "id, main_type, stereotype, name, description, x_order, y_order, list_order, uuid";
pub const FEATURE_COLUMNS: &str =
    "id, classifier_id, main_type, feature_key, feature_value, description, list_order, uuid";
pub const RELATIONSHIP_COLUMNS: &str = "id, main_type, from_classifier_id, from_feature_id, \
     to_classifier_id, to_feature_id, name, description, list_order, uuid";
pub const DIAGRAMELEMENT_COLUMNS: &str =
    "id, diagram_id, classifier_id, display_flags, focused_feature_id, uuid";

/// SQL table holding rows of `table`
pub fn table_name(table: Table) -> &'static str {
    match table {
        Table::Diagram => "diagrams",
        Table::Classifier => "classifiers",
        Table::Feature => "features",
        Table::Relationship => "relationships",
        Table::DiagramElement => "diagramelements",
    }
}

fn decode<T>(
    row: &rusqlite::Row<'_>,
    idx: usize,
    what: &str,
    from_code: fn(i32) -> Option<T>,
) -> rusqlite::Result<T> {
    let code: i32 = row.get(idx)?;
    from_code(code).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            Box::new(ModelError::Internal {
                message: format!("unknown {} code {}", what, code),
            }),
        )
    })
}

fn row_id(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<RowId> {
    row.get::<_, i64>(idx).map(RowId::new)
}

fn opt_row_id(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Option<RowId>> {
    row.get::<_, Option<i64>>(idx).map(|v| v.map(RowId::new))
}

pub fn diagram_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Diagram> {
    Ok(Diagram {
        id: row_id(row, 0)?,
        parent_id: opt_row_id(row, 1)?,
        diagram_type: decode(row, 2, "diagram type", DiagramType::from_code)?,
        name: row.get(3)?,
        description: row.get(4)?,
        list_order: row.get(5)?,
        flags: row.get(6)?,
        uuid: row.get(7)?,
    })
}

pub fn classifier_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Classifier> {
    Ok(Classifier {
        id: row_id(row, 0)?,
        main_type: decode(row, 1, "classifier type", ClassifierType::from_code)?,
        stereotype: row.get(2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        x_order: row.get(5)?,
        y_order: row.get(6)?,
        list_order: row.get(7)?,
        uuid: row.get(8)?,
    })
}

pub fn feature_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Feature> {
    Ok(Feature {
        id: row_id(row, 0)?,
        classifier_id: row_id(row, 1)?,
        main_type: decode(row, 2, "feature type", FeatureType::from_code)?,
        key: row.get(3)?,
        value: row.get(4)?,
        description: row.get(5)?,
        list_order: row.get(6)?,
        uuid: row.get(7)?,
    })
}

pub fn relationship_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Relationship> {
    Ok(Relationship {
        id: row_id(row, 0)?,
        main_type: decode(row, 1, "relationship type", RelationshipType::from_code)?,
        from_classifier_id: row_id(row, 2)?,
        from_feature_id: opt_row_id(row, 3)?,
        to_classifier_id: row_id(row, 4)?,
        to_feature_id: opt_row_id(row, 5)?,
        name: row.get(6)?,
        description: row.get(7)?,
        list_order: row.get(8)?,
        uuid: row.get(9)?,
    })
}

pub fn diagramelement_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DiagramElement> {
    Ok(DiagramElement {
        id: row_id(row, 0)?,
        diagram_id: row_id(row, 1)?,
        classifier_id: row_id(row, 2)?,
        display_flags: row.get(3)?,
        focused_feature_id: opt_row_id(row, 4)?,
        uuid: row.get(5)?,
    })
}
