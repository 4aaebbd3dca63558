use modelx_core::journal::Change;
use modelx_core::model::{Classifier, ClassifierType, Row, RowId, Table};
use modelx_core::store::{MemoryStore, Reader, Writer};

/// Create a new empty store for testing
#[allow(dead_code)]
pub fn new_store() -> MemoryStore {
    MemoryStore::new()
}

/// Insert a classifier and return the change that records it
///
/// Bypasses the controllers; the journal only sees the recorded change.
#[allow(dead_code)]
pub fn insert_classifier(store: &mut MemoryStore, name: &str) -> Change {
    let id = store
        .insert_row(&Classifier::new(ClassifierType::UmlClass, name).into())
        .unwrap();
    Change::Insert {
        row: store.get_row(Table::Classifier, id).unwrap(),
    }
}

/// Rename a classifier and return the recorded update
#[allow(dead_code)]
pub fn rename_classifier(store: &mut MemoryStore, id: RowId, name: &str) -> Change {
    let before = store.get_classifier(id).unwrap();
    let mut after = before.clone();
    after.name = name.to_string();
    store.update_row(&after.clone().into()).unwrap();
    Change::Update {
        before: before.into(),
        after: after.into(),
    }
}

/// Delete a classifier and return the recorded delete
#[allow(dead_code)]
pub fn delete_classifier(store: &mut MemoryStore, id: RowId) -> Change {
    let row: Row = store.get_classifier(id).unwrap().into();
    store.delete_row(Table::Classifier, id).unwrap();
    Change::Delete { row }
}

/// Every row of the store, for whole-model comparisons
#[allow(dead_code)]
pub fn all_rows<R: Reader>(reader: &R) -> Vec<Row> {
    let mut rows: Vec<Row> = Vec::new();
    rows.extend(reader.get_all_diagrams().unwrap().into_iter().map(Row::from));
    rows.extend(reader.get_all_classifiers().unwrap().into_iter().map(Row::from));
    rows.extend(reader.get_all_features().unwrap().into_iter().map(Row::from));
    rows.extend(reader.get_all_relationships().unwrap().into_iter().map(Row::from));
    rows.extend(reader.get_all_diagramelements().unwrap().into_iter().map(Row::from));
    rows
}
