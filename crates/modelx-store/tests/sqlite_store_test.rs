// Integration tests for SqliteStore against the Reader / Writer contracts

mod common;

use common::{seed_classifier, seed_diagram, seed_element, seed_feature, setup_store};
use modelx_core::config::StoreConfig;
use modelx_core::errors::ExErrorKind;
use modelx_core::model::{DiagramType, Row, RowId, Table};
use modelx_core::store::{ReadLimits, Reader, Writer};
use modelx_store::SqliteStore;

#[test]
fn test_update_then_delete_row() {
    // Given: A stored classifier
    let mut store = setup_store();
    let id = seed_classifier(&mut store, "Engine");

    // When: It is renamed
    let mut classifier = store.get_classifier(id).unwrap();
    classifier.name = "Motor".to_string();
    store.update_row(&classifier.clone().into()).unwrap();

    // Then: The new name is visible by name lookup
    assert!(store.get_classifier_by_name("Engine").unwrap().is_none());
    assert_eq!(store.get_classifier_by_name("Motor").unwrap(), Some(classifier));

    // When: It is deleted
    store.delete_row(Table::Classifier, id).unwrap();

    // Then: Point lookup reports not found, and a second delete does too
    assert!(store.get_classifier(id).unwrap_err().is_not_found());
    assert!(store
        .delete_row(Table::Classifier, id)
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_update_missing_row_is_not_found() {
    let mut store = setup_store();
    let id = seed_classifier(&mut store, "Engine");
    let mut ghost = store.get_classifier(id).unwrap();
    ghost.id = RowId::new(999);

    let err = store.update_row(&ghost.into()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_reinsert_keeps_original_id() {
    // Given: A deleted diagram element
    let mut store = setup_store();
    let diagram = seed_diagram(&mut store, None, DiagramType::UmlClass);
    let classifier = seed_classifier(&mut store, "Engine");
    let element = seed_element(&mut store, diagram, classifier);
    let row: Row = store.get_diagramelement(element).unwrap().into();
    store.delete_row(Table::DiagramElement, element).unwrap();

    // When: The same row is inserted again, as undo does
    let reinserted = store.insert_row(&row).unwrap();

    // Then: The id is unchanged and the row is identical
    assert_eq!(reinserted, element);
    assert_eq!(store.get_row(Table::DiagramElement, element).unwrap(), row);

    // And: Inserting it a second time fails
    let err = store.insert_row(&row).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Storage);
}

#[test]
fn test_rollback_discards_writes() {
    // Given: An open transaction with one insert
    let mut store = setup_store();
    seed_classifier(&mut store, "Kept");
    store.begin_transaction().unwrap();
    seed_classifier(&mut store, "Discarded");

    // When: The transaction is rolled back
    store.rollback_transaction().unwrap();

    // Then: Only the row committed before the transaction survives
    assert_eq!(store.count_rows(Table::Classifier).unwrap(), 1);
    assert!(store.get_classifier_by_name("Discarded").unwrap().is_none());
}

#[test]
fn test_commit_without_begin_fails() {
    let mut store = setup_store();
    let err = store.commit_transaction().unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Storage);
}

#[test]
fn test_features_ordered_by_list_order_then_id() {
    // Given: Features inserted out of list order
    let mut store = setup_store();
    let classifier = seed_classifier(&mut store, "Engine");
    let late = seed_feature(&mut store, classifier, 65536);
    let early = seed_feature(&mut store, classifier, -32768);
    let tie = seed_feature(&mut store, classifier, 65536);

    // When: Features are listed
    let ids: Vec<RowId> = store
        .get_features_by_classifier_id(classifier)
        .unwrap()
        .into_iter()
        .map(|f| f.id)
        .collect();

    // Then: Ordering is by list_order, then id
    assert_eq!(ids, vec![early, late, tie]);
}

#[test]
fn test_root_and_child_diagram_lookup() {
    let mut store = setup_store();
    let root = seed_diagram(&mut store, None, DiagramType::UmlPackage);
    let child = seed_diagram(&mut store, Some(root), DiagramType::UmlSequence);

    let roots = store.get_diagram_ids_by_parent_id(None).unwrap();
    assert_eq!(roots.rows, vec![root]);

    let children = store.get_diagrams_by_parent_id(Some(root)).unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children.rows[0].id, child);
    assert_eq!(children.rows[0].diagram_type, DiagramType::UmlSequence);
}

#[test]
fn test_list_lookup_truncated_by_limits() {
    // Given: A store limited to two rows per list lookup
    let limits = ReadLimits {
        max_rows_per_query: Some(2),
    };
    let mut store = setup_store().with_limits(limits);
    let classifier = seed_classifier(&mut store, "Engine");
    for order in 0..3 {
        seed_feature(&mut store, classifier, order);
    }

    // When: The features are listed
    let features = store.get_features_by_classifier_id(classifier).unwrap();

    // Then: Two rows come back, flagged as truncated
    assert!(features.truncated);
    assert_eq!(features.len(), 2);

    // And: Full scans are not limited
    assert_eq!(store.get_all_features().unwrap().len(), 3);
}

#[test]
fn test_relationship_lookup_by_endpoint() {
    use modelx_core::model::{Relationship, RelationshipType};

    let mut store = setup_store();
    let a = seed_classifier(&mut store, "A");
    let b = seed_classifier(&mut store, "B");
    let c = seed_classifier(&mut store, "C");
    let port = seed_feature(&mut store, b, 0);

    let mut rel = Relationship::new(RelationshipType::SyncCall, a, b);
    rel.to_feature_id = Some(port);
    let rel_id = store.insert_row(&rel.into()).unwrap();

    assert_eq!(store.get_relationships_by_classifier_id(b).unwrap().len(), 1);
    assert!(store.get_relationships_by_classifier_id(c).unwrap().is_empty());
    let by_feature = store.get_relationships_by_feature_id(port).unwrap();
    assert_eq!(by_feature.rows[0].id, rel_id);
    assert_eq!(by_feature.rows[0].from_feature_id, None);
}

#[test]
fn test_file_store_persists_across_reopen() {
    // Given: A model file with one classifier
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.sqlite");
    let config = StoreConfig::default();
    let uuid = {
        let mut store = SqliteStore::open(&path, &config).unwrap();
        let id = seed_classifier(&mut store, "Engine");
        store.get_classifier(id).unwrap().uuid
    };

    // When: The file is reopened
    let store = SqliteStore::open(&path, &config).unwrap();

    // Then: The classifier is still there
    let classifier = store.get_classifier_by_uuid(&uuid).unwrap();
    assert_eq!(classifier.name, "Engine");
    assert!(store
        .get_diagram_by_uuid("missing")
        .unwrap_err()
        .is_not_found());
}
