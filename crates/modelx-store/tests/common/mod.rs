use modelx_core::model::{
    Classifier, ClassifierType, Diagram, DiagramElement, DiagramType, Feature, FeatureType, RowId,
};
use modelx_core::store::Writer;
use modelx_store::SqliteStore;

/// Create a fresh in-memory store with the schema applied
#[allow(dead_code)]
pub fn setup_store() -> SqliteStore {
    SqliteStore::open_in_memory().expect("Failed to open in-memory store")
}

#[allow(dead_code)]
pub fn seed_classifier(store: &mut SqliteStore, name: &str) -> RowId {
    store
        .insert_row(&Classifier::new(ClassifierType::UmlClass, name).into())
        .unwrap()
}

#[allow(dead_code)]
pub fn seed_diagram(store: &mut SqliteStore, parent: Option<RowId>, diagram_type: DiagramType) -> RowId {
    store
        .insert_row(&Diagram::new(parent, diagram_type, "diagram").into())
        .unwrap()
}

#[allow(dead_code)]
pub fn seed_feature(store: &mut SqliteStore, classifier_id: RowId, list_order: i32) -> RowId {
    let mut feature = Feature::new(classifier_id, FeatureType::Property, "attr");
    feature.list_order = list_order;
    store.insert_row(&feature.into()).unwrap()
}

#[allow(dead_code)]
pub fn seed_element(store: &mut SqliteStore, diagram_id: RowId, classifier_id: RowId) -> RowId {
    store
        .insert_row(&DiagramElement::new(diagram_id, classifier_id).into())
        .unwrap()
}
