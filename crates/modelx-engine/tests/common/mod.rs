use modelx_core::journal::Boundary;
use modelx_core::model::{
    Classifier, ClassifierType, Diagram, DiagramElement, DiagramType, Feature, RowId,
};
use modelx_core::store::{MemoryStore, Reader, Store};
use modelx_engine::Controller;

pub const NEW: Boundary = Boundary::StartNew;

/// Controller over a fresh in-memory model
#[allow(dead_code)]
pub fn new_controller() -> Controller<MemoryStore> {
    Controller::new(MemoryStore::new())
}

#[allow(dead_code)]
pub fn create_diagram<S: Store>(c: &mut Controller<S>, diagram_type: DiagramType) -> RowId {
    c.create_diagram(Diagram::new(None, diagram_type, "diagram"), NEW)
        .unwrap()
}

#[allow(dead_code)]
pub fn create_classifier<S: Store>(c: &mut Controller<S>, name: &str) -> RowId {
    c.create_classifier(Classifier::new(ClassifierType::UmlClass, name), NEW)
        .unwrap()
}

#[allow(dead_code)]
pub fn bind<S: Store>(c: &mut Controller<S>, diagram_id: RowId, classifier_id: RowId) -> RowId {
    c.create_diagramelement(DiagramElement::new(diagram_id, classifier_id), NEW)
        .unwrap()
}

/// Lifelines owned by a classifier, ascending by id
#[allow(dead_code)]
pub fn lifelines_of<R: Reader>(reader: &R, classifier_id: RowId) -> Vec<Feature> {
    reader
        .get_features_by_classifier_id(classifier_id)
        .unwrap()
        .into_iter()
        .filter(Feature::is_lifeline)
        .collect()
}

#[allow(dead_code)]
pub fn focus_of<R: Reader>(reader: &R, element_id: RowId) -> Option<RowId> {
    reader
        .get_diagramelement(element_id)
        .unwrap()
        .focused_feature_id
}
