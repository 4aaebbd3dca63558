// Lifeline maintenance through the controller facade

mod common;

use common::{bind, create_classifier, create_diagram, focus_of, lifelines_of, new_controller, NEW};
use modelx_core::errors::ExErrorKind;
use modelx_core::journal::{Boundary, Replay};
use modelx_core::model::{
    DiagramElement, DiagramType, Feature, FeatureType, Relationship, RelationshipType, Table,
};
use modelx_core::store::Reader;
use proptest::prelude::*;

#[test]
fn test_lifeline_delete_and_undo_scenario() {
    // Given: A sequence diagram binding one classifier
    let mut c = new_controller();
    let r = create_diagram(&mut c, DiagramType::UmlSequence);
    let k = create_classifier(&mut c, "my_class");
    let e = bind(&mut c, r, k);

    // Then: The classifier owns exactly one lifeline, focused by the element
    let lifelines = lifelines_of(c.store(), k);
    assert_eq!(lifelines.len(), 1);
    let l = lifelines[0].id;
    assert_eq!(focus_of(c.store(), e), Some(l));

    // When: The lifeline is deleted directly
    c.delete_feature(l, NEW).unwrap();

    // Then: The element survives without a focus
    assert_eq!(focus_of(c.store(), e), None);
    assert!(c.store().get_feature(l).unwrap_err().is_not_found());

    // When: The delete is undone
    let replay = c.undo().unwrap();

    // Then: Lifeline and focus are back, with matching statistics
    assert!(c.store().get_feature(l).is_ok());
    assert_eq!(focus_of(c.store(), e), Some(l));
    let stats = replay.statistics().unwrap();
    assert_eq!(stats.created(Table::Feature), 1);
    assert_eq!(stats.modified(Table::DiagramElement), 1);
    assert_eq!(stats.total(), 2);
}

#[test]
fn test_create_element_records_base_change_first() {
    let mut c = new_controller();
    let r = create_diagram(&mut c, DiagramType::UmlSequence);
    let k = create_classifier(&mut c, "my_class");
    bind(&mut c, r, k);

    // element insert, lifeline insert, focus update
    assert_eq!(c.journal().current_boundary_len(), 3);

    let replay = c.undo().unwrap();
    let Replay::Applied(replayed) = replay else {
        panic!("expected an applied undo");
    };
    // undo runs derived changes first, the element delete last
    assert_eq!(replayed.changes.last().unwrap().table(), Table::DiagramElement);
    assert_eq!(c.store().count_rows(Table::DiagramElement).unwrap(), 0);
    assert_eq!(c.store().count_rows(Table::Feature).unwrap(), 0);
}

#[test]
fn test_lifeline_shared_across_scenario_diagrams() {
    // Given: One classifier bound into a sequence and a timing diagram
    let mut c = new_controller();
    let seq = create_diagram(&mut c, DiagramType::UmlSequence);
    let timing = create_diagram(&mut c, DiagramType::UmlTiming);
    let k = create_classifier(&mut c, "shared");
    let e1 = bind(&mut c, seq, k);
    let e2 = bind(&mut c, timing, k);

    // Then: Both elements focus the same single lifeline
    let lifelines = lifelines_of(c.store(), k);
    assert_eq!(lifelines.len(), 1);
    assert_eq!(focus_of(c.store(), e1), Some(lifelines[0].id));
    assert_eq!(focus_of(c.store(), e2), Some(lifelines[0].id));

    // When: One element is deleted, the lifeline stays
    c.delete_diagramelement(e1, NEW).unwrap();
    assert_eq!(lifelines_of(c.store(), k).len(), 1);

    // When: The last one is deleted, the lifeline goes
    c.delete_diagramelement(e2, NEW).unwrap();
    assert!(lifelines_of(c.store(), k).is_empty());
}

#[test]
fn test_non_scenario_element_has_no_lifeline() {
    let mut c = new_controller();
    let class_diagram = create_diagram(&mut c, DiagramType::UmlClass);
    let k = create_classifier(&mut c, "plain");
    let e = bind(&mut c, class_diagram, k);

    assert_eq!(focus_of(c.store(), e), None);
    assert!(lifelines_of(c.store(), k).is_empty());
}

#[test]
fn test_type_change_binds_and_releases_in_batch() {
    // Given: A class diagram with two classifiers, one bound twice
    let mut c = new_controller();
    let d = create_diagram(&mut c, DiagramType::UmlClass);
    let a = create_classifier(&mut c, "A");
    let b = create_classifier(&mut c, "B");
    let ea1 = bind(&mut c, d, a);
    let ea2 = bind(&mut c, d, a);
    let eb = bind(&mut c, d, b);

    // When: The diagram becomes a sequence diagram
    c.update_diagram_type(d, DiagramType::UmlSequence, NEW).unwrap();

    // Then: One lifeline per classifier, shared by both elements of A
    let la = lifelines_of(c.store(), a);
    let lb = lifelines_of(c.store(), b);
    assert_eq!((la.len(), lb.len()), (1, 1));
    assert_eq!(focus_of(c.store(), ea1), Some(la[0].id));
    assert_eq!(focus_of(c.store(), ea2), Some(la[0].id));
    assert_eq!(focus_of(c.store(), eb), Some(lb[0].id));

    // When: It becomes a class diagram again
    c.update_diagram_type(d, DiagramType::UmlClass, NEW).unwrap();

    // Then: Every focus is cleared and the lifelines are gone
    for e in [ea1, ea2, eb] {
        assert_eq!(focus_of(c.store(), e), None);
    }
    assert_eq!(c.store().count_rows(Table::Feature).unwrap(), 0);
    c.validate().unwrap();
}

#[test]
fn test_leaving_scenario_keeps_lifeline_used_elsewhere() {
    let mut c = new_controller();
    let d = create_diagram(&mut c, DiagramType::UmlSequence);
    let other = create_diagram(&mut c, DiagramType::UmlCommunication);
    let k = create_classifier(&mut c, "K");
    let e = bind(&mut c, d, k);
    let kept = bind(&mut c, other, k);

    c.update_diagram_type(d, DiagramType::UmlActivity, NEW).unwrap();

    assert_eq!(focus_of(c.store(), e), None);
    let lifelines = lifelines_of(c.store(), k);
    assert_eq!(lifelines.len(), 1);
    assert_eq!(focus_of(c.store(), kept), Some(lifelines[0].id));
}

#[test]
fn test_scenario_to_scenario_type_change_is_plain_update() {
    let mut c = new_controller();
    let d = create_diagram(&mut c, DiagramType::UmlSequence);
    let k = create_classifier(&mut c, "K");
    bind(&mut c, d, k);

    c.update_diagram_type(d, DiagramType::UmlTiming, NEW).unwrap();
    assert_eq!(c.journal().current_boundary_len(), 1);
    assert_eq!(lifelines_of(c.store(), k).len(), 1);
}

#[test]
fn test_new_lifeline_placed_after_existing_features() {
    let mut c = new_controller();
    let d = create_diagram(&mut c, DiagramType::UmlSequence);
    let k = create_classifier(&mut c, "K");
    let mut attr = Feature::new(k, FeatureType::Property, "speed");
    attr.list_order = 100;
    c.create_feature(k, attr, NEW).unwrap();

    bind(&mut c, d, k);
    let lifeline = &lifelines_of(c.store(), k)[0];
    assert!(lifeline.list_order > 100);
}

#[test]
fn test_delete_classifier_cascades() {
    // Given: A classifier with a feature, a relationship and two elements
    let mut c = new_controller();
    let seq = create_diagram(&mut c, DiagramType::UmlSequence);
    let class_diagram = create_diagram(&mut c, DiagramType::UmlClass);
    let k = create_classifier(&mut c, "K");
    let other = create_classifier(&mut c, "Other");
    c.create_feature(k, Feature::new(k, FeatureType::Operation, "run"), NEW)
        .unwrap();
    c.create_relationship(Relationship::new(RelationshipType::Association, other, k), NEW)
        .unwrap();
    bind(&mut c, seq, k);
    bind(&mut c, class_diagram, k);
    let kept_element = bind(&mut c, seq, other);

    // When: The classifier is deleted
    c.delete_classifier(k, NEW).unwrap();

    // Then: Everything hanging off it is gone, the rest is intact
    let store = c.store();
    assert!(store.get_features_by_classifier_id(k).unwrap().is_empty());
    assert!(store.get_relationships_by_classifier_id(other).unwrap().is_empty());
    assert!(store.get_diagramelements_by_classifier_id(k).unwrap().is_empty());
    assert!(store.get_diagramelement(kept_element).is_ok());
    c.validate().unwrap();

    // And: One undo restores all of it
    c.undo().unwrap();
    assert_eq!(c.store().get_diagramelements_by_classifier_id(k).unwrap().len(), 2);
    assert_eq!(c.store().get_features_by_classifier_id(k).unwrap().len(), 2);
    c.validate().unwrap();
}

#[test]
fn test_delete_diagram_releases_lifelines() {
    let mut c = new_controller();
    let d = create_diagram(&mut c, DiagramType::UmlSequence);
    let k = create_classifier(&mut c, "K");
    bind(&mut c, d, k);

    c.delete_diagram(d, NEW).unwrap();
    assert_eq!(c.store().count_rows(Table::DiagramElement).unwrap(), 0);
    assert!(lifelines_of(c.store(), k).is_empty());
}

#[test]
fn test_delete_diagram_with_shared_lifeline_undoes_cleanly() {
    // Given: A sequence diagram binding one classifier twice
    let mut c = new_controller();
    let d = create_diagram(&mut c, DiagramType::UmlSequence);
    let k = create_classifier(&mut c, "K");
    let first = bind(&mut c, d, k);
    let second = bind(&mut c, d, k);
    let lifeline = lifelines_of(c.store(), k)[0].id;

    // When: The diagram is deleted and the delete undone
    c.delete_diagram(d, NEW).unwrap();
    assert!(lifelines_of(c.store(), k).is_empty());
    let replay = c.undo().unwrap();

    // Then: Both elements come back focused, with no intermediate focus edits
    let stats = replay.statistics().unwrap();
    assert_eq!(stats.created(Table::DiagramElement), 2);
    assert_eq!(stats.modified(Table::DiagramElement), 0);
    assert_eq!(stats.created(Table::Feature), 1);
    assert_eq!(stats.total(), 4);
    assert_eq!(focus_of(c.store(), first), Some(lifeline));
    assert_eq!(focus_of(c.store(), second), Some(lifeline));
    c.validate().unwrap();
}

#[test]
fn test_delete_classifier_with_shared_lifeline_records_no_focus_edits() {
    let mut c = new_controller();
    let seq = create_diagram(&mut c, DiagramType::UmlSequence);
    let timing = create_diagram(&mut c, DiagramType::UmlTiming);
    let k = create_classifier(&mut c, "K");
    bind(&mut c, seq, k);
    bind(&mut c, timing, k);

    c.delete_classifier(k, NEW).unwrap();
    let replay = c.undo().unwrap();

    let stats = replay.statistics().unwrap();
    assert_eq!(stats.created(Table::DiagramElement), 2);
    assert_eq!(stats.modified(Table::DiagramElement), 0);
    assert_eq!(stats.created(Table::Feature), 1);
    c.validate().unwrap();
}

#[test]
fn test_releasing_lifeline_removes_attached_messages() {
    // Given: Two lifelines exchanging a message
    let mut c = new_controller();
    let d = create_diagram(&mut c, DiagramType::UmlSequence);
    let a = create_classifier(&mut c, "A");
    let b = create_classifier(&mut c, "B");
    let ea = bind(&mut c, d, a);
    bind(&mut c, d, b);
    let la = lifelines_of(c.store(), a)[0].id;
    let lb = lifelines_of(c.store(), b)[0].id;
    let mut message = Relationship::new(RelationshipType::SyncCall, a, b);
    message.from_feature_id = Some(la);
    message.to_feature_id = Some(lb);
    let message = c.create_relationship(message, NEW).unwrap();

    // When: A is removed from the diagram
    c.delete_diagramelement(ea, NEW).unwrap();

    // Then: A's lifeline and the message attached to it are gone
    assert!(c.store().get_relationship(message).unwrap_err().is_not_found());
    c.validate().unwrap();
}

#[test]
fn test_lifeline_type_edits_rejected() {
    let mut c = new_controller();
    let d = create_diagram(&mut c, DiagramType::UmlSequence);
    let k = create_classifier(&mut c, "K");
    bind(&mut c, d, k);
    let lifeline = lifelines_of(c.store(), k)[0].id;
    let attr = c
        .create_feature(k, Feature::new(k, FeatureType::Property, "x"), NEW)
        .unwrap();

    let err = c
        .update_feature_main_type(lifeline, FeatureType::Port, NEW)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidRequest);
    let err = c
        .update_feature_main_type(attr, FeatureType::Lifeline, NEW)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidRequest);
    c.update_feature_main_type(attr, FeatureType::Operation, NEW)
        .unwrap();
}

#[test]
fn test_failed_operation_leaves_no_trace() {
    let mut c = new_controller();
    let d = create_diagram(&mut c, DiagramType::UmlSequence);
    let before = c.journal().len();

    let missing = modelx_core::model::RowId::new(999);
    let err = c
        .create_diagramelement(DiagramElement::new(d, missing), Boundary::Append)
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(c.journal().len(), before);
    assert_eq!(c.store().count_rows(Table::DiagramElement).unwrap(), 0);
}

#[test]
fn test_visible_relationships_hide_half_bound() {
    let mut c = new_controller();
    let d = create_diagram(&mut c, DiagramType::UmlClass);
    let a = create_classifier(&mut c, "A");
    let b = create_classifier(&mut c, "B");
    let outside = create_classifier(&mut c, "Outside");
    bind(&mut c, d, a);
    bind(&mut c, d, b);
    let shown = c
        .create_relationship(Relationship::new(RelationshipType::Dependency, a, b), NEW)
        .unwrap();
    c.create_relationship(Relationship::new(RelationshipType::Dependency, a, outside), NEW)
        .unwrap();

    let visible = c.visible_relationships(d).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, shown);
}

fn any_diagram_type() -> impl Strategy<Value = DiagramType> {
    prop::sample::select(DiagramType::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_type_toggles_keep_one_lifeline_per_classifier(
        types in prop::collection::vec(any_diagram_type(), 1..8),
        bindings in prop::collection::vec(0usize..3, 1..6),
    ) {
        // Given: A diagram binding some of three classifiers, possibly twice
        let mut c = new_controller();
        let d = create_diagram(&mut c, DiagramType::UmlClass);
        let classifiers: Vec<_> = ["A", "B", "C"]
            .iter()
            .map(|name| create_classifier(&mut c, name))
            .collect();
        for &i in &bindings {
            bind(&mut c, d, classifiers[i]);
        }

        // When: The type is changed repeatedly
        for t in &types {
            c.update_diagram_type(d, *t, NEW).unwrap();
        }

        // Then: Bound classifiers own exactly one lifeline iff the final type is scenario
        let scenario = types.last().unwrap().is_scenario();
        for (i, classifier) in classifiers.iter().enumerate() {
            let expected = usize::from(scenario && bindings.contains(&i));
            prop_assert_eq!(lifelines_of(c.store(), *classifier).len(), expected);
        }
        prop_assert!(c.validate().is_ok());
    }
}
