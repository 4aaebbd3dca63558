// Undo/redo boundaries and change notifications

mod common;

use std::sync::{Arc, Mutex};

use common::{bind, create_classifier, create_diagram, new_controller, NEW};
use modelx_core::errors::ExErrorKind;
use modelx_core::journal::{Boundary, JournalState};
use modelx_core::model::{DiagramType, RowId, Table};
use modelx_core::store::Reader;
use modelx_engine::{ChangeEvent, Notification, Outcome};
use proptest::prelude::*;

fn recorder() -> (Arc<Mutex<Vec<Notification>>>, impl FnMut(&Notification) + Send + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |n: &Notification| sink.lock().unwrap().push(n.clone()))
}

#[test]
fn test_append_groups_operations_into_one_undo() {
    // Given: A classifier renamed twice, the second edit appended
    let mut c = new_controller();
    let k = create_classifier(&mut c, "first");
    c.update_classifier_name(k, "second", NEW).unwrap();
    c.update_classifier_stereotype(k, "entity", Boundary::Append)
        .unwrap();
    assert_eq!(c.journal().len(), 2);
    assert_eq!(c.journal().current_boundary_len(), 2);

    // When: Undone once
    c.undo().unwrap();

    // Then: Both appended edits are reverted, the create stays
    let classifier = c.store().get_classifier(k).unwrap();
    assert_eq!(classifier.name, "first");
    assert_eq!(classifier.stereotype, "");
    assert_eq!(c.journal().position(), 1);
}

#[test]
fn test_no_op_start_new_closes_boundary() {
    // Given: A create followed by a rename that changes nothing
    let mut c = new_controller();
    let a = create_classifier(&mut c, "a");
    c.update_classifier_name(a, "a", NEW).unwrap();

    // When: The next create appends
    let b = c
        .create_classifier(
            modelx_core::model::Classifier::new(
                modelx_core::model::ClassifierType::UmlClass,
                "b",
            ),
            Boundary::Append,
        )
        .unwrap();
    assert_eq!(c.journal().len(), 2);

    // Then: One undo only reverts the appended create
    c.undo().unwrap();
    assert!(c.store().get_classifier(a).is_ok());
    assert!(c.store().get_classifier(b).unwrap_err().is_not_found());
    assert_eq!(c.journal().position(), 1);
}

#[test]
fn test_append_on_empty_journal_starts_boundary() {
    let mut c = new_controller();
    create_diagram(&mut c, DiagramType::UmlClass);
    c.undo().unwrap();

    let d = c
        .create_diagram(
            modelx_core::model::Diagram::new(None, DiagramType::UmlClass, "again"),
            Boundary::Append,
        )
        .unwrap();
    assert_eq!(c.journal().len(), 1);
    assert!(c.store().get_diagram(d).is_ok());
}

#[test]
fn test_append_after_undo_opens_new_boundary() {
    let mut c = new_controller();
    let k = create_classifier(&mut c, "k");
    c.update_classifier_name(k, "renamed", NEW).unwrap();
    c.undo().unwrap();

    c.update_classifier_description(k, "text", Boundary::Append)
        .unwrap();
    c.undo().unwrap();

    // the create was not merged into the appended edit
    assert!(c.store().get_classifier(k).is_ok());
}

#[test]
fn test_redo_discarded_by_new_operation() {
    // Given: An undone rename
    let mut c = new_controller();
    let k = create_classifier(&mut c, "k");
    c.update_classifier_name(k, "renamed", NEW).unwrap();
    c.undo().unwrap();
    assert_eq!(c.journal().state(), JournalState::InPast);
    assert!(c.journal().can_redo());

    // When: A new operation runs
    c.update_classifier_x_order(k, 40, NEW).unwrap();

    // Then: The undone rename can no longer be redone
    assert!(!c.journal().can_redo());
    assert!(c.redo().unwrap().is_nothing_to_do());
    assert_eq!(c.store().get_classifier(k).unwrap().name, "k");
}

#[test]
fn test_undo_redo_round_trip_restores_state() {
    let mut c = new_controller();
    let d = create_diagram(&mut c, DiagramType::UmlSequence);
    let k = create_classifier(&mut c, "k");
    let e = bind(&mut c, d, k);

    c.undo().unwrap();
    assert!(c.store().get_diagramelement(e).unwrap_err().is_not_found());
    assert_eq!(c.journal().state(), JournalState::InPast);

    let replay = c.redo().unwrap();
    let stats = replay.statistics().unwrap();
    assert_eq!(stats.created(Table::DiagramElement), 1);
    assert_eq!(stats.created(Table::Feature), 1);
    assert_eq!(stats.modified(Table::DiagramElement), 1);

    // ids survive the round trip
    let element = c.store().get_diagramelement(e).unwrap();
    assert!(element.focused_feature_id.is_some());
    c.validate().unwrap();
}

#[test]
fn test_nothing_to_do_is_status_not_error() {
    let mut c = new_controller();
    let undo = c.undo();
    let redo = c.redo();

    assert!(undo.as_ref().unwrap().is_nothing_to_do());
    assert!(redo.as_ref().unwrap().is_nothing_to_do());
    assert_eq!(Outcome::of_replay(&undo).code, Some(ExErrorKind::InvalidRequest));
}

#[test]
fn test_rejected_operation_records_nothing() {
    let mut c = new_controller();
    create_classifier(&mut c, "taken");
    let k = create_classifier(&mut c, "other");
    let before = c.journal().len();

    let err = c.update_classifier_name(k, "taken", NEW).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::DuplicateName);
    let err = c.update_classifier_name(RowId::VOID, "x", NEW).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidRequest);

    assert_eq!(c.journal().len(), before);
}

#[test]
fn test_noop_update_records_nothing() {
    let mut c = new_controller();
    let k = create_classifier(&mut c, "same");
    c.update_classifier_name(k, "same", NEW).unwrap();
    assert_eq!(c.journal().len(), 1);
}

#[test]
fn test_notifications_follow_commit_in_change_order() {
    // Given: A subscriber on a controller with a scenario diagram
    let mut c = new_controller();
    let d = create_diagram(&mut c, DiagramType::UmlSequence);
    let k = create_classifier(&mut c, "k");
    let (seen, handler) = recorder();
    let subscription = c.subscribe(handler);

    // When: An element is created
    let e = bind(&mut c, d, k);

    // Then: Base change first, derived changes after
    let events: Vec<_> = seen
        .lock()
        .unwrap()
        .iter()
        .map(|n| (n.table, n.event))
        .collect();
    assert_eq!(
        events,
        vec![
            (Some(Table::DiagramElement), ChangeEvent::Created),
            (Some(Table::Feature), ChangeEvent::Created),
            (Some(Table::DiagramElement), ChangeEvent::Updated),
        ]
    );
    assert_eq!(seen.lock().unwrap()[0].row_id, e);

    // And: Undo notifies the replayed changes too
    seen.lock().unwrap().clear();
    c.undo().unwrap();
    assert_eq!(seen.lock().unwrap().len(), 3);
    assert_eq!(seen.lock().unwrap()[2].event, ChangeEvent::Deleted);

    // And: Nothing arrives after unsubscribing
    assert!(c.unsubscribe(subscription));
    seen.lock().unwrap().clear();
    c.redo().unwrap();
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_failed_operation_notifies_nothing() {
    let mut c = new_controller();
    let (seen, handler) = recorder();
    c.subscribe(handler);

    c.delete_classifier(RowId::new(42), NEW).unwrap_err();
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_close_emits_lifecycle_events() {
    let mut c = new_controller();
    create_classifier(&mut c, "k");
    let (seen, handler) = recorder();
    c.subscribe(handler);

    let store = c.close();

    let events: Vec<_> = seen.lock().unwrap().iter().map(|n| n.event).collect();
    assert_eq!(events, vec![ChangeEvent::DbPrepareClose, ChangeEvent::DbClosed]);
    assert!(seen.lock().unwrap().iter().all(|n| n.table.is_none()));
    assert_eq!(store.count_rows(Table::Classifier).unwrap(), 1);
}

#[derive(Debug, Clone)]
enum Op {
    Bind { diagram: usize, classifier: usize },
    Unbind { element: usize },
    SetType { diagram: usize, scenario: bool },
    Rename { classifier: usize },
    DeleteClassifier { classifier: usize },
}

fn any_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..2, 0usize..3).prop_map(|(diagram, classifier)| Op::Bind { diagram, classifier }),
        (0usize..8).prop_map(|element| Op::Unbind { element }),
        (0usize..2, any::<bool>()).prop_map(|(diagram, scenario)| Op::SetType { diagram, scenario }),
        (0usize..3).prop_map(|classifier| Op::Rename { classifier }),
        (0usize..3).prop_map(|classifier| Op::DeleteClassifier { classifier }),
    ]
}

type Rows = (
    Vec<modelx_core::model::Diagram>,
    Vec<modelx_core::model::Classifier>,
    Vec<modelx_core::model::Feature>,
    Vec<modelx_core::model::DiagramElement>,
);

fn all_rows<R: Reader>(reader: &R) -> Rows {
    (
        reader.get_all_diagrams().unwrap(),
        reader.get_all_classifiers().unwrap(),
        reader.get_all_features().unwrap(),
        reader.get_all_diagramelements().unwrap(),
    )
}

proptest! {
    #[test]
    fn prop_undo_all_restores_initial_rows(ops in prop::collection::vec(any_op(), 1..12)) {
        // Given: Two diagrams and three classifiers
        let mut c = new_controller();
        let diagrams = [
            create_diagram(&mut c, DiagramType::UmlSequence),
            create_diagram(&mut c, DiagramType::UmlClass),
        ];
        let classifiers: Vec<_> = ["A", "B", "C"]
            .iter()
            .map(|name| create_classifier(&mut c, name))
            .collect();
        let seeded = c.journal().position();
        let initial = all_rows(c.store());
        let mut elements = Vec::new();

        // When: Random operations run; rejected ones are simply skipped
        for (step, op) in ops.iter().enumerate() {
            match op {
                Op::Bind { diagram, classifier } => {
                    if let Ok(id) = c.create_diagramelement(
                        modelx_core::model::DiagramElement::new(diagrams[*diagram], classifiers[*classifier]),
                        NEW,
                    ) {
                        elements.push(id);
                    }
                }
                Op::Unbind { element } => {
                    if let Some(id) = elements.get(*element) {
                        let _ = c.delete_diagramelement(*id, NEW);
                    }
                }
                Op::SetType { diagram, scenario } => {
                    let t = if *scenario { DiagramType::UmlTiming } else { DiagramType::UmlComponent };
                    c.update_diagram_type(diagrams[*diagram], t, NEW).unwrap();
                }
                Op::Rename { classifier } => {
                    let _ = c.update_classifier_name(classifiers[*classifier], &format!("n{}", step), NEW);
                }
                Op::DeleteClassifier { classifier } => {
                    let _ = c.delete_classifier(classifiers[*classifier], NEW);
                }
            }
            prop_assert!(c.validate().is_ok());
        }

        // Then: Undoing back to the seeded position restores every row
        while c.journal().position() > seeded {
            prop_assert!(!c.undo().unwrap().is_nothing_to_do());
        }
        prop_assert_eq!(all_rows(c.store()), initial);
    }
}
