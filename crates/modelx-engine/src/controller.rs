//! Controller facade
//!
//! Owns the store, the undo/redo journal and the change-notification bus
//! for one open model. Every mutating operation:
//!
//! 1. logs `start`
//! 2. runs the classifier or diagram controller inside one transaction
//! 3. on commit, emits one notification per change and records the
//!    changes in the journal under the caller's `Boundary`
//! 4. logs `end`, or `end_error` with the stable error code
//!
//! A failed operation leaves neither rows nor a journal boundary behind.

use std::path::Path;
use std::time::Instant;

use modelx_core::config::ModelConfig;
use modelx_core::errors::{require_id, ExErrorKind, Result};
use modelx_core::journal::{Boundary, Journal, Replay};
use modelx_core::model::{
    Classifier, ClassifierType, Diagram, DiagramElement, DiagramType, Feature, FeatureType,
    Relationship, RelationshipType, RowId,
};
use modelx_core::rules;
use modelx_core::store::Store;
use modelx_core::types::{RequestId, TraceId};
use modelx_core::{log_op_end, log_op_error, log_op_start};
use modelx_store::SqliteStore;

use crate::classifier_controller as classifiers;
use crate::diagram_controller as diagrams;
use crate::events::{ChangeEvent, EventBus, Notification, SubscriptionId};
use crate::repair::{self, RepairReport};
use crate::tx::{self, Batch};

/// User-visible result of one operation: error code and optional new id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub code: Option<ExErrorKind>,
    pub new_id: Option<RowId>,
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        self.code.is_none()
    }

    /// Stable code string, `"OK"` on success
    pub fn code_str(&self) -> &'static str {
        self.code.map_or("OK", |kind| kind.code())
    }

    pub fn of_create(result: &Result<RowId>) -> Self {
        match result {
            Ok(id) => Self {
                code: None,
                new_id: Some(*id),
            },
            Err(err) => Self {
                code: Some(err.kind()),
                new_id: None,
            },
        }
    }

    pub fn of<T>(result: &Result<T>) -> Self {
        Self {
            code: result.as_ref().err().map(|e| e.kind()),
            new_id: None,
        }
    }

    /// Undo/redo with nothing to replay maps to `InvalidRequest`
    pub fn of_replay(result: &Result<Replay>) -> Self {
        match result {
            Ok(Replay::NothingToDo) => Self {
                code: Some(ExErrorKind::InvalidRequest),
                new_id: None,
            },
            other => Self::of(other),
        }
    }
}

pub struct Controller<S: Store> {
    store: S,
    journal: Journal,
    events: EventBus,
    trace_id: TraceId,
}

impl Controller<SqliteStore> {
    /// Open a model file, creating or migrating its schema
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or migrated.
    pub fn open<P: AsRef<Path>>(path: P, config: &ModelConfig) -> Result<Self> {
        let store = SqliteStore::open(path, &config.store)?;
        Ok(Self::new(store))
    }
}

impl<S: Store> Controller<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            journal: Journal::new(),
            events: EventBus::new(),
            trace_id: TraceId::new(),
        }
    }

    /// Read access to the model
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&Notification) + Send + 'static,
    {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    fn execute<T, F>(&mut self, op: &'static str, boundary: Boundary, f: F) -> Result<T>
    where
        F: FnOnce(&mut Batch<'_, S>) -> Result<T>,
    {
        log_op_start!(op, trace_id = self.trace_id.as_str());
        let start = Instant::now();

        match tx::run(&mut self.store, f) {
            Ok((value, changes)) => {
                let change_count = changes.len();
                self.events.emit_changes(&changes);
                let request_id = self.journal.record(boundary, RequestId::new(), changes);
                log_op_end!(
                    op,
                    duration_ms = start.elapsed().as_millis() as u64,
                    changes = change_count as u64,
                    request_id = request_id.as_ref().map(RequestId::as_str),
                    journal_pos = self.journal.position() as u64
                );
                Ok(value)
            }
            Err(err) => {
                log_op_error!(
                    op,
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Err(err)
            }
        }
    }

    /// `execute` for operations on an existing row; VOID is rejected
    fn execute_on<T, F>(&mut self, op: &'static str, id: RowId, boundary: Boundary, f: F) -> Result<T>
    where
        F: FnOnce(&mut Batch<'_, S>, RowId) -> Result<T>,
    {
        self.execute(op, boundary, |batch| {
            let id = require_id(op, id)?;
            f(batch, id)
        })
    }

    // ---------------------------------------------------------------------
    // Classifiers
    // ---------------------------------------------------------------------

    /// Create a classifier; its name must be unique and not blank
    ///
    /// # Errors
    ///
    /// `DuplicateName`, `InvalidRequest`, or store failures.
    pub fn create_classifier(&mut self, draft: Classifier, boundary: Boundary) -> Result<RowId> {
        self.execute("create_classifier", boundary, |b| {
            classifiers::create_classifier(b, draft)
        })
    }

    /// # Errors
    ///
    /// `NotFound`, `DuplicateName`, `InvalidRequest`, or store failures.
    pub fn update_classifier_name(&mut self, id: RowId, name: &str, boundary: Boundary) -> Result<()> {
        self.execute_on("update_classifier_name", id, boundary, |b, id| {
            classifiers::update_classifier_name(b, id, name)
        })
    }

    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn update_classifier_stereotype(
        &mut self,
        id: RowId,
        stereotype: &str,
        boundary: Boundary,
    ) -> Result<()> {
        self.execute_on("update_classifier_stereotype", id, boundary, |b, id| {
            classifiers::update_classifier_stereotype(b, id, stereotype)
        })
    }

    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn update_classifier_description(
        &mut self,
        id: RowId,
        description: &str,
        boundary: Boundary,
    ) -> Result<()> {
        self.execute_on("update_classifier_description", id, boundary, |b, id| {
            classifiers::update_classifier_description(b, id, description)
        })
    }

    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn update_classifier_main_type(
        &mut self,
        id: RowId,
        main_type: ClassifierType,
        boundary: Boundary,
    ) -> Result<()> {
        self.execute_on("update_classifier_main_type", id, boundary, |b, id| {
            classifiers::update_classifier_main_type(b, id, main_type)
        })
    }

    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn update_classifier_x_order(&mut self, id: RowId, x_order: i32, boundary: Boundary) -> Result<()> {
        self.execute_on("update_classifier_x_order", id, boundary, |b, id| {
            classifiers::update_classifier_x_order(b, id, x_order)
        })
    }

    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn update_classifier_y_order(&mut self, id: RowId, y_order: i32, boundary: Boundary) -> Result<()> {
        self.execute_on("update_classifier_y_order", id, boundary, |b, id| {
            classifiers::update_classifier_y_order(b, id, y_order)
        })
    }

    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn update_classifier_list_order(
        &mut self,
        id: RowId,
        list_order: i32,
        boundary: Boundary,
    ) -> Result<()> {
        self.execute_on("update_classifier_list_order", id, boundary, |b, id| {
            classifiers::update_classifier_list_order(b, id, list_order)
        })
    }

    /// Delete a classifier with its features, relationships and elements
    ///
    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn delete_classifier(&mut self, id: RowId, boundary: Boundary) -> Result<()> {
        self.execute_on("delete_classifier", id, boundary, |b, id| {
            classifiers::delete_classifier(b, id)
        })
    }

    // ---------------------------------------------------------------------
    // Features
    // ---------------------------------------------------------------------

    /// Add a feature to a classifier; lifelines cannot be created manually
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidRequest`, or store failures.
    pub fn create_feature(&mut self, classifier_id: RowId, draft: Feature, boundary: Boundary) -> Result<RowId> {
        self.execute_on("create_feature", classifier_id, boundary, |b, id| {
            classifiers::create_feature(b, id, draft)
        })
    }

    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn update_feature_key(&mut self, id: RowId, key: &str, boundary: Boundary) -> Result<()> {
        self.execute_on("update_feature_key", id, boundary, |b, id| {
            classifiers::update_feature_key(b, id, key)
        })
    }

    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn update_feature_value(&mut self, id: RowId, value: &str, boundary: Boundary) -> Result<()> {
        self.execute_on("update_feature_value", id, boundary, |b, id| {
            classifiers::update_feature_value(b, id, value)
        })
    }

    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn update_feature_description(
        &mut self,
        id: RowId,
        description: &str,
        boundary: Boundary,
    ) -> Result<()> {
        self.execute_on("update_feature_description", id, boundary, |b, id| {
            classifiers::update_feature_description(b, id, description)
        })
    }

    /// # Errors
    ///
    /// `NotFound`, `InvalidRequest` when the change involves a lifeline,
    /// or store failures.
    pub fn update_feature_main_type(
        &mut self,
        id: RowId,
        main_type: FeatureType,
        boundary: Boundary,
    ) -> Result<()> {
        self.execute_on("update_feature_main_type", id, boundary, |b, id| {
            classifiers::update_feature_main_type(b, id, main_type)
        })
    }

    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn update_feature_list_order(&mut self, id: RowId, list_order: i32, boundary: Boundary) -> Result<()> {
        self.execute_on("update_feature_list_order", id, boundary, |b, id| {
            classifiers::update_feature_list_order(b, id, list_order)
        })
    }

    /// Delete a feature; deleting a lifeline clears every focus on it
    ///
    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn delete_feature(&mut self, id: RowId, boundary: Boundary) -> Result<()> {
        self.execute_on("delete_feature", id, boundary, |b, id| {
            classifiers::delete_feature(b, id)
        })
    }

    // ---------------------------------------------------------------------
    // Relationships
    // ---------------------------------------------------------------------

    /// # Errors
    ///
    /// `NotFound` for a missing endpoint, `InvalidRequest` for an endpoint
    /// feature owned by another classifier, or store failures.
    pub fn create_relationship(&mut self, draft: Relationship, boundary: Boundary) -> Result<RowId> {
        self.execute("create_relationship", boundary, |b| {
            classifiers::create_relationship(b, draft)
        })
    }

    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn update_relationship_name(&mut self, id: RowId, name: &str, boundary: Boundary) -> Result<()> {
        self.execute_on("update_relationship_name", id, boundary, |b, id| {
            classifiers::update_relationship_name(b, id, name)
        })
    }

    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn update_relationship_description(
        &mut self,
        id: RowId,
        description: &str,
        boundary: Boundary,
    ) -> Result<()> {
        self.execute_on("update_relationship_description", id, boundary, |b, id| {
            classifiers::update_relationship_description(b, id, description)
        })
    }

    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn update_relationship_main_type(
        &mut self,
        id: RowId,
        main_type: RelationshipType,
        boundary: Boundary,
    ) -> Result<()> {
        self.execute_on("update_relationship_main_type", id, boundary, |b, id| {
            classifiers::update_relationship_main_type(b, id, main_type)
        })
    }

    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn update_relationship_list_order(
        &mut self,
        id: RowId,
        list_order: i32,
        boundary: Boundary,
    ) -> Result<()> {
        self.execute_on("update_relationship_list_order", id, boundary, |b, id| {
            classifiers::update_relationship_list_order(b, id, list_order)
        })
    }

    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn delete_relationship(&mut self, id: RowId, boundary: Boundary) -> Result<()> {
        self.execute_on("delete_relationship", id, boundary, |b, id| {
            classifiers::delete_relationship(b, id)
        })
    }

    // ---------------------------------------------------------------------
    // Diagrams
    // ---------------------------------------------------------------------

    /// # Errors
    ///
    /// `NotFound` for a missing parent, `InvalidRequest` for a blank name,
    /// or store failures.
    pub fn create_diagram(&mut self, draft: Diagram, boundary: Boundary) -> Result<RowId> {
        self.execute("create_diagram", boundary, |b| diagrams::create_diagram(b, draft))
    }

    /// Change the type, binding or releasing lifelines when the diagram
    /// enters or leaves the scenario types
    ///
    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn update_diagram_type(
        &mut self,
        id: RowId,
        diagram_type: DiagramType,
        boundary: Boundary,
    ) -> Result<()> {
        self.execute_on("update_diagram_type", id, boundary, |b, id| {
            diagrams::update_diagram_type(b, id, diagram_type)
        })
    }

    /// # Errors
    ///
    /// `NotFound`, `InvalidRequest` for a blank name, or store failures.
    pub fn update_diagram_name(&mut self, id: RowId, name: &str, boundary: Boundary) -> Result<()> {
        self.execute_on("update_diagram_name", id, boundary, |b, id| {
            diagrams::update_diagram_name(b, id, name)
        })
    }

    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn update_diagram_description(
        &mut self,
        id: RowId,
        description: &str,
        boundary: Boundary,
    ) -> Result<()> {
        self.execute_on("update_diagram_description", id, boundary, |b, id| {
            diagrams::update_diagram_description(b, id, description)
        })
    }

    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn update_diagram_list_order(&mut self, id: RowId, list_order: i32, boundary: Boundary) -> Result<()> {
        self.execute_on("update_diagram_list_order", id, boundary, |b, id| {
            diagrams::update_diagram_list_order(b, id, list_order)
        })
    }

    /// # Errors
    ///
    /// `NotFound`, `InvalidRequest` when the move would create a cycle, or
    /// store failures.
    pub fn update_diagram_parent_id(
        &mut self,
        id: RowId,
        parent_id: Option<RowId>,
        boundary: Boundary,
    ) -> Result<()> {
        self.execute_on("update_diagram_parent_id", id, boundary, |b, id| {
            diagrams::update_diagram_parent_id(b, id, parent_id)
        })
    }

    /// Delete a diagram without children, with all its elements
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidRequest` when child diagrams exist, or store
    /// failures.
    pub fn delete_diagram(&mut self, id: RowId, boundary: Boundary) -> Result<()> {
        self.execute_on("delete_diagram", id, boundary, |b, id| {
            diagrams::delete_diagram(b, id)
        })
    }

    // ---------------------------------------------------------------------
    // Diagram elements
    // ---------------------------------------------------------------------

    /// Bind a classifier into a diagram
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing diagram or classifier, or store failures.
    pub fn create_diagramelement(&mut self, draft: DiagramElement, boundary: Boundary) -> Result<RowId> {
        self.execute("create_diagramelement", boundary, |b| {
            diagrams::create_diagramelement(b, draft)
        })
    }

    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn delete_diagramelement(&mut self, id: RowId, boundary: Boundary) -> Result<()> {
        self.execute_on("delete_diagramelement", id, boundary, |b, id| {
            diagrams::delete_diagramelement(b, id)
        })
    }

    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn update_diagramelement_display_flags(
        &mut self,
        id: RowId,
        display_flags: u32,
        boundary: Boundary,
    ) -> Result<()> {
        self.execute_on("update_diagramelement_display_flags", id, boundary, |b, id| {
            diagrams::update_diagramelement_display_flags(b, id, display_flags)
        })
    }

    /// # Errors
    ///
    /// `NotFound`, `InvalidRequest` for a focus other than the element's
    /// own lifeline, or store failures.
    pub fn update_diagramelement_focused_feature_id(
        &mut self,
        id: RowId,
        focused_feature_id: Option<RowId>,
        boundary: Boundary,
    ) -> Result<()> {
        self.execute_on("update_diagramelement_focused_feature_id", id, boundary, |b, id| {
            diagrams::update_diagramelement_focused_feature_id(b, id, focused_feature_id)
        })
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Relationships drawn on a diagram: both endpoints must be bound
    ///
    /// # Errors
    ///
    /// `NotFound` or store failures.
    pub fn visible_relationships(&self, diagram_id: RowId) -> Result<Vec<Relationship>> {
        let diagram_id = require_id("visible_relationships", diagram_id)?;
        diagrams::visible_relationships(&self.store, diagram_id)
    }

    /// Check every invariant, failing on the first violation
    ///
    /// # Errors
    ///
    /// `ConsistencyViolation` or store failures.
    pub fn validate(&self) -> Result<()> {
        rules::validate_model(&self.store)
    }

    // ---------------------------------------------------------------------
    // Journal
    // ---------------------------------------------------------------------

    /// Undo the last boundary
    ///
    /// # Errors
    ///
    /// Store failures; the journal position is unchanged on error.
    pub fn undo(&mut self) -> Result<Replay> {
        self.replay("undo", |journal, store| journal.undo(store))
    }

    /// Redo the next boundary
    ///
    /// # Errors
    ///
    /// Store failures; the journal position is unchanged on error.
    pub fn redo(&mut self) -> Result<Replay> {
        self.replay("redo", |journal, store| journal.redo(store))
    }

    fn replay<F>(&mut self, op: &'static str, f: F) -> Result<Replay>
    where
        F: FnOnce(&mut Journal, &mut S) -> Result<Replay>,
    {
        log_op_start!(op, journal_pos = self.journal.position() as u64);
        let start = Instant::now();

        match f(&mut self.journal, &mut self.store) {
            Ok(replay) => {
                if let Replay::Applied(replayed) = &replay {
                    self.events.emit_changes(&replayed.changes);
                }
                log_op_end!(
                    op,
                    duration_ms = start.elapsed().as_millis() as u64,
                    nothing_to_do = replay.is_nothing_to_do(),
                    statistics = %replay
                        .statistics()
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                    journal_pos = self.journal.position() as u64
                );
                Ok(replay)
            }
            Err(err) => {
                log_op_error!(
                    op,
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Err(err)
            }
        }
    }

    // ---------------------------------------------------------------------
    // Repair and lifecycle
    // ---------------------------------------------------------------------

    /// Scan for invariant violations and fix them unless `dry_run`
    ///
    /// Fixes bypass the journal. Because undo could no longer replay the
    /// recorded history over repaired rows, the journal is cleared when
    /// anything was fixed.
    ///
    /// # Errors
    ///
    /// Store failures while scanning or committing. A single failed fix is
    /// logged in the report and does not stop the others.
    pub fn repair(&mut self, dry_run: bool) -> Result<RepairReport> {
        log_op_start!("repair", dry_run = dry_run);
        let start = Instant::now();

        match repair::repair(&mut self.store, dry_run) {
            Ok((report, changes)) => {
                if !changes.is_empty() {
                    self.events.emit_changes(&changes);
                    self.journal.clear();
                }
                log_op_end!(
                    "repair",
                    duration_ms = start.elapsed().as_millis() as u64,
                    found = report.found as u64,
                    fixed = report.fixed as u64
                );
                Ok(report)
            }
            Err(err) => {
                log_op_error!(
                    "repair",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Err(err)
            }
        }
    }

    /// Close the model, handing the store back
    ///
    /// Subscribers see `DbPrepareClose` then `DbClosed`; the journal is
    /// discarded.
    pub fn close(mut self) -> S {
        log_op_start!("close");
        let start = Instant::now();
        self.events
            .emit(&Notification::lifecycle(ChangeEvent::DbPrepareClose));
        self.journal.clear();
        self.events.emit(&Notification::lifecycle(ChangeEvent::DbClosed));
        log_op_end!("close", duration_ms = start.elapsed().as_millis() as u64);
        self.store
    }
}
