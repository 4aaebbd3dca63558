//! ModelX Core - structural model kernel
//!
//! This crate provides the building blocks of the model-consistency
//! controller:
//! - the five row types (diagrams, classifiers, features, relationships,
//!   diagram elements) and the `Row`/`Table` sum types
//! - the Reader/Writer store contracts and an in-memory store
//! - the lifeline policy (pure planning of derived changes)
//! - the undo/redo journal
//! - invariant scan rules used by validation and repair
//! - error, logging and configuration facilities

pub mod config;
pub mod errors;
pub mod journal;
pub mod logging_facility;
pub mod model;
pub mod policy;
pub mod rules;
pub mod store;

pub use modelx_core_types as types;

pub use config::ModelConfig;
pub use errors::{ExError, ExErrorKind, ModelError, Result};
pub use journal::{Boundary, Change, Journal, JournalState, Outcome, Replay, Statistics};
pub use model::{
    Classifier, ClassifierType, Diagram, DiagramElement, DiagramType, Feature, FeatureType,
    Relationship, RelationshipType, Row, RowId, Table,
};
pub use store::{MemoryStore, ReadLimits, Reader, RowSet, Store, Writer};
