//! ModelX Engine - model-consistency controller
//!
//! Mediates every structural edit of an open model:
//! - `classifier_controller` / `diagram_controller`: validate a request and
//!   apply it together with the lifeline changes it implies
//! - `controller::Controller`: the facade owning the store, the undo/redo
//!   journal and the change-notification bus
//! - `repair`: offline scan and fix of invariant violations
//!
//! ## Logging Ownership
//!
//! The facade owns lifecycle logging (`log_op_start!`, `log_op_end!`,
//! `log_op_error!`). The controllers below it use only `tracing::debug!`.

mod classifier_controller;
pub mod controller;
mod diagram_controller;
pub mod events;
mod lifelines;
pub mod repair;
mod tx;

pub use controller::{Controller, Outcome};
pub use events::{ChangeEvent, EventBus, Notification, SubscriptionId};
pub use repair::RepairReport;
