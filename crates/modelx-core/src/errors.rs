use modelx_core_types::{RequestId, TraceId};
use thiserror::Error;

use crate::model::{RowId, Table};

/// Result type alias using ModelError
pub type Result<T> = std::result::Result<T, ModelError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable code that the outer layers (GUI, import,
/// CLI) receive together with an optional new row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    NotFound,
    DuplicateName,
    /// VOID id, empty name, forbidden edit, nothing to undo/redo
    InvalidRequest,
    /// A list lookup hit its row limit; non-fatal, logged
    Truncated,
    /// I/O or transaction failure; fatal to the single operation only
    Storage,
    /// Only reported by the repair scan
    ConsistencyViolation,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::DuplicateName => "ERR_DUPLICATE_NAME",
            ExErrorKind::InvalidRequest => "ERR_INVALID_REQUEST",
            ExErrorKind::Truncated => "ERR_TRUNCATED",
            ExErrorKind::Storage => "ERR_STORAGE",
            ExErrorKind::ConsistencyViolation => "ERR_CONSISTENCY_VIOLATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type handed to callers of the facade
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    table: Option<Table>,
    row_id: Option<RowId>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            table: None,
            row_id: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the table the failing row belongs to
    pub fn with_table(mut self, table: Table) -> Self {
        self.table = Some(table);
        self
    }

    /// Add row id context
    pub fn with_row_id(mut self, id: RowId) -> Self {
        self.row_id = Some(id);
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn table(&self) -> Option<Table> {
        self.table
    }

    pub fn row_id(&self) -> Option<RowId> {
        self.row_id
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(table) = self.table {
            write!(f, " (table: {})", table)?;
        }
        if let Some(id) = self.row_id {
            write!(f, " (row_id: {})", id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for model operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("{table} {id} not found")]
    RowNotFound { table: Table, id: RowId },

    #[error("{table} with uuid {uuid} not found")]
    UuidNotFound { table: Table, uuid: String },

    #[error("Classifier name already in use: {name}")]
    DuplicateName { name: String },

    #[error("Operation {op} called with VOID id")]
    VoidId { op: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Consistency violation: {reason}")]
    ConsistencyViolation { reason: String },

    #[error("Storage failure in {op}: {message}")]
    Storage { op: String, message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ModelError {
    pub fn not_found(table: Table, id: RowId) -> Self {
        ModelError::RowNotFound { table, id }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        ModelError::InvalidRequest {
            reason: reason.into(),
        }
    }

    pub fn storage(op: impl Into<String>, message: impl Into<String>) -> Self {
        ModelError::Storage {
            op: op.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ExErrorKind {
        match self {
            ModelError::RowNotFound { .. } | ModelError::UuidNotFound { .. } => {
                ExErrorKind::NotFound
            }
            ModelError::DuplicateName { .. } => ExErrorKind::DuplicateName,
            ModelError::VoidId { .. } | ModelError::InvalidRequest { .. } => {
                ExErrorKind::InvalidRequest
            }
            ModelError::ConsistencyViolation { .. } => ExErrorKind::ConsistencyViolation,
            ModelError::Storage { .. } => ExErrorKind::Storage,
            ModelError::Internal { .. } => ExErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ExErrorKind::NotFound
    }
}

/// Conversion from ModelError to the canonical ExError
impl From<ModelError> for ExError {
    fn from(err: ModelError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match err {
            ModelError::RowNotFound { table, id } => ExError::new(kind)
                .with_table(table)
                .with_row_id(id)
                .with_message(message),
            ModelError::UuidNotFound { table, .. } => {
                ExError::new(kind).with_table(table).with_message(message)
            }
            ModelError::VoidId { op } => ExError::new(kind)
                .with_op(op)
                .with_row_id(RowId::VOID)
                .with_message(message),
            ModelError::Storage { op, .. } => ExError::new(kind).with_op(op).with_message(message),
            ModelError::DuplicateName { .. }
            | ModelError::InvalidRequest { .. }
            | ModelError::ConsistencyViolation { .. }
            | ModelError::Internal { .. } => ExError::new(kind).with_message(message),
        }
    }
}

/// Reject the VOID sentinel before touching the store
pub fn require_id(op: &str, id: RowId) -> Result<RowId> {
    if id.is_void() {
        Err(ModelError::VoidId { op: op.to_string() })
    } else {
        Ok(id)
    }
}
