//! Error types and handling for `trackd`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Validation and authentication failures are produced at the operation
//!   boundary and never wrapped
//! - Storage-consistency failures (`Sequence`, `Update`, `Store`) propagate
//!   unmodified and are never retried by the core
//! - Not-found is a soft result (`None`/`false`), never an error variant

use thiserror::Error;

/// Primary error type for `trackd` operations.
#[derive(Error, Debug)]
pub enum TrackerError {
    // === User input ===
    /// One or more field validation rules were violated.
    ///
    /// Carries every collected violation, not just the first.
    #[error("Validation failed: {}", format_validation_errors(.errors))]
    Validation { errors: Vec<ValidationError> },

    /// Invalid status value.
    #[error("Invalid status: {status}")]
    InvalidStatus { status: String },

    /// Un-parseable timestamp supplied at the boundary.
    #[error("Invalid timestamp for '{field}': {value}")]
    InvalidTimestamp { field: String, value: String },

    // === Authentication ===
    /// A gated operation was invoked without a signed-in session.
    #[error("Signed-in users only: authentication required")]
    Authentication,

    // === Storage consistency ===
    /// The named counter row is missing or corrupted.
    #[error("Sequence counter '{name}' missing or corrupted")]
    Sequence { name: String },

    /// An update matched zero rows: the id does not exist.
    #[error("Update failed: no issue with id {id}")]
    Update { id: i64 },

    /// An insert did not report a new surrogate key.
    #[error("Store failure: {reason}")]
    Store { reason: String },

    /// `SQLite` database error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // === I/O / encoding ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Wrapped anyhow error for boundary code.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// The reason for the validation failure.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl TrackerError {
    /// Can the user fix this without server-side investigation?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::InvalidStatus { .. }
                | Self::InvalidTimestamp { .. }
                | Self::Authentication
                | Self::Update { .. }
        )
    }

    /// Get the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        1
    }

    /// Create from collected validation errors.
    #[must_use]
    pub fn from_validation_errors(errors: Vec<ValidationError>) -> Self {
        Self::Validation { errors }
    }
}

/// Result type using `TrackerError`.
pub type Result<T> = std::result::Result<T, TrackerError>;
