//! Validation helpers for `trackd`.
//!
//! These routines enforce the issue structural invariants and return
//! structured validation errors without mutating storage. All violations
//! are collected, not just the first.

use crate::error::ValidationError;
use crate::model::{Issue, IssueInput, Status};

/// Minimum title length, in characters.
pub const MIN_TITLE_LEN: usize = 3;

/// Validates issue fields and invariants.
pub struct IssueValidator;

impl IssueValidator {
    /// Validate a candidate record before insertion.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate_input(input: &IssueInput) -> Result<(), Vec<ValidationError>> {
        Self::validate_fields(&input.title, input.status.unwrap_or_default(), input.owner.as_deref())
    }

    /// Validate a merged record during update.
    ///
    /// Runs only when the patch touched `title`, `status`, or `owner`; the
    /// caller overlays the patch onto the stored record first.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate_merged(issue: &Issue) -> Result<(), Vec<ValidationError>> {
        Self::validate_fields(&issue.title, issue.status, issue.owner.as_deref())
    }

    fn validate_fields(
        title: &str,
        status: Status,
        owner: Option<&str>,
    ) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        // Title: at least 3 characters.
        if title.chars().count() < MIN_TITLE_LEN {
            errors.push(ValidationError::new(
                "title",
                "must be at least 3 characters",
            ));
        }

        // An Assigned issue must have an owner.
        if status == Status::Assigned && owner.is_none_or(str::is_empty) {
            errors.push(ValidationError::new(
                "owner",
                "required when status is Assigned",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
