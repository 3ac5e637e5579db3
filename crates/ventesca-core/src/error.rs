//! # Error Types
//!
//! Domain-specific error types for ventesca-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ventesca-core errors (this file)                                       │
//! │  ├── CoreError          - Invariant violations of the domain            │
//! │  ├── ValidationError    - One field failed validation                   │
//! │  └── ValidationErrors   - Every failing field of one payload            │
//! │                                                                         │
//! │  ventesca-db errors (separate crate)                                    │
//! │  └── DbError            - Database operation failures                   │
//! │                                                                         │
//! │  server errors (apps/server)                                            │
//! │  └── ApiError           - What the HTTP client sees (serialized)        │
//! │                                                                         │
//! │  Flow: ValidationErrors → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Business-rule rejections (decrease below zero, quantity over stock,
//! inactive product) are NOT errors. They are reported as statuses by the
//! intent handlers, so nothing here models them.

use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

use crate::types::BulkStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Domain invariant violations.
///
/// These abort the current operation; they are not expected during normal use.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A bulk modification was asked to move between states it cannot.
    ///
    /// ## When This Occurs
    /// - Executing a bulk modification that is already EXECUTED or REVERTED
    /// - Reverting one that is still PENDING or already REVERTED
    /// - Cancelling one that has left PENDING
    #[error("Bulk price modification cannot go from {from:?} to {to:?}")]
    InvalidBulkTransition { from: BulkStatus, to: BulkStatus },

    /// An executed bulk modification has no price snapshot to restore from.
    #[error("Bulk price modification {0} has no price snapshot")]
    MissingSnapshot(String),

    /// Validation error (wraps ValidationErrors).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, one per field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// The name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::MustNotBeNegative { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Wire form of one failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every validation failure of one payload.
///
/// ## Usage
/// ```rust
/// use ventesca_core::error::ValidationErrors;
/// use ventesca_core::validation::{validate_code, validate_price};
///
/// let mut errors = ValidationErrors::new();
/// errors.check(validate_code(""));
/// errors.check(validate_price("sellingPrice", -1));
/// assert_eq!(errors.len(), 2);
/// assert!(errors.into_result().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors(Vec::new())
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Records the error of a failed check, if any.
    pub fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(e) = result {
            self.0.push(e);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// Per-field messages for the response body.
    pub fn field_errors(&self) -> Vec<FieldError> {
        self.0
            .iter()
            .map(|e| FieldError {
                field: e.field().to_string(),
                message: e.to_string(),
            })
            .collect()
    }

    /// `Ok(())` when nothing failed.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        ValidationErrors(vec![error])
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidBulkTransition {
            from: BulkStatus::Reverted,
            to: BulkStatus::Executed,
        };
        assert_eq!(
            err.to_string(),
            "Bulk price modification cannot go from Reverted to Executed"
        );

        let err = ValidationError::Required {
            field: "code".to_string(),
        };
        assert_eq!(err.to_string(), "code is required");
        assert_eq!(err.field(), "code");
    }

    #[test]
    fn test_validation_errors_collects_fields() {
        let mut errors = ValidationErrors::new();
        errors.check(Ok(()));
        errors.check(Err(ValidationError::MustBePositive {
            field: "adjustmentValue".to_string(),
        }));

        let fields = errors.field_errors();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field, "adjustmentValue");
        assert_eq!(fields[0].message, "adjustmentValue must be positive");
    }

    #[test]
    fn test_empty_validation_errors_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let errors: ValidationErrors = ValidationError::Required {
            field: "code".to_string(),
        }
        .into();
        let core_err: CoreError = errors.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
