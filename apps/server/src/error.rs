//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Ventesca                               │
//! │                                                                         │
//! │  Handler: Result<Json<T>, ApiError>                                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Validation failed? ── ValidationErrors ───────────────► 400 + fields   │
//! │  Not found?         ── DbError::NotFound ──────────────► 404            │
//! │  Bad transition?    ── DbError::InvalidTransition ─────► 409            │
//! │  Duplicate code?    ── DbError::UniqueViolation ───────► 409            │
//! │  Missing snapshot?  ── DbError::MissingSnapshot ───────► 500 (logged)   │
//! │  Storage failure?   ── DbError::QueryFailed, ... ──────► 500 (logged)   │
//! │                                                                         │
//! │  Business rejections (over stock, inactive product, ...) never get      │
//! │  here: they are an IntentStatus inside a 200 response.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Response Body
//! ```json
//! {
//!   "code": "VALIDATION_ERROR",
//!   "message": "2 field(s) failed validation",
//!   "fields": [{ "field": "code", "message": "code is required" }]
//! }
//! ```

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use ts_rs::TS;
use ventesca_core::{CoreError, FieldError, ValidationError, ValidationErrors};
use ventesca_db::DbError;

/// API error returned from handlers.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Per-field failures of a rejected payload
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Missing or malformed session headers (401)
    Unauthorized,

    /// Request conflicts with the current state (409)
    Conflict,

    /// Stored data broke an invariant (500)
    InvariantViolation,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::InvariantViolation | ErrorCode::DatabaseError | ErrorCode::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::InvalidTransition(message) => ApiError::new(ErrorCode::Conflict, message),
            DbError::MissingSnapshot(id) => {
                tracing::error!(bulk_id = %id, "Executed bulk modification has no snapshot");
                ApiError::new(
                    ErrorCode::InvariantViolation,
                    format!("Bulk price modification {} has no price snapshot", id),
                )
            }
            DbError::Validation(errors) => ApiError::from(errors),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::from(DbError::from(err))
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: errors.to_string(),
            fields: errors.field_errors(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::from(ValidationErrors::from(err))
    }
}

/// Malformed JSON, unknown intents and bad enum values are validation errors.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ventesca_core::BulkStatus;

    #[test]
    fn test_db_error_status_mapping() {
        let cases = [
            (DbError::not_found("Order line", "x"), StatusCode::NOT_FOUND),
            (DbError::duplicate("code", "BEB-001"), StatusCode::CONFLICT),
            (
                DbError::InvalidTransition("no".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                DbError::MissingSnapshot("b1".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DbError::QueryFailed("disk I/O error".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).code.status(), status);
        }
    }

    #[test]
    fn test_storage_details_are_not_exposed() {
        let err = ApiError::from(DbError::QueryFailed("no such table: secrets".to_string()));
        assert!(!err.message.contains("secrets"));
    }

    #[test]
    fn test_validation_errors_carry_fields() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::Required {
            field: "code".to_string(),
        });
        errors.push(ValidationError::MustBePositive {
            field: "adjustmentValue".to_string(),
        });

        let err = ApiError::from(errors);
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.fields.len(), 2);
        assert_eq!(err.fields[1].field, "adjustmentValue");

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["fields"][0]["field"], "code");
    }

    #[test]
    fn test_core_transition_error_is_conflict() {
        let err = ApiError::from(CoreError::InvalidBulkTransition {
            from: BulkStatus::Reverted,
            to: BulkStatus::Executed,
        });
        assert_eq!(err.code, ErrorCode::Conflict);
        assert!(err.fields.is_empty());
    }
}
