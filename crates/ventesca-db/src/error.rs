//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)        CoreError (ventesca-core)            │
//! │       │                                 │                               │
//! │       ▼                                 ▼                               │
//! │  DbError (this module) ← Adds context and categorization                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (apps/server) ← Serialized for the client                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use ventesca_core::{CoreError, ValidationErrors};

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// No row with this id for the tenant. Soft-deleted products count as
    /// missing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A live product already uses the code, or a second PENDING order
    /// was opened for the same seller.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A bulk modification was asked to leave a state it cannot leave.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// An executed bulk modification has nothing to revert from.
    #[error("Missing snapshot for bulk price modification {0}")]
    MissingSnapshot(String),

    /// Input rejected before any write was attempted.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Any other SQLite error: CHECK constraints, trigger aborts, I/O.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// No connection became free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// ```text
/// RowNotFound                          → NotFound
/// "UNIQUE constraint failed: t.col"    → UniqueViolation { field: "col" }
/// "FOREIGN KEY constraint failed"      → ForeignKeyViolation
/// other database errors                → QueryFailed
/// PoolTimedOut                         → PoolExhausted
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if let Some(columns) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    // "products.tenant_id, products.code" → "code"
                    let field = columns
                        .rsplit(", ")
                        .next()
                        .and_then(|c| c.rsplit('.').next())
                        .unwrap_or(columns)
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<CoreError> for DbError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidBulkTransition { .. } => DbError::InvalidTransition(err.to_string()),
            CoreError::MissingSnapshot(id) => DbError::MissingSnapshot(id),
            CoreError::Validation(errors) => DbError::Validation(errors),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
