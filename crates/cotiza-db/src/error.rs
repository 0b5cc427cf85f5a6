//! # Database Error Types
//!
//! Error types for persistence, allocation and the quotation service.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          CoreError (cotiza-core)            │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  DbError (this module) ◄──────────────────┘                             │
//! │       │                                                                 │
//! │       ├── UniqueViolation   → allocator retries the bucket              │
//! │       ├── AllocationConflict→ retries exhausted, surfaced to caller     │
//! │       └── everything else   → surfaced to caller                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use cotiza_core::CoreError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - Material id referenced by a quotation line doesn't exist
    /// - Project code doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Two writers reserved the same sequence in one bucket
    /// - Duplicate project code
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Quotation line referencing a non-existent project
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A stored value could not be decoded (bad decimal, unknown kind, ...).
    #[error("Invalid data in {table}.{column}: {reason}")]
    InvalidData {
        table: String,
        column: String,
        reason: String,
    },

    /// Every allocation attempt for a bucket lost the race.
    #[error("Could not allocate a code in bucket {bucket} after {attempts} attempts")]
    AllocationConflict { bucket: String, attempts: u32 },

    /// JSON columns (BOM, material ids) failed to encode or decode.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Domain error raised while pricing or formatting codes.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates an InvalidData error for a column that failed to decode.
    pub fn invalid_data(
        table: impl Into<String>,
        column: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        DbError::InvalidData {
            table: table.into(),
            column: column.into(),
            reason: reason.to_string(),
        }
    }

    /// True for errors a retry with a fresh read can fix.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
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

                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>, ..."
                // PRIMARY KEY on a TEXT column reports the same message.
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
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

impl From<cotiza_core::ValidationError> for DbError {
    fn from(err: cotiza_core::ValidationError) -> Self {
        DbError::Core(CoreError::from(err))
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_pass_through() {
        let err: DbError = CoreError::MissingProjectType.into();
        assert!(matches!(err, DbError::Core(CoreError::MissingProjectType)));
        assert_eq!(err.to_string(), CoreError::MissingProjectType.to_string());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_allocation_conflict_message() {
        let err = DbError::AllocationConflict {
            bucket: "RE-505-".to_string(),
            attempts: 3,
        };
        assert_eq!(
            err.to_string(),
            "Could not allocate a code in bucket RE-505- after 3 attempts"
        );
        assert!(!err.is_unique_violation());
        assert!(DbError::duplicate("projects.code", "RE-505-001").is_unique_violation());
    }
}
