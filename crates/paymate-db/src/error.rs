//! # Database Error Types
//!
//! Error types for store and repository operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error / serde_json::Error / CoreError                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├── DatabaseMissing → "provision the database" screen            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller displays a user-friendly message                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use paymate_core::CoreError;
use thiserror::Error;

/// Backend messages that mean the database itself is absent or
/// unprovisioned, rather than a single record.
const MISSING_DATABASE_MARKERS: [&str; 4] = [
    "does not exist",
    "unable to open database file",
    "no such table: documents",
    "not-found",
];

/// Store and repository errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Document not found.
    ///
    /// ## When This Occurs
    /// - `get` on an id that was never stored or was deleted
    /// - A repository operation on a stale id
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The backing database is missing or was never provisioned.
    ///
    /// ## When This Occurs
    /// - The SQLite file cannot be opened or created
    /// - Migrations were disabled and the `documents` table is absent
    #[error("Database missing: {0}")]
    DatabaseMissing(String),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A document body could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A business rule rejected the operation.
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

    /// Classifies a raw backend message.
    pub fn from_backend_message(message: &str) -> Self {
        if is_missing_database(message) {
            DbError::DatabaseMissing(message.to_string())
        } else {
            DbError::QueryFailed(message.to_string())
        }
    }

    pub fn is_database_missing(&self) -> bool {
        matches!(self, DbError::DatabaseMissing(_))
    }
}

/// True when a backend message signals an absent or unprovisioned database.
pub fn is_missing_database(message: &str) -> bool {
    let message = message.to_lowercase();
    MISSING_DATABASE_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → DatabaseMissing or QueryFailed, by message
/// sqlx::Error::Io             → DatabaseMissing or ConnectionFailed
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Document", "unknown"),

            sqlx::Error::Database(db_err) => DbError::from_backend_message(db_err.message()),

            sqlx::Error::Io(io_err) => {
                let msg = io_err.to_string();
                if is_missing_database(&msg) {
                    DbError::DatabaseMissing(msg)
                } else {
                    DbError::ConnectionFailed(msg)
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

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_database_detection() {
        assert!(is_missing_database(
            "The database (default) does not exist for project demo"
        ));
        assert!(is_missing_database("unable to open database file"));
        assert!(is_missing_database("no such table: documents"));
        assert!(!is_missing_database("UNIQUE constraint failed: documents.id"));
    }

    #[test]
    fn test_backend_message_classification() {
        assert!(DbError::from_backend_message("no such table: documents").is_database_missing());
        assert!(matches!(
            DbError::from_backend_message("syntax error"),
            DbError::QueryFailed(_)
        ));
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: DbError = CoreError::NoWorkingDays.into();
        assert_eq!(err.to_string(), "Payroll period has no working days");
    }
}
