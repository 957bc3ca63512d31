//! # Database Error Types
//!
//! Error types for database operations, plus the request-boundary taxonomy.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CircError (this module) ← Request-boundary kinds callers match on     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller displays message / dispatches on kind()                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No raw storage error crosses the operation boundary: everything collapses
//! into one of the `CircError` kinds, with the original diagnostic carried
//! only as an opaque string inside `StoreUnavailable`.

use thiserror::Error;

use circ_core::{CoreError, ValidationError};

// =============================================================================
// Storage Errors
// =============================================================================

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - ID doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate borrower email or username
    /// - A second open loan for the same (item, borrower) pair
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// CHECK constraint violation.
    ///
    /// ## When This Occurs
    /// - A write would push available_count out of `0..=total_count`
    /// - A catalog update would set total below the open-loan count
    #[error("Constraint violated: {message}")]
    CheckViolation { message: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - A loan referencing a non-existent item id
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
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

                // SQLite error messages for constraints:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // CHECK constraint:  "CHECK constraint failed: <detail>"
                // FK constraint:     "FOREIGN KEY constraint failed"
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
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
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

/// Field-rule failures surface as constraint violations: both mean the
/// write was refused before any state change.
impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::CheckViolation {
            message: err.to_string(),
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

// =============================================================================
// Request-Boundary Errors
// =============================================================================

/// Failure kinds visible to callers of circulation, query, and account
/// operations.
///
/// Every variant carries enough context for a human-readable message
/// (via `Display`) and exposes a machine-readable kind via [`CircError::kind`].
#[derive(Debug, Error)]
pub enum CircError {
    /// Referenced item or record is absent.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// No copies left to issue.
    #[error("Item {item_id} is unavailable: no copies left to issue")]
    Unavailable { item_id: String },

    /// Return attempted with no matching open loan.
    #[error("No active record found for item {item_id} and borrower '{borrower}'; verify the item identifier")]
    NoActiveLoan { item_id: String, borrower: String },

    /// Uniqueness violation on create (email, username, or a second open
    /// loan for the same item/borrower pair).
    #[error("Duplicate {field}: '{value}' already exists")]
    DuplicateKey { field: String, value: String },

    /// Username/password pair did not verify.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Input rejected before any state change.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Underlying persistence unreachable or misbehaving. Fatal for this
    /// request; retries are the caller's responsibility.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl CircError {
    /// Machine-readable kind for programmatic dispatch.
    pub fn kind(&self) -> &'static str {
        match self {
            CircError::NotFound { .. } => "NOT_FOUND",
            CircError::Unavailable { .. } => "UNAVAILABLE",
            CircError::NoActiveLoan { .. } => "NO_ACTIVE_LOAN",
            CircError::DuplicateKey { .. } => "DUPLICATE_KEY",
            CircError::InvalidCredentials => "INVALID_CREDENTIALS",
            CircError::Validation { .. } => "VALIDATION",
            CircError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    /// Creates a NotFound error.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CircError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Collapses storage errors into the caller-facing taxonomy.
impl From<DbError> for CircError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CircError::NotFound { entity, id },
            DbError::UniqueViolation { field, value } => CircError::DuplicateKey { field, value },
            DbError::CheckViolation { message } => CircError::Validation { message },
            // Everything else is a store fault; keep the diagnostic opaque.
            other => CircError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<ValidationError> for CircError {
    fn from(err: ValidationError) -> Self {
        CircError::Validation {
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for CircError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ItemNotFound(id) => CircError::not_found("Item", id),
            CoreError::ItemUnavailable { item_id, .. } => CircError::Unavailable { item_id },
            CoreError::NoActiveLoan { item_id, borrower } => {
                CircError::NoActiveLoan { item_id, borrower }
            }
            CoreError::LoanAlreadyOpen { item_id, borrower } => CircError::DuplicateKey {
                field: "open loan".to_string(),
                value: format!("{}/{}", item_id, borrower),
            },
            CoreError::StockBelowOpenLoans { requested, open } => CircError::Validation {
                message: format!(
                    "cannot set total to {}: {} copies are out on loan",
                    requested, open
                ),
            },
            CoreError::Validation(e) => e.into(),
        }
    }
}

/// Result type for operation-boundary calls.
pub type CircResult<T> = Result<T, CircError>;

// =============================================================================
// Unit Tests
// =============================================================================
