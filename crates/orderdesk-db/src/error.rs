//! # Database Error Types
//!
//! Error types for store operations and their classification into the
//! error kinds a request layer reports.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          CoreError (business rule)          │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  DbError (this module) ◄──── Domain(CoreError)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ErrorKind + ErrorReport ← Serialized by the request layer              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller displays message, retries if `retryable`                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use orderdesk_core::{CoreError, Entity, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// SQLite primary result codes (the low byte of an extended code).
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;
const SQLITE_CONSTRAINT: i32 = 19;

/// Store operation errors.
///
/// These errors wrap sqlx errors and domain rejections, keeping enough
/// structure to classify each one without parsing messages.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found by id.
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },

    /// A business rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Unique, foreign key or check constraint failure not classified
    /// as a domain error.
    ///
    /// ## When This Occurs
    /// - Duplicate user email
    /// - Duplicate payment transaction id
    /// - A CHECK constraint or trigger aborting a write
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// Transient failures persisted past the retry budget.
    #[error("Store unavailable after {attempts} attempt(s): {message}")]
    StoreUnavailable { attempts: u32, message: String },

    /// SQLite reported BUSY or LOCKED.
    #[error("Database busy: {0}")]
    Busy(String),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Pool closed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Pool exhausted (all connections in use past the acquire timeout).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: Entity, id: i64) -> Self {
        DbError::NotFound { entity, id }
    }

    /// Creates a ConcurrentModification rejection.
    pub fn concurrent(entity: Entity, id: i64) -> Self {
        DbError::Domain(CoreError::ConcurrentModification { entity, id })
    }

    /// Maps the error onto the reported taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::NotFound { .. } => ErrorKind::NotFound,
            DbError::Domain(err) => match err {
                CoreError::UnknownOrder { .. } => ErrorKind::UnknownOrder,
                CoreError::UnknownProduct { .. } => ErrorKind::UnknownProduct,
                CoreError::UnknownUser { .. } => ErrorKind::NotFound,
                CoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
                CoreError::ImmutableReference { .. } => ErrorKind::ImmutableReference,
                CoreError::ConcurrentModification { .. } => ErrorKind::ConcurrentModification,
                CoreError::HasDependentPayments { .. } => ErrorKind::HasDependentPayments,
                CoreError::HasDependentOrders { .. } => ErrorKind::HasDependentOrders,
                CoreError::ReferencedByOrderItems { .. } => ErrorKind::ReferencedByOrderItems,
                CoreError::Validation(_) => ErrorKind::InvalidInput,
            },
            DbError::ConstraintViolation { .. } => ErrorKind::ConstraintViolation,
            DbError::StoreUnavailable { .. }
            | DbError::Busy(_)
            | DbError::ConnectionFailed(_)
            | DbError::PoolExhausted => ErrorKind::StoreUnavailable,
            DbError::MigrationFailed(_) | DbError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// True when the caller may retry the whole operation.
    ///
    /// Only optimistic concurrency conflicts qualify; transient store
    /// failures are already retried inside `Database::transactionally`.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::ConcurrentModification
    }

    /// True for failures that `Database::transactionally` retries with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DbError::Busy(_) | DbError::PoolExhausted | DbError::ConnectionFailed(_)
        )
    }

    /// Builds the serializable report for the request layer.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
            retryable: self.is_retryable(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database (constraint)  → DbError::ConstraintViolation
/// sqlx::Error::Database (busy/locked) → DbError::Busy
/// sqlx::Error::PoolTimedOut           → DbError::PoolExhausted
/// sqlx::Error::PoolClosed / Io        → DbError::ConnectionFailed
/// Other                               → DbError::Internal
/// ```
///
/// `RowNotFound` is not mapped to `NotFound`: repositories use
/// `fetch_optional` and name the missing entity themselves.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                let primary = db_err
                    .code()
                    .and_then(|code| code.parse::<i32>().ok())
                    .map(|code| code & 0xff);

                if db_err.is_unique_violation()
                    || db_err.is_foreign_key_violation()
                    || db_err.is_check_violation()
                    || primary == Some(SQLITE_CONSTRAINT)
                {
                    DbError::ConstraintViolation { message }
                } else if matches!(primary, Some(SQLITE_BUSY) | Some(SQLITE_LOCKED)) {
                    DbError::Busy(message)
                } else {
                    DbError::Internal(message)
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Domain(CoreError::Validation(err))
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// True when `err` is a foreign key failure.
///
/// Repositories whose table has a single foreign key translate this into the
/// matching `Unknown*` domain error.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_foreign_key_violation(),
        _ => false,
    }
}

/// Maps a foreign key failure to `domain`, anything else through `From`.
pub(crate) fn map_foreign_key(err: sqlx::Error, domain: CoreError) -> DbError {
    if is_foreign_key_violation(&err) {
        DbError::Domain(domain)
    } else {
        DbError::from(err)
    }
}

// =============================================================================
// Error Kinds
// =============================================================================

/// Error kinds surfaced to the request layer, never raw store exceptions.
///
/// ## Serialization
/// ```json
/// "INSUFFICIENT_STOCK"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    UnknownOrder,
    UnknownProduct,
    NotFound,
    InsufficientStock,
    ImmutableReference,
    ConcurrentModification,
    HasDependentPayments,
    HasDependentOrders,
    ReferencedByOrderItems,
    ConstraintViolation,
    StoreUnavailable,
    InvalidInput,
    Internal,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnknownOrder => "UNKNOWN_ORDER",
            ErrorKind::UnknownProduct => "UNKNOWN_PRODUCT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorKind::ImmutableReference => "IMMUTABLE_REFERENCE",
            ErrorKind::ConcurrentModification => "CONCURRENT_MODIFICATION",
            ErrorKind::HasDependentPayments => "HAS_DEPENDENT_PAYMENTS",
            ErrorKind::HasDependentOrders => "HAS_DEPENDENT_ORDERS",
            ErrorKind::ReferencedByOrderItems => "REFERENCED_BY_ORDER_ITEMS",
            ErrorKind::ConstraintViolation => "CONSTRAINT_VIOLATION",
            ErrorKind::StoreUnavailable => "STORE_UNAVAILABLE",
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error payload handed to the request layer.
///
/// ## Serialization
/// ```json
/// {
///   "kind": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for product 1: available 7, requested 8",
///   "retryable": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl From<&DbError> for ErrorReport {
    fn from(err: &DbError) -> Self {
        err.report()
    }
}

impl From<DbError> for ErrorReport {
    fn from(err: DbError) -> Self {
        err.report()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_kinds() {
        let err = DbError::from(CoreError::InsufficientStock {
            product_id: 1,
            available: 7,
            requested: 8,
        });
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        assert!(!err.is_retryable());

        let err = DbError::from(CoreError::UnknownUser { user_id: 3 });
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = DbError::from(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_only_concurrent_modification_is_retryable() {
        assert!(DbError::concurrent(Entity::OrderItem, 4).is_retryable());
        assert!(!DbError::not_found(Entity::Order, 4).is_retryable());
        assert!(!DbError::PoolExhausted.is_retryable());
    }

    #[test]
    fn test_transient_classification() {
        assert!(DbError::Busy("database is locked".to_string()).is_transient());
        assert!(DbError::PoolExhausted.is_transient());
        assert!(!DbError::concurrent(Entity::Product, 1).is_transient());
        assert!(!DbError::ConstraintViolation {
            message: "UNIQUE constraint failed: users.email".to_string()
        }
        .is_transient());

        let exhausted = DbError::StoreUnavailable {
            attempts: 6,
            message: "database is locked".to_string(),
        };
        assert_eq!(exhausted.kind(), ErrorKind::StoreUnavailable);
        assert!(!exhausted.is_transient());
    }

    #[test]
    fn test_report_serialization() {
        let report = DbError::from(CoreError::HasDependentPayments {
            order_id: 9,
            payments: 1,
        })
        .report();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "HAS_DEPENDENT_PAYMENTS");
        assert_eq!(json["retryable"], false);
        assert_eq!(
            json["message"],
            "Order 9 has 1 payment(s) and cannot be deleted"
        );
    }

    #[test]
    fn test_kind_as_str_matches_serde() {
        for kind in [
            ErrorKind::ReferencedByOrderItems,
            ErrorKind::ConcurrentModification,
            ErrorKind::Internal,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.as_str());
        }
    }
}
