//! # Database Error Types
//!
//! Error types for database operations and the stock coordinator.
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
//! │  InventoryError::Store ← Passed through unchanged by StockService      │
//! │                                                                         │
//! │  StockError (catalog-core)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InventoryError::Stock ← Business rejection, nothing was written       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use catalog_core::{StockError, StockItemId};
use thiserror::Error;

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
    /// - Update or delete of an ID that doesn't exist
    /// - Variant or review inserted for a missing product
    #[error("{entity} not found: {id}")]
    NotFound {
        entity: String,
        id: String,
    },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate SKU
    /// - Any UNIQUE index violation
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation {
        field: String,
        value: String,
    },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation {
        message: String,
    },

    /// CHECK constraint violation, e.g. a write that would break
    /// `0 <= reserved_stock_quantity <= stock_quantity`.
    #[error("Check constraint violation: {message}")]
    CheckViolation {
        message: String,
    },

    /// A stored row could not be turned back into a domain value.
    #[error("Corrupt row in {table}: {reason}")]
    CorruptRow {
        table: String,
        reason: String,
    },

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

    pub fn corrupt_row(table: impl Into<String>, reason: impl ToString) -> Self {
        DbError::CorruptRow {
            table: table.into(),
            reason: reason.to_string(),
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

                // SQLite constraint messages:
                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                // "CHECK constraint failed: <expr>"
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
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
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

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Inventory Error
// =============================================================================

/// Outcome of a failed stock operation.
///
/// ## Caller Mapping
/// ```text
/// Stock(InsufficientStock | OverRelease) → business failure, show to user
/// Stock(InvalidArgument)                 → caller bug
/// Stock(NotFound)                        → item gone
/// Store(_)                               → infrastructure, retry later
/// Contention                             → item too hot, retry later
/// ```
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The ledger refused the operation. Nothing was persisted.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// The store failed. Propagated unchanged.
    #[error(transparent)]
    Store(#[from] DbError),

    /// Every compare-and-swap attempt lost to a concurrent writer.
    #[error("Gave up on {item} after {attempts} conflicting attempts")]
    Contention { item: StockItemId, attempts: u32 },
}

impl InventoryError {
    /// The ledger rejection, if this is one.
    pub fn as_stock(&self) -> Option<&StockError> {
        match self {
            InventoryError::Stock(err) => Some(err),
            _ => None,
        }
    }

    /// True for insufficient stock and over-release.
    pub fn is_business_rejection(&self) -> bool {
        self.as_stock()
            .is_some_and(StockError::is_business_rejection)
    }
}

/// Result type for stock operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_error_classification() {
        let rejected = InventoryError::from(StockError::InsufficientStock {
            item: StockItemId::product("p-1"),
            available: 4,
            requested: 6,
        });
        assert!(rejected.is_business_rejection());
        assert!(rejected.as_stock().is_some());

        let store = InventoryError::from(DbError::PoolExhausted);
        assert!(!store.is_business_rejection());
        assert!(store.as_stock().is_none());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DbError::not_found("Product", "p-1").to_string(),
            "Product not found: p-1"
        );

        let err = InventoryError::Contention {
            item: StockItemId::variant("v-1"),
            attempts: 5,
        };
        assert_eq!(
            err.to_string(),
            "Gave up on variant:v-1 after 5 conflicting attempts"
        );
    }
}
