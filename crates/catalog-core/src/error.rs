//! # Error Types
//!
//! Domain-specific error types for catalog-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  catalog-core errors (this file)                                       │
//! │  ├── StockError       - Ledger transition rejections                   │
//! │  ├── CoreError        - Catalog-level domain errors                    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  catalog-db errors (separate crate)                                    │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── InventoryError   - StockError | DbError | Contention              │
//! │                                                                         │
//! │  Flow: ValidationError → StockError → InventoryError → caller          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Business Rejection vs Infrastructure Failure
//! Every `StockError` is a *business* answer: the request was understood and
//! refused, and nothing was written. Infrastructure failures never appear
//! here; they live in catalog-db and are propagated unchanged.

use thiserror::Error;

use crate::ledger::StockItemId;

// =============================================================================
// Stock Error
// =============================================================================

/// Rejections produced by the stock ledger.
///
/// ## Caller Mapping
/// ```text
/// InvalidArgument    → caller bug, never retried
/// NotFound           → item has no ledger (deleted or never created)
/// InsufficientStock  → business refusal ("only 3 left")
/// OverRelease        → business refusal ("only 2 reserved")
/// CorruptLedger      → stored row breaks the invariant, needs an operator
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    /// Identifier missing/empty, or quantity ≤ 0, or arithmetic overflow.
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    /// The referenced item has no ledger.
    #[error("Stock item not found: {0}")]
    NotFound(StockItemId),

    /// Reserve asked for more than is available, or Reduce found less total
    /// stock than requested.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout (qty: 5)
    ///      │
    ///      ▼
    /// Reserve: stock=10, reserved=7 → available=3
    ///      │
    ///      ▼
    /// InsufficientStock { available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 left in stock"
    /// ```
    #[error("Insufficient stock for {item}: available {available}, requested {requested}")]
    InsufficientStock {
        item: StockItemId,
        available: i64,
        requested: i64,
    },

    /// Release or Reduce asked for more than is currently reserved.
    #[error("Cannot release {requested} of {item}: only {reserved} reserved")]
    OverRelease {
        item: StockItemId,
        reserved: i64,
        requested: i64,
    },

    /// Persisted counters violate `0 <= reserved <= stock`.
    #[error("Stock ledger for {item} is corrupt: stock {stock}, reserved {reserved}")]
    CorruptLedger {
        item: StockItemId,
        stock: i64,
        reserved: i64,
    },
}

impl StockError {
    /// True for domain-level refusals (insufficient stock, over-release).
    ///
    /// These map to a business failure for the caller, not a server error.
    pub fn is_business_rejection(&self) -> bool {
        matches!(
            self,
            StockError::InsufficientStock { .. } | StockError::OverRelease { .. }
        )
    }

    /// The item the error refers to, when known.
    pub fn item(&self) -> Option<&StockItemId> {
        match self {
            StockError::InvalidArgument(_) => None,
            StockError::NotFound(item)
            | StockError::InsufficientStock { item, .. }
            | StockError::OverRelease { item, .. }
            | StockError::CorruptLedger { item, .. } => Some(item),
        }
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Catalog-level business errors (products, variants, reviews).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Variant cannot be found.
    #[error("Product variant not found: {0}")]
    VariantNotFound(String),

    /// Review cannot be found.
    #[error("Product review not found: {0}")]
    ReviewNotFound(String),

    /// Stock ledger rejection.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements.
/// Used for early validation before business logic runs.
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
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Arithmetic on the field would overflow.
    #[error("{field} would overflow")]
    Overflow { field: String },

    /// Invalid format (e.g., invalid UUID, invalid slug).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for ledger transitions.
pub type StockResult<T> = Result<T, StockError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StockError::InsufficientStock {
            item: StockItemId::product("p-1"),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product:p-1: available 3, requested 5"
        );

        let err = StockError::OverRelease {
            item: StockItemId::variant("v-9"),
            reserved: 2,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Cannot release 5 of variant:v-9: only 2 reserved"
        );
    }

    #[test]
    fn test_business_rejection_classification() {
        let item = StockItemId::product("p-1");

        assert!(StockError::InsufficientStock {
            item: item.clone(),
            available: 0,
            requested: 1,
        }
        .is_business_rejection());
        assert!(StockError::OverRelease {
            item: item.clone(),
            reserved: 0,
            requested: 1,
        }
        .is_business_rejection());

        assert!(!StockError::NotFound(item.clone()).is_business_rejection());
        assert!(!StockError::from(ValidationError::must_be_positive("quantity"))
            .is_business_rejection());
    }

    #[test]
    fn test_item_accessor() {
        let item = StockItemId::variant("v-1");
        assert_eq!(StockError::NotFound(item.clone()).item(), Some(&item));
        assert_eq!(
            StockError::from(ValidationError::required("id")).item(),
            None
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("sku").to_string(), "sku is required");
        assert_eq!(
            ValidationError::must_be_positive("quantity").to_string(),
            "quantity must be positive"
        );
    }

    #[test]
    fn test_conversions_into_core_error() {
        let core_err: CoreError = ValidationError::required("sku").into();
        assert!(matches!(core_err, CoreError::Validation(_)));

        let core_err: CoreError = StockError::NotFound(StockItemId::product("p")).into();
        assert!(matches!(core_err, CoreError::Stock(StockError::NotFound(_))));
    }
}
