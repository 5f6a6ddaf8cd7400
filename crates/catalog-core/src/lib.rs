//! # catalog-core: Pure Business Logic for the Catalog Service
//!
//! This crate is the **heart** of the catalog service. It contains the stock
//! reservation rules and the catalog domain types as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Catalog Service Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Order / Checkout workflow (caller)                 │   │
//! │  │    place order ──► Reserve    cancel ──► Release               │   │
//! │  │    ship order  ──► Reduce     receive ──► Restock              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          catalog-db: StockService (lock + load + CAS save)      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ catalog-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  ledger   │  │   types   │  │   money   │  │ validation│  │   │
//! │  │   │ Reserve   │  │  Product  │  │   Money   │  │   rules   │  │   │
//! │  │   │ Release   │  │  Variant  │  │  cents    │  │  checks   │  │   │
//! │  │   │ Reduce    │  │  Review   │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO LOCKS • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`ledger`] - `StockLedger` and its validated transitions
//! - [`types`] - Catalog types (Product, ProductVariant, ProductReview)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use catalog_core::{StockItemId, StockLedger};
//!
//! let ledger = StockLedger::open(StockItemId::product("p-1"), 10).unwrap();
//! let ledger = ledger.reserve(4).unwrap();
//!
//! assert_eq!(ledger.reserved(), 4);
//! assert_eq!(ledger.available(), 6);
//!
//! // Asking for more than is available is rejected, nothing changes
//! assert!(ledger.reserve(7).is_err());
//! assert_eq!(ledger.reserved(), 4);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, StockError, StockResult, ValidationError};
pub use ledger::{ItemKind, StockItemId, StockLedger, StockOperation};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a product SKU.
pub const MAX_SKU_LEN: usize = 50;

/// Maximum length of a product name.
pub const MAX_PRODUCT_NAME_LEN: usize = 150;

/// Maximum length of a product short description.
pub const MAX_SHORT_DESCRIPTION_LEN: usize = 300;

/// Maximum length of a variant name.
pub const MAX_VARIANT_NAME_LEN: usize = 100;

/// Maximum length of a variant color or size label.
pub const MAX_VARIANT_ATTRIBUTE_LEN: usize = 50;

/// Maximum length of a reviewer's user id.
pub const MAX_REVIEW_USER_LEN: usize = 100;

/// Maximum length of a review comment.
pub const MAX_REVIEW_COMMENT_LEN: usize = 1000;

/// Upper bound on any price or surcharge: one billion in major units.
pub const MAX_PRICE_CENTS: i64 = 100_000_000_000;

/// Review ratings are whole stars in this range.
pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;
