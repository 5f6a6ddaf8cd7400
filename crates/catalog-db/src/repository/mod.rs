//! # Repository Module
//!
//! Database repository implementations for the catalog.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Writes Which Columns                             │
//! │                                                                         │
//! │  ProductRepository / VariantRepository                                 │
//! │  ├── insert  → every column, including the opening ledger              │
//! │  ├── update  → details + updated_at only                               │
//! │  └── delete  → the row (and, by cascade, child rows and ledgers)       │
//! │                                                                         │
//! │  SqliteLedgerStore (used by StockService)                              │
//! │  └── save    → stock_quantity, reserved_stock_quantity, sync_version   │
//! │                (compare-and-swap on sync_version)                      │
//! │                                                                         │
//! │  ReviewRepository                                                      │
//! │  └── product_reviews, no stock involved                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD and search
//! - [`VariantRepository`](variant::VariantRepository) - Variants of a product
//! - [`ReviewRepository`](review::ReviewRepository) - Reviews and rating summaries
//! - [`SqliteLedgerStore`](ledger::SqliteLedgerStore) - Stock ledgers for the coordinator

pub mod ledger;
pub mod product;
pub mod review;
pub mod variant;
