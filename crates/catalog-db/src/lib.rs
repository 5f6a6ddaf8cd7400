//! # catalog-db: Database Layer for the Catalog Service
//!
//! SQLite persistence for products, variants and reviews, plus the stock
//! coordinator that makes ledger operations atomic per item.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Catalog Data Flow                                │
//! │                                                                         │
//! │  Caller (checkout, admin tooling, seed binary)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    catalog-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │ StockService │  │   │
//! │  │   │   (pool.rs)   │    │ product       │    │  ItemLocks   │  │   │
//! │  │   │               │◄───│ variant       │    │  + CAS save  │  │   │
//! │  │   │ SqlitePool    │    │ review        │    │  + retries   │  │   │
//! │  │   │ Migrations    │    │ ledger        │◄───│              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   CATALOG_DATABASE_PATH (default ./catalog.db)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and inventory error types
//! - [`repository`] - Repository implementations and the SQLite ledger store
//! - [`stock`] - `LedgerStore` contract, item locks, `StockService`
//! - [`config`] - Environment configuration
//! - [`telemetry`] - Tracing subscriber setup
//!
//! ## Usage
//!
//! ```rust,ignore
//! use catalog_db::{CatalogConfig, Database};
//!
//! let config = CatalogConfig::load()?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let item = StockItemId::product(&product_id);
//! db.stock().reserve(&item, 2).await?;
//! let left = db.stock().available_stock(&item).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod stock;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{CatalogConfig, ConfigError};
pub use error::{DbError, DbResult, InventoryError, InventoryResult};
pub use pool::{Database, DbConfig};
pub use stock::{
    InMemoryLedgerStore, ItemLocks, LedgerStore, SaveOutcome, StockPolicy, StockService,
};

// Repository re-exports for convenience
pub use repository::ledger::SqliteLedgerStore;
pub use repository::product::ProductRepository;
pub use repository::review::ReviewRepository;
pub use repository::variant::VariantRepository;
