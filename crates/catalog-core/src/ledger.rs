//! # Stock Ledger
//!
//! The stock/reserved counter pair owned by one sellable item, and the only
//! transitions allowed to change it.
//!
//! ## Where Units Live
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Life of a Unit of Stock                              │
//! │                                                                         │
//! │              Restock                                                    │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │          ┌─────────────┐   Reserve    ┌─────────────┐                  │
//! │          │  AVAILABLE  │ ───────────► │  RESERVED   │                  │
//! │          │ stock - res │ ◄─────────── │  reserved   │                  │
//! │          └─────────────┘   Release    └──────┬──────┘                  │
//! │                                              │ Reduce                   │
//! │                                              ▼                          │
//! │                                       ┌─────────────┐                  │
//! │                                       │   SHIPPED   │                  │
//! │                                       │ (gone from  │                  │
//! │                                       │   stock)    │                  │
//! │                                       └─────────────┘                  │
//! │                                                                         │
//! │  Invariant at every arrow: 0 <= reserved <= stock                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Immutable Transitions
//! `StockLedger` has no setters. Every transition borrows the current value,
//! validates the request in full, and returns a *new* ledger or a
//! [`StockError`]. A rejected request therefore cannot leave a half-applied
//! ledger behind; the caller still holds the untouched original.
//!
//! Locking, persistence, and retries are not this module's concern. See
//! `catalog_db::stock` for the coordinator that makes load → transition →
//! save atomic per item.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{StockError, StockResult, ValidationError};
use crate::validation::{validate_item_id, validate_stock_quantity};

// =============================================================================
// Item Identity
// =============================================================================

/// Which kind of catalog item owns a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Product,
    Variant,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Product => "product",
            ItemKind::Variant => "variant",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a sellable item: a product or one of its variants.
///
/// Displays as `product:<id>` / `variant:<id>`, which is also the key used
/// by the per-item locks in catalog-db.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockItemId {
    pub kind: ItemKind,
    pub id: String,
}

impl StockItemId {
    pub fn new(kind: ItemKind, id: impl Into<String>) -> Self {
        StockItemId {
            kind,
            id: id.into(),
        }
    }

    pub fn product(id: impl Into<String>) -> Self {
        Self::new(ItemKind::Product, id)
    }

    pub fn variant(id: impl Into<String>) -> Self {
        Self::new(ItemKind::Variant, id)
    }
}

impl fmt::Display for StockItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

// =============================================================================
// Operations
// =============================================================================

/// A named, quantity-carrying ledger transition.
///
/// This is what the coordinator replays after a compare-and-swap conflict:
/// the same operation applied to freshly loaded state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "quantity", rename_all = "snake_case")]
pub enum StockOperation {
    /// Move units from available to reserved (order placed).
    Reserve(i64),
    /// Return reserved units to available (order cancelled).
    Release(i64),
    /// Consume a reservation and remove the units from stock (order shipped).
    Reduce(i64),
    /// Add received units to stock.
    Restock(i64),
}

impl StockOperation {
    pub fn name(&self) -> &'static str {
        match self {
            StockOperation::Reserve(_) => "reserve",
            StockOperation::Release(_) => "release",
            StockOperation::Reduce(_) => "reduce",
            StockOperation::Restock(_) => "restock",
        }
    }

    pub fn quantity(&self) -> i64 {
        match *self {
            StockOperation::Reserve(q)
            | StockOperation::Release(q)
            | StockOperation::Reduce(q)
            | StockOperation::Restock(q) => q,
        }
    }
}

impl fmt::Display for StockOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.quantity())
    }
}

// =============================================================================
// Stock Ledger
// =============================================================================

/// Stock and reserved counters for one sellable item.
///
/// ## Invariants
/// - `stock >= 0`
/// - `0 <= reserved <= stock`
/// - `available() = stock - reserved >= 0`
///
/// ## Version
/// `version` is the persistence token of the stored state this value was
/// loaded from. Transitions carry it forward unchanged, so a store can
/// compare-and-swap on it when saving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LedgerRecord")]
pub struct StockLedger {
    id: StockItemId,
    stock: i64,
    reserved: i64,
    version: i64,
}

/// Unchecked wire shape; deserialization goes through [`StockLedger::restore`].
#[derive(Deserialize)]
struct LedgerRecord {
    id: StockItemId,
    stock: i64,
    reserved: i64,
    #[serde(default)]
    version: i64,
}

impl TryFrom<LedgerRecord> for StockLedger {
    type Error = StockError;

    fn try_from(record: LedgerRecord) -> Result<Self, Self::Error> {
        StockLedger::restore(record.id, record.stock, record.reserved, record.version)
    }
}

impl StockLedger {
    /// Opens the ledger of a newly created item: `reserved = 0`.
    ///
    /// ## Errors
    /// - `InvalidArgument` if the id is blank or `initial_stock < 0`
    pub fn open(id: StockItemId, initial_stock: i64) -> StockResult<Self> {
        validate_item_id(&id.id)?;
        if initial_stock < 0 {
            return Err(ValidationError::MustNotBeNegative {
                field: "stock".to_string(),
            }
            .into());
        }

        Ok(StockLedger {
            id,
            stock: initial_stock,
            reserved: 0,
            version: 0,
        })
    }

    /// Rebuilds a ledger from persisted counters.
    ///
    /// ## Errors
    /// - `InvalidArgument` if the id is blank
    /// - `CorruptLedger` if the counters break the invariant
    pub fn restore(id: StockItemId, stock: i64, reserved: i64, version: i64) -> StockResult<Self> {
        validate_item_id(&id.id)?;
        if stock < 0 || reserved < 0 || reserved > stock {
            return Err(StockError::CorruptLedger {
                item: id,
                stock,
                reserved,
            });
        }

        Ok(StockLedger {
            id,
            stock,
            reserved,
            version,
        })
    }

    #[inline]
    pub fn id(&self) -> &StockItemId {
        &self.id
    }

    /// Total units physically on hand.
    #[inline]
    pub fn stock(&self) -> i64 {
        self.stock
    }

    /// Units held for in-flight orders.
    #[inline]
    pub fn reserved(&self) -> i64 {
        self.reserved
    }

    /// Units that can still be reserved.
    #[inline]
    pub fn available(&self) -> i64 {
        self.stock - self.reserved
    }

    #[inline]
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Same counters, new persistence token. Used by stores after a save.
    pub fn with_version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    /// Reserves `quantity` units ahead of fulfillment.
    ///
    /// ## Flow
    /// ```text
    /// quantity <= 0?            → InvalidArgument
    /// stock - reserved < qty?   → InsufficientStock
    /// otherwise                 → reserved += qty
    /// ```
    pub fn reserve(&self, quantity: i64) -> StockResult<Self> {
        validate_stock_quantity(quantity)?;

        let available = self.available();
        if available < quantity {
            return Err(StockError::InsufficientStock {
                item: self.id.clone(),
                available,
                requested: quantity,
            });
        }

        Ok(self.with_counters(self.stock, self.reserved + quantity))
    }

    /// Returns `quantity` reserved units to available (order cancelled).
    pub fn release(&self, quantity: i64) -> StockResult<Self> {
        validate_stock_quantity(quantity)?;
        self.ensure_reserved(quantity)?;

        Ok(self.with_counters(self.stock, self.reserved - quantity))
    }

    /// Converts a reservation into a permanent decrement (order shipped).
    ///
    /// Both rules are checked before anything changes:
    /// 1. `reserved >= quantity` else `OverRelease`
    /// 2. `stock >= quantity` else `InsufficientStock`
    pub fn reduce(&self, quantity: i64) -> StockResult<Self> {
        validate_stock_quantity(quantity)?;
        self.ensure_reserved(quantity)?;

        if self.stock < quantity {
            return Err(StockError::InsufficientStock {
                item: self.id.clone(),
                available: self.stock,
                requested: quantity,
            });
        }

        Ok(self.with_counters(self.stock - quantity, self.reserved - quantity))
    }

    /// Adds `quantity` received units to stock. `reserved` is untouched.
    pub fn restock(&self, quantity: i64) -> StockResult<Self> {
        validate_stock_quantity(quantity)?;

        let stock = self
            .stock
            .checked_add(quantity)
            .ok_or_else(|| ValidationError::Overflow {
                field: "stock".to_string(),
            })?;

        Ok(self.with_counters(stock, self.reserved))
    }

    /// Applies a named operation.
    pub fn apply(&self, operation: StockOperation) -> StockResult<Self> {
        match operation {
            StockOperation::Reserve(q) => self.reserve(q),
            StockOperation::Release(q) => self.release(q),
            StockOperation::Reduce(q) => self.reduce(q),
            StockOperation::Restock(q) => self.restock(q),
        }
    }

    fn ensure_reserved(&self, quantity: i64) -> StockResult<()> {
        if self.reserved < quantity {
            return Err(StockError::OverRelease {
                item: self.id.clone(),
                reserved: self.reserved,
                requested: quantity,
            });
        }
        Ok(())
    }

    fn with_counters(&self, stock: i64, reserved: i64) -> Self {
        debug_assert!(stock >= 0 && (0..=stock).contains(&reserved));
        StockLedger {
            id: self.id.clone(),
            stock,
            reserved,
            version: self.version,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
