//! # Stock Coordinator
//!
//! Runs ledger transitions against a [`LedgerStore`] so that, per item, the
//! read-validate-write sequence is atomic.
//!
//! ## Two Layers of Protection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Reserve(product:p-1, 6)                              │
//! │                                                                         │
//! │  1. ItemLocks.acquire(product:p-1)    ← serializes this process        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. store.load(id)            {stock 10, reserved 0, version 7}        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. ledger.reserve(6)         pure, may reject (nothing written)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  4. store.save(next)          UPDATE ... WHERE sync_version = 7        │
//! │       │                                                                 │
//! │       ├── Saved { version: 8 }  → done                                 │
//! │       └── Conflict              → another process won, back to 2       │
//! │                                   (at most `max_attempts` times)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The lock alone covers a single process. The compare-and-swap save covers
//! several processes (or several `StockService`s) sharing one database.

pub mod locks;
pub mod memory;

use async_trait::async_trait;
use catalog_core::validation::{validate_item_id, validate_stock_quantity};
use catalog_core::{StockError, StockItemId, StockLedger, StockOperation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{DbResult, InventoryError, InventoryResult};

pub use locks::{ItemGuard, ItemLocks};
pub use memory::InMemoryLedgerStore;

// =============================================================================
// Store Contract
// =============================================================================

/// Result of a compare-and-swap save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written; the stored ledger now carries `version`.
    Saved { version: i64 },
    /// The stored version no longer matches the one the ledger was loaded
    /// at (or the item is gone). Nothing was written.
    Conflict,
}

/// Persistence for stock ledgers.
///
/// ## Contract
/// - `load` returns the current counters and version, or `None` if the item
///   does not exist.
/// - `save` writes the counters only if the stored version still equals
///   `ledger.version()`, and then increments it.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn load(&self, id: &StockItemId) -> DbResult<Option<StockLedger>>;

    async fn save(&self, ledger: &StockLedger) -> DbResult<SaveOutcome>;
}

#[async_trait]
impl<S: LedgerStore + ?Sized> LedgerStore for Arc<S> {
    async fn load(&self, id: &StockItemId) -> DbResult<Option<StockLedger>> {
        (**self).load(id).await
    }

    async fn save(&self, ledger: &StockLedger) -> DbResult<SaveOutcome> {
        (**self).save(ledger).await
    }
}

// =============================================================================
// Policy
// =============================================================================

/// Retry policy for compare-and-swap conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockPolicy {
    /// Load-transition-save attempts before giving up with `Contention`.
    pub max_attempts: u32,
}

impl Default for StockPolicy {
    fn default() -> Self {
        StockPolicy { max_attempts: 5 }
    }
}

// =============================================================================
// Stock Service
// =============================================================================

/// Reserve / Release / Reduce / Restock / AvailableStock over a store.
///
/// ## Usage
/// ```rust,ignore
/// let stock = db.stock();
/// let item = StockItemId::product(&product.id);
///
/// stock.reserve(&item, 2).await?;   // order placed
/// stock.reduce(&item, 2).await?;    // order shipped
/// ```
#[derive(Debug)]
pub struct StockService<S> {
    store: S,
    locks: ItemLocks,
    policy: StockPolicy,
}

impl<S: LedgerStore> StockService<S> {
    pub fn new(store: S) -> Self {
        Self::with_policy(store, StockPolicy::default())
    }

    pub fn with_policy(store: S, policy: StockPolicy) -> Self {
        StockService {
            store,
            locks: ItemLocks::new(),
            policy,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> StockPolicy {
        self.policy
    }

    /// Holds `quantity` units for an order.
    ///
    /// ## Errors
    /// - `InvalidArgument` if `quantity <= 0`
    /// - `NotFound` if the item has no ledger
    /// - `InsufficientStock` if fewer than `quantity` units are available
    pub async fn reserve(&self, id: &StockItemId, quantity: i64) -> InventoryResult<StockLedger> {
        self.execute(id, StockOperation::Reserve(quantity)).await
    }

    /// Returns `quantity` reserved units to available.
    ///
    /// ## Errors
    /// `InvalidArgument`, `NotFound`, or `OverRelease` when fewer than
    /// `quantity` units are reserved.
    pub async fn release(&self, id: &StockItemId, quantity: i64) -> InventoryResult<StockLedger> {
        self.execute(id, StockOperation::Release(quantity)).await
    }

    /// Ships `quantity` reserved units: both counters drop by `quantity`.
    ///
    /// ## Errors
    /// `InvalidArgument`, `NotFound`, `OverRelease` (not reserved) or
    /// `InsufficientStock` (not in stock), checked in that order.
    pub async fn reduce(&self, id: &StockItemId, quantity: i64) -> InventoryResult<StockLedger> {
        self.execute(id, StockOperation::Reduce(quantity)).await
    }

    /// Adds `quantity` received units to stock.
    pub async fn restock(&self, id: &StockItemId, quantity: i64) -> InventoryResult<StockLedger> {
        self.execute(id, StockOperation::Restock(quantity)).await
    }

    /// `stock - reserved` as currently stored. Fails with `InvalidArgument`
    /// for a blank id, `NotFound`, or a store error.
    pub async fn available_stock(&self, id: &StockItemId) -> InventoryResult<i64> {
        Ok(self.ledger(id).await?.available())
    }

    /// Current ledger, read without taking the item lock.
    pub async fn ledger(&self, id: &StockItemId) -> InventoryResult<StockLedger> {
        validate_item_id(&id.id).map_err(StockError::from)?;

        let ledger = self
            .store
            .load(id)
            .await?
            .ok_or_else(|| StockError::NotFound(id.clone()))?;
        Ok(ledger)
    }

    /// Applies `operation` to `id` under the item lock, retrying on
    /// compare-and-swap conflicts. Returns the saved ledger.
    pub async fn execute(
        &self,
        id: &StockItemId,
        operation: StockOperation,
    ) -> InventoryResult<StockLedger> {
        validate_item_id(&id.id).map_err(StockError::from)?;
        validate_stock_quantity(operation.quantity()).map_err(StockError::from)?;

        let _guard = self.locks.acquire(id).await;

        for attempt in 1..=self.policy.max_attempts {
            let current = self
                .store
                .load(id)
                .await?
                .ok_or_else(|| StockError::NotFound(id.clone()))?;

            let next = current.apply(operation).map_err(|err| {
                debug!(item = %id, op = %operation, error = %err, "Stock operation rejected");
                err
            })?;

            match self.store.save(&next).await? {
                SaveOutcome::Saved { version } => {
                    debug!(
                        item = %id,
                        op = %operation,
                        stock = next.stock(),
                        reserved = next.reserved(),
                        version,
                        "Stock operation applied"
                    );
                    return Ok(next.with_version(version));
                }
                SaveOutcome::Conflict => {
                    warn!(
                        item = %id,
                        op = %operation,
                        attempt,
                        loaded_version = current.version(),
                        "Stock ledger changed underneath, retrying"
                    );
                }
            }
        }

        warn!(
            item = %id,
            op = %operation,
            attempts = self.policy.max_attempts,
            "Giving up on contended stock ledger"
        );
        Err(InventoryError::Contention {
            item: id.clone(),
            attempts: self.policy.max_attempts,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn service_with(id: &StockItemId, stock: i64, reserved: i64) -> StockService<InMemoryLedgerStore> {
        let store = InMemoryLedgerStore::new();
        store
            .insert(StockLedger::restore(id.clone(), stock, reserved, 0).unwrap())
            .unwrap();
        StockService::new(store)
    }

    async fn counters<S: LedgerStore>(service: &StockService<S>, id: &StockItemId) -> (i64, i64) {
        let l = service.ledger(id).await.unwrap();
        (l.stock(), l.reserved())
    }

    fn stock_err(err: InventoryError) -> StockError {
        match err {
            InventoryError::Stock(e) => e,
            other => panic!("expected a stock rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reserve_within_available() {
        let id = StockItemId::product("p-1");
        let service = service_with(&id, 10, 2);

        service.reserve(&id, 5).await.unwrap();

        assert_eq!(counters(&service, &id).await, (10, 7));
        assert_eq!(service.available_stock(&id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_reserve_insufficient_writes_nothing() {
        let id = StockItemId::product("p-1");
        let service = service_with(&id, 10, 5);

        let err = stock_err(service.reserve(&id, 10).await.unwrap_err());
        assert_eq!(
            err,
            StockError::InsufficientStock {
                item: id.clone(),
                available: 5,
                requested: 10,
            }
        );
        let ledger = service.ledger(&id).await.unwrap();
        assert_eq!((ledger.stock(), ledger.reserved(), ledger.version()), (10, 5, 0));
    }

    #[tokio::test]
    async fn test_release_and_reduce() {
        let id = StockItemId::variant("v-1");
        let service = service_with(&id, 10, 5);

        service.release(&id, 3).await.unwrap();
        assert_eq!(counters(&service, &id).await, (10, 2));

        let err = stock_err(service.release(&id, 5).await.unwrap_err());
        assert!(matches!(err, StockError::OverRelease { reserved: 2, requested: 5, .. }));

        service.reserve(&id, 3).await.unwrap();
        service.reduce(&id, 5).await.unwrap();
        assert_eq!(counters(&service, &id).await, (5, 0));
    }

    #[tokio::test]
    async fn test_restock() {
        let id = StockItemId::product("p-1");
        let service = service_with(&id, 3, 3);

        let ledger = service.restock(&id, 7).await.unwrap();
        assert_eq!((ledger.stock(), ledger.reserved(), ledger.available()), (10, 3, 7));
    }

    #[tokio::test]
    async fn test_invalid_quantity_checked_before_lookup() {
        let service = StockService::new(InMemoryLedgerStore::new());
        let missing = StockItemId::product("missing");

        let err = stock_err(service.reserve(&missing, 0).await.unwrap_err());
        assert!(matches!(err, StockError::InvalidArgument(_)));

        let err = stock_err(service.reduce(&missing, 1).await.unwrap_err());
        assert_eq!(err, StockError::NotFound(missing.clone()));

        let err = stock_err(service.available_stock(&missing).await.unwrap_err());
        assert_eq!(err, StockError::NotFound(missing));
    }

    #[tokio::test]
    async fn test_blank_item_id_is_invalid() {
        let service = StockService::new(InMemoryLedgerStore::new());
        let blank = StockItemId::product("");

        let err = stock_err(service.reserve(&blank, 1).await.unwrap_err());
        assert!(matches!(err, StockError::InvalidArgument(_)));

        let err = stock_err(service.available_stock(&blank).await.unwrap_err());
        assert!(matches!(err, StockError::InvalidArgument(_)));

        let err = stock_err(service.ledger(&StockItemId::variant("  ")).await.unwrap_err());
        assert!(matches!(err, StockError::InvalidArgument(_)));
    }

    /// Reports a conflict for the first `conflicts` saves, then delegates.
    struct FlakyStore {
        inner: InMemoryLedgerStore,
        conflicts: AtomicU32,
        saves: AtomicU32,
    }

    #[async_trait]
    impl LedgerStore for FlakyStore {
        async fn load(&self, id: &StockItemId) -> DbResult<Option<StockLedger>> {
            self.inner.load(id).await
        }

        async fn save(&self, ledger: &StockLedger) -> DbResult<SaveOutcome> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            let remaining = self.conflicts.load(Ordering::SeqCst);
            if remaining > 0 {
                self.conflicts.store(remaining - 1, Ordering::SeqCst);
                return Ok(SaveOutcome::Conflict);
            }
            self.inner.save(ledger).await
        }
    }

    fn flaky(id: &StockItemId, conflicts: u32) -> FlakyStore {
        let inner = InMemoryLedgerStore::new();
        inner.insert(StockLedger::open(id.clone(), 10).unwrap()).unwrap();
        FlakyStore {
            inner,
            conflicts: AtomicU32::new(conflicts),
            saves: AtomicU32::new(0),
        }
    }

    #[tokio::test]
    async fn test_conflict_is_retried() {
        let id = StockItemId::product("p-1");
        let service = StockService::with_policy(flaky(&id, 2), StockPolicy { max_attempts: 3 });

        let ledger = service.reserve(&id, 4).await.unwrap();

        assert_eq!(ledger.reserved(), 4);
        assert_eq!(ledger.version(), 1);
        assert_eq!(service.store().saves.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_contention_after_max_attempts() {
        let id = StockItemId::product("p-1");
        let service = StockService::with_policy(flaky(&id, 10), StockPolicy { max_attempts: 3 });

        let err = service.reserve(&id, 4).await.unwrap_err();

        assert!(matches!(err, InventoryError::Contention { attempts: 3, .. }));
        assert_eq!(service.store().inner.load(&id).await.unwrap().unwrap().reserved(), 0);
    }

    struct BrokenStore;

    #[async_trait]
    impl LedgerStore for BrokenStore {
        async fn load(&self, _id: &StockItemId) -> DbResult<Option<StockLedger>> {
            Err(DbError::PoolExhausted)
        }

        async fn save(&self, _ledger: &StockLedger) -> DbResult<SaveOutcome> {
            Err(DbError::PoolExhausted)
        }
    }

    #[tokio::test]
    async fn test_store_errors_pass_through() {
        let service = StockService::new(BrokenStore);
        let err = service
            .reserve(&StockItemId::product("p-1"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::Store(DbError::PoolExhausted)));
    }

    #[tokio::test]
    async fn test_concurrent_reserves_same_service() {
        let id = StockItemId::product("p-1");
        let service = Arc::new(service_with(&id, 10, 0));

        let a = tokio::spawn({
            let (service, id) = (service.clone(), id.clone());
            async move { service.reserve(&id, 6).await }
        });
        let b = tokio::spawn({
            let (service, id) = (service.clone(), id.clone());
            async move { service.reserve(&id, 6).await }
        });
        let results = [a.await.unwrap(), b.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let rejected = results.into_iter().find_map(Result::err).unwrap();
        assert!(matches!(
            rejected.as_stock(),
            Some(StockError::InsufficientStock { available: 4, requested: 6, .. })
        ));
        assert_eq!(counters(&service, &id).await, (10, 6));
    }
}
