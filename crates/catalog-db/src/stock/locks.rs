//! Per-item async locks.
//!
//! One `tokio::sync::Mutex` per [`StockItemId`], created on first use and
//! dropped again when the last holder or waiter lets go, so the map only
//! ever holds items with an operation in flight.

use catalog_core::StockItemId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<()>>;

/// Registry of per-item locks.
#[derive(Debug, Default)]
pub struct ItemLocks {
    slots: Mutex<HashMap<StockItemId, Slot>>,
}

impl ItemLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other task holds `id`, then holds it until the guard drops.
    ///
    /// Different ids never contend with each other.
    pub async fn acquire(&self, id: &StockItemId) -> ItemGuard<'_> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(id.clone()).or_default().clone()
        };

        ItemGuard {
            locks: self,
            id: id.clone(),
            guard: Some(slot.lock_owned().await),
        }
    }

    /// Number of items currently locked or waited on.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive hold on one item. Unlocks on drop.
#[derive(Debug)]
pub struct ItemGuard<'a> {
    locks: &'a ItemLocks,
    id: StockItemId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ItemGuard<'_> {
    fn drop(&mut self) {
        let mut slots = self
            .locks
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(guard) = self.guard.take() {
            // One reference in the map, one in this guard: nobody is waiting.
            if Arc::strong_count(OwnedMutexGuard::mutex(&guard)) <= 2 {
                slots.remove(&self.id);
            }
            drop(guard);
        }
    }
}
