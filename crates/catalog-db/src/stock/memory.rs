use async_trait::async_trait;
use catalog_core::{StockItemId, StockLedger};
use std::collections::HashMap;
use std::sync::RwLock;

use super::{LedgerStore, SaveOutcome};
use crate::error::{DbError, DbResult};

/// In-memory ledger store with compare-and-swap saves.
///
/// Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    ledgers: RwLock<HashMap<StockItemId, StockLedger>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a ledger, as creating its item would.
    pub fn insert(&self, ledger: StockLedger) -> DbResult<()> {
        let mut ledgers = self.write()?;
        ledgers.insert(ledger.id().clone(), ledger);
        Ok(())
    }

    /// Drops a ledger, as deleting its item would.
    pub fn remove(&self, id: &StockItemId) -> DbResult<Option<StockLedger>> {
        Ok(self.write()?.remove(id))
    }

    fn write(
        &self,
    ) -> DbResult<std::sync::RwLockWriteGuard<'_, HashMap<StockItemId, StockLedger>>> {
        self.ledgers
            .write()
            .map_err(|_| DbError::Internal("ledger map lock poisoned".to_string()))
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn load(&self, id: &StockItemId) -> DbResult<Option<StockLedger>> {
        let ledgers = self
            .ledgers
            .read()
            .map_err(|_| DbError::Internal("ledger map lock poisoned".to_string()))?;
        Ok(ledgers.get(id).cloned())
    }

    async fn save(&self, ledger: &StockLedger) -> DbResult<SaveOutcome> {
        let mut ledgers = self.write()?;

        let Some(stored) = ledgers.get_mut(ledger.id()) else {
            return Ok(SaveOutcome::Conflict);
        };
        if stored.version() != ledger.version() {
            return Ok(SaveOutcome::Conflict);
        }

        let version = ledger.version() + 1;
        *stored = ledger.clone().with_version(version);
        Ok(SaveOutcome::Saved { version })
    }
}
