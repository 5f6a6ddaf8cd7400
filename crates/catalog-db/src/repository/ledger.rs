//! # Ledger Store (SQLite)
//!
//! [`LedgerStore`] over the stock columns of `products` and
//! `product_variants`.
//!
//! ## Compare-and-Swap Save
//! ```text
//! UPDATE products
//! SET stock_quantity = ?, reserved_stock_quantity = ?,
//!     sync_version = sync_version + 1, updated_at = ?
//! WHERE id = ? AND sync_version = <version the ledger was loaded at>
//!
//! rows_affected = 1 → Saved { version + 1 }
//! rows_affected = 0 → Conflict (someone else wrote first, or row deleted)
//! ```

use async_trait::async_trait;
use catalog_core::{ItemKind, StockItemId, StockLedger};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::stock::{LedgerStore, SaveOutcome};

/// Table holding the ledger columns for each item kind.
pub(crate) fn table_for(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Product => "products",
        ItemKind::Variant => "product_variants",
    }
}

/// Rebuilds a ledger from its three columns.
///
/// Rows that break `0 <= reserved <= stock` surface as `CorruptRow`.
pub(crate) fn ledger_from_columns(
    id: StockItemId,
    stock: i64,
    reserved: i64,
    version: i64,
) -> DbResult<StockLedger> {
    let table = table_for(id.kind);
    StockLedger::restore(id, stock, reserved, version).map_err(|e| DbError::corrupt_row(table, e))
}

#[derive(Debug, sqlx::FromRow)]
struct LedgerRow {
    stock_quantity: i64,
    reserved_stock_quantity: i64,
    sync_version: i64,
}

/// SQLite-backed ledger store.
#[derive(Debug, Clone)]
pub struct SqliteLedgerStore {
    pool: SqlitePool,
}

impl SqliteLedgerStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteLedgerStore { pool }
    }
}

#[async_trait]
impl LedgerStore for SqliteLedgerStore {
    async fn load(&self, id: &StockItemId) -> DbResult<Option<StockLedger>> {
        let sql = format!(
            "SELECT stock_quantity, reserved_stock_quantity, sync_version FROM {} WHERE id = ?1",
            table_for(id.kind)
        );

        let row = sqlx::query_as::<_, LedgerRow>(&sql)
            .bind(&id.id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| {
            ledger_from_columns(
                id.clone(),
                r.stock_quantity,
                r.reserved_stock_quantity,
                r.sync_version,
            )
        })
        .transpose()
    }

    async fn save(&self, ledger: &StockLedger) -> DbResult<SaveOutcome> {
        let id = ledger.id();
        let sql = format!(
            r#"
            UPDATE {}
            SET
                stock_quantity = ?1,
                reserved_stock_quantity = ?2,
                sync_version = sync_version + 1,
                updated_at = ?3
            WHERE id = ?4 AND sync_version = ?5
            "#,
            table_for(id.kind)
        );

        let result = sqlx::query(&sql)
            .bind(ledger.stock())
            .bind(ledger.reserved())
            .bind(Utc::now())
            .bind(&id.id)
            .bind(ledger.version())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            debug!(item = %id, version = ledger.version(), "Ledger save lost compare-and-swap");
            return Ok(SaveOutcome::Conflict);
        }

        Ok(SaveOutcome::Saved {
            version: ledger.version() + 1,
        })
    }
}
