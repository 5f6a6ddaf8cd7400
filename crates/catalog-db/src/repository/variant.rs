//! # Variant Repository
//!
//! Database operations for product variants. Each variant row carries its
//! own stock ledger, independent of the parent product's.

use catalog_core::{Money, ProductVariant, StockItemId, VariantDetails};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::ledger::ledger_from_columns;

const VARIANT_COLUMNS: &str = r#"
    id, product_id, variant_name, color, size, additional_price_cents,
    image_url, is_active, stock_quantity, reserved_stock_quantity,
    sync_version, created_at, updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct VariantRow {
    id: String,
    product_id: String,
    variant_name: String,
    color: String,
    size: String,
    additional_price_cents: Option<i64>,
    image_url: String,
    is_active: bool,
    stock_quantity: i64,
    reserved_stock_quantity: i64,
    sync_version: i64,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<VariantRow> for ProductVariant {
    type Error = DbError;

    fn try_from(row: VariantRow) -> DbResult<Self> {
        let ledger = ledger_from_columns(
            StockItemId::variant(&row.id),
            row.stock_quantity,
            row.reserved_stock_quantity,
            row.sync_version,
        )?;

        let details = VariantDetails {
            variant_name: row.variant_name,
            color: row.color,
            size: row.size,
            additional_price: row.additional_price_cents.map(Money::from_cents),
            image_url: row.image_url,
            is_active: row.is_active,
        };

        ProductVariant::restore(
            row.id,
            row.product_id,
            details,
            row.created_at,
            row.updated_at,
            ledger,
        )
        .map_err(|e| DbError::corrupt_row("product_variants", e))
    }
}

/// Repository for product variants.
#[derive(Debug, Clone)]
pub struct VariantRepository {
    pool: SqlitePool,
}

impl VariantRepository {
    pub fn new(pool: SqlitePool) -> Self {
        VariantRepository { pool }
    }

    /// Inserts a variant and its opening ledger.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - the parent product doesn't exist
    pub async fn insert(&self, variant: &ProductVariant) -> DbResult<ProductVariant> {
        debug!(
            product_id = %variant.product_id,
            name = %variant.details.variant_name,
            "Inserting variant"
        );

        let d = &variant.details;
        let ledger = variant.ledger();

        sqlx::query(
            r#"
            INSERT INTO product_variants (
                id, product_id, variant_name, color, size, additional_price_cents,
                image_url, is_active, stock_quantity, reserved_stock_quantity,
                sync_version, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&variant.id)
        .bind(&variant.product_id)
        .bind(&d.variant_name)
        .bind(&d.color)
        .bind(&d.size)
        .bind(d.additional_price.map(|m| m.cents()))
        .bind(&d.image_url)
        .bind(d.is_active)
        .bind(ledger.stock())
        .bind(ledger.reserved())
        .bind(ledger.version())
        .bind(variant.created_at)
        .bind(variant.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::ForeignKeyViolation { .. } => DbError::not_found("Product", &variant.product_id),
            other => other,
        })?;

        Ok(variant.clone())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ProductVariant>> {
        let sql = format!("SELECT {VARIANT_COLUMNS} FROM product_variants WHERE id = ?1");

        let row = sqlx::query_as::<_, VariantRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProductVariant::try_from).transpose()
    }

    /// All variants of a product, oldest first.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<ProductVariant>> {
        let sql = format!(
            "SELECT {VARIANT_COLUMNS} FROM product_variants WHERE product_id = ?1 ORDER BY created_at, variant_name"
        );

        let rows = sqlx::query_as::<_, VariantRow>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ProductVariant::try_from).collect()
    }

    /// Writes the variant's details. Stock columns are not touched.
    pub async fn update(&self, variant: &ProductVariant) -> DbResult<()> {
        debug!(id = %variant.id, "Updating variant");

        let d = &variant.details;
        let updated_at = variant.updated_at.unwrap_or_else(Utc::now);

        let result = sqlx::query(
            r#"
            UPDATE product_variants SET
                variant_name = ?2,
                color = ?3,
                size = ?4,
                additional_price_cents = ?5,
                image_url = ?6,
                is_active = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&variant.id)
        .bind(&d.variant_name)
        .bind(&d.color)
        .bind(&d.size)
        .bind(d.additional_price.map(|m| m.cents()))
        .bind(&d.image_url)
        .bind(d.is_active)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ProductVariant", &variant.id));
        }

        Ok(())
    }

    /// Deletes a variant and its ledger.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting variant");

        let result = sqlx::query("DELETE FROM product_variants WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ProductVariant", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::stock::LedgerStore;
    use catalog_core::{NewProduct, NewVariant, Product, ProductDetails};

    async fn db_with_product() -> (Database, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = Product::create(
            NewProduct {
                details: ProductDetails {
                    sku: "MK-002".to_string(),
                    name: "Mechanical Keyboard".to_string(),
                    short_description: String::new(),
                    full_description: String::new(),
                    price: Money::from_cents(34999),
                    discount_price: Some(Money::from_cents(29999)),
                    is_active: true,
                    is_featured: false,
                    minimum_stock_threshold: 5,
                    allow_backorder: true,
                    brand: "Corsair".to_string(),
                    category: "Accessories".to_string(),
                    tags: vec![],
                    image_url: String::new(),
                    thumbnail_url: String::new(),
                    seo_title: String::new(),
                    slug: "mechanical-keyboard".to_string(),
                },
                initial_stock: 80,
            },
            Utc::now(),
        )
        .unwrap();
        db.products().insert(&product).await.unwrap();
        (db, product)
    }

    fn variant(product_id: &str, name: &str, surcharge: i64, stock: i64) -> ProductVariant {
        ProductVariant::create(
            NewVariant {
                product_id: product_id.to_string(),
                details: VariantDetails {
                    variant_name: name.to_string(),
                    color: "Black".to_string(),
                    size: "Full".to_string(),
                    additional_price: Some(Money::from_cents(surcharge)),
                    image_url: String::new(),
                    is_active: true,
                },
                initial_stock: stock,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_list_get() {
        let (db, product) = db_with_product().await;
        let repo = db.variants();

        let black = variant(&product.id, "RGB Black", 0, 50);
        let red = variant(&product.id, "Compact Red", -1000, 30);
        repo.insert(&black).await.unwrap();
        repo.insert(&red).await.unwrap();

        let listed = repo.list_for_product(&product.id).await.unwrap();
        assert_eq!(listed.len(), 2);

        let loaded = repo.get_by_id(&red.id).await.unwrap().unwrap();
        assert_eq!(loaded.ledger().stock(), 30);
        assert_eq!(loaded.effective_price(&product), Money::from_cents(28999));
    }

    #[tokio::test]
    async fn test_variant_stock_round_trip() {
        let (db, product) = db_with_product().await;
        let v = variant(&product.id, "Silent White", 2000, 40);
        db.variants().insert(&v).await.unwrap();
        let (id, stock) = (v.item_id(), db.stock());

        stock.reserve(&id, 10).await.unwrap();
        stock.release(&id, 4).await.unwrap();
        let shipped = stock.reduce(&id, 6).await.unwrap();
        assert_eq!((shipped.stock(), shipped.reserved(), shipped.version()), (34, 0, 3));

        let loaded = db.variants().get_by_id(&v.id).await.unwrap().unwrap();
        assert_eq!((loaded.ledger().stock(), loaded.ledger().reserved()), (34, 0));
        assert_eq!(stock.available_stock(&id).await.unwrap(), 34);

        // Parent ledger is a different row
        let parent = db.ledgers().load(&product.item_id()).await.unwrap().unwrap();
        assert_eq!((parent.stock(), parent.reserved(), parent.version()), (80, 0, 0));
    }

    #[tokio::test]
    async fn test_insert_for_missing_product() {
        let (db, _) = db_with_product().await;
        let err = db
            .variants()
            .insert(&variant("no-such-product", "Orphan", 0, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Product"));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (db, product) = db_with_product().await;
        let repo = db.variants();
        let mut v = variant(&product.id, "RGB Black", 0, 50);
        repo.insert(&v).await.unwrap();

        db.stock().reserve(&v.item_id(), 5).await.unwrap();

        let mut d = v.details.clone();
        d.is_active = false;
        v.apply_update(d, Utc::now()).unwrap();
        repo.update(&v).await.unwrap();

        let loaded = repo.get_by_id(&v.id).await.unwrap().unwrap();
        assert!(!loaded.details.is_active);
        assert_eq!(loaded.ledger().reserved(), 5);

        repo.delete(&v.id).await.unwrap();
        assert!(repo.get_by_id(&v.id).await.unwrap().is_none());
        assert!(matches!(repo.delete(&v.id).await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_deleting_product_cascades() {
        let (db, product) = db_with_product().await;
        let v = variant(&product.id, "RGB Black", 0, 50);
        db.variants().insert(&v).await.unwrap();

        db.products().delete(&product.id).await.unwrap();

        assert!(db.variants().get_by_id(&v.id).await.unwrap().is_none());
        assert!(db.ledgers().load(&v.item_id()).await.unwrap().is_none());
    }
}
