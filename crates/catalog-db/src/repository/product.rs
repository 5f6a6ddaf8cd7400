//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Prefix search over SKU and name
//! - CRUD operations (details only)
//! - Cascading delete of variants and reviews
//!
//! Stock columns are written once, by `insert`. After that they belong to
//! the stock coordinator: `update` never touches them.
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  User types: "mech"                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  sku LIKE 'mech%' OR name LIKE 'mech%'   (active products only)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  MK-002 | Mechanical Keyboard            ← MATCH                       │
//! │  WM-001 | Wireless Mouse                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use catalog_core::{Money, Product, ProductDetails, StockItemId};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::ledger::ledger_from_columns;

const PRODUCT_COLUMNS: &str = r#"
    id, sku, name, short_description, full_description,
    price_cents, discount_price_cents, is_active, is_featured,
    minimum_stock_threshold, allow_backorder, brand, category, tags,
    image_url, thumbnail_url, seo_title, slug,
    stock_quantity, reserved_stock_quantity, sync_version,
    created_at, updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    sku: String,
    name: String,
    short_description: String,
    full_description: String,
    price_cents: i64,
    discount_price_cents: Option<i64>,
    is_active: bool,
    is_featured: bool,
    minimum_stock_threshold: i64,
    allow_backorder: bool,
    brand: String,
    category: String,
    tags: String,
    image_url: String,
    thumbnail_url: String,
    seo_title: String,
    slug: String,
    stock_quantity: i64,
    reserved_stock_quantity: i64,
    sync_version: i64,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> DbResult<Self> {
        let ledger = ledger_from_columns(
            StockItemId::product(&row.id),
            row.stock_quantity,
            row.reserved_stock_quantity,
            row.sync_version,
        )?;

        let details = ProductDetails {
            sku: row.sku,
            name: row.name,
            short_description: row.short_description,
            full_description: row.full_description,
            price: Money::from_cents(row.price_cents),
            discount_price: row.discount_price_cents.map(Money::from_cents),
            is_active: row.is_active,
            is_featured: row.is_featured,
            minimum_stock_threshold: row.minimum_stock_threshold,
            allow_backorder: row.allow_backorder,
            brand: row.brand,
            category: row.category,
            tags: decode_tags(&row.tags)?,
            image_url: row.image_url,
            thumbnail_url: row.thumbnail_url,
            seo_title: row.seo_title,
            slug: row.slug,
        };

        Product::restore(row.id, details, row.created_at, row.updated_at, ledger)
            .map_err(|e| DbError::corrupt_row("products", e))
    }
}

/// The `tags` column holds a JSON array of strings.
fn decode_tags(raw: &str) -> DbResult<Vec<String>> {
    serde_json::from_str(raw).map_err(|e| DbError::corrupt_row("products", format!("tags: {e}")))
}

fn encode_tags(tags: &[String]) -> DbResult<String> {
    serde_json::to_string(tags).map_err(|e| DbError::Internal(format!("encoding tags: {e}")))
}

fn into_products(rows: Vec<ProductRow>) -> DbResult<Vec<Product>> {
    rows.into_iter().map(Product::try_from).collect()
}

/// Escapes LIKE wildcards so user input matches literally.
fn like_prefix(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 1);
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// // Search products
/// let results = repo.search("mech", 20).await?;
///
/// // Get by ID
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Searches active products by SKU or name prefix (case-insensitive).
    ///
    /// An empty query lists active products.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE is_active = 1
            AND (sku LIKE ?1 ESCAPE '\' OR name LIKE ?1 ESCAPE '\')
            ORDER BY name
            LIMIT ?2
            "#
        );

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(like_prefix(query))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Search returned products");
        into_products(rows)
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY name LIMIT ?1"
        );

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        into_products(rows)
    }

    /// Lists every product, active or not, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name");

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        into_products(rows)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    /// Gets a product by its SKU (e.g., "WM-001").
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?1");

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    /// Inserts a new product together with its opening ledger.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(sku = %product.details.sku, "Inserting product");

        let d = &product.details;
        let ledger = product.ledger();

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, short_description, full_description,
                price_cents, discount_price_cents, is_active, is_featured,
                minimum_stock_threshold, allow_backorder, brand, category, tags,
                image_url, thumbnail_url, seo_title, slug,
                stock_quantity, reserved_stock_quantity, sync_version,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11, ?12, ?13, ?14,
                ?15, ?16, ?17, ?18,
                ?19, ?20, ?21,
                ?22, ?23
            )
            "#,
        )
        .bind(&product.id)
        .bind(&d.sku)
        .bind(&d.name)
        .bind(&d.short_description)
        .bind(&d.full_description)
        .bind(d.price.cents())
        .bind(d.discount_price.map(|m| m.cents()))
        .bind(d.is_active)
        .bind(d.is_featured)
        .bind(d.minimum_stock_threshold)
        .bind(d.allow_backorder)
        .bind(&d.brand)
        .bind(&d.category)
        .bind(encode_tags(&d.tags)?)
        .bind(&d.image_url)
        .bind(&d.thumbnail_url)
        .bind(&d.seo_title)
        .bind(&d.slug)
        .bind(ledger.stock())
        .bind(ledger.reserved())
        .bind(ledger.version())
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("sku", &d.sku),
            other => other,
        })?;

        Ok(product.clone())
    }

    /// Writes the product's details and `updated_at`.
    ///
    /// Stock columns and `sync_version` are left alone, so an edit never
    /// races with a stock operation.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let d = &product.details;
        let updated_at = product.updated_at.unwrap_or_else(Utc::now);

        let result = sqlx::query(
            r#"
            UPDATE products SET
                sku = ?2,
                name = ?3,
                short_description = ?4,
                full_description = ?5,
                price_cents = ?6,
                discount_price_cents = ?7,
                is_active = ?8,
                is_featured = ?9,
                minimum_stock_threshold = ?10,
                allow_backorder = ?11,
                brand = ?12,
                category = ?13,
                tags = ?14,
                image_url = ?15,
                thumbnail_url = ?16,
                seo_title = ?17,
                slug = ?18,
                updated_at = ?19
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&d.sku)
        .bind(&d.name)
        .bind(&d.short_description)
        .bind(&d.full_description)
        .bind(d.price.cents())
        .bind(d.discount_price.map(|m| m.cents()))
        .bind(d.is_active)
        .bind(d.is_featured)
        .bind(d.minimum_stock_threshold)
        .bind(d.allow_backorder)
        .bind(&d.brand)
        .bind(&d.category)
        .bind(encode_tags(&d.tags)?)
        .bind(&d.image_url)
        .bind(&d.thumbnail_url)
        .bind(&d.seo_title)
        .bind(&d.slug)
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("sku", &d.sku),
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Deletes a product. Its variants and reviews go with it
    /// (`ON DELETE CASCADE`), and so do their ledgers.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use catalog_core::NewProduct;

    fn details(sku: &str, name: &str) -> ProductDetails {
        ProductDetails {
            sku: sku.to_string(),
            name: name.to_string(),
            short_description: "Ergonomic wireless mouse".to_string(),
            full_description: String::new(),
            price: Money::from_cents(12999),
            discount_price: Some(Money::from_cents(9999)),
            is_active: true,
            is_featured: true,
            minimum_stock_threshold: 10,
            allow_backorder: false,
            brand: "LogiTech".to_string(),
            category: "Accessories".to_string(),
            tags: vec!["mouse".to_string(), "wireless".to_string()],
            image_url: String::new(),
            thumbnail_url: String::new(),
            seo_title: String::new(),
            slug: Product::slugify(name),
        }
    }

    fn product(sku: &str, name: &str, stock: i64) -> Product {
        Product::create(
            NewProduct {
                details: details(sku, name),
                initial_stock: stock,
            },
            Utc::now(),
        )
        .unwrap()
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = db().await;
        let p = product("WM-001", "Wireless Mouse", 150);
        db.products().insert(&p).await.unwrap();

        let loaded = db.products().get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(loaded.details, p.details);
        assert_eq!(loaded.ledger().stock(), 150);
        assert_eq!(loaded.ledger().reserved(), 0);

        let by_sku = db.products().get_by_sku("WM-001").await.unwrap().unwrap();
        assert_eq!(by_sku.id, p.id);

        assert!(db.products().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sku() {
        let db = db().await;
        db.products()
            .insert(&product("WM-001", "Wireless Mouse", 1))
            .await
            .unwrap();

        let err = db
            .products()
            .insert(&product("WM-001", "Another Mouse", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "sku"));
    }

    #[tokio::test]
    async fn test_search_and_list() {
        let db = db().await;
        let repo = db.products();
        repo.insert(&product("WM-001", "Wireless Mouse", 1)).await.unwrap();
        repo.insert(&product("MK-002", "Mechanical Keyboard", 1)).await.unwrap();

        let mut hidden = product("GH-003", "Gaming Headset", 1);
        hidden.details.is_active = false;
        repo.insert(&hidden).await.unwrap();

        let hits = repo.search("mech", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].details.sku, "MK-002");

        assert_eq!(repo.search("wm-", 10).await.unwrap().len(), 1);
        assert!(repo.search("gaming", 10).await.unwrap().is_empty());
        assert!(repo.search("%", 10).await.unwrap().is_empty());

        let active = repo.search("", 10).await.unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].details.name, "Mechanical Keyboard");

        assert_eq!(repo.list().await.unwrap().len(), 3);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_update_keeps_stock() {
        let db = db().await;
        let repo = db.products();
        let mut p = product("WM-001", "Wireless Mouse", 150);
        repo.insert(&p).await.unwrap();

        db.stock().reserve(&p.item_id(), 40).await.unwrap();

        let mut d = p.details.clone();
        d.price = Money::from_cents(11999);
        d.tags.push("silent".to_string());
        p.apply_update(d, Utc::now()).unwrap();
        repo.update(&p).await.unwrap();

        let loaded = repo.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(loaded.details.price, Money::from_cents(11999));
        assert_eq!(loaded.details.tags.len(), 3);
        assert!(loaded.updated_at.is_some());
        assert_eq!(loaded.ledger().reserved(), 40);
        assert_eq!(loaded.ledger().stock(), 150);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let db = db().await;
        let p = product("WM-001", "Wireless Mouse", 1);

        assert!(matches!(
            db.products().update(&p).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            db.products().delete(&p.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_checkout_flow_then_delete() {
        let db = db().await;
        let p = product("MK-002", "Mechanical Keyboard", 80);
        db.products().insert(&p).await.unwrap();
        let id = p.item_id();
        let stock = db.stock();

        // Two carts hold units, one pays, the other abandons
        stock.reserve(&id, 5).await.unwrap();
        stock.reserve(&id, 3).await.unwrap();
        assert_eq!(stock.available_stock(&id).await.unwrap(), 72);

        let after_payment = stock.reduce(&id, 5).await.unwrap();
        assert_eq!((after_payment.stock(), after_payment.reserved()), (75, 3));

        stock.release(&id, 3).await.unwrap();
        assert_eq!(stock.available_stock(&id).await.unwrap(), 75);

        let loaded = db.products().get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(loaded.ledger().stock(), 75);
        assert_eq!(loaded.ledger().version(), 4);

        db.products().delete(&p.id).await.unwrap();
        let err = stock.reserve(&id, 1).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::InventoryError::Stock(catalog_core::StockError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unreadable_tags_column() {
        let db = db().await;
        let p = product("WM-001", "Wireless Mouse", 1);
        db.products().insert(&p).await.unwrap();

        sqlx::query("UPDATE products SET tags = 'mouse,wireless' WHERE id = ?1")
            .bind(&p.id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = db.products().get_by_id(&p.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::CorruptRow { ref table, ref reason } if table == "products" && reason.starts_with("tags:")
        ));
    }

    #[test]
    fn test_tags_column_encoding() {
        let tags = vec!["mouse".to_string(), "50% off".to_string()];
        assert_eq!(decode_tags(&encode_tags(&tags).unwrap()).unwrap(), tags);
        assert_eq!(decode_tags("[]").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_like_prefix_escapes_wildcards() {
        assert_eq!(like_prefix("mk"), "mk%");
        assert_eq!(like_prefix("50%_off"), "50\\%\\_off%");
    }
}
