//! # Review Repository
//!
//! Database operations for product reviews. Reviews carry no stock.

use catalog_core::{ProductReview, RatingSummary};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: String,
    product_id: String,
    user_id: String,
    rating: i64,
    comment: String,
    is_verified_purchase: bool,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for ProductReview {
    fn from(row: ReviewRow) -> Self {
        ProductReview {
            id: row.id,
            product_id: row.product_id,
            user_id: row.user_id,
            rating: row.rating,
            comment: row.comment,
            is_verified_purchase: row.is_verified_purchase,
            created_at: row.created_at,
        }
    }
}

/// Repository for product reviews.
#[derive(Debug, Clone)]
pub struct ReviewRepository {
    pool: SqlitePool,
}

impl ReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReviewRepository { pool }
    }

    /// Inserts a review.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - the product doesn't exist
    pub async fn insert(&self, review: &ProductReview) -> DbResult<ProductReview> {
        debug!(product_id = %review.product_id, rating = review.rating, "Inserting review");

        sqlx::query(
            r#"
            INSERT INTO product_reviews (
                id, product_id, user_id, rating, comment, is_verified_purchase, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&review.id)
        .bind(&review.product_id)
        .bind(&review.user_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.is_verified_purchase)
        .bind(review.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::ForeignKeyViolation { .. } => DbError::not_found("Product", &review.product_id),
            other => other,
        })?;

        Ok(review.clone())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ProductReview>> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, product_id, user_id, rating, comment, is_verified_purchase, created_at
            FROM product_reviews
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ProductReview::from))
    }

    /// A product's reviews, newest first.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<ProductReview>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, product_id, user_id, rating, comment, is_verified_purchase, created_at
            FROM product_reviews
            WHERE product_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductReview::from).collect())
    }

    pub async fn update(&self, review: &ProductReview) -> DbResult<()> {
        debug!(id = %review.id, "Updating review");

        let result = sqlx::query(
            r#"
            UPDATE product_reviews SET
                rating = ?2,
                comment = ?3,
                is_verified_purchase = ?4
            WHERE id = ?1
            "#,
        )
        .bind(&review.id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.is_verified_purchase)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ProductReview", &review.id));
        }

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting review");

        let result = sqlx::query("DELETE FROM product_reviews WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ProductReview", id));
        }

        Ok(())
    }

    /// Count and mean rating of a product's reviews.
    pub async fn rating_summary(&self, product_id: &str) -> DbResult<RatingSummary> {
        let (count, average): (i64, Option<f64>) = sqlx::query_as(
            "SELECT COUNT(*), AVG(rating) FROM product_reviews WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(RatingSummary { count, average })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use catalog_core::{Money, NewProduct, NewReview, Product, ProductDetails, ReviewUpdate};

    async fn db_with_product() -> (Database, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = Product::create(
            NewProduct {
                details: ProductDetails {
                    sku: "WM-001".to_string(),
                    name: "Wireless Mouse".to_string(),
                    short_description: String::new(),
                    full_description: String::new(),
                    price: Money::from_cents(12999),
                    discount_price: None,
                    is_active: true,
                    is_featured: true,
                    minimum_stock_threshold: 10,
                    allow_backorder: false,
                    brand: "LogiTech".to_string(),
                    category: "Accessories".to_string(),
                    tags: vec![],
                    image_url: String::new(),
                    thumbnail_url: String::new(),
                    seo_title: String::new(),
                    slug: "wireless-mouse".to_string(),
                },
                initial_stock: 150,
            },
            Utc::now(),
        )
        .unwrap();
        db.products().insert(&product).await.unwrap();
        (db, product)
    }

    fn review(product_id: &str, user: &str, rating: i64, days_ago: i64) -> ProductReview {
        ProductReview::create(
            NewReview {
                product_id: product_id.to_string(),
                user_id: user.to_string(),
                rating,
                comment: "Super comfortable and responsive!".to_string(),
                is_verified_purchase: true,
            },
            Utc::now() - chrono::Duration::days(days_ago),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_list_and_summary() {
        let (db, product) = db_with_product().await;
        let repo = db.reviews();

        assert_eq!(
            repo.rating_summary(&product.id).await.unwrap(),
            RatingSummary::default()
        );

        repo.insert(&review(&product.id, "matheus123", 5, 5)).await.unwrap();
        repo.insert(&review(&product.id, "tech_guy", 4, 3)).await.unwrap();
        repo.insert(&review(&product.id, "gamer_babe", 3, 1)).await.unwrap();

        let listed = repo.list_for_product(&product.id).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].user_id, "gamer_babe");

        let summary = repo.rating_summary(&product.id).await.unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average, Some(4.0));
    }

    #[tokio::test]
    async fn test_insert_for_missing_product() {
        let (db, _) = db_with_product().await;
        let err = db
            .reviews()
            .insert(&review("ghost", "someone", 5, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (db, product) = db_with_product().await;
        let repo = db.reviews();
        let mut r = review(&product.id, "tech_guy", 4, 3);
        repo.insert(&r).await.unwrap();

        r.apply_update(ReviewUpdate {
            rating: 2,
            comment: "Battery died after a week.".to_string(),
            is_verified_purchase: true,
        })
        .unwrap();
        repo.update(&r).await.unwrap();

        let loaded = repo.get_by_id(&r.id).await.unwrap().unwrap();
        assert_eq!(loaded.rating, 2);

        repo.delete(&r.id).await.unwrap();
        assert!(repo.get_by_id(&r.id).await.unwrap().is_none());
        assert!(matches!(repo.delete(&r.id).await, Err(DbError::NotFound { .. })));
    }
}
