//! # Domain Types
//!
//! Catalog types: products, their variants, and customer reviews.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Catalog Types                                   │
//! │                                                                         │
//! │  ┌─────────────────┐ 1     * ┌─────────────────┐                       │
//! │  │    Product      │─────────│ ProductVariant  │                       │
//! │  │  ─────────────  │         │  ─────────────  │                       │
//! │  │  id (UUID)      │         │  id (UUID)      │                       │
//! │  │  details        │         │  product_id     │                       │
//! │  │  ledger ◄───────┼── stock │  details        │                       │
//! │  └────────┬────────┘         │  ledger ◄───────┼── stock               │
//! │           │ 1                └─────────────────┘                       │
//! │           │                                                             │
//! │           │ *                                                           │
//! │  ┌────────┴────────┐                                                   │
//! │  │ ProductReview   │   (no stock)                                      │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Details vs Ledger
//! Editable attributes live in a `*Details` struct that an update replaces
//! wholesale. The stock ledger is a private field: it is opened by
//! `create`, read through `ledger()`, and otherwise only changes through
//! the stock operations in catalog-db.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, StockError, ValidationError};
use crate::ledger::{StockItemId, StockLedger};
use crate::money::Money;
use crate::validation::{
    validate_non_negative, validate_optional_text, validate_price, validate_product_name,
    validate_rating, validate_required_text, validate_sku, validate_slug, validate_surcharge,
};
use crate::{
    MAX_REVIEW_COMMENT_LEN, MAX_REVIEW_USER_LEN, MAX_SHORT_DESCRIPTION_LEN,
    MAX_VARIANT_ATTRIBUTE_LEN, MAX_VARIANT_NAME_LEN,
};

/// Generates a new entity id (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Product
// =============================================================================

/// Editable product attributes.
///
/// Used as creation input (inside [`NewProduct`]) and as the full-replace
/// update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    /// Stock Keeping Unit - business identifier, unique.
    pub sku: String,
    pub name: String,
    pub short_description: String,
    pub full_description: String,
    pub price: Money,
    /// Sale price; shown instead of `price` when set.
    pub discount_price: Option<Money>,
    pub is_active: bool,
    pub is_featured: bool,
    /// Available stock at or below this level counts as "low stock".
    pub minimum_stock_threshold: i64,
    pub allow_backorder: bool,
    pub brand: String,
    pub category: String,
    pub tags: Vec<String>,
    pub image_url: String,
    pub thumbnail_url: String,
    pub seo_title: String,
    pub slug: String,
}

impl ProductDetails {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_sku(&self.sku)?;
        validate_product_name(&self.name)?;
        validate_optional_text("short_description", &self.short_description, MAX_SHORT_DESCRIPTION_LEN)?;
        validate_price("price", self.price)?;
        if let Some(discount) = self.discount_price {
            validate_price("discount_price", discount)?;
            if discount > self.price {
                return Err(ValidationError::OutOfRange {
                    field: "discount_price".to_string(),
                    min: 0,
                    max: self.price.cents(),
                });
            }
        }
        validate_non_negative("minimum_stock_threshold", self.minimum_stock_threshold)?;
        validate_slug(&self.slug)?;
        Ok(())
    }
}

/// Creation input for a product: its details plus the opening stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    #[serde(flatten)]
    pub details: ProductDetails,
    pub initial_stock: i64,
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProductRecord")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,
    #[serde(flatten)]
    pub details: ProductDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    ledger: StockLedger,
}

/// Unchecked wire shape; deserialization goes through [`Product::restore`].
#[derive(Deserialize)]
struct ProductRecord {
    id: String,
    #[serde(flatten)]
    details: ProductDetails,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    ledger: StockLedger,
}

impl TryFrom<ProductRecord> for Product {
    type Error = CoreError;

    fn try_from(r: ProductRecord) -> Result<Self, Self::Error> {
        Product::restore(r.id, r.details, r.created_at, r.updated_at, r.ledger)
    }
}

impl Product {
    /// Builds a new product with a fresh id and an opened ledger
    /// (`stock = initial_stock`, `reserved = 0`).
    pub fn create(input: NewProduct, now: DateTime<Utc>) -> CoreResult<Self> {
        input.details.validate()?;

        let id = generate_id();
        let ledger = StockLedger::open(StockItemId::product(&id), input.initial_stock)?;

        Ok(Product {
            id,
            details: input.details,
            created_at: now,
            updated_at: None,
            ledger,
        })
    }

    /// Reassembles a product from storage.
    ///
    /// ## Errors
    /// `InvalidArgument` if the ledger belongs to a different item.
    pub fn restore(
        id: String,
        details: ProductDetails,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
        ledger: StockLedger,
    ) -> CoreResult<Self> {
        ensure_ledger_owner(&StockItemId::product(&id), &ledger)?;
        Ok(Product {
            id,
            details,
            created_at,
            updated_at,
            ledger,
        })
    }

    /// Replaces the editable details. The ledger is not touched.
    pub fn apply_update(&mut self, details: ProductDetails, now: DateTime<Utc>) -> CoreResult<()> {
        details.validate()?;
        self.details = details;
        self.updated_at = Some(now);
        Ok(())
    }

    pub fn item_id(&self) -> StockItemId {
        StockItemId::product(&self.id)
    }

    pub fn ledger(&self) -> &StockLedger {
        &self.ledger
    }

    /// Price a customer pays: the discount price when set.
    pub fn effective_price(&self) -> Money {
        self.details.discount_price.unwrap_or(self.details.price)
    }

    /// Markdown of the discount price from list price, in basis points.
    pub fn discount_bps(&self) -> Option<u32> {
        self.details
            .discount_price
            .and_then(|sale| self.details.price.discount_bps(sale))
    }

    /// True when available stock has fallen to the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.ledger.available() <= self.details.minimum_stock_threshold
    }

    /// Derives a URL slug from a display name.
    ///
    /// ## Example
    /// ```rust
    /// use catalog_core::Product;
    ///
    /// assert_eq!(Product::slugify("Wireless Mouse"), "wireless-mouse");
    /// assert_eq!(Product::slugify("  Gaming -- Headset! "), "gaming-headset");
    /// ```
    pub fn slugify(name: &str) -> String {
        name.to_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

// =============================================================================
// Product Variant
// =============================================================================

/// Editable variant attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDetails {
    pub variant_name: String,
    pub color: String,
    pub size: String,
    /// Surcharge over the product's price; may be negative.
    pub additional_price: Option<Money>,
    pub image_url: String,
    pub is_active: bool,
}

impl VariantDetails {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required_text("variant_name", &self.variant_name, MAX_VARIANT_NAME_LEN)?;
        validate_optional_text("color", &self.color, MAX_VARIANT_ATTRIBUTE_LEN)?;
        validate_optional_text("size", &self.size, MAX_VARIANT_ATTRIBUTE_LEN)?;
        if let Some(surcharge) = self.additional_price {
            validate_surcharge("additional_price", surcharge)?;
        }
        Ok(())
    }
}

/// Creation input for a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVariant {
    pub product_id: String,
    #[serde(flatten)]
    pub details: VariantDetails,
    pub initial_stock: i64,
}

/// A sellable variant of a product (color, size, ...), with its own stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "VariantRecord")]
pub struct ProductVariant {
    pub id: String,
    pub product_id: String,
    #[serde(flatten)]
    pub details: VariantDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    ledger: StockLedger,
}

/// Unchecked wire shape; deserialization goes through [`ProductVariant::restore`].
#[derive(Deserialize)]
struct VariantRecord {
    id: String,
    product_id: String,
    #[serde(flatten)]
    details: VariantDetails,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    ledger: StockLedger,
}

impl TryFrom<VariantRecord> for ProductVariant {
    type Error = CoreError;

    fn try_from(r: VariantRecord) -> Result<Self, Self::Error> {
        ProductVariant::restore(
            r.id,
            r.product_id,
            r.details,
            r.created_at,
            r.updated_at,
            r.ledger,
        )
    }
}

impl ProductVariant {
    pub fn create(input: NewVariant, now: DateTime<Utc>) -> CoreResult<Self> {
        validate_required_text("product_id", &input.product_id, usize::MAX)?;
        input.details.validate()?;

        let id = generate_id();
        let ledger = StockLedger::open(StockItemId::variant(&id), input.initial_stock)?;

        Ok(ProductVariant {
            id,
            product_id: input.product_id,
            details: input.details,
            created_at: now,
            updated_at: None,
            ledger,
        })
    }

    pub fn restore(
        id: String,
        product_id: String,
        details: VariantDetails,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
        ledger: StockLedger,
    ) -> CoreResult<Self> {
        ensure_ledger_owner(&StockItemId::variant(&id), &ledger)?;
        Ok(ProductVariant {
            id,
            product_id,
            details,
            created_at,
            updated_at,
            ledger,
        })
    }

    pub fn apply_update(&mut self, details: VariantDetails, now: DateTime<Utc>) -> CoreResult<()> {
        details.validate()?;
        self.details = details;
        self.updated_at = Some(now);
        Ok(())
    }

    pub fn item_id(&self) -> StockItemId {
        StockItemId::variant(&self.id)
    }

    pub fn ledger(&self) -> &StockLedger {
        &self.ledger
    }

    /// The parent's effective price plus this variant's surcharge, floored at zero.
    pub fn effective_price(&self, product: &Product) -> Money {
        let surcharge = self.details.additional_price.unwrap_or_default();
        product
            .effective_price()
            .saturating_add(surcharge)
            .max(Money::zero())
    }
}

fn ensure_ledger_owner(expected: &StockItemId, ledger: &StockLedger) -> Result<(), StockError> {
    if ledger.id() != expected {
        return Err(ValidationError::InvalidFormat {
            field: "ledger".to_string(),
            reason: format!("belongs to {}, expected {}", ledger.id(), expected),
        }
        .into());
    }
    Ok(())
}

// =============================================================================
// Product Review
// =============================================================================

/// Creation input for a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    pub product_id: String,
    pub user_id: String,
    pub rating: i64,
    pub comment: String,
    #[serde(default)]
    pub is_verified_purchase: bool,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required_text("product_id", &self.product_id, usize::MAX)?;
        validate_required_text("user_id", &self.user_id, MAX_REVIEW_USER_LEN)?;
        validate_rating(self.rating)?;
        validate_optional_text("comment", &self.comment, MAX_REVIEW_COMMENT_LEN)
    }
}

/// Editable review fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewUpdate {
    pub rating: i64,
    pub comment: String,
    pub is_verified_purchase: bool,
}

impl ReviewUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_rating(self.rating)?;
        validate_optional_text("comment", &self.comment, MAX_REVIEW_COMMENT_LEN)
    }
}

/// A customer review of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductReview {
    pub id: String,
    pub product_id: String,
    pub user_id: String,
    /// Whole stars, 1..=5.
    pub rating: i64,
    pub comment: String,
    pub is_verified_purchase: bool,
    pub created_at: DateTime<Utc>,
}

impl ProductReview {
    pub fn create(input: NewReview, now: DateTime<Utc>) -> CoreResult<Self> {
        input.validate()?;
        Ok(ProductReview {
            id: generate_id(),
            product_id: input.product_id,
            user_id: input.user_id,
            rating: input.rating,
            comment: input.comment,
            is_verified_purchase: input.is_verified_purchase,
            created_at: now,
        })
    }

    pub fn apply_update(&mut self, update: ReviewUpdate) -> CoreResult<()> {
        update.validate()?;
        self.rating = update.rating;
        self.comment = update.comment;
        self.is_verified_purchase = update.is_verified_purchase;
        Ok(())
    }
}

/// Aggregate of a product's ratings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RatingSummary {
    pub count: i64,
    /// Mean rating, `None` when there are no reviews.
    pub average: Option<f64>,
}

impl RatingSummary {
    pub fn from_ratings(ratings: impl IntoIterator<Item = i64>) -> Self {
        let (count, total) = ratings
            .into_iter()
            .fold((0i64, 0i64), |(n, sum), r| (n + 1, sum + r));

        RatingSummary {
            count,
            average: (count > 0).then(|| total as f64 / count as f64),
        }
    }
}

impl From<&Product> for StockItemId {
    fn from(product: &Product) -> Self {
        product.item_id()
    }
}

impl From<&ProductVariant> for StockItemId {
    fn from(variant: &ProductVariant) -> Self {
        variant.item_id()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
