//! # Seed Data Generator
//!
//! Populates the catalog with demo products, variants and reviews.
//!
//! ## Usage
//! ```bash
//! # Use CATALOG_DATABASE_PATH (default ./catalog.db)
//! cargo run -p catalog-db --bin seed
//!
//! # Specify database path
//! cargo run -p catalog-db --bin seed -- --db ./data/catalog.db
//! ```
//!
//! Seeding is skipped when the database already holds products.

use catalog_core::{
    Money, NewProduct, NewReview, NewVariant, Product, ProductDetails, ProductReview,
    ProductVariant, VariantDetails,
};
use catalog_db::{telemetry, CatalogConfig, Database};
use chrono::{Duration, Utc};
use std::env;
use tracing::info;

struct SeedProduct {
    sku: &'static str,
    name: &'static str,
    short_description: &'static str,
    full_description: &'static str,
    price: (i64, i64),
    discount: (i64, i64),
    is_featured: bool,
    stock: i64,
    threshold: i64,
    allow_backorder: bool,
    brand: &'static str,
    category: &'static str,
    tags: &'static [&'static str],
    seo_title: &'static str,
    slug: &'static str,
    /// (name, color, size, surcharge in whole units, stock, image suffix)
    variants: &'static [(&'static str, &'static str, &'static str, i64, i64, &'static str)],
    /// (user, rating, comment, days ago, verified)
    reviews: &'static [(&'static str, i64, &'static str, i64, bool)],
}

const CATALOG: &[SeedProduct] = &[
    SeedProduct {
        sku: "WM-001",
        name: "Wireless Mouse",
        short_description: "Ergonomic wireless mouse",
        full_description: "Comfortable wireless mouse with adjustable DPI and silent clicks.",
        price: (129, 99),
        discount: (99, 99),
        is_featured: true,
        stock: 150,
        threshold: 10,
        allow_backorder: false,
        brand: "LogiTech",
        category: "Accessories",
        tags: &["mouse", "wireless", "ergonomic"],
        seo_title: "Wireless Mouse - Ergonomic & Silent",
        slug: "wireless-mouse",
        variants: &[
            ("Compact Black", "Black", "Small", 0, 100, "black"),
            ("Ergo Gray", "Gray", "Medium", 10, 80, "gray"),
            ("Silent White", "White", "Large", 5, 60, "white"),
        ],
        reviews: &[
            ("matheus123", 5, "Super comfortable and responsive!", 5, true),
            ("tech_guy", 4, "Great mouse, but wish the battery lasted longer.", 3, true),
            ("gamer_babe", 5, "Perfect for gaming and work!", 1, false),
        ],
    },
    SeedProduct {
        sku: "MK-002",
        name: "Mechanical Keyboard",
        short_description: "RGB mechanical keyboard",
        full_description: "High-performance mechanical keyboard with customizable RGB lighting.",
        price: (349, 99),
        discount: (299, 99),
        is_featured: false,
        stock: 80,
        threshold: 5,
        allow_backorder: true,
        brand: "Corsair",
        category: "Accessories",
        tags: &["keyboard", "mechanical", "RGB"],
        seo_title: "Mechanical Keyboard - RGB & Performance",
        slug: "mechanical-keyboard",
        variants: &[
            ("RGB Black", "Black", "Full", 0, 50, "black"),
            ("Silent White", "White", "Tenkeyless", 20, 40, "white"),
            ("Compact Red", "Red", "60%", -10, 30, "red"),
        ],
        reviews: &[
            ("corsairFan", 5, "Clicky keys and stunning RGB!", 7, true),
            ("quietCoder", 3, "Too loud for my taste, but solid build.", 4, true),
            ("rgbQueen", 4, "Love the lighting effects!", 2, false),
        ],
    },
    SeedProduct {
        sku: "GH-003",
        name: "Gaming Headset",
        short_description: "Surround sound headset",
        full_description: "Immersive 7.1 surround sound gaming headset with noise-canceling mic.",
        price: (249, 99),
        discount: (199, 99),
        is_featured: true,
        stock: 120,
        threshold: 15,
        allow_backorder: false,
        brand: "Razer",
        category: "Audio",
        tags: &["headset", "gaming", "surround"],
        seo_title: "Gaming Headset - Surround Sound",
        slug: "gaming-headset",
        variants: &[
            ("Blackout Edition", "Black", "Standard", 0, 70, "black"),
            ("Neon Green", "Green", "Large", 15, 50, "green"),
            ("White Noise", "White", "Standard", 10, 40, "white"),
        ],
        reviews: &[
            ("razerMaster", 5, "Immersive sound and comfy fit!", 6, true),
            ("streamerGirl", 4, "Mic is clear, but ear cups get warm.", 3, true),
            ("bassHunter", 5, "Bass is insane. Highly recommend!", 1, false),
        ],
    },
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    let mut config = CatalogConfig::load()?;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Catalog Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $CATALOG_DATABASE_PATH or ./catalog.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Catalog Seed Data Generator");
    println!("==============================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::new(config.db_config()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();
    let mut variant_count = 0;
    let mut review_count = 0;

    for seed in CATALOG {
        let product = db.products().insert(&Product::create(seed.to_input(), now)?).await?;
        info!(
            sku = %product.details.sku,
            id = %product.id,
            price = %product.effective_price(),
            discount_bps = ?product.discount_bps(),
            "Seeded product"
        );

        for &(variant_name, color, size, surcharge, stock, suffix) in seed.variants {
            let variant = ProductVariant::create(
                NewVariant {
                    product_id: product.id.clone(),
                    details: VariantDetails {
                        variant_name: variant_name.to_string(),
                        color: color.to_string(),
                        size: size.to_string(),
                        additional_price: Some(Money::from_major_minor(surcharge, 0)),
                        image_url: format!("/images/products/{}-{}.jpg", seed.slug, suffix),
                        is_active: true,
                    },
                    initial_stock: stock,
                },
                now,
            )?;
            db.variants().insert(&variant).await?;
            variant_count += 1;
        }

        for &(user, rating, comment, days_ago, verified) in seed.reviews {
            let review = ProductReview::create(
                NewReview {
                    product_id: product.id.clone(),
                    user_id: user.to_string(),
                    rating,
                    comment: comment.to_string(),
                    is_verified_purchase: verified,
                },
                now - Duration::days(days_ago),
            )?;
            db.reviews().insert(&review).await?;
            review_count += 1;
        }
    }

    println!();
    println!(
        "✓ Seeded {} products, {} variants, {} reviews",
        CATALOG.len(),
        variant_count,
        review_count
    );

    println!();
    println!("Verifying search...");
    let results = db.products().search("WM", 10).await?;
    println!("  Search 'WM': {} results", results.len());

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

impl SeedProduct {
    fn to_input(&self) -> NewProduct {
        NewProduct {
            details: ProductDetails {
                sku: self.sku.to_string(),
                name: self.name.to_string(),
                short_description: self.short_description.to_string(),
                full_description: self.full_description.to_string(),
                price: Money::from_major_minor(self.price.0, self.price.1),
                discount_price: Some(Money::from_major_minor(self.discount.0, self.discount.1)),
                is_active: true,
                is_featured: self.is_featured,
                minimum_stock_threshold: self.threshold,
                allow_backorder: self.allow_backorder,
                brand: self.brand.to_string(),
                category: self.category.to_string(),
                tags: self.tags.iter().map(|t| t.to_string()).collect(),
                image_url: format!("/images/products/{}.jpg", self.slug),
                thumbnail_url: format!("/images/products/thumbs/{}.jpg", self.slug),
                seo_title: self.seo_title.to_string(),
                slug: self.slug.to_string(),
            },
            initial_stock: self.stock,
        }
    }
}
