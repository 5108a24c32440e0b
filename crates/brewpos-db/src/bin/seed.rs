//! # Seed Data Generator
//!
//! Populates the database with a coffee-shop menu for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p brewpos-db --bin seed
//!
//! # Specify database path
//! cargo run -p brewpos-db --bin seed -- --db ./data/brewpos.db
//!
//! # Also seed opening stock for every product
//! cargo run -p brewpos-db --bin seed -- --with-stock
//! ```
//!
//! ## Generated Data
//! - Menu products across categories (espresso, brew, tea, cold, pastry, sandwich)
//! - Two sample promotions (a percentage and a fixed-amount campaign)
//! - Optional opening stock levels with ledger movements

use chrono::{Duration, Utc};
use std::env;
use uuid::Uuid;

use brewpos_core::{DiscountType, MovementType, Product, Promotion};
use brewpos_db::{Database, DbConfig, StockApplyOutcome};

/// Menu items per category: (name, price in cents).
const MENU: &[(&str, &[(&str, i64)])] = &[
    (
        "espresso",
        &[
            ("Espresso", 275),
            ("Double Espresso", 350),
            ("Americano", 375),
            ("Cappuccino", 450),
            ("Flat White", 475),
            ("Latte", 495),
            ("Mocha", 525),
            ("Cortado", 425),
            ("Macchiato", 400),
        ],
    ),
    (
        "brew",
        &[
            ("Drip Coffee", 295),
            ("Pour Over", 450),
            ("French Press", 425),
            ("Cold Brew", 475),
        ],
    ),
    (
        "tea",
        &[
            ("Earl Grey", 325),
            ("Green Tea", 325),
            ("Chai Latte", 475),
            ("Matcha Latte", 550),
            ("Herbal Infusion", 350),
        ],
    ),
    (
        "cold",
        &[
            ("Iced Latte", 525),
            ("Iced Americano", 400),
            ("Frappe", 575),
            ("Lemonade", 375),
            ("Sparkling Water", 250),
        ],
    ),
    (
        "pastry",
        &[
            ("Croissant", 350),
            ("Pain au Chocolat", 395),
            ("Blueberry Muffin", 375),
            ("Cinnamon Roll", 425),
            ("Banana Bread", 350),
            ("Chocolate Chip Cookie", 295),
        ],
    ),
    (
        "sandwich",
        &[
            ("Ham & Cheese Toastie", 695),
            ("Caprese Panini", 750),
            ("Avocado Toast", 795),
            ("Bagel with Cream Cheese", 450),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./brewpos_dev.db");
    let mut with_stock = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--with-stock" | "-s" => {
                with_stock = true;
            }
            "--help" | "-h" => {
                println!("BrewPOS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./brewpos_dev.db)");
                println!("  -s, --with-stock   Also seed opening stock levels");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 BrewPOS Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Generate the menu
    println!();
    println!("Seeding menu...");

    let now = Utc::now();
    let mut product_ids = Vec::new();
    let mut generated = 0;

    for (category, items) in MENU {
        for (name, price_cents) in *items {
            let product = Product {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                category: category.to_string(),
                price_cents: *price_cents,
                is_active: true,
                created_at: now,
                updated_at: now,
            };

            if let Err(e) = db.products().insert(&product).await {
                eprintln!("Failed to insert {}: {}", product.name, e);
                continue;
            }

            product_ids.push(product.id);
            generated += 1;
        }
    }

    println!("✓ Seeded {} products", generated);

    // Sample promotions
    println!();
    println!("Seeding promotions...");

    let promotions = [
        Promotion {
            id: Uuid::new_v4().to_string(),
            name: "Happy Hour 15%".to_string(),
            description: Some("15% off, weekday afternoons".to_string()),
            discount_type: DiscountType::Percentage,
            discount_value: 1500, // basis points
            is_active: true,
            is_archived: false,
            start_date: now,
            end_date: now + Duration::days(30),
            created_by: None,
            created_at: now,
            updated_at: now,
        },
        Promotion {
            id: Uuid::new_v4().to_string(),
            name: "Grand Opening $2 Off".to_string(),
            description: Some("Flat $2.00 off any order".to_string()),
            discount_type: DiscountType::FixedAmount,
            discount_value: 200, // cents
            is_active: true,
            is_archived: false,
            start_date: now,
            end_date: now + Duration::days(7),
            created_by: None,
            created_at: now,
            updated_at: now,
        },
    ];

    for promotion in &promotions {
        db.promotions().insert(promotion).await?;
    }

    println!("✓ Seeded {} promotions", promotions.len());

    // Optional opening stock
    if with_stock {
        println!();
        println!("Seeding opening stock...");

        let mut stocked = 0;
        for (idx, product_id) in product_ids.iter().enumerate() {
            // Deterministic spread: 20-50 units
            let quantity = 20 + (idx as i64 * 7) % 31;

            match db
                .stock()
                .apply_movement(product_id, MovementType::Add, quantity, Some("seed"))
                .await?
            {
                StockApplyOutcome::Applied { .. } => stocked += 1,
                StockApplyOutcome::InsufficientStock { .. } => unreachable!("additions never reject"),
            }
        }

        println!("✓ Seeded stock for {} products", stocked);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
