//! # Seed Data Generator
//!
//! Populates a database with a small, consistent demo data set.
//!
//! ## Usage
//! ```bash
//! # Use ORDERDESK_DATABASE_PATH (default ./orderdesk.db)
//! cargo run -p orderdesk-db --bin seed
//!
//! # Specify database path
//! cargo run -p orderdesk-db --bin seed -- --db ./data/orderdesk.db
//!
//! # More logging
//! RUST_LOG=orderdesk_db=debug cargo run -p orderdesk-db --bin seed
//! ```
//!
//! ## Generated Data
//! - One admin and three customers
//! - Products across categories with stock
//! - An order built through the line item service, so stock and the order
//!   total match the items
//! - A payment for that order and a few admin log entries
//!
//! Prints the seeded order as JSON when done.

use std::env;
use std::path::PathBuf;

use orderdesk_core::{NewAdminLog, NewOrder, NewOrderItem, NewPayment, NewProduct, NewUser};
use orderdesk_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

/// (name, category, price in cents, stock)
const PRODUCTS: &[(&str, &str, i64, i64)] = &[
    ("Coffee Mug", "Kitchen", 1999, 40),
    ("French Press", "Kitchen", 3450, 12),
    ("Notebook A5", "Stationery", 899, 120),
    ("Fountain Pen", "Stationery", 4500, 8),
    ("Desk Lamp", "Office", 2999, 15),
    ("Monitor Stand", "Office", 5999, 6),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Ada Park", "ada@example.com"),
    ("Ben Ortiz", "ben@example.com"),
    ("Chloe Wu", "chloe@example.com"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = DbConfig::from_env()?;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("OrderDesk Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $ORDERDESK_DATABASE_PATH or ./orderdesk.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("OrderDesk Seed Data Generator");
    println!("=============================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::new(config).await?;
    println!("✓ Connected to database, migrations applied");

    if !db.users().list().await?.is_empty() {
        println!("⚠ Database already has users, skipping seed.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let admin = db
        .users()
        .insert(&NewUser {
            name: "Store Admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: "$argon2id$v=19$seed-only".to_string(),
            role: "admin".to_string(),
        })
        .await?;

    let mut customers = Vec::with_capacity(CUSTOMERS.len());
    for (name, email) in CUSTOMERS {
        let user = db
            .users()
            .insert(&NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: "$argon2id$v=19$seed-only".to_string(),
                role: "customer".to_string(),
            })
            .await?;
        customers.push(user);
    }
    println!("✓ Created 1 admin and {} customers", customers.len());

    let mut products = Vec::with_capacity(PRODUCTS.len());
    for (name, category, price_cents, stock_quantity) in PRODUCTS {
        let product = db
            .products()
            .insert(&NewProduct {
                name: name.to_string(),
                description: None,
                price_cents: *price_cents,
                stock_quantity: *stock_quantity,
                category: category.to_string(),
                image_url: None,
            })
            .await?;
        products.push(product);
    }
    println!("✓ Created {} products", products.len());

    db.admin_logs()
        .insert(&NewAdminLog {
            admin_id: Some(admin.id),
            action: format!("Imported {} products", products.len()),
        })
        .await?;

    let Some(buyer) = customers.first() else {
        return Ok(());
    };
    let order = db
        .orders()
        .insert(&NewOrder {
            user_id: buyer.id,
            status: None,
        })
        .await?;

    for (product, quantity) in products.iter().zip([3, 1, 5]) {
        db.line_items()
            .create_line_item(NewOrderItem {
                order_id: order.id,
                product_id: product.id,
                quantity,
            })
            .await?;
    }

    db.payments()
        .insert(&NewPayment {
            order_id: order.id,
            payment_method: "card".to_string(),
            payment_status: Some("completed".to_string()),
            transaction_id: Some(format!("seed-{}", order.id)),
        })
        .await?;

    db.orders().update_status(order.id, "paid").await?;

    db.admin_logs()
        .insert(&NewAdminLog {
            admin_id: Some(admin.id),
            action: format!("Marked order {} as paid", order.id),
        })
        .await?;
    println!("✓ Created order {} with items and a payment", order.id);

    let detail = db.orders().get_detail(order.id).await?;
    println!();
    println!("{}", serde_json::to_string_pretty(&detail)?);

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
