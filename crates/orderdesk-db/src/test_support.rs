//! Fixtures shared by the store tests.

use crate::config::DbConfig;
use crate::pool::Database;
use orderdesk_core::{NewOrder, NewProduct, NewUser, Order, Product, User};

pub(crate) async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

pub(crate) fn new_user(email: &str, role: &str) -> NewUser {
    NewUser {
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$v=19$test".to_string(),
        role: role.to_string(),
    }
}

pub(crate) fn new_product(name: &str, price_cents: i64, stock_quantity: i64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: None,
        price_cents,
        stock_quantity,
        category: "General".to_string(),
        image_url: None,
    }
}

pub(crate) async fn seed_user(db: &Database, email: &str) -> User {
    db.users().insert(&new_user(email, "customer")).await.unwrap()
}

pub(crate) async fn seed_product(db: &Database, price_cents: i64, stock_quantity: i64) -> Product {
    db.products()
        .insert(&new_product("Coffee Mug", price_cents, stock_quantity))
        .await
        .unwrap()
}

pub(crate) async fn seed_order(db: &Database, user_id: i64) -> Order {
    db.orders()
        .insert(&NewOrder {
            user_id,
            status: None,
        })
        .await
        .unwrap()
}

/// Reads stock straight from the table.
pub(crate) async fn stock_of(db: &Database, product_id: i64) -> i64 {
    sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_one(db.pool())
        .await
        .unwrap()
}

/// Reads an order total straight from the table.
pub(crate) async fn total_of(db: &Database, order_id: i64) -> i64 {
    sqlx::query_scalar("SELECT total_price_cents FROM orders WHERE id = ?1")
        .bind(order_id)
        .fetch_one(db.pool())
        .await
        .unwrap()
}

/// Σ(price × quantity) over the order's items, computed by SQLite.
pub(crate) async fn items_sum_of(db: &Database, order_id: i64) -> i64 {
    sqlx::query_scalar(
        "SELECT COALESCE(SUM(price_cents * quantity), 0) FROM order_items WHERE order_id = ?1",
    )
    .bind(order_id)
    .fetch_one(db.pool())
    .await
    .unwrap()
}
