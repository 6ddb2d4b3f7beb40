//! # Inventory Ledger
//!
//! Applies the stock rules from `orderdesk_core::inventory` to the
//! `products` table inside the caller's transaction.
//!
//! ## Guarded Write
//! ```text
//! SELECT ... FROM products WHERE id = ?          → stock 10, version 4
//! rules::reserve(10, 3)                          → 7
//! UPDATE products SET stock_quantity = 7, version = version + 1
//!  WHERE id = ? AND version = 4                  → 1 row, or
//!                                                  ConcurrentModification
//! ```

use sqlx::SqliteConnection;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::product;
use orderdesk_core::inventory as rules;
use orderdesk_core::validation::validate_quantity;
use orderdesk_core::{CoreError, CoreResult, Entity, Product};

/// Takes `quantity` units of stock for a line item.
pub(crate) async fn reserve(
    conn: &mut SqliteConnection,
    product_id: i64,
    quantity: i64,
) -> DbResult<Product> {
    apply_rule(conn, product_id, |stock| rules::reserve(product_id, stock, quantity)).await
}

/// Returns `quantity` units of stock.
pub(crate) async fn release(
    conn: &mut SqliteConnection,
    product_id: i64,
    quantity: i64,
) -> DbResult<Product> {
    apply_rule(conn, product_id, |stock| rules::release(product_id, stock, quantity)).await
}

/// Signed adjustment: negative reserves, positive releases, zero is a no-op
/// that still requires the product to exist.
pub(crate) async fn adjust(
    conn: &mut SqliteConnection,
    product_id: i64,
    delta: i64,
) -> DbResult<Product> {
    apply_rule(conn, product_id, |stock| rules::adjust(product_id, stock, delta)).await
}

async fn apply_rule<R>(conn: &mut SqliteConnection, product_id: i64, rule: R) -> DbResult<Product>
where
    R: FnOnce(i64) -> CoreResult<i64>,
{
    let current = product::fetch(&mut *conn, product_id)
        .await?
        .ok_or(CoreError::UnknownProduct { product_id })?;

    let next = rule(current.stock_quantity)?;
    if next == current.stock_quantity {
        return Ok(current);
    }

    debug!(
        product_id,
        from = current.stock_quantity,
        to = next,
        version = current.version,
        "Writing stock"
    );

    write_stock(conn, product_id, next, current.version).await
}

async fn write_stock(
    conn: &mut SqliteConnection,
    product_id: i64,
    stock: i64,
    expected_version: i64,
) -> DbResult<Product> {
    sqlx::query_as::<_, Product>(
        r#"
        UPDATE products SET
            stock_quantity = ?2,
            version = version + 1
        WHERE id = ?1 AND version = ?3
        RETURNING
            id, name, description, price_cents, stock_quantity,
            category, image_url, version, created_at
        "#,
    )
    .bind(product_id)
    .bind(stock)
    .bind(expected_version)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::concurrent(Entity::Product, product_id))
}

// =============================================================================
// Inventory Ledger
// =============================================================================

/// Stock operations that are not tied to a line item.
///
/// ## Usage
/// ```rust,ignore
/// let product = db.inventory().restock(product_id, 24).await?;
/// let level = db.inventory().stock_level(product_id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct InventoryLedger {
    db: Database,
}

impl InventoryLedger {
    pub(crate) fn new(db: Database) -> Self {
        InventoryLedger { db }
    }

    /// Adds `quantity` (> 0) units to a product's stock.
    pub async fn restock(&self, product_id: i64, quantity: i64) -> DbResult<Product> {
        validate_quantity(quantity)?;

        let product = self
            .db
            .transactionally(move |conn| Box::pin(release(conn, product_id, quantity)))
            .await?;

        info!(
            product_id,
            quantity,
            stock = product.stock_quantity,
            "Product restocked"
        );
        Ok(product)
    }

    /// Current stock of a product.
    pub async fn stock_level(&self, product_id: i64) -> DbResult<i64> {
        product::fetch(self.db.pool(), product_id)
            .await?
            .map(|p| p.stock_quantity)
            .ok_or_else(|| DbError::not_found(Entity::Product, product_id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
