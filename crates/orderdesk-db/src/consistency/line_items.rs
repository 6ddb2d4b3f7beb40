//! # Line Item Service
//!
//! Creates, changes and deletes order items. Each call is one transaction
//! that writes the item row, the product stock and the order total together.
//!
//! ## Effects Per Operation
//! ```text
//! ┌──────────────────────┬──────────────────┬──────────────────────────────┐
//! │ Operation            │ Stock            │ Order total                  │
//! ├──────────────────────┼──────────────────┼──────────────────────────────┤
//! │ create (qty q)       │ reserve(q)       │ + price × q                  │
//! │ update q → q + Δ     │ adjust(-Δ)       │ + price × Δ                  │
//! │ delete (qty q)       │ release(q)       │ - price × q                  │
//! └──────────────────────┴──────────────────┴──────────────────────────────┘
//! ```
//!
//! `price` is the snapshot stored on the item at creation. Later product
//! price changes never reach existing items.

use sqlx::SqliteConnection;
use tracing::info;

use crate::consistency::{inventory, totals};
use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::{order, order_item, product};
use orderdesk_core::inventory as stock_rules;
use orderdesk_core::totals as total_rules;
use orderdesk_core::validation::validate_quantity;
use orderdesk_core::{CoreError, Entity, NewOrderItem, OrderItem, OrderItemUpdate};

/// Line item mutations with stock and total bookkeeping.
///
/// ## Usage
/// ```rust,ignore
/// let item = db.line_items().create_line_item(NewOrderItem {
///     order_id,
///     product_id,
///     quantity: 3,
/// }).await?;
///
/// let item = db.line_items()
///     .update_line_item_quantity(item.id, OrderItemUpdate::quantity(5))
///     .await?;
///
/// db.line_items().delete_line_item(item.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct LineItemService {
    db: Database,
}

impl LineItemService {
    pub(crate) fn new(db: Database) -> Self {
        LineItemService { db }
    }

    /// Adds a line item at the product's current price.
    ///
    /// ## Returns
    /// * `Ok(OrderItem)` - Created item with its id and captured price
    /// * `Err(UnknownOrder | UnknownProduct)` - A reference is missing
    /// * `Err(InsufficientStock)` - Carries the available quantity
    pub async fn create_line_item(&self, input: NewOrderItem) -> DbResult<OrderItem> {
        validate_quantity(input.quantity)?;

        let item = self
            .db
            .transactionally(move |conn| Box::pin(create_in_tx(conn, input)))
            .await?;

        info!(
            item_id = item.id,
            order_id = item.order_id,
            product_id = item.product_id,
            quantity = item.quantity,
            price = %item.price(),
            "Line item created"
        );
        Ok(item)
    }

    /// Changes a line item's quantity. The price snapshot is kept.
    ///
    /// ## Returns
    /// * `Ok(OrderItem)` - Updated item (unchanged when the quantity is the same)
    /// * `Err(NotFound)` - Item doesn't exist
    /// * `Err(ImmutableReference)` - The update names a different order or product
    /// * `Err(ConcurrentModification)` - `expected_version` is stale, or a
    ///   concurrent writer won the row
    /// * `Err(InsufficientStock)` - Not enough stock for the increase
    pub async fn update_line_item_quantity(
        &self,
        item_id: i64,
        update: OrderItemUpdate,
    ) -> DbResult<OrderItem> {
        validate_quantity(update.quantity)?;

        let item = self
            .db
            .transactionally(move |conn| Box::pin(update_in_tx(conn, item_id, update)))
            .await?;

        info!(
            item_id = item.id,
            quantity = item.quantity,
            version = item.version,
            "Line item quantity updated"
        );
        Ok(item)
    }

    /// Removes a line item, returning its stock and taking its amount off
    /// the order total.
    ///
    /// ## Returns
    /// * `Ok(OrderItem)` - The item as it was before removal
    /// * `Err(NotFound)` - Item doesn't exist
    pub async fn delete_line_item(&self, item_id: i64) -> DbResult<OrderItem> {
        let item = self
            .db
            .transactionally(move |conn| Box::pin(delete_in_tx(conn, item_id)))
            .await?;

        info!(
            item_id = item.id,
            order_id = item.order_id,
            released = item.quantity,
            "Line item deleted"
        );
        Ok(item)
    }
}

// =============================================================================
// Transaction Bodies
// =============================================================================

async fn create_in_tx(conn: &mut SqliteConnection, input: NewOrderItem) -> DbResult<OrderItem> {
    let NewOrderItem {
        order_id,
        product_id,
        quantity,
    } = input;

    if !order::exists(&mut *conn, order_id).await? {
        return Err(CoreError::UnknownOrder { order_id }.into());
    }
    let product = product::fetch(&mut *conn, product_id)
        .await?
        .ok_or(CoreError::UnknownProduct { product_id })?;

    // Reject before any write so the error names the stock seen here.
    stock_rules::reserve(product_id, product.stock_quantity, quantity)?;

    let price = product.price();
    let amount = total_rules::line_amount(price, quantity)?;

    let item = order_item::insert(&mut *conn, order_id, product_id, quantity, price.cents()).await?;

    inventory::reserve(&mut *conn, product_id, quantity).await?;
    totals::apply(&mut *conn, order_id, amount).await?;

    Ok(item)
}

async fn update_in_tx(
    conn: &mut SqliteConnection,
    item_id: i64,
    update: OrderItemUpdate,
) -> DbResult<OrderItem> {
    let item = order_item::fetch(&mut *conn, item_id)
        .await?
        .ok_or_else(|| DbError::not_found(Entity::OrderItem, item_id))?;

    if update.order_id.is_some_and(|id| id != item.order_id) {
        return Err(CoreError::ImmutableReference {
            item_id,
            field: "order_id",
        }
        .into());
    }
    if update.product_id.is_some_and(|id| id != item.product_id) {
        return Err(CoreError::ImmutableReference {
            item_id,
            field: "product_id",
        }
        .into());
    }
    if update.expected_version.is_some_and(|v| v != item.version) {
        return Err(DbError::concurrent(Entity::OrderItem, item_id));
    }

    let delta = update.quantity - item.quantity;
    if delta == 0 {
        return Ok(item);
    }

    if !order::exists(&mut *conn, item.order_id).await? {
        return Err(CoreError::UnknownOrder {
            order_id: item.order_id,
        }
        .into());
    }
    let product = product::fetch(&mut *conn, item.product_id)
        .await?
        .ok_or(CoreError::UnknownProduct {
            product_id: item.product_id,
        })?;
    if delta > 0 {
        stock_rules::reserve(product.id, product.stock_quantity, delta)?;
    }
    let amount = total_rules::quantity_change_amount(item.price(), delta)?;

    let updated =
        order_item::update_quantity(&mut *conn, item.id, update.quantity, item.version).await?;

    // Positive delta consumes stock.
    inventory::adjust(&mut *conn, item.product_id, -delta).await?;
    totals::apply(&mut *conn, item.order_id, amount).await?;

    Ok(updated)
}

async fn delete_in_tx(conn: &mut SqliteConnection, item_id: i64) -> DbResult<OrderItem> {
    let item = order_item::fetch(&mut *conn, item_id)
        .await?
        .ok_or_else(|| DbError::not_found(Entity::OrderItem, item_id))?;

    let amount = total_rules::removal_amount(item.price(), item.quantity)?;

    inventory::release(&mut *conn, item.product_id, item.quantity).await?;
    totals::apply(&mut *conn, item.order_id, amount).await?;
    order_item::delete(&mut *conn, item.id, item.version).await?;

    Ok(item)
}

// =============================================================================
// Unit Tests
// =============================================================================
