//! # Deletion Guard
//!
//! Deletes orders, users and products only when nothing that must outlive
//! them still points at them.
//!
//! ```text
//! ┌───────────────┬──────────────────────────────┬──────────────────────────┐
//! │ Delete        │ Blocked by                   │ Side effects             │
//! ├───────────────┼──────────────────────────────┼──────────────────────────┤
//! │ order         │ any payment                  │ items removed (cascade), │
//! │               │                              │ stock NOT restored       │
//! │ user          │ any order                    │ admin logs detached      │
//! │ product       │ any order item               │ none                     │
//! └───────────────┴──────────────────────────────┴──────────────────────────┘
//! ```
//!
//! The dependent count and the delete run in one transaction, so a payment
//! inserted between the two can't slip past the check.

use sqlx::SqliteConnection;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::{admin_log, order, product, user};
use orderdesk_core::{CoreError, Entity};

/// Guarded deletes for the entities other rows depend on.
#[derive(Debug, Clone)]
pub struct DeletionGuard {
    db: Database,
}

impl DeletionGuard {
    pub(crate) fn new(db: Database) -> Self {
        DeletionGuard { db }
    }

    /// Deletes an order and its line items.
    ///
    /// ## Returns
    /// * `Err(NotFound)` - Order doesn't exist
    /// * `Err(HasDependentPayments)` - Order has payments; nothing is deleted
    pub async fn delete_order(&self, order_id: i64) -> DbResult<()> {
        self.db
            .transactionally(move |conn| Box::pin(delete_order_in_tx(conn, order_id)))
            .await?;

        info!(order_id, "Order deleted");
        Ok(())
    }

    /// Deletes a user. Admin log entries they wrote are kept with no author.
    ///
    /// ## Returns
    /// * `Ok(u64)` - Number of admin log entries detached
    /// * `Err(NotFound)` - User doesn't exist
    /// * `Err(HasDependentOrders)` - User owns orders; nothing is deleted
    pub async fn delete_user(&self, user_id: i64) -> DbResult<u64> {
        let detached = self
            .db
            .transactionally(move |conn| Box::pin(delete_user_in_tx(conn, user_id)))
            .await?;

        info!(user_id, detached_logs = detached, "User deleted");
        Ok(detached)
    }

    /// Deletes a product that no line item references.
    ///
    /// ## Returns
    /// * `Err(NotFound)` - Product doesn't exist
    /// * `Err(ReferencedByOrderItems)` - Product is on an order; nothing is deleted
    pub async fn delete_product(&self, product_id: i64) -> DbResult<()> {
        self.db
            .transactionally(move |conn| Box::pin(delete_product_in_tx(conn, product_id)))
            .await?;

        info!(product_id, "Product deleted");
        Ok(())
    }
}

// =============================================================================
// Transaction Bodies
// =============================================================================

async fn delete_order_in_tx(conn: &mut SqliteConnection, order_id: i64) -> DbResult<()> {
    if !order::exists(&mut *conn, order_id).await? {
        return Err(DbError::not_found(Entity::Order, order_id));
    }

    let payments = order::count_payments(&mut *conn, order_id).await?;
    if payments > 0 {
        return Err(CoreError::HasDependentPayments { order_id, payments }.into());
    }

    order::delete(&mut *conn, order_id).await?;
    Ok(())
}

async fn delete_user_in_tx(conn: &mut SqliteConnection, user_id: i64) -> DbResult<u64> {
    if !user::exists(&mut *conn, user_id).await? {
        return Err(DbError::not_found(Entity::User, user_id));
    }

    let orders = user::count_orders(&mut *conn, user_id).await?;
    if orders > 0 {
        return Err(CoreError::HasDependentOrders { user_id, orders }.into());
    }

    let detached = admin_log::detach_admin(&mut *conn, user_id).await?;
    user::delete(&mut *conn, user_id).await?;
    Ok(detached)
}

async fn delete_product_in_tx(conn: &mut SqliteConnection, product_id: i64) -> DbResult<()> {
    if product::fetch(&mut *conn, product_id).await?.is_none() {
        return Err(DbError::not_found(Entity::Product, product_id));
    }

    let items = product::count_order_items(&mut *conn, product_id).await?;
    if items > 0 {
        return Err(CoreError::ReferencedByOrderItems { product_id, items }.into());
    }

    product::delete(&mut *conn, product_id).await?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
