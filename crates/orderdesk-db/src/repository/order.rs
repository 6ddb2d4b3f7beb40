//! # Order Repository
//!
//! Database operations for orders.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert(NewOrder)     total 0.00, status "pending" unless given         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  line items added/changed/removed (LineItemService) → total moves       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  update_status("shipped", ...)     user, total, created_at unchanged    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DeletionGuard::delete_order       refused while payments exist         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};

use crate::error::{map_foreign_key, DbError, DbResult};
use crate::repository::{order_item, payment};
use orderdesk_core::validation::{validate_required, MAX_STATUS_LEN};
use orderdesk_core::{CoreError, Entity, NewOrder, Order, OrderDetail, DEFAULT_ORDER_STATUS};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Lists all orders ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, total_price_cents, status, version, created_at
            FROM orders
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Gets an order by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Order>> {
        fetch(&self.pool, id).await
    }

    /// Gets an order with its items and payments, each ordered by id.
    ///
    /// All three reads share one transaction, so they see the same snapshot:
    /// the order total always matches the returned items.
    pub async fn get_detail(&self, id: i64) -> DbResult<OrderDetail> {
        let mut tx = self.pool.begin().await?;

        let order = fetch(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::not_found(Entity::Order, id))?;
        let items = order_item::list_for_order(&mut *tx, id).await?;
        let payments = payment::list_for_order(&mut *tx, id).await?;

        tx.commit().await?;

        debug!(
            order_id = id,
            items = items.len(),
            payments = payments.len(),
            "Loaded order detail"
        );

        Ok(OrderDetail {
            order,
            items,
            payments,
        })
    }

    /// Creates an order for an existing user with a 0.00 total.
    ///
    /// ## Returns
    /// * `Ok(Order)` - Created order
    /// * `Err(CoreError::UnknownUser)` - User doesn't exist
    pub async fn insert(&self, order: &NewOrder) -> DbResult<Order> {
        let status = order
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ORDER_STATUS);
        validate_required("status", status, MAX_STATUS_LEN)?;

        debug!(user_id = order.user_id, status = %status, "Inserting order");

        let created = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (user_id, total_price_cents, status, version, created_at)
            VALUES (?1, 0, ?2, 0, ?3)
            RETURNING id, user_id, total_price_cents, status, version, created_at
            "#,
        )
        .bind(order.user_id)
        .bind(status)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_foreign_key(
                e,
                CoreError::UnknownUser {
                    user_id: order.user_id,
                },
            )
        })?;

        info!(order_id = created.id, user_id = created.user_id, "Order created");
        Ok(created)
    }

    /// Changes an order's status label.
    ///
    /// ## Returns
    /// * `Ok(Order)` - Updated order
    /// * `Err(DbError::NotFound)` - Order doesn't exist
    pub async fn update_status(&self, id: i64, status: &str) -> DbResult<Order> {
        validate_required("status", status, MAX_STATUS_LEN)?;

        debug!(order_id = id, status = %status, "Updating order status");

        sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET
                status = ?2,
                version = version + 1
            WHERE id = ?1
            RETURNING id, user_id, total_price_cents, status, version, created_at
            "#,
        )
        .bind(id)
        .bind(status.trim())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found(Entity::Order, id))
    }
}

// =============================================================================
// Executor-level Operations
// =============================================================================

pub(crate) async fn fetch<'e, E>(executor: E, id: i64) -> DbResult<Option<Order>>
where
    E: SqliteExecutor<'e>,
{
    let order = sqlx::query_as::<_, Order>(
        r#"
        SELECT id, user_id, total_price_cents, status, version, created_at
        FROM orders
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(order)
}

pub(crate) async fn exists<'e, E>(executor: E, id: i64) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE id = ?1)")
        .bind(id)
        .fetch_one(executor)
        .await?;

    Ok(found != 0)
}

/// Number of payments recorded against the order.
pub(crate) async fn count_payments<'e, E>(executor: E, order_id: i64) -> DbResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE order_id = ?1")
        .bind(order_id)
        .fetch_one(executor)
        .await?;

    Ok(count)
}

/// Deletes the order row; its items go with it (ON DELETE CASCADE).
pub(crate) async fn delete<'e, E>(executor: E, id: i64) -> DbResult<u64>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::test_support::{seed_order, seed_product, seed_user, test_db};
    use orderdesk_core::{NewOrder, NewOrderItem, NewPayment};

    #[tokio::test]
    async fn test_new_order_opens_at_zero_pending() {
        let db = test_db().await;
        let user = seed_user(&db, "buyer@example.com").await;

        let order = seed_order(&db, user.id).await;

        assert_eq!(order.user_id, user.id);
        assert_eq!(order.total_price().to_string(), "0.00");
        assert_eq!(order.status, "pending");
    }

    #[tokio::test]
    async fn test_explicit_status_is_kept() {
        let db = test_db().await;
        let user = seed_user(&db, "buyer@example.com").await;

        let order = db
            .orders()
            .insert(&NewOrder {
                user_id: user.id,
                status: Some("draft".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(order.status, "draft");
    }

    #[tokio::test]
    async fn test_unknown_user_reports_not_found() {
        let db = test_db().await;

        let err = db
            .orders()
            .insert(&NewOrder {
                user_id: 404,
                status: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(db.orders().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status_keeps_total_and_owner() {
        let db = test_db().await;
        let user = seed_user(&db, "buyer@example.com").await;
        let product = seed_product(&db, 1999, 10).await;
        let order = seed_order(&db, user.id).await;
        db.line_items()
            .create_line_item(NewOrderItem {
                order_id: order.id,
                product_id: product.id,
                quantity: 2,
            })
            .await
            .unwrap();

        let updated = db.orders().update_status(order.id, "shipped").await.unwrap();

        assert_eq!(updated.status, "shipped");
        assert_eq!(updated.user_id, user.id);
        assert_eq!(updated.total_price_cents, 3998);
        assert_eq!(updated.created_at, order.created_at);
    }

    #[tokio::test]
    async fn test_update_status_missing_order() {
        let db = test_db().await;
        let err = db.orders().update_status(1, "shipped").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    /// Repeated reads with no writes in between serialize identically.
    #[tokio::test]
    async fn test_get_detail_is_idempotent() {
        let db = test_db().await;
        let user = seed_user(&db, "buyer@example.com").await;
        let mug = seed_product(&db, 1999, 10).await;
        let pen = seed_product(&db, 250, 100).await;
        let order = seed_order(&db, user.id).await;

        for (product_id, quantity) in [(mug.id, 3), (pen.id, 4)] {
            db.line_items()
                .create_line_item(NewOrderItem {
                    order_id: order.id,
                    product_id,
                    quantity,
                })
                .await
                .unwrap();
        }
        db.payments()
            .insert(&NewPayment {
                order_id: order.id,
                payment_method: "card".to_string(),
                payment_status: None,
                transaction_id: Some("tx-1".to_string()),
            })
            .await
            .unwrap();

        let first = db.orders().get_detail(order.id).await.unwrap();
        let second = db.orders().get_detail(order.id).await.unwrap();

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.payments.len(), 1);
        assert_eq!(Some(first.order.total_price()), first.items_total());
        assert_eq!(first.order.total_price().to_string(), "69.97");
        assert!(first.items.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_get_detail_missing_order() {
        let db = test_db().await;
        let err = db.orders().get_detail(7).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
