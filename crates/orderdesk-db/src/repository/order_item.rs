//! # Order Item Repository
//!
//! Reads over line items, plus the row-level writes the line item service
//! runs inside its transactions.
//!
//! The pool-backed repository is read-only on purpose: creating, changing or
//! deleting an item without the matching stock and total change would break
//! the order total. Those paths live in
//! [`LineItemService`](crate::consistency::line_items::LineItemService).

use chrono::Utc;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::order;
use orderdesk_core::{Entity, OrderItem};

/// Read-only repository for line items.
#[derive(Debug, Clone)]
pub struct OrderItemRepository {
    pool: SqlitePool,
}

impl OrderItemRepository {
    /// Creates a new OrderItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderItemRepository { pool }
    }

    /// Lists all line items ordered by id.
    pub async fn list(&self) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, quantity, price_cents, version, created_at
            FROM order_items
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets a line item by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<OrderItem>> {
        fetch(&self.pool, id).await
    }

    /// Lists the items of one order, ordered by id.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Order doesn't exist
    pub async fn list_for_order(&self, order_id: i64) -> DbResult<Vec<OrderItem>> {
        let mut tx = self.pool.begin().await?;

        if !order::exists(&mut *tx, order_id).await? {
            return Err(DbError::not_found(Entity::Order, order_id));
        }
        let items = list_for_order(&mut *tx, order_id).await?;

        tx.commit().await?;
        Ok(items)
    }
}

// =============================================================================
// Executor-level Operations
// =============================================================================

pub(crate) async fn fetch<'e, E>(executor: E, id: i64) -> DbResult<Option<OrderItem>>
where
    E: SqliteExecutor<'e>,
{
    let item = sqlx::query_as::<_, OrderItem>(
        r#"
        SELECT id, order_id, product_id, quantity, price_cents, version, created_at
        FROM order_items
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(item)
}

pub(crate) async fn list_for_order<'e, E>(executor: E, order_id: i64) -> DbResult<Vec<OrderItem>>
where
    E: SqliteExecutor<'e>,
{
    let items = sqlx::query_as::<_, OrderItem>(
        r#"
        SELECT id, order_id, product_id, quantity, price_cents, version, created_at
        FROM order_items
        WHERE order_id = ?1
        ORDER BY id
        "#,
    )
    .bind(order_id)
    .fetch_all(executor)
    .await?;

    Ok(items)
}

/// Inserts an item row with its price snapshot.
pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    order_id: i64,
    product_id: i64,
    quantity: i64,
    price_cents: i64,
) -> DbResult<OrderItem> {
    debug!(order_id, product_id, quantity, price_cents, "Inserting order item");

    let item = sqlx::query_as::<_, OrderItem>(
        r#"
        INSERT INTO order_items (order_id, product_id, quantity, price_cents, version, created_at)
        VALUES (?1, ?2, ?3, ?4, 0, ?5)
        RETURNING id, order_id, product_id, quantity, price_cents, version, created_at
        "#,
    )
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .bind(price_cents)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    Ok(item)
}

/// Writes a new quantity if the row is still at `expected_version`.
///
/// The price column is not part of the statement.
///
/// ## Returns
/// * `Ok(OrderItem)` - Updated row, version bumped
/// * `Err(ConcurrentModification)` - Row changed since it was read
pub(crate) async fn update_quantity(
    conn: &mut SqliteConnection,
    id: i64,
    quantity: i64,
    expected_version: i64,
) -> DbResult<OrderItem> {
    debug!(item_id = id, quantity, expected_version, "Updating order item quantity");

    sqlx::query_as::<_, OrderItem>(
        r#"
        UPDATE order_items SET
            quantity = ?2,
            version = version + 1
        WHERE id = ?1 AND version = ?3
        RETURNING id, order_id, product_id, quantity, price_cents, version, created_at
        "#,
    )
    .bind(id)
    .bind(quantity)
    .bind(expected_version)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::concurrent(Entity::OrderItem, id))
}

/// Deletes the item row if it is still at `expected_version`.
pub(crate) async fn delete(
    conn: &mut SqliteConnection,
    id: i64,
    expected_version: i64,
) -> DbResult<()> {
    let result = sqlx::query("DELETE FROM order_items WHERE id = ?1 AND version = ?2")
        .bind(id)
        .bind(expected_version)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::concurrent(Entity::OrderItem, id));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::test_support::{seed_order, seed_product, seed_user, test_db};
    use orderdesk_core::NewOrderItem;

    #[tokio::test]
    async fn test_list_for_order_filters_and_orders() {
        let db = test_db().await;
        let user = seed_user(&db, "buyer@example.com").await;
        let product = seed_product(&db, 500, 50).await;
        let first = seed_order(&db, user.id).await;
        let second = seed_order(&db, user.id).await;

        for (order_id, quantity) in [(first.id, 1), (second.id, 2), (first.id, 3)] {
            db.line_items()
                .create_line_item(NewOrderItem {
                    order_id,
                    product_id: product.id,
                    quantity,
                })
                .await
                .unwrap();
        }

        let items = db.order_items().list_for_order(first.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.order_id == first.id));
        assert!(items[0].id < items[1].id);

        assert_eq!(db.order_items().list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_list_for_missing_order() {
        let db = test_db().await;
        let err = db.order_items().list_for_order(5).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
