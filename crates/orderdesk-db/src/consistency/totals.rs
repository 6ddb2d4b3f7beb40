//! # Order Total Accumulator
//!
//! Adds signed line amounts to `orders.total_price_cents` inside the
//! caller's transaction, using `orderdesk_core::totals::apply` for the
//! arithmetic and a version-guarded write.

use sqlx::SqliteConnection;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::repository::order;
use orderdesk_core::totals as rules;
use orderdesk_core::{CoreError, Entity, Money, Order};

/// Adds `amount` (possibly negative) to the order's total.
///
/// ## Returns
/// * `Ok(Order)` - The order with its new total
/// * `Err(CoreError::UnknownOrder)` - Order doesn't exist
/// * `Err(ConcurrentModification)` - Order row changed since it was read
/// * `Err(Validation)` - The new total doesn't fit in `i64` cents
pub(crate) async fn apply(
    conn: &mut SqliteConnection,
    order_id: i64,
    amount: Money,
) -> DbResult<Order> {
    let current = order::fetch(&mut *conn, order_id)
        .await?
        .ok_or(CoreError::UnknownOrder { order_id })?;

    if amount.is_zero() {
        return Ok(current);
    }

    let adjustment = rules::apply(current.total_price(), amount)?;
    if adjustment.floored {
        warn!(
            order_id,
            total = %current.total_price(),
            amount = %amount,
            "Order total would go below zero, flooring at 0.00"
        );
    }

    debug!(
        order_id,
        from = %current.total_price(),
        to = %adjustment.total,
        version = current.version,
        "Writing order total"
    );

    sqlx::query_as::<_, Order>(
        r#"
        UPDATE orders SET
            total_price_cents = ?2,
            version = version + 1
        WHERE id = ?1 AND version = ?3
        RETURNING id, user_id, total_price_cents, status, version, created_at
        "#,
    )
    .bind(order_id)
    .bind(adjustment.total.cents())
    .bind(current.version)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::concurrent(Entity::Order, order_id))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_support::{seed_order, seed_user, test_db, total_of};

    #[tokio::test]
    async fn test_apply_positive_and_negative() {
        let db = test_db().await;
        let user = seed_user(&db, "buyer@example.com").await;
        let order_id = seed_order(&db, user.id).await.id;

        let order = db
            .transactionally(move |conn| {
                Box::pin(apply(conn, order_id, Money::from_cents(5997)))
            })
            .await
            .unwrap();
        assert_eq!(order.total_price().to_string(), "59.97");

        db.transactionally(move |conn| Box::pin(apply(conn, order_id, Money::from_cents(-1999))))
            .await
            .unwrap();
        assert_eq!(total_of(&db, order_id).await, 3998);
    }

    #[tokio::test]
    async fn test_floor_at_zero() {
        let db = test_db().await;
        let user = seed_user(&db, "buyer@example.com").await;
        let order_id = seed_order(&db, user.id).await.id;

        let order = db
            .transactionally(move |conn| Box::pin(apply(conn, order_id, Money::from_cents(-500))))
            .await
            .unwrap();
        assert_eq!(order.total_price_cents, 0);
    }

    #[tokio::test]
    async fn test_overflowing_total_is_rejected() {
        let db = test_db().await;
        let user = seed_user(&db, "buyer@example.com").await;
        let order_id = seed_order(&db, user.id).await.id;

        db.transactionally(move |conn| Box::pin(apply(conn, order_id, Money::from_cents(i64::MAX))))
            .await
            .unwrap();
        let err = db
            .transactionally(move |conn| Box::pin(apply(conn, order_id, Money::from_cents(1))))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(total_of(&db, order_id).await, i64::MAX);
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let db = test_db().await;
        let err = db
            .transactionally(|conn| Box::pin(apply(conn, 31, Money::from_cents(100))))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownOrder);
    }
}
