//! # Payment Repository
//!
//! Database operations for payments.
//!
//! Transaction ids are unique when present. Blank ids are stored as NULL,
//! and any number of payments may have no id.

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};

use crate::error::{map_foreign_key, DbError, DbResult};
use crate::repository::order;
use orderdesk_core::validation::{
    normalize_transaction_id, validate_required, MAX_PAYMENT_METHOD_LEN, MAX_STATUS_LEN,
};
use orderdesk_core::{CoreError, Entity, NewPayment, Payment, PaymentUpdate, DEFAULT_PAYMENT_STATUS};

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Lists all payments ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, order_id, payment_method, payment_status, transaction_id, created_at
            FROM payments
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Gets a payment by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, order_id, payment_method, payment_status, transaction_id, created_at
            FROM payments
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Lists the payments of one order, ordered by id.
    ///
    /// ## Returns
    /// * `Err(CoreError::UnknownOrder)` - Order doesn't exist
    pub async fn list_for_order(&self, order_id: i64) -> DbResult<Vec<Payment>> {
        let mut tx = self.pool.begin().await?;

        if !order::exists(&mut *tx, order_id).await? {
            return Err(CoreError::UnknownOrder { order_id }.into());
        }
        let payments = list_for_order(&mut *tx, order_id).await?;

        tx.commit().await?;
        Ok(payments)
    }

    /// Records a payment against an existing order.
    ///
    /// ## Returns
    /// * `Ok(Payment)` - Recorded payment
    /// * `Err(CoreError::UnknownOrder)` - Order doesn't exist
    /// * `Err(DbError::ConstraintViolation)` - Transaction id already used
    pub async fn insert(&self, payment: &NewPayment) -> DbResult<Payment> {
        validate_required("payment_method", &payment.payment_method, MAX_PAYMENT_METHOD_LEN)?;
        let status = payment
            .payment_status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_PAYMENT_STATUS);
        validate_required("payment_status", status, MAX_STATUS_LEN)?;
        let transaction_id = normalize_transaction_id(payment.transaction_id.as_deref())?;

        debug!(order_id = payment.order_id, "Inserting payment");

        let created = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (order_id, payment_method, payment_status, transaction_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, order_id, payment_method, payment_status, transaction_id, created_at
            "#,
        )
        .bind(payment.order_id)
        .bind(payment.payment_method.trim())
        .bind(status)
        .bind(transaction_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_foreign_key(
                e,
                CoreError::UnknownOrder {
                    order_id: payment.order_id,
                },
            )
        })?;

        info!(
            payment_id = created.id,
            order_id = created.order_id,
            "Payment recorded"
        );
        Ok(created)
    }

    /// Updates method, status and transaction id. The order reference is fixed.
    pub async fn update(&self, id: i64, update: &PaymentUpdate) -> DbResult<Payment> {
        validate_required("payment_method", &update.payment_method, MAX_PAYMENT_METHOD_LEN)?;
        validate_required("payment_status", &update.payment_status, MAX_STATUS_LEN)?;
        let transaction_id = normalize_transaction_id(update.transaction_id.as_deref())?;

        debug!(payment_id = id, "Updating payment");

        sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments SET
                payment_method = ?2,
                payment_status = ?3,
                transaction_id = ?4
            WHERE id = ?1
            RETURNING id, order_id, payment_method, payment_status, transaction_id, created_at
            "#,
        )
        .bind(id)
        .bind(update.payment_method.trim())
        .bind(update.payment_status.trim())
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found(Entity::Payment, id))
    }

    /// Deletes a payment.
    ///
    /// Once an order's last payment is gone the order itself may be deleted.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM payments WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(Entity::Payment, id));
        }

        info!(payment_id = id, "Payment deleted");
        Ok(())
    }
}

// =============================================================================
// Executor-level Operations
// =============================================================================

pub(crate) async fn list_for_order<'e, E>(executor: E, order_id: i64) -> DbResult<Vec<Payment>>
where
    E: SqliteExecutor<'e>,
{
    let payments = sqlx::query_as::<_, Payment>(
        r#"
        SELECT id, order_id, payment_method, payment_status, transaction_id, created_at
        FROM payments
        WHERE order_id = ?1
        ORDER BY id
        "#,
    )
    .bind(order_id)
    .fetch_all(executor)
    .await?;

    Ok(payments)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::test_support::{seed_order, seed_user, test_db};
    use orderdesk_core::{NewPayment, PaymentUpdate};

    fn card(order_id: i64, transaction_id: Option<&str>) -> NewPayment {
        NewPayment {
            order_id,
            payment_method: "card".to_string(),
            payment_status: None,
            transaction_id: transaction_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_insert_defaults_to_pending() {
        let db = test_db().await;
        let user = seed_user(&db, "payer@example.com").await;
        let order = seed_order(&db, user.id).await;

        let payment = db.payments().insert(&card(order.id, Some("tx-1"))).await.unwrap();

        assert_eq!(payment.payment_status, "pending");
        assert_eq!(payment.transaction_id.as_deref(), Some("tx-1"));
        assert_eq!(db.payments().get_by_id(payment.id).await.unwrap(), Some(payment));
    }

    #[tokio::test]
    async fn test_list_for_order_filters_and_orders() {
        let db = test_db().await;
        let user = seed_user(&db, "payer@example.com").await;
        let first = seed_order(&db, user.id).await;
        let second = seed_order(&db, user.id).await;

        let a = db.payments().insert(&card(first.id, Some("tx-a"))).await.unwrap();
        db.payments().insert(&card(second.id, Some("tx-b"))).await.unwrap();
        let c = db.payments().insert(&card(first.id, None)).await.unwrap();

        let payments = db.payments().list_for_order(first.id).await.unwrap();
        assert_eq!(payments, vec![a, c]);

        let empty = seed_order(&db, user.id).await;
        assert!(db.payments().list_for_order(empty.id).await.unwrap().is_empty());

        let err = db.payments().list_for_order(404).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownOrder);
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let db = test_db().await;

        let err = db.payments().insert(&card(77, None)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownOrder);
    }

    #[tokio::test]
    async fn test_transaction_id_unique_when_present() {
        let db = test_db().await;
        let user = seed_user(&db, "payer@example.com").await;
        let order = seed_order(&db, user.id).await;

        db.payments().insert(&card(order.id, Some("tx-9"))).await.unwrap();
        let err = db.payments().insert(&card(order.id, Some("tx-9"))).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
    }

    #[tokio::test]
    async fn test_missing_and_blank_transaction_ids_never_collide() {
        let db = test_db().await;
        let user = seed_user(&db, "payer@example.com").await;
        let order = seed_order(&db, user.id).await;

        db.payments().insert(&card(order.id, None)).await.unwrap();
        db.payments().insert(&card(order.id, None)).await.unwrap();
        let blank = db.payments().insert(&card(order.id, Some("  "))).await.unwrap();

        assert_eq!(blank.transaction_id, None);
        assert_eq!(db.payments().list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = test_db().await;
        let user = seed_user(&db, "payer@example.com").await;
        let order = seed_order(&db, user.id).await;
        let payment = db.payments().insert(&card(order.id, None)).await.unwrap();

        let updated = db
            .payments()
            .update(
                payment.id,
                &PaymentUpdate {
                    payment_method: "bank_transfer".to_string(),
                    payment_status: "completed".to_string(),
                    transaction_id: Some("tx-42".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.order_id, order.id);
        assert_eq!(updated.payment_status, "completed");

        db.payments().delete(payment.id).await.unwrap();
        let err = db.payments().delete(payment.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
