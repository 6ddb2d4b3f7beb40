//! # Admin Log Repository
//!
//! Audit entries written by administrators. An entry outlives its author:
//! deleting the admin user clears `admin_id` and keeps the entry.

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};

use crate::error::{map_foreign_key, DbError, DbResult};
use orderdesk_core::validation::validate_present;
use orderdesk_core::{AdminLog, CoreError, Entity, NewAdminLog};

/// Repository for admin log database operations.
#[derive(Debug, Clone)]
pub struct AdminLogRepository {
    pool: SqlitePool,
}

impl AdminLogRepository {
    /// Creates a new AdminLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AdminLogRepository { pool }
    }

    /// Lists all entries ordered by id.
    pub async fn list(&self) -> DbResult<Vec<AdminLog>> {
        let logs = sqlx::query_as::<_, AdminLog>(
            "SELECT id, admin_id, action, created_at FROM admin_logs ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    /// Gets an entry by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<AdminLog>> {
        let log = sqlx::query_as::<_, AdminLog>(
            "SELECT id, admin_id, action, created_at FROM admin_logs WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(log)
    }

    /// Lists the entries written by one admin, ordered by id.
    pub async fn list_for_admin(&self, admin_id: i64) -> DbResult<Vec<AdminLog>> {
        let logs = sqlx::query_as::<_, AdminLog>(
            r#"
            SELECT id, admin_id, action, created_at
            FROM admin_logs
            WHERE admin_id = ?1
            ORDER BY id
            "#,
        )
        .bind(admin_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    /// Writes an entry. A given `admin_id` must reference an existing user.
    pub async fn insert(&self, log: &NewAdminLog) -> DbResult<AdminLog> {
        validate_present("action", &log.action)?;

        debug!(admin_id = ?log.admin_id, "Inserting admin log");

        let created = sqlx::query_as::<_, AdminLog>(
            r#"
            INSERT INTO admin_logs (admin_id, action, created_at)
            VALUES (?1, ?2, ?3)
            RETURNING id, admin_id, action, created_at
            "#,
        )
        .bind(log.admin_id)
        .bind(log.action.trim())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_foreign_key(
                e,
                CoreError::UnknownUser {
                    user_id: log.admin_id.unwrap_or_default(),
                },
            )
        })?;

        Ok(created)
    }

    /// Deletes an entry.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM admin_logs WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(Entity::AdminLog, id));
        }

        info!(log_id = id, "Admin log deleted");
        Ok(())
    }
}

// =============================================================================
// Executor-level Operations
// =============================================================================

/// Clears `admin_id` on every entry written by `user_id`.
///
/// The schema's ON DELETE SET NULL does the same; running it explicitly
/// first lets the deletion guard report how many entries it detached.
pub(crate) async fn detach_admin<'e, E>(executor: E, user_id: i64) -> DbResult<u64>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE admin_logs SET admin_id = NULL WHERE admin_id = ?1")
        .bind(user_id)
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
    use crate::test_support::{seed_user, test_db};
    use orderdesk_core::NewAdminLog;

    #[tokio::test]
    async fn test_insert_and_list_for_admin() {
        let db = test_db().await;
        let admin = seed_user(&db, "root@example.com").await;
        let other = seed_user(&db, "ops@example.com").await;

        for (admin_id, action) in [
            (Some(admin.id), "Created product 1"),
            (Some(other.id), "Refunded order 3"),
            (None, "Nightly cleanup"),
            (Some(admin.id), "Changed price of product 1"),
        ] {
            db.admin_logs()
                .insert(&NewAdminLog {
                    admin_id,
                    action: action.to_string(),
                })
                .await
                .unwrap();
        }

        let mine = db.admin_logs().list_for_admin(admin.id).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine[0].id < mine[1].id);
        assert_eq!(db.admin_logs().list().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_admin_and_blank_action() {
        let db = test_db().await;

        let err = db
            .admin_logs()
            .insert(&NewAdminLog {
                admin_id: Some(12),
                action: "Something".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = db
            .admin_logs()
            .insert(&NewAdminLog {
                admin_id: None,
                action: "   ".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let log = db
            .admin_logs()
            .insert(&NewAdminLog {
                admin_id: None,
                action: "Rotated keys".to_string(),
            })
            .await
            .unwrap();

        db.admin_logs().delete(log.id).await.unwrap();
        assert!(db.admin_logs().get_by_id(log.id).await.unwrap().is_none());
        assert_eq!(
            db.admin_logs().delete(log.id).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
