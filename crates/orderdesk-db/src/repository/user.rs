//! # User Repository
//!
//! Database operations for users. Deletion goes through
//! [`DeletionGuard::delete_user`](crate::consistency::deletion::DeletionGuard::delete_user).

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use orderdesk_core::validation::{
    validate_email, validate_required, MAX_NAME_LEN, MAX_ROLE_LEN,
};
use orderdesk_core::{Entity, NewUser, User, UserUpdate};

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Lists all users ordered by id.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, created_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Gets a user by id.
    ///
    /// ## Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - User not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        fetch(&self.pool, id).await
    }

    /// Checks whether a user exists.
    pub async fn exists(&self, id: i64) -> DbResult<bool> {
        exists(&self.pool, id).await
    }

    /// Inserts a new user.
    ///
    /// The credential must already be hashed by the auth layer.
    ///
    /// ## Returns
    /// * `Ok(User)` - Inserted user with its assigned id
    /// * `Err(DbError::ConstraintViolation)` - Email already exists
    pub async fn insert(&self, user: &NewUser) -> DbResult<User> {
        validate_profile(&user.name, &user.email, &user.role)?;
        validate_required("password_hash", &user.password_hash, MAX_NAME_LEN)?;

        debug!(email = %user.email, "Inserting user");

        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, name, email, password_hash, role, created_at
            "#,
        )
        .bind(user.name.trim())
        .bind(user.email.trim())
        .bind(&user.password_hash)
        .bind(user.role.trim())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        info!(user_id = created.id, "User created");
        Ok(created)
    }

    /// Updates a user's profile. The credential and creation time are kept.
    ///
    /// ## Returns
    /// * `Ok(User)` - Updated user
    /// * `Err(DbError::NotFound)` - User doesn't exist
    /// * `Err(DbError::ConstraintViolation)` - Email taken by another user
    pub async fn update(&self, id: i64, update: &UserUpdate) -> DbResult<User> {
        validate_profile(&update.name, &update.email, &update.role)?;

        debug!(user_id = id, "Updating user");

        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = ?2,
                email = ?3,
                role = ?4
            WHERE id = ?1
            RETURNING id, name, email, password_hash, role, created_at
            "#,
        )
        .bind(id)
        .bind(update.name.trim())
        .bind(update.email.trim())
        .bind(update.role.trim())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found(Entity::User, id))
    }
}

fn validate_profile(name: &str, email: &str, role: &str) -> DbResult<()> {
    validate_required("name", name, MAX_NAME_LEN)?;
    validate_email(email)?;
    validate_required("role", role, MAX_ROLE_LEN)?;
    Ok(())
}

// =============================================================================
// Executor-level Operations
// =============================================================================

pub(crate) async fn fetch<'e, E>(executor: E, id: i64) -> DbResult<Option<User>>
where
    E: SqliteExecutor<'e>,
{
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password_hash, role, created_at
        FROM users
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}

pub(crate) async fn exists<'e, E>(executor: E, id: i64) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)")
        .bind(id)
        .fetch_one(executor)
        .await?;

    Ok(found != 0)
}

/// Number of orders owned by the user.
pub(crate) async fn count_orders<'e, E>(executor: E, user_id: i64) -> DbResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = ?1")
        .bind(user_id)
        .fetch_one(executor)
        .await?;

    Ok(count)
}

/// Deletes the user row. Returns the number of rows removed.
pub(crate) async fn delete<'e, E>(executor: E, id: i64) -> DbResult<u64>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM users WHERE id = ?1")
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
    use crate::test_support::{new_user, test_db};
    use orderdesk_core::UserUpdate;

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;

        let user = db.users().insert(&new_user("ada@example.com", "admin")).await.unwrap();
        assert!(user.id > 0);

        let fetched = db.users().get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(fetched, user);
        assert!(db.users().exists(user.id).await.unwrap());
        assert!(!db.users().exists(user.id + 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_constraint_violation() {
        let db = test_db().await;
        db.users().insert(&new_user("dup@example.com", "customer")).await.unwrap();

        let err = db
            .users()
            .insert(&new_user("dup@example.com", "customer"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
    }

    #[tokio::test]
    async fn test_invalid_email_is_rejected_before_insert() {
        let db = test_db().await;

        let err = db.users().insert(&new_user("not-an-email", "customer")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(db.users().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_credential() {
        let db = test_db().await;
        let user = db.users().insert(&new_user("grace@example.com", "customer")).await.unwrap();

        let updated = db
            .users()
            .update(
                user.id,
                &UserUpdate {
                    name: "Grace H".to_string(),
                    email: "grace.h@example.com".to_string(),
                    role: "admin".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Grace H");
        assert_eq!(updated.role, "admin");
        assert_eq!(updated.password_hash, user.password_hash);
        assert_eq!(updated.created_at, user.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let db = test_db().await;
        let err = db
            .users()
            .update(
                99,
                &UserUpdate {
                    name: "Nobody".to_string(),
                    email: "nobody@example.com".to_string(),
                    role: "customer".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_id() {
        let db = test_db().await;
        for email in ["c@example.com", "a@example.com", "b@example.com"] {
            db.users().insert(&new_user(email, "customer")).await.unwrap();
        }

        let ids: Vec<i64> = db.users().list().await.unwrap().iter().map(|u| u.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
        assert_eq!(ids.len(), 3);
    }
}
