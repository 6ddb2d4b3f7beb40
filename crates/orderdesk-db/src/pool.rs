//! # Database Pool Management
//!
//! Connection pool creation, repository access and the transaction runner.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  DbConfig::from_env() / DbConfig::new(path)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ├── db.products(), db.orders(), ...   plain reads and writes     │
//! │       │                                                                 │
//! │       └── db.transactionally(|conn| ...)    one SQLite transaction,    │
//! │                                             retried on BUSY/LOCKED     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled: readers don't block the
//! writer, and the writer doesn't block readers. Writers still serialize;
//! a writer that loses the race sees `SQLITE_BUSY` and is retried.

use backoff::backoff::Backoff;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePoolOptions,
    SqliteSynchronous,
};
use sqlx::SqlitePool;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::config::{DbConfig, RetryPolicy};
use crate::consistency::deletion::DeletionGuard;
use crate::consistency::inventory::InventoryLedger;
use crate::consistency::line_items::LineItemService;
use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::admin_log::AdminLogRepository;
use crate::repository::order::OrderRepository;
use crate::repository::order_item::OrderItemRepository;
use crate::repository::payment::PaymentRepository;
use crate::repository::product::ProductRepository;
use crate::repository::user::UserRepository;

/// Future returned by a unit of work passed to [`Database::transactionally`].
pub type TxFuture<'c, T> = Pin<Box<dyn Future<Output = DbResult<T>> + Send + 'c>>;

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// Cheap to clone: clones share the pool.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::from_env()?).await?;
///
/// let item = db.line_items().create_line_item(NewOrderItem {
///     order_id: 1,
///     product_id: 1,
///     quantity: 3,
/// }).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,

    /// Backoff applied by `transactionally` to transient failures.
    retry: RetryPolicy,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite:
    ///    - WAL mode for concurrent reads
    ///    - NORMAL synchronous (balance of safety/speed)
    ///    - Foreign keys enabled (the referential policy depends on them)
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = DbConfig::new("./orderdesk.db");
    /// let db = Database::new(config).await?;
    /// ```
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        // sqlite://path?mode=rwc creates the file if it does not exist
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // SQLite has them disabled by default for backwards compatibility
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            max_retries = config.retry.max_retries,
            "Database pool created"
        );

        let db = Database {
            pool,
            retry: config.retry,
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations. Called by `new()` unless disabled.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    ///
    /// For diagnostics and tests. Stock and order totals must never be
    /// written through it.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the retry policy in effect.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Runs `work` inside one SQLite transaction.
    ///
    /// ## Semantics
    /// ```text
    /// BEGIN
    ///   work(conn) ──Ok(v)──► COMMIT ──► Ok(v)
    ///        │
    ///        └──Err(e)──────► ROLLBACK ──► Err(e)
    ///
    /// e.is_transient() (BUSY, LOCKED, pool timeout)?
    ///   └── sleep(next backoff) and run `work` again,
    ///       up to retry.max_retries times, then StoreUnavailable
    /// ```
    ///
    /// `work` may run more than once, so it must not have effects outside
    /// `conn`. Domain errors (stock, versions, guards) are never retried here.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let item = db
    ///     .transactionally(move |conn| Box::pin(create_in_tx(conn, input)))
    ///     .await?;
    /// ```
    pub async fn transactionally<T, F>(&self, mut work: F) -> DbResult<T>
    where
        T: Send,
        F: for<'c> FnMut(&'c mut SqliteConnection) -> TxFuture<'c, T> + Send,
    {
        let mut attempt: u32 = 0;
        let mut backoff = self.retry.backoff();

        loop {
            let err = match self.run_once(&mut work).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_transient() {
                return Err(err);
            }

            if attempt >= self.retry.max_retries {
                warn!(attempts = attempt + 1, error = %err, "Store retries exhausted");
                return Err(DbError::StoreUnavailable {
                    attempts: attempt + 1,
                    message: err.to_string(),
                });
            }

            let delay = backoff.next_backoff().unwrap_or(self.retry.max_delay);
            warn!(
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Transient store failure, retrying transaction"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn run_once<T, F>(&self, work: &mut F) -> DbResult<T>
    where
        T: Send,
        F: for<'c> FnMut(&'c mut SqliteConnection) -> TxFuture<'c, T> + Send,
    {
        let mut tx = self.pool.begin().await?;

        let outcome = work(&mut *tx).await;

        match outcome {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    // =========================================================================
    // Repositories and Services
    // =========================================================================

    /// Returns the user repository.
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Returns the product repository.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Returns the order repository.
    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    /// Returns the read-only order item repository.
    ///
    /// Line items are created, changed and deleted through [`Self::line_items`].
    pub fn order_items(&self) -> OrderItemRepository {
        OrderItemRepository::new(self.pool.clone())
    }

    /// Returns the payment repository.
    pub fn payments(&self) -> PaymentRepository {
        PaymentRepository::new(self.pool.clone())
    }

    /// Returns the admin log repository.
    pub fn admin_logs(&self) -> AdminLogRepository {
        AdminLogRepository::new(self.pool.clone())
    }

    /// Returns the line item service (create/update/delete with stock and
    /// total bookkeeping).
    pub fn line_items(&self) -> LineItemService {
        LineItemService::new(self.clone())
    }

    /// Returns the deletion guard for orders, users and products.
    pub fn deletions(&self) -> DeletionGuard {
        DeletionGuard::new(self.clone())
    }

    /// Returns the inventory ledger (restocking and stock reads).
    pub fn inventory(&self) -> InventoryLedger {
        InventoryLedger::new(self.clone())
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all repository operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
