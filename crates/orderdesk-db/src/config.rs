//! # Store Configuration
//!
//! Pool settings and the retry policy for transient store failures.
//!
//! Configuration is built in code with the [`DbConfig`] builder or loaded from
//! environment variables with fallback to defaults:
//!
//! | Variable                             | Default          |
//! |--------------------------------------|------------------|
//! | `ORDERDESK_DATABASE_PATH`            | `./orderdesk.db` |
//! | `ORDERDESK_MAX_CONNECTIONS`          | `5`              |
//! | `ORDERDESK_CONNECT_TIMEOUT_SECS`     | `30`             |
//! | `ORDERDESK_STORE_MAX_RETRIES`        | `5`              |
//! | `ORDERDESK_STORE_RETRY_MAX_DELAY_MS` | `30000`          |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};

pub const ENV_DATABASE_PATH: &str = "ORDERDESK_DATABASE_PATH";
pub const ENV_MAX_CONNECTIONS: &str = "ORDERDESK_MAX_CONNECTIONS";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "ORDERDESK_CONNECT_TIMEOUT_SECS";
pub const ENV_STORE_MAX_RETRIES: &str = "ORDERDESK_STORE_MAX_RETRIES";
pub const ENV_STORE_RETRY_MAX_DELAY_MS: &str = "ORDERDESK_STORE_RETRY_MAX_DELAY_MS";

// =============================================================================
// Retry Policy
// =============================================================================

/// Bounded exponential backoff for transient store failures.
///
/// ## Schedule (defaults)
/// ```text
/// attempt 0 fails ──► sleep  50ms
/// attempt 1 fails ──► sleep 100ms
/// attempt 2 fails ──► sleep 200ms
/// attempt 3 fails ──► sleep 400ms
/// attempt 4 fails ──► sleep 800ms
/// attempt 5 fails ──► StoreUnavailable { attempts: 6 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: u32,
    pub base_delay: Duration,
    /// Upper bound on any single backoff sleep.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 5,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        RetryPolicy {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Backoff schedule for one `transactionally` call: starts at
    /// `base_delay`, doubles, and never sleeps longer than `max_delay`.
    /// The retry count is bounded by `max_retries`, not by elapsed time.
    ///
    /// ## Example
    /// ```rust
    /// use backoff::backoff::Backoff;
    /// use orderdesk_db::RetryPolicy;
    ///
    /// let mut backoff = RetryPolicy::default().backoff();
    /// let first = backoff.next_backoff().map(|d| d.as_millis());
    /// let second = backoff.next_backoff().map(|d| d.as_millis());
    /// assert_eq!(first, Some(50));
    /// assert_eq!(second, Some(100));
    /// ```
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.base_delay)
            .with_max_interval(self.max_delay)
            .with_multiplier(2.0)
            .with_randomization_factor(0.0)
            .with_max_elapsed_time(None) // bounded by max_retries instead
            .build()
    }
}

// =============================================================================
// Database Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/orderdesk.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection acquire timeout.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,

    /// Retry policy for transactions hitting transient failures.
    pub retry: RetryPolicy,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// ## Arguments
    /// * `path` - Path to the SQLite database file. Will be created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Sets the retry policy.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let config = DbConfig::in_memory();
    /// let db = Database::new(config).await?;
    /// // Database is isolated, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
            retry: RetryPolicy::default(),
        }
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns a variable's value
    /// or `None` when unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = DbConfig::new("./orderdesk.db");

        let database_path = lookup(ENV_DATABASE_PATH)
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| defaults.database_path.clone());

        let max_connections: u32 = parse_var(&lookup, ENV_MAX_CONNECTIONS, 5)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue(ENV_MAX_CONNECTIONS.to_string()));
        }

        let connect_timeout_secs: u64 = parse_var(&lookup, ENV_CONNECT_TIMEOUT_SECS, 30)?;
        let max_retries: u32 = parse_var(&lookup, ENV_STORE_MAX_RETRIES, 5)?;
        let max_delay_ms: u64 = parse_var(&lookup, ENV_STORE_RETRY_MAX_DELAY_MS, 30_000)?;

        Ok(DbConfig {
            database_path,
            max_connections,
            min_connections: defaults.min_connections.min(max_connections),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            retry: RetryPolicy {
                max_retries,
                max_delay: Duration::from_millis(max_delay_ms),
                ..RetryPolicy::default()
            },
            ..defaults
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

// =============================================================================
// Unit Tests
// =============================================================================
