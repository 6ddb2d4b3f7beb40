//! # orderdesk-db: Storage Layer for OrderDesk
//!
//! SQLite persistence for users, products, orders, line items, payments and
//! admin logs, plus the transactional services that keep stock and order
//! totals consistent with the line items.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        OrderDesk Data Flow                              │
//! │                                                                         │
//! │  Caller (HTTP handler, CLI, seed binary)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   orderdesk-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Consistency   │    │ Repositories │  │   │
//! │  │   │   (pool.rs)   │    │                │    │              │  │   │
//! │  │   │               │    │ LineItemService│    │ UserRepo     │  │   │
//! │  │   │ SqlitePool    │◄───│ DeletionGuard  │───►│ ProductRepo  │  │   │
//! │  │   │ transactionally│   │ InventoryLedger│    │ OrderRepo    │  │   │
//! │  │   │ retry policy  │    │ totals         │    │ PaymentRepo  │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │           SQLite (migrations/sqlite, embedded at build)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Connection settings, retry policy, environment loading
//! - [`pool`] - Connection pool and the transaction runner
//! - [`migrations`] - Embedded schema migrations
//! - [`error`] - Store error type and the stable error kinds
//! - [`repository`] - Plain reads and writes per table
//! - [`consistency`] - Line item, stock, total and deletion rules
//!
//! ## Usage
//!
//! ```rust,ignore
//! use orderdesk_db::{Database, DbConfig};
//! use orderdesk_core::NewOrderItem;
//!
//! let db = Database::new(DbConfig::new("orderdesk.db")).await?;
//!
//! let item = db.line_items().create_line_item(NewOrderItem {
//!     order_id: 1,
//!     product_id: 4,
//!     quantity: 3,
//! }).await?;
//!
//! let detail = db.orders().get_detail(item.order_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod consistency;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, DbConfig, RetryPolicy};
pub use error::{DbError, DbResult, ErrorKind, ErrorReport};
pub use pool::{Database, TxFuture};

pub use consistency::deletion::DeletionGuard;
pub use consistency::inventory::InventoryLedger;
pub use consistency::line_items::LineItemService;

// Repository re-exports for convenience
pub use repository::admin_log::AdminLogRepository;
pub use repository::order::OrderRepository;
pub use repository::order_item::OrderItemRepository;
pub use repository::payment::PaymentRepository;
pub use repository::product::ProductRepository;
pub use repository::user::UserRepository;
