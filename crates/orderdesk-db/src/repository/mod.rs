//! # Repository Module
//!
//! Entity store repositories, one per table.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two Ways Into a Table                                │
//! │                                                                         │
//! │  Request layer                                                         │
//! │       │                                                                 │
//! │       │  db.products().get_by_id(1)                                    │
//! │       ▼                                                                 │
//! │  ProductRepository (pool-backed, one statement per call)               │
//! │  ├── list / get_by_id / exists                                         │
//! │  ├── insert / update                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │       ▲                                                                 │
//! │       │                                                                 │
//! │  product::fetch(&mut *conn, id)  (pub(crate), any SqliteExecutor)      │
//! │       ▲                                                                 │
//! │       │  inside db.transactionally(...)                                │
//! │  LineItemService / DeletionGuard / InventoryLedger                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories never write product stock or order totals; those columns
//! change only through the `consistency` module.
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository)
//! - [`ProductRepository`](product::ProductRepository)
//! - [`OrderRepository`](order::OrderRepository)
//! - [`OrderItemRepository`](order_item::OrderItemRepository) - reads only
//! - [`PaymentRepository`](payment::PaymentRepository)
//! - [`AdminLogRepository`](admin_log::AdminLogRepository)

pub mod admin_log;
pub mod order;
pub mod order_item;
pub mod payment;
pub mod product;
pub mod user;
