//! # Consistency Module
//!
//! Every write to product stock and order totals, and the guarded deletes.
//!
//! ## One Transaction Per Line Item Mutation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LineItemService::create_line_item(order 1, product 1, qty 3)          │
//! │                                                                         │
//! │  db.transactionally(|conn| {                                           │
//! │      order exists?            ── else UnknownOrder                     │
//! │      product exists?          ── else UnknownProduct                   │
//! │      stock >= 3?              ── else InsufficientStock{available}     │
//! │      price = product.price    (snapshot)                               │
//! │      INSERT order_items       ┐                                        │
//! │      inventory::reserve       ├─ all three commit together             │
//! │      totals::apply(+price×3)  ┘  or none of them do                    │
//! │  })                                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock and total writes are compare-and-swap on the row's `version`, so a
//! lost update surfaces as `ConcurrentModification` instead of being
//! overwritten.
//!
//! ## Modules
//! - [`inventory`] - stock reservation and release inside a transaction,
//!   plus [`InventoryLedger`](inventory::InventoryLedger) for restocking
//! - [`totals`] - order total accumulation inside a transaction
//! - [`line_items`] - [`LineItemService`](line_items::LineItemService)
//! - [`deletion`] - [`DeletionGuard`](deletion::DeletionGuard)

pub mod deletion;
pub mod inventory;
pub mod line_items;
pub mod totals;
