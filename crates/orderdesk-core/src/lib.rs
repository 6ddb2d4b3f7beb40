//! # orderdesk-core: Pure Domain Rules for OrderDesk
//!
//! This crate holds the entity types and the arithmetic that keeps product
//! stock and order totals consistent with line items. It has zero I/O
//! dependencies; `orderdesk-db` applies these rules inside store transactions.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        OrderDesk Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Request layer (HTTP, auth) - external              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │      orderdesk-db: LineItemService, DeletionGuard, repos        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ orderdesk-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ inventory │  │  totals   │  │   │
//! │  │   │  Product  │  │   Money   │  │  reserve  │  │   apply   │  │   │
//! │  │   │   Order   │  │           │  │  release  │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entity types (User, Product, Order, OrderItem, Payment, AdminLog)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`inventory`] - Stock reservation rules
//! - [`totals`] - Order total accumulation rules
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use orderdesk_core::money::Money;
//! use orderdesk_core::{inventory, totals};
//!
//! let price = Money::from_cents(1999); // 19.99
//!
//! // Reserve 3 units out of 10
//! let stock = inventory::reserve(1, 10, 3).unwrap();
//! assert_eq!(stock, 7);
//!
//! // Add the line amount to a fresh order
//! let amount = totals::line_amount(price, 3).unwrap();
//! let adjustment = totals::apply(Money::zero(), amount).unwrap();
//! assert_eq!(adjustment.total.cents(), 5997);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod inventory;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Status assigned to an order when the caller does not supply one.
pub const DEFAULT_ORDER_STATUS: &str = "pending";

/// Status assigned to a payment when the caller does not supply one.
pub const DEFAULT_PAYMENT_STATUS: &str = "pending";
