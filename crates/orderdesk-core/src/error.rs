//! # Error Types
//!
//! Domain-specific error types for orderdesk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  orderdesk-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule rejections                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  orderdesk-db errors (separate crate)                                  │
//! │  └── DbError          - Store failures + Domain(CoreError)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ErrorKind → caller      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant carries the entity id (and for stock failures the available
//! quantity) so the caller can build a message without re-querying the store.

use thiserror::Error;

use crate::types::Entity;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule rejections raised by the consistency core and deletion guard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A line item or payment references an order that does not exist.
    #[error("Unknown order: {order_id}")]
    UnknownOrder { order_id: i64 },

    /// A line item references a product that does not exist.
    #[error("Unknown product: {product_id}")]
    UnknownProduct { product_id: i64 },

    /// An order or admin log references a user that does not exist.
    #[error("Unknown user: {user_id}")]
    UnknownUser { user_id: i64 },

    /// Not enough stock to reserve the requested quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Add line item (qty: 8)
    ///      │
    ///      ▼
    /// Check stock: available=7
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 1, available: 7, requested: 8 }
    ///      │
    ///      ▼
    /// Caller shows: "Only 7 in stock"
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// A line item's order or product reference cannot be changed after creation.
    #[error("Order item {item_id}: {field} cannot be changed once the item is created")]
    ImmutableReference { item_id: i64, field: &'static str },

    /// The record changed between read and write.
    #[error("{entity} {id} was modified concurrently")]
    ConcurrentModification { entity: Entity, id: i64 },

    /// An order with payments cannot be deleted.
    #[error("Order {order_id} has {payments} payment(s) and cannot be deleted")]
    HasDependentPayments { order_id: i64, payments: i64 },

    /// A user who owns orders cannot be deleted.
    #[error("User {user_id} owns {orders} order(s) and cannot be deleted")]
    HasDependentOrders { user_id: i64, orders: i64 },

    /// A product referenced by line items cannot be deleted.
    #[error("Product {product_id} is referenced by {items} order item(s) and cannot be deleted")]
    ReferencedByOrderItems { product_id: i64, items: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before any store call runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email or amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
