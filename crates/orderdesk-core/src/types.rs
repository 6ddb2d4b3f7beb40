//! # Domain Types
//!
//! Entity rows and the inputs that create or change them.
//!
//! ## Entity Graph
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Entities                                        │
//! │                                                                         │
//! │  User ──owns──► Order ──owns──► OrderItem ◄──references── Product       │
//! │   │               │                                                     │
//! │   │               └──owns──► Payment                                    │
//! │   │                                                                     │
//! │   └─(nullable)── AdminLog                                               │
//! │                                                                         │
//! │  Every arrow is an id, never an owning pointer. Navigation goes        │
//! │  through the store: order → items is `list_for_order(order.id)`.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are positive integers assigned by the store on insert.
//! `version` columns back the optimistic concurrency checks on the three
//! mutable counters: product stock, order total and line item quantity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Entity Kind
// =============================================================================

/// Names an entity type in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    User,
    Product,
    Order,
    OrderItem,
    Payment,
    AdminLog,
}

impl Entity {
    /// Human-readable name, e.g. `"order item"`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Entity::User => "user",
            Entity::Product => "product",
            Entity::Order => "order",
            Entity::OrderItem => "order item",
            Entity::Payment => "payment",
            Entity::AdminLog => "admin log",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// User
// =============================================================================

/// A customer or administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Globally unique.
    pub email: String,
    /// Opaque credential produced by the auth layer. Never serialized outward.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    /// Free text, e.g. "admin" or "customer".
    pub role: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// Profile fields a user update may change. The credential is not one of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
    pub role: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product with its current price and stock counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Current unit price in cents.
    pub price_cents: i64,
    /// Units available. Never negative.
    pub stock_quantity: i64,
    pub category: String,
    pub image_url: Option<String>,
    /// Bumped on every stock or field write.
    pub version: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns the current unit price.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks if `quantity` units can be reserved right now.
    #[inline]
    pub fn can_reserve(&self, quantity: i64) -> bool {
        self.stock_quantity >= quantity
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock_quantity: i64,
    pub category: String,
    pub image_url: Option<String>,
}

/// Catalogue fields a product update may change.
///
/// Stock is deliberately absent: it moves only through the inventory ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub category: String,
    pub image_url: Option<String>,
}

// =============================================================================
// Order
// =============================================================================

/// An order with its running total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    /// Σ(item.price × item.quantity) over the current items.
    pub total_price_cents: i64,
    /// Free-text state label, "pending" by default.
    pub status: String,
    pub version: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the running total as Money.
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

/// Input for creating an order. Orders always open with a 0.00 total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: i64,
    pub status: Option<String>,
}

/// An order together with its items and payments, ordered by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payments: Vec<Payment>,
}

impl OrderDetail {
    /// Recomputes Σ(price × quantity) from the loaded items. `None` if the
    /// sum overflows.
    pub fn items_total(&self) -> Option<Money> {
        self.items
            .iter()
            .try_fold(Money::zero(), |total, item| total.checked_add(item.line_total()?))
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item: a quantity of one product at the price captured when the item
/// was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price snapshot in cents (frozen at creation).
    pub price_cents: i64,
    pub version: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the unit price snapshot.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns price × quantity, `None` on overflow.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        self.price().checked_multiply_quantity(self.quantity)
    }
}

/// Input for creating a line item. The price is never supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

/// Input for changing a line item's quantity.
///
/// `order_id`/`product_id` may be echoed back by the caller; a value that
/// differs from the stored one is rejected. `expected_version`, when given,
/// must match the stored version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderItemUpdate {
    pub quantity: i64,
    pub order_id: Option<i64>,
    pub product_id: Option<i64>,
    pub expected_version: Option<i64>,
}

impl OrderItemUpdate {
    /// A quantity-only update with no version expectation.
    pub fn quantity(quantity: i64) -> Self {
        OrderItemUpdate {
            quantity,
            ..Default::default()
        }
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment recorded against an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub payment_method: String,
    /// "pending" by default.
    pub payment_status: String,
    /// Unique across payments when present.
    pub transaction_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Input for recording a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub order_id: i64,
    pub payment_method: String,
    pub payment_status: Option<String>,
    pub transaction_id: Option<String>,
}

/// Fields a payment update may change. The order reference is fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentUpdate {
    pub payment_method: String,
    pub payment_status: String,
    pub transaction_id: Option<String>,
}

// =============================================================================
// Admin Log
// =============================================================================

/// An audit entry. `admin_id` becomes `None` when the admin is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AdminLog {
    pub id: i64,
    pub admin_id: Option<i64>,
    pub action: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Input for writing an admin log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAdminLog {
    pub admin_id: Option<i64>,
    pub action: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i64, price_cents: i64) -> OrderItem {
        OrderItem {
            id: 1,
            order_id: 1,
            product_id: 1,
            quantity,
            price_cents,
            version: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(item(3, 1999).line_total(), Some(Money::from_cents(5997)));
        assert_eq!(item(10_000, 1_000_000_000_000_000).line_total(), None);
    }

    #[test]
    fn test_order_detail_items_total() {
        let order = Order {
            id: 1,
            user_id: 1,
            total_price_cents: 6497,
            status: "pending".to_string(),
            version: 2,
            created_at: Utc::now(),
        };
        let detail = OrderDetail {
            order,
            items: vec![item(3, 1999), item(1, 500)],
            payments: vec![],
        };
        assert_eq!(detail.items_total(), Some(detail.order.total_price()));
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: "admin".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_entity_display() {
        assert_eq!(Entity::OrderItem.to_string(), "order item");
        assert_eq!(Entity::AdminLog.to_string(), "admin log");
    }

    #[test]
    fn test_can_reserve() {
        let product = Product {
            id: 1,
            name: "Mug".to_string(),
            description: None,
            price_cents: 1999,
            stock_quantity: 7,
            category: "Kitchen".to_string(),
            image_url: None,
            version: 0,
            created_at: Utc::now(),
        };
        assert!(product.can_reserve(7));
        assert!(!product.can_reserve(8));
    }
}
