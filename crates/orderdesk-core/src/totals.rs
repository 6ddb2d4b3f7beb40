//! # Order Total Rules
//!
//! Pure arithmetic for the order total accumulator.
//!
//! | Line item event           | Signed amount                 |
//! |---------------------------|-------------------------------|
//! | create (qty q)            | `+price × q`                  |
//! | quantity change by Δ      | `price × Δ`                   |
//! | delete (qty q)            | `-price × q`                  |
//!
//! `price` is always the item's own snapshot, never the product's current
//! price.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

/// Result of applying a signed amount to an order total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalAdjustment {
    /// The total to write back.
    pub total: Money,
    /// True when the raw sum went below zero and was floored.
    pub floored: bool,
}

/// Adds `amount` (possibly negative) to `current`, flooring the result at zero.
///
/// With amounts that mirror real line item changes the floor never engages;
/// `floored` lets the caller log when it does. A sum past `i64::MAX` cents
/// is refused.
///
/// ## Example
/// ```rust
/// use orderdesk_core::money::Money;
/// use orderdesk_core::totals::apply;
///
/// let adj = apply(Money::from_cents(5997), Money::from_cents(3998)).unwrap();
/// assert_eq!(adj.total.cents(), 9995);
/// assert!(!adj.floored);
///
/// let adj = apply(Money::from_cents(100), Money::from_cents(-250)).unwrap();
/// assert!(adj.total.is_zero());
/// assert!(adj.floored);
/// ```
pub fn apply(current: Money, amount: Money) -> CoreResult<TotalAdjustment> {
    let raw = current
        .checked_add(amount)
        .ok_or_else(|| out_of_range("total_price"))?;

    if raw.is_negative() {
        Ok(TotalAdjustment {
            total: Money::zero(),
            floored: true,
        })
    } else {
        Ok(TotalAdjustment {
            total: raw,
            floored: false,
        })
    }
}

/// `+price × quantity`, the amount added when a line item is created.
#[inline]
pub fn line_amount(price: Money, quantity: i64) -> CoreResult<Money> {
    price
        .checked_multiply_quantity(quantity)
        .ok_or_else(|| out_of_range("line amount"))
}

/// `price × delta`, the amount applied when a quantity changes.
#[inline]
pub fn quantity_change_amount(price: Money, delta: i64) -> CoreResult<Money> {
    line_amount(price, delta)
}

/// `-price × quantity`, the amount applied when a line item is deleted.
#[inline]
pub fn removal_amount(price: Money, quantity: i64) -> CoreResult<Money> {
    line_amount(price, quantity)?
        .cents()
        .checked_neg()
        .map(Money::from_cents)
        .ok_or_else(|| out_of_range("line amount"))
}

fn out_of_range(field: &str) -> CoreError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
    .into()
}

// =============================================================================
// Unit Tests
// =============================================================================
