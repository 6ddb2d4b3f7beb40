//! # Inventory Rules
//!
//! Pure stock arithmetic for the inventory ledger. Each function takes the
//! stock read inside the current transaction and returns the stock to write
//! back, or the rejection. `orderdesk-db` performs the read and the guarded
//! write; nothing here touches a store.
//!
//! ## Line Item Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create item (qty 3)      reserve(3)       stock 10 → 7                 │
//! │  update item 3 → 5        adjust(-2)       stock  7 → 5                 │
//! │  update item 5 → 4        adjust(+1)       stock  5 → 6                 │
//! │  delete item (qty 4)      release(4)       stock  6 → 10                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};

/// Takes `quantity` units out of `stock`.
///
/// ## Example
/// ```rust
/// use orderdesk_core::inventory::reserve;
///
/// assert_eq!(reserve(1, 10, 3).unwrap(), 7);
/// assert!(reserve(1, 7, 8).is_err());
/// ```
pub fn reserve(product_id: i64, stock: i64, quantity: i64) -> CoreResult<i64> {
    ensure_non_negative(quantity)?;

    if quantity > stock {
        return Err(CoreError::InsufficientStock {
            product_id,
            available: stock,
            requested: quantity,
        });
    }

    Ok(stock - quantity)
}

/// Puts `quantity` units back into `stock`.
///
/// Releases mirror earlier reservations, so there is no upper bound; a
/// negative quantity or an overflowing sum is still refused.
pub fn release(product_id: i64, stock: i64, quantity: i64) -> CoreResult<i64> {
    ensure_non_negative(quantity)?;

    stock.checked_add(quantity).ok_or_else(|| {
        CoreError::Validation(ValidationError::OutOfRange {
            field: format!("stock of product {product_id}"),
            min: 0,
            max: i64::MAX,
        })
    })
}

/// Signed stock change: `delta < 0` reserves `-delta`, `delta > 0` releases
/// `delta`, zero leaves the stock untouched.
///
/// ## Example
/// ```rust
/// use orderdesk_core::inventory::adjust;
///
/// assert_eq!(adjust(1, 7, -2).unwrap(), 5);
/// assert_eq!(adjust(1, 5, 1).unwrap(), 6);
/// assert_eq!(adjust(1, 5, 0).unwrap(), 5);
/// ```
pub fn adjust(product_id: i64, stock: i64, delta: i64) -> CoreResult<i64> {
    match delta {
        0 => Ok(stock),
        d if d < 0 => reserve(product_id, stock, -d),
        d => release(product_id, stock, d),
    }
}

fn ensure_non_negative(quantity: i64) -> CoreResult<()> {
    if quantity < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        }
        .into());
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
