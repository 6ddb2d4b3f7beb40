//! # Money Module
//!
//! Provides the `Money` type for monetary values at 2-decimal fixed point.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    19.99 * 3 = 59.970000000000006  ❌ WRONG!                            │
//! │                                                                         │
//! │  An order total is a running sum of many such products. Drift of a     │
//! │  fraction of a cent per line item breaks                                │
//! │    total == Σ(price × quantity)                                         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    1999 cents * 3 = 5997 cents, exact every time                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use orderdesk_core::money::Money;
//!
//! let price = Money::from_cents(1999);        // 19.99
//! let line = price.checked_multiply_quantity(3); // 59.97
//! let parsed: Money = "59.97".parse().unwrap();
//! assert_eq!(line, Some(parsed));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: total adjustments are signed (`-price×quantity` on delete)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money is Used
/// ```text
/// Product.price_cents ──► OrderItem.price_cents (snapshot at creation)
///                                │
///                                ▼
///                   price × quantity (line amount)
///                                │
///                                ▼
///                    Order.total_price_cents (running sum)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use orderdesk_core::money::Money;
    ///
    /// let price = Money::from_cents(1999); // Represents 19.99
    /// assert_eq!(price.cents(), 1999);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity (signed, so a quantity delta works too).
    /// `None` when the product doesn't fit in an `i64` of cents.
    ///
    /// ## Example
    /// ```rust
    /// use orderdesk_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1999);
    /// assert_eq!(unit_price.checked_multiply_quantity(2), Some(Money::from_cents(3998)));
    /// assert_eq!(unit_price.checked_multiply_quantity(-2), Some(Money::from_cents(-3998)));
    /// assert_eq!(unit_price.checked_multiply_quantity(i64::MAX), None);
    /// ```
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses a decimal amount with at most two fractional digits.
///
/// Accepts `"19.99"`, `"19.9"`, `"19"`, `"-5.50"`. Rejects more than two
/// fractional digits instead of rounding them away.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (major_str, minor_str) = match digits.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (digits, ""),
        };

        if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected digits before the decimal point"));
        }
        if minor_str.len() > 2 || !minor_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("at most two decimal places"));
        }

        let major: i64 = major_str
            .parse()
            .map_err(|_| invalid("amount out of range"))?;
        let minor: i64 = match minor_str.len() {
            0 => 0,
            1 => minor_str.parse::<i64>().map_err(|_| invalid("bad cents"))? * 10,
            _ => minor_str.parse().map_err(|_| invalid("bad cents"))?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("amount out of range"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain 2-decimal rendering, e.g. `59.97` or `-5.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1999);
        assert_eq!(money.cents(), 1999);
        assert_eq!(money.major(), 19);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(5997).to_string(), "59.97");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_parse() {
        assert_eq!("19.99".parse::<Money>().unwrap().cents(), 1999);
        assert_eq!("19.9".parse::<Money>().unwrap().cents(), 1990);
        assert_eq!("19".parse::<Money>().unwrap().cents(), 1900);
        assert_eq!("-5.50".parse::<Money>().unwrap().cents(), -550);
        assert_eq!(" 0.05 ".parse::<Money>().unwrap().cents(), 5);

        assert!("19.999".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!(".50".parse::<Money>().is_err());
        assert!("1.-5".parse::<Money>().is_err());
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(-500);

        assert_eq!(a.checked_add(b), Some(Money::from_cents(500)));
        assert_eq!((-a).cents(), -1000);
        assert_eq!(a.checked_multiply_quantity(3), Some(Money::from_cents(3000)));
        assert_eq!(a.checked_multiply_quantity(0), Some(Money::zero()));
    }

    #[test]
    fn test_overflow_is_none() {
        let big = Money::from_cents(1_000_000_000_000_000);

        assert_eq!(big.checked_multiply_quantity(10_000), None);
        assert_eq!(big.checked_multiply_quantity(-10_000), None);
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
        assert_eq!(
            Money::from_cents(i64::MAX).checked_add(Money::from_cents(-1)),
            Some(Money::from_cents(i64::MAX - 1))
        );
    }

    /// Repeated 2-decimal products stay exact, unlike f64.
    #[test]
    fn test_no_drift_over_many_lines() {
        let price = Money::from_cents(1999);
        let mut total = Money::zero();
        let line = price.checked_multiply_quantity(3).unwrap();
        for _ in 0..1000 {
            total = total.checked_add(line).unwrap();
        }
        for _ in 0..1000 {
            total = total.checked_add(-line).unwrap();
        }
        assert!(total.is_zero());
    }
}
