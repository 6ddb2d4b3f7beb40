//! # Validation Module
//!
//! Input validation for entity creation and updates.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request layer                                                │
//! │  └── Deserialization, required fields                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Repositories / services (Rust)                               │
//! │  └── THIS MODULE: lengths, positivity, formats                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints (stock >= 0, quantity > 0, total >= 0)          │
//! │  ├── UNIQUE constraints (email, transaction id)                        │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Length limits match the column sizes of the schema.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_ROLE_LEN: usize = 50;
pub const MAX_STATUS_LEN: usize = 50;
pub const MAX_CATEGORY_LEN: usize = 100;
pub const MAX_IMAGE_URL_LEN: usize = 512;
pub const MAX_PAYMENT_METHOD_LEN: usize = 50;
pub const MAX_TRANSACTION_ID_LEN: usize = 255;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field against a maximum length.
///
/// ## Example
/// ```rust
/// use orderdesk_core::validation::validate_required;
///
/// assert!(validate_required("name", "Coffee Mug", 255).is_ok());
/// assert!(validate_required("name", "   ", 255).is_err());
/// ```
pub fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    validate_max_len(field, value, max)
}

/// Validates a required text field with no length limit.
pub fn validate_present(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an optional text field against a maximum length.
pub fn validate_optional(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) => validate_max_len(field, v, max),
        None => Ok(()),
    }
}

fn validate_max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Required, at most 255 characters
/// - Exactly one `@` with a non-empty local part and a dotted domain
/// - No whitespace
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_required("email", email, MAX_EMAIL_LEN)?;

    let email = email.trim();
    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@example.com".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.split_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() && !domain.ends_with('.') => {
            Ok(())
        }
        _ => Err(invalid()),
    }
}

/// Normalizes a transaction id: blank becomes `None`, otherwise trimmed.
///
/// Payments without a transaction id never collide with each other.
pub fn normalize_transaction_id(id: Option<&str>) -> ValidationResult<Option<String>> {
    match id.map(str::trim) {
        None | Some("") => Ok(None),
        Some(id) => {
            validate_max_len("transaction_id", id, MAX_TRANSACTION_ID_LEN)?;
            Ok(Some(id.to_string()))
        }
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// ## Example
/// ```rust
/// use orderdesk_core::validation::validate_quantity;
///
/// assert!(validate_quantity(1).is_ok());
/// assert!(validate_quantity(0).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a price in cents. Zero is allowed (free items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates an initial or restocked stock quantity.
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock_quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("name", "Mug", MAX_NAME_LEN).is_ok());
        assert!(validate_required("name", "", MAX_NAME_LEN).is_err());
        assert!(validate_present("action", "Deleted product 4").is_ok());
        assert!(validate_present("action", " ").is_err());
        assert_eq!(
            validate_required("category", &"A".repeat(101), MAX_CATEGORY_LEN),
            Err(ValidationError::TooLong {
                field: "category".to_string(),
                max: 100
            })
        );
    }

    #[test]
    fn test_validate_optional() {
        assert!(validate_optional("image_url", None, MAX_IMAGE_URL_LEN).is_ok());
        assert!(validate_optional("image_url", Some(""), MAX_IMAGE_URL_LEN).is_ok());
        assert!(validate_optional("image_url", Some(&"x".repeat(513)), MAX_IMAGE_URL_LEN).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("a.b+c@mail.example.org").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ada@localhost").is_err());
        assert!(validate_email("ada@example.").is_err());
        assert!(validate_email("a da@example.com").is_err());
        assert!(validate_email("a@b@example.com").is_err());
    }

    #[test]
    fn test_normalize_transaction_id() {
        assert_eq!(normalize_transaction_id(None).unwrap(), None);
        assert_eq!(normalize_transaction_id(Some("  ")).unwrap(), None);
        assert_eq!(
            normalize_transaction_id(Some(" tx-1 ")).unwrap(),
            Some("tx-1".to_string())
        );
        assert!(normalize_transaction_id(Some(&"t".repeat(256))).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(1000).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_price_and_stock() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1999).is_ok());
        assert!(validate_price_cents(-1).is_err());

        assert!(validate_stock_quantity(0).is_ok());
        assert!(validate_stock_quantity(-1).is_err());
    }
}
