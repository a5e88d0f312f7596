//! # Validation Module
//!
//! Input validation for Duka POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web client                                                   │
//! │  └── Basic form checks, immediate feedback                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: REST handler (Rust)                                          │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE and foreign key constraints                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use duka_core::validation::{validate_name, validate_quantity};
//!
//! validate_name("name", "Mama Mboga Kiosk").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Largest amount any single price, tender, deposit or expense may carry
/// (KES 10 billion). A full cart of such lines still fits in `i64` cents.
pub const MAX_AMOUNT: Money = Money::from_units(10_000_000_000);

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (shop, product, cashier, customer).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ```rust
/// use duka_core::validation::validate_name;
///
/// assert!(validate_name("name", "Sugar 2kg").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an email address (shape only: one `@`, dotted domain).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@example.com".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Optional leading `+`
/// - 9 to 15 digits; spaces and hyphens are ignored
///
/// ```rust
/// use duka_core::validation::validate_phone;
///
/// assert!(validate_phone("+254 712 345 678").is_ok());
/// assert!(validate_phone("0712-345678").is_ok());
/// assert!(validate_phone("12ab").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();
    let digits = phone.strip_prefix('+').unwrap_or(phone);

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "phone".to_string(),
        reason: reason.to_string(),
    };

    if !digits
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
    {
        return Err(invalid("must contain only digits, spaces and hyphens"));
    }

    let count = digits.chars().filter(|c| c.is_ascii_digit()).count();
    if !(9..=15).contains(&count) {
        return Err(invalid("must have between 9 and 15 digits"));
    }

    Ok(())
}

/// Validates a password for a new or reset account.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < 6 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale quantity: 1..=999.
///
/// ## User Workflow
/// ```text
/// Cashier enters quantity: 5
///      │
///      ▼
/// validate_quantity(5) ← THIS FUNCTION
///      │
///      ├── qty <= 0?  → "quantity must be positive"
///      ├── qty > 999? → "quantity must be between 1 and 999"
///      └── OK → add to cart
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock count (zero allowed).
pub fn validate_stock(field: &str, count: i64) -> ValidationResult<()> {
    if count < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an amount that may be zero: `0 ..= MAX_AMOUNT`.
///
/// ```rust
/// use duka_core::money::Money;
/// use duka_core::validation::{validate_amount, MAX_AMOUNT};
///
/// assert!(validate_amount("deposit", Money::zero()).is_ok());
/// assert!(validate_amount("deposit", MAX_AMOUNT + Money::from_cents(1)).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() || amount > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT.units(),
        });
    }

    Ok(())
}

/// Validates a product's price pair.
///
/// ## Rules
/// - Both prices within `0 ..= MAX_AMOUNT`
/// - Minimum selling price must be positive
/// - Minimum selling price must not be below the buying price
///
/// ```rust
/// use duka_core::money::Money;
/// use duka_core::validation::validate_pricing;
///
/// assert!(validate_pricing(Money::from_units(80), Money::from_units(100)).is_ok());
/// assert!(validate_pricing(Money::from_units(120), Money::from_units(100)).is_err());
/// ```
pub fn validate_pricing(buying_price: Money, min_selling_price: Money) -> ValidationResult<()> {
    validate_amount("buying_price", buying_price)?;
    validate_amount("min_selling_price", min_selling_price)?;

    if !min_selling_price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "min_selling_price".to_string(),
        });
    }

    if min_selling_price < buying_price {
        return Err(ValidationError::OutOfRange {
            field: "min_selling_price".to_string(),
            min: buying_price.cents(),
            max: MAX_AMOUNT.cents(),
        });
    }

    Ok(())
}

/// Validates an amount that must be strictly positive (expenses, repayments).
pub fn validate_positive_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    validate_amount(field, amount)
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size before adding another line.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Identifier & Date Validators
// =============================================================================

/// Validates a UUID string.
///
/// ```rust
/// use duka_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        }
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Kiosk A").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", &"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("jane@duka.co.ke").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("jane").is_err());
        assert!(validate_email("jane@localhost").is_err());
        assert!(validate_email("a@b@c.com").is_err());
        assert!(validate_email("jane doe@duka.com").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("0712345678").is_ok());
        assert!(validate_phone("+254712345678").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("+254-7x2").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret1").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password("abc").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_pricing() {
        assert!(validate_pricing(Money::zero(), Money::from_units(10)).is_ok());
        assert!(validate_pricing(Money::from_units(10), Money::from_units(10)).is_ok());
        assert!(validate_pricing(Money::from_units(10), Money::zero()).is_err());
        assert!(validate_pricing(Money::from_units(11), Money::from_units(10)).is_err());
        assert!(validate_pricing(Money::from_cents(-1), Money::from_units(10)).is_err());
    }

    #[test]
    fn test_amounts_are_capped() {
        let over = MAX_AMOUNT + Money::from_cents(1);

        assert!(validate_amount("deposit", MAX_AMOUNT).is_ok());
        assert!(validate_amount("deposit", over).is_err());
        assert!(validate_amount("deposit", Money::from_cents(-1)).is_err());

        assert!(validate_positive_amount("amount", MAX_AMOUNT).is_ok());
        assert!(matches!(
            validate_positive_amount("amount", Money::from_major(1e17)),
            Err(ValidationError::OutOfRange { .. })
        ));

        assert!(validate_pricing(Money::from_major(1e17), Money::from_major(1e17)).is_err());
        assert!(validate_pricing(Money::from_units(10), over).is_err());
        assert!(validate_pricing(MAX_AMOUNT, MAX_AMOUNT).is_ok());
    }

    #[test]
    fn test_validate_stock() {
        assert!(validate_stock("current_stock", 0).is_ok());
        assert!(validate_stock("current_stock", -1).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS - 1).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("start", "2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_date("start", "2023-02-29").is_err());
        assert!(parse_date("start", "29/02/2024").is_err());
    }
}
