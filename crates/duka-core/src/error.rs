//! Errors raised by cart, checkout and credit rules.
//!
//! ```text
//! ValidationError ──► CoreError ──► DbError (duka-db) ──► ApiError (apps/api)
//!   bad input          broken rule     storage              JSON + status
//! ```
//!
//! The analytics module has no error type: malformed numbers become zero.

use thiserror::Error;

use crate::money::Money;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("No such product: {0}")]
    ProductNotFound(String),

    /// The shelf holds fewer units than the cart asks for.
    #[error("Only {available} of {product} in stock, {requested} requested")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Cashiers may discount down to the floor price, never below it.
    #[error("{product} cannot sell at {price}; floor price is {minimum}")]
    PriceBelowMinimum {
        product: String,
        price: Money,
        minimum: Money,
    },

    #[error("Product {product_id} belongs to another shop than {shop_id}")]
    WrongShop { product_id: String, shop_id: String },

    #[error("A sale is limited to {max} lines")]
    CartTooLarge { max: usize },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Line quantity {requested} is over the limit of {max}")]
    QuantityTooLarge { requested: i64, max: i64 },

    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    /// Split tender: both halves must cover the total exactly.
    #[error("Split payment {cash} cash + {mpesa} M-Pesa does not match total {total}")]
    SplitMismatch {
        cash: Money,
        mpesa: Money,
        total: Money,
    },

    #[error("Bad payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    #[error("Credit {0} has nothing left to pay")]
    CreditSettled(String),

    #[error("Payment {requested} is more than the {balance} still owed")]
    PaymentExceedsBalance { balance: Money, requested: Money },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Rejected request fields, caught before any rule runs.
///
/// `field` carries the client-facing (camelCase) name.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} is longer than {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} is shorter than {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must lie in {min}..={max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be greater than zero")]
    MustBePositive { field: String },

    /// Dates, emails, phone numbers, enum names.
    #[error("{field} is malformed: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} accepts only {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    #[error("{field}: start {start} is after end {end}")]
    InvertedRange {
        field: String,
        start: String,
        end: String,
    },
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_and_price_messages() {
        let short = CoreError::InsufficientStock {
            product: "Sugar 2kg".into(),
            available: 3,
            requested: 5,
        };
        assert_eq!(short.to_string(), "Only 3 of Sugar 2kg in stock, 5 requested");

        let cheap = CoreError::PriceBelowMinimum {
            product: "Milk 500ml".into(),
            price: Money::from_units(50),
            minimum: Money::from_units(60),
        };
        assert_eq!(
            cheap.to_string(),
            "Milk 500ml cannot sell at 50.00; floor price is 60.00"
        );
    }

    #[test]
    fn test_validation_is_transparent() {
        let core: CoreError = ValidationError::Required {
            field: "name".into(),
        }
        .into();
        assert!(matches!(core, CoreError::Validation(_)));
        assert_eq!(core.to_string(), "name is required");
    }

    #[test]
    fn test_inverted_range_message() {
        let err = ValidationError::InvertedRange {
            field: "period".into(),
            start: "2024-02-01".into(),
            end: "2024-01-01".into(),
        };
        assert_eq!(err.to_string(), "period: start 2024-02-01 is after end 2024-01-01");
    }
}
