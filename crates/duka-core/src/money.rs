//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Integer Cents, Decimal Wire Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Inside Duka POS               │  On the wire (JSON)                    │
//! │  ────────────────              │  ──────────────────                    │
//! │  Money(15050)  (cents, i64)    │  150.5   (major units)                 │
//! │                                │                                        │
//! │  All sums, differences and     │  Incoming values pass through          │
//! │  group-by reductions are       │  safe_number(): null, NaN, negative    │
//! │  exact integer arithmetic      │  and garbage become 0                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Floats only appear at the JSON boundary and in derived percentages.
//!
//! Arithmetic saturates at the `i64` bounds instead of overflowing, so a
//! reduction over absurd stored values degrades to a clamped number rather
//! than a panic. Request amounts are capped earlier by
//! [`validation::MAX_AMOUNT`](crate::validation::MAX_AMOUNT).
//!
//! ## Usage
//! ```rust
//! use duka_core::money::Money;
//!
//! let price = Money::from_cents(1099); // KES 10.99
//! let doubled = price * 2;
//! let total = price + Money::from_cents(500);
//!
//! assert_eq!(doubled.cents(), 2198);
//! assert_eq!(total.cents(), 1599);
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::numeric::{parse_number, safe_number};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: profit and net figures can go negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Custom serde**: decimal major units on the wire, coerced on input
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use duka_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a decimal amount in major units.
    ///
    /// The amount is coerced with [`safe_number`] first, so NaN, infinities
    /// and negative values become zero. Rounds half away from zero to the
    /// nearest cent.
    ///
    /// ```rust
    /// use duka_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(150.5).cents(), 15050);
    /// assert_eq!(Money::from_major(0.125).cents(), 13);
    /// assert_eq!(Money::from_major(f64::NAN).cents(), 0);
    /// assert_eq!(Money::from_major(-20.0).cents(), 0);
    /// ```
    pub fn from_major(amount: f64) -> Self {
        let amount = safe_number(amount);
        Money((amount * 100.0).round() as i64)
    }

    /// Creates a Money value from whole major units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units.saturating_mul(100))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value in major units as a float (wire/display only).
    #[inline]
    pub fn as_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the whole major-unit portion.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor-unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ```rust
    /// use duka_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Returns `self / whole × 100`, or 0 when `whole` is not positive.
    ///
    /// This is the single percentage rule used by every margin and rate in
    /// the analytics module.
    ///
    /// ```rust
    /// use duka_core::money::Money;
    ///
    /// let profit = Money::from_units(25);
    /// let revenue = Money::from_units(100);
    /// assert_eq!(profit.percent_of(revenue), 25.0);
    /// assert_eq!(profit.percent_of(Money::zero()), 0.0);
    /// ```
    pub fn percent_of(&self, whole: Money) -> f64 {
        if whole.0 <= 0 {
            return 0.0;
        }
        self.0 as f64 / whole.0 as f64 * 100.0
    }

    /// Divides evenly by a count, truncating toward zero. Zero count yields zero.
    pub fn average_over(&self, count: usize) -> Money {
        if count == 0 {
            return Money::zero();
        }
        Money(self.0 / count as i64)
    }

    /// Clamps negative values to zero.
    #[inline]
    pub const fn non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug/log formatting. Localized display belongs to the front end.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major())
    }
}

/// Lenient deserialization: any JSON value is accepted and coerced.
///
/// `150.5`, `"150.50"`, `null`, `"abc"`, `-3` all deserialize; the last three
/// become zero. Missing fields need `#[serde(default)]` on the container.
impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let amount = match parse_number(&value) {
            Some(amount) => amount,
            None if value.is_null() => 0.0,
            None => {
                tracing::warn!(raw = %value, "Amount coerced to zero");
                0.0
            }
        };
        Ok(Money::from_major(amount))
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
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.units(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_rounds_to_cents() {
        assert_eq!(Money::from_major(10.99).cents(), 1099);
        assert_eq!(Money::from_major(0.1 + 0.2).cents(), 30);
        assert_eq!(Money::from_major(1999.5).cents(), 199950);
    }

    #[test]
    fn test_from_major_coerces_garbage() {
        assert_eq!(Money::from_major(f64::NAN), Money::zero());
        assert_eq!(Money::from_major(f64::INFINITY), Money::zero());
        assert_eq!(Money::from_major(-5.0), Money::zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::zero()), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((b - a).cents(), -500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!((-a).cents(), -1000);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Money::from_major(1e17);
        assert_eq!(huge.cents(), i64::MAX);

        assert_eq!((huge + huge).cents(), i64::MAX);
        assert_eq!((huge * 10).cents(), i64::MAX);
        assert_eq!(huge.multiply_quantity(999).cents(), i64::MAX);
        assert_eq!((-huge - huge).cents(), i64::MIN);
        assert_eq!(vec![huge, huge, huge].iter().sum::<Money>().cents(), i64::MAX);

        let mut acc = Money::from_cents(i64::MAX - 1);
        acc += Money::from_cents(5);
        assert_eq!(acc.cents(), i64::MAX);
    }

    #[test]
    fn test_sum() {
        let values = vec![Money::from_cents(100), Money::from_cents(250)];
        let by_ref: Money = values.iter().sum();
        let by_value: Money = values.into_iter().sum();
        assert_eq!(by_ref.cents(), 350);
        assert_eq!(by_value.cents(), 350);

        let empty: Vec<Money> = Vec::new();
        assert_eq!(empty.iter().sum::<Money>(), Money::zero());
    }

    #[test]
    fn test_percent_of() {
        let revenue = Money::from_units(200);
        assert_eq!(Money::from_units(50).percent_of(revenue), 25.0);
        assert_eq!(Money::from_units(-50).percent_of(revenue), -25.0);
        assert_eq!(Money::from_units(50).percent_of(Money::zero()), 0.0);
        assert_eq!(Money::from_units(50).percent_of(Money::from_units(-1)), 0.0);
    }

    #[test]
    fn test_average_over() {
        assert_eq!(Money::from_cents(1000).average_over(3).cents(), 333);
        assert_eq!(Money::from_cents(1000).average_over(0), Money::zero());
    }

    #[test]
    fn test_serialize_as_major_units() {
        let json = serde_json::to_string(&Money::from_cents(15050)).unwrap();
        assert_eq!(json, "150.5");
    }

    #[test]
    fn test_deserialize_lenient() {
        let parse = |s: &str| serde_json::from_str::<Money>(s).unwrap();

        assert_eq!(parse("150.5").cents(), 15050);
        assert_eq!(parse("\"99.90\"").cents(), 9990);
        assert_eq!(parse("null"), Money::zero());
        assert_eq!(parse("\"abc\""), Money::zero());
        assert_eq!(parse("-12"), Money::zero());
        assert_eq!(parse("true"), Money::zero());
    }
}
