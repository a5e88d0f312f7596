//! # Numeric Coercion
//!
//! Defensive conversion of raw numeric input before any arithmetic.
//!
//! Records reach the aggregation code from JSON payloads, seed files and
//! older clients. Any of their numeric fields may be missing, `null`, a
//! numeric string, `NaN` or negative. The rule is the same everywhere:
//!
//! ```text
//!   finite and >= 0        → kept
//!   numeric string         → parsed, then the rule above
//!   anything else          → 0
//! ```
//!
//! Aggregation therefore never fails on bad data; it reports zero instead.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerces a float to a usable non-negative amount.
///
/// ```rust
/// use duka_core::numeric::safe_number;
///
/// assert_eq!(safe_number(12.5), 12.5);
/// assert_eq!(safe_number(f64::NAN), 0.0);
/// assert_eq!(safe_number(-3.0), 0.0);
/// ```
#[inline]
pub fn safe_number(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

/// Coerces an optional float; `None` becomes 0.
#[inline]
pub fn safe_number_opt(value: Option<f64>) -> f64 {
    value.map(safe_number).unwrap_or(0.0)
}

/// Coerces an arbitrary JSON value.
///
/// ```rust
/// use duka_core::numeric::safe_number_value;
/// use serde_json::json;
///
/// assert_eq!(safe_number_value(&json!(42)), 42.0);
/// assert_eq!(safe_number_value(&json!("7.25")), 7.25);
/// assert_eq!(safe_number_value(&json!(null)), 0.0);
/// assert_eq!(safe_number_value(&json!("n/a")), 0.0);
/// ```
pub fn safe_number_value(value: &Value) -> f64 {
    parse_number(value).unwrap_or(0.0)
}

/// Coerces a JSON value to a non-negative integer count (stock, quantity).
/// Fractions are truncated.
pub fn safe_count_value(value: &Value) -> i64 {
    safe_number_value(value).trunc() as i64
}

/// Serde helper for count fields: `#[serde(deserialize_with = "deserialize_count")]`.
pub fn deserialize_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(safe_count_value(&value))
}

/// Returns the value only when it is a usable amount, `None` when it would
/// have to be coerced.
pub fn parse_number(value: &Value) -> Option<f64> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if raw.is_finite() && raw >= 0.0 {
        Some(raw)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_safe_number_keeps_valid_values() {
        assert_eq!(safe_number(0.0), 0.0);
        assert_eq!(safe_number(1500.75), 1500.75);
    }

    #[test]
    fn test_safe_number_coerces_invalid_values() {
        assert_eq!(safe_number(f64::NAN), 0.0);
        assert_eq!(safe_number(f64::INFINITY), 0.0);
        assert_eq!(safe_number(f64::NEG_INFINITY), 0.0);
        assert_eq!(safe_number(-0.01), 0.0);
    }

    #[test]
    fn test_safe_number_opt() {
        assert_eq!(safe_number_opt(None), 0.0);
        assert_eq!(safe_number_opt(Some(3.5)), 3.5);
        assert_eq!(safe_number_opt(Some(f64::NAN)), 0.0);
    }

    #[test]
    fn test_safe_number_value() {
        assert_eq!(safe_number_value(&json!(10)), 10.0);
        assert_eq!(safe_number_value(&json!(" 12.50 ")), 12.5);
        assert_eq!(safe_number_value(&json!(-4)), 0.0);
        assert_eq!(safe_number_value(&json!("-4")), 0.0);
        assert_eq!(safe_number_value(&json!("NaN")), 0.0);
        assert_eq!(safe_number_value(&json!(null)), 0.0);
        assert_eq!(safe_number_value(&json!(true)), 0.0);
        assert_eq!(safe_number_value(&json!([1, 2])), 0.0);
        assert_eq!(safe_number_value(&json!({"amount": 5})), 0.0);
    }

    #[derive(serde::Deserialize)]
    struct Counted {
        #[serde(default, deserialize_with = "deserialize_count")]
        stock: i64,
    }

    #[test]
    fn test_deserialize_count() {
        let parsed: Counted = serde_json::from_str(r#"{"stock": "12"}"#).unwrap();
        assert_eq!(parsed.stock, 12);

        let parsed: Counted = serde_json::from_str(r#"{"stock": null}"#).unwrap();
        assert_eq!(parsed.stock, 0);

        let parsed: Counted = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.stock, 0);
    }

    #[test]
    fn test_safe_count_value() {
        assert_eq!(safe_count_value(&json!(7.9)), 7);
        assert_eq!(safe_count_value(&json!("3")), 3);
        assert_eq!(safe_count_value(&json!(null)), 0);
    }
}
