//! Reusable field validators
//!
//! Each validator takes the raw (possibly missing) form value and either
//! yields the typed value or the message to show next to the field.

use std::str::FromStr;

/// Validator: field is present and not blank
pub fn required_text(
    message: &'static str,
) -> impl Fn(Option<&str>) -> Result<String, String> + Send + Sync + Clone {
    move |value: Option<&str>| match value {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        _ => Err(message.to_string()),
    }
}

/// Validator: coerce to a number that is strictly positive
///
/// A blank value coerces to zero, so it fails like any other non-positive
/// amount. Amounts that would round to zero cents are rejected as well.
pub fn positive_amount(
    message: &'static str,
) -> impl Fn(Option<&str>) -> Result<f64, String> + Send + Sync + Clone {
    move |value: Option<&str>| {
        let raw = value.unwrap_or("").trim();
        let amount = if raw.is_empty() {
            0.0
        } else {
            raw.parse::<f64>().map_err(|_| message.to_string())?
        };

        if !amount.is_finite() || amount <= 0.0 || (amount * 100.0).round() < 1.0 {
            Err(message.to_string())
        } else {
            Ok(amount)
        }
    }
}

/// Validator: an amount in dollars is at most `max_cents` once rounded to cents
pub fn at_most_cents(
    max_cents: i64,
    message: &'static str,
) -> impl Fn(f64) -> Result<f64, String> + Send + Sync + Clone {
    move |amount: f64| {
        if (amount * 100.0).round() > max_cents as f64 {
            Err(message.to_string())
        } else {
            Ok(amount)
        }
    }
}

/// Validator: value must parse into one of the members of `T`
pub fn one_of<T: FromStr>(
    message: &'static str,
) -> impl Fn(Option<&str>) -> Result<T, String> + Send + Sync + Clone {
    move |value: Option<&str>| {
        value
            .and_then(|s| s.parse::<T>().ok())
            .ok_or_else(|| message.to_string())
    }
}
