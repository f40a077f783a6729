//! Monetary conversions between dollar strings and integer cents.
//!
//! Amounts travel through the builder as integer cents. `rust_decimal` is used
//! at the edges: parsing dollar amounts from caller input and rendering
//! fixed-point fields.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Number of fractional digits in a cent-denominated dollar amount.
pub const CENT_SCALE: u32 = 2;

/// Parses a dollar amount such as `"25.01"` into cents.
///
/// Returns a message describing the problem if the value is not a decimal
/// number, carries more than two fractional digits, or does not fit in `i64`.
/// Negative amounts parse successfully; rejecting them is the builder's job.
///
/// # Examples
///
/// ```
/// use ach_writer::money::parse_dollars;
///
/// assert_eq!(parse_dollars("25.01"), Ok(2501));
/// assert_eq!(parse_dollars(" 7 "), Ok(700));
/// assert!(parse_dollars("1.005").is_err());
/// ```
pub fn parse_dollars(s: &str) -> std::result::Result<i64, String> {
    let trimmed = s.trim();
    let value = Decimal::from_str(trimmed)
        .map_err(|e| format!("invalid amount '{}': {}", trimmed, e))?;

    let normalized = value.normalize();
    if normalized.scale() > CENT_SCALE {
        return Err(format!("amount '{}' has fractions of a cent", trimmed));
    }

    (normalized * Decimal::ONE_HUNDRED)
        .to_i64()
        .ok_or_else(|| format!("amount '{}' out of range", trimmed))
}

/// Renders cents as a dollar string with two decimal places.
pub fn format_cents(cents: u64) -> String {
    Decimal::new(cents as i64, CENT_SCALE).to_string()
}

/// Renders `value` with exactly `precision` fractional digits.
pub fn render_fixed(value: Decimal, precision: u32) -> String {
    let mut rounded = value.round_dp(precision);
    rounded.rescale(precision);
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dollars_to_cents() {
        assert_eq!(parse_dollars("25.01"), Ok(2501));
        assert_eq!(parse_dollars("25.1"), Ok(2510));
        assert_eq!(parse_dollars("25"), Ok(2500));
        assert_eq!(parse_dollars("0.00"), Ok(0));
        assert_eq!(parse_dollars("  3.50  "), Ok(350));
    }

    #[test]
    fn test_parse_dollars_keeps_sign() {
        assert_eq!(parse_dollars("-1.25"), Ok(-125));
    }

    #[test]
    fn test_parse_dollars_trailing_zeros_are_not_fractions_of_cent() {
        assert_eq!(parse_dollars("1.2500"), Ok(125));
    }

    #[test]
    fn test_parse_dollars_rejects_sub_cent() {
        assert!(parse_dollars("1.001").is_err());
    }

    #[test]
    fn test_parse_dollars_rejects_garbage() {
        assert!(parse_dollars("abc").is_err());
        assert!(parse_dollars("").is_err());
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(2501), "25.01");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(0), "0.00");
    }

    #[test]
    fn test_render_fixed_pads_and_rounds() {
        assert_eq!(render_fixed(Decimal::from_str("1.5").unwrap(), 2), "1.50");
        assert_eq!(render_fixed(Decimal::from_str("1.234").unwrap(), 2), "1.23");
        assert_eq!(render_fixed(Decimal::from_str("7").unwrap(), 0), "7");
        assert_eq!(render_fixed(Decimal::from_str("2.5").unwrap(), 3), "2.500");
    }
}
