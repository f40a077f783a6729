//! Field formatter: renders one value into exactly `width` characters.

use crate::error::{AchError, Result};
use crate::money::render_fixed;
use crate::schema::{FieldKind, FieldSpec, Justify};
use rust_decimal::Decimal;
use std::fmt;

/// A value destined for one fixed-width field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(u64),
    Decimal(Decimal),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Decimal(d) => write!(f, "{}", d),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<char> for FieldValue {
    fn from(c: char) -> Self {
        FieldValue::Text(c.to_string())
    }
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        FieldValue::Integer(u64::from(n))
    }
}

impl From<u16> for FieldValue {
    fn from(n: u16) -> Self {
        FieldValue::Integer(u64::from(n))
    }
}

impl From<usize> for FieldValue {
    fn from(n: usize) -> Self {
        FieldValue::Integer(n as u64)
    }
}

impl From<Decimal> for FieldValue {
    fn from(d: Decimal) -> Self {
        FieldValue::Decimal(d)
    }
}

/// Rejects text that would not occupy one byte per character on the wire.
pub fn check_ascii(field: &'static str, value: &str) -> Result<()> {
    if value.is_ascii() {
        Ok(())
    } else {
        Err(AchError::NonAsciiText {
            field,
            value: value.to_string(),
        })
    }
}

/// Renders the unpadded form of `value` according to the field kind.
fn render(spec: &FieldSpec, value: &FieldValue) -> String {
    match (spec.kind, value) {
        (FieldKind::FixedPoint(precision), FieldValue::Decimal(d)) => render_fixed(*d, precision),
        (FieldKind::FixedPoint(precision), FieldValue::Integer(n)) => {
            render_fixed(Decimal::from(*n), precision)
        }
        _ => value.to_string(),
    }
}

/// Formats `value` into exactly `spec.width` characters.
///
/// Values longer than the field keep their first `width` characters; that
/// applies to numbers as well, so callers must keep numeric values within the
/// field's digit capacity. A missing value renders as an all-pad field.
/// Width is counted in characters; [`crate::record::assemble`] rejects
/// non-ASCII values so that characters and bytes agree.
pub fn format_field(spec: &FieldSpec, value: Option<&FieldValue>) -> String {
    let rendered = value.map(|v| render(spec, v)).unwrap_or_default();
    let len = rendered.chars().count();

    if len >= spec.width {
        return rendered.chars().take(spec.width).collect();
    }

    let padding: String = std::iter::repeat(spec.pad_char())
        .take(spec.width - len)
        .collect();

    match spec.justify {
        Justify::Left => rendered + &padding,
        Justify::Right => padding + &rendered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const NAME: FieldSpec = FieldSpec {
        name: "name",
        width: 6,
        justify: Justify::Left,
        kind: FieldKind::Text,
    };

    const DEST: FieldSpec = FieldSpec {
        name: "dest",
        width: 6,
        justify: Justify::Right,
        kind: FieldKind::Text,
    };

    const COUNT: FieldSpec = FieldSpec {
        name: "count",
        width: 6,
        justify: Justify::Right,
        kind: FieldKind::ZeroFilledInteger,
    };

    const RATE: FieldSpec = FieldSpec {
        name: "rate",
        width: 8,
        justify: Justify::Right,
        kind: FieldKind::FixedPoint(2),
    };

    #[test]
    fn test_left_text_pads_right() {
        assert_eq!(format_field(&NAME, Some(&"abc".into())), "abc   ");
    }

    #[test]
    fn test_right_text_pads_left_with_spaces() {
        assert_eq!(format_field(&DEST, Some(&"abc".into())), "   abc");
    }

    #[test]
    fn test_long_text_keeps_first_width_chars() {
        assert_eq!(format_field(&NAME, Some(&"abcdefghij".into())), "abcdef");
        assert_eq!(format_field(&DEST, Some(&"abcdefghij".into())), "abcdef");
    }

    #[test]
    fn test_exact_width_text_unchanged() {
        assert_eq!(format_field(&NAME, Some(&"abcdef".into())), "abcdef");
    }

    #[test]
    fn test_integer_zero_fills() {
        assert_eq!(format_field(&COUNT, Some(&42u64.into())), "000042");
        assert_eq!(format_field(&COUNT, Some(&0u64.into())), "000000");
    }

    #[test]
    fn test_oversized_integer_keeps_leading_digits() {
        assert_eq!(format_field(&COUNT, Some(&12345678u64.into())), "123456");
    }

    #[test]
    fn test_fixed_point_renders_precision_then_pads() {
        let value = FieldValue::from(Decimal::from_str("3.5").unwrap());
        assert_eq!(format_field(&RATE, Some(&value)), "00003.50");
        assert_eq!(format_field(&RATE, Some(&7u64.into())), "00007.00");
    }

    #[test]
    fn test_missing_value_is_all_pad() {
        assert_eq!(format_field(&NAME, None), "      ");
        assert_eq!(format_field(&COUNT, None), "000000");
    }

    #[test]
    fn test_multibyte_text_counts_chars() {
        let out = format_field(&NAME, Some(&"José Ñúñez".into()));
        assert_eq!(out, "José Ñ");
        assert_eq!(out.chars().count(), 6);
    }

    #[test]
    fn test_check_ascii() {
        assert!(check_ascii("name", "Alice O'Neil-Smith 42").is_ok());
        assert!(matches!(
            check_ascii("name", "José"),
            Err(AchError::NonAsciiText { field: "name", .. })
        ));
    }
}
