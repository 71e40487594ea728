//! Chilean peso price handling.
//!
//! Prices are whole peso amounts: CLP has no fractional minor unit, so every
//! amount is a `u64` and tax is rounded to the nearest whole peso.
//!
//! Display strings follow the `es-CL` convention: a leading `$`, thousands
//! grouped with `.`, and no decimals (`16990` renders as `"$16.990"`).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Currency glyph prefixed to every formatted price.
pub const CURRENCY_SYMBOL: &str = "$";

/// Thousands separator used by the `es-CL` locale.
pub const THOUSANDS_SEPARATOR: char = '.';

/// IVA (Chilean value-added tax) rate: 19%.
pub const TAX_RATE: Decimal = Decimal::from_parts(19, 0, 0, false, 2);

/// Parse a formatted display price into a whole amount.
///
/// Every character that is not an ASCII digit is discarded and the remaining
/// digits are read as a base-10 integer. Input without digits parses to `0`;
/// absurdly long digit runs saturate at `u64::MAX`.
///
/// ```
/// use gmexpress_core::price_to_number;
///
/// assert_eq!(price_to_number("$16.990"), 16990);
/// assert_eq!(price_to_number(""), 0);
/// ```
#[must_use]
pub fn price_to_number(price: &str) -> u64 {
    price
        .bytes()
        .filter(u8::is_ascii_digit)
        .fold(0_u64, |acc, digit| {
            acc.saturating_mul(10)
                .saturating_add(u64::from(digit - b'0'))
        })
}

/// Format a whole amount as a display price.
///
/// ```
/// use gmexpress_core::format_price;
///
/// assert_eq!(format_price(16990), "$16.990");
/// assert_eq!(format_price(0), "$0");
/// ```
#[must_use]
pub fn format_price(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    grouped.push_str(CURRENCY_SYMBOL);

    let lead = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            grouped.push(THOUSANDS_SEPARATOR);
        }
        grouped.push(ch);
    }
    grouped
}

/// Compute the IVA owed on a subtotal, rounded half-up to a whole amount.
#[must_use]
pub fn tax_on(subtotal: u64) -> u64 {
    (Decimal::from(subtotal) * TAX_RATE)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_to_number_strips_symbols() {
        assert_eq!(price_to_number("$16.990"), 16990);
        assert_eq!(price_to_number("$ 1.250.000 CLP"), 1_250_000);
    }

    #[test]
    fn test_price_to_number_without_digits() {
        assert_eq!(price_to_number(""), 0);
        assert_eq!(price_to_number("gratis"), 0);
    }

    #[test]
    fn test_price_to_number_saturates() {
        assert_eq!(price_to_number("99999999999999999999999999"), u64::MAX);
    }

    #[test]
    fn test_format_price_groups_thousands() {
        assert_eq!(format_price(999), "$999");
        assert_eq!(format_price(1000), "$1.000");
        assert_eq!(format_price(16990), "$16.990");
        assert_eq!(format_price(123_456), "$123.456");
        assert_eq!(format_price(1_250_000), "$1.250.000");
    }

    #[test]
    fn test_format_then_parse_is_identity() {
        for value in [0, 7, 2975, 1_000_000, 4_294_967_296] {
            assert_eq!(price_to_number(&format_price(value)), value);
        }
    }

    #[test]
    fn test_tax_rounding() {
        assert_eq!(tax_on(2500), 475);
        // 0.19 * 50 = 9.5, rounds up
        assert_eq!(tax_on(50), 10);
        // 0.19 * 10 = 1.9
        assert_eq!(tax_on(10), 2);
        assert_eq!(tax_on(0), 0);
    }
}
