//! Cart totals.

use gmexpress_core::{CartItem, format_price, tax_on};
use serde::Serialize;

/// Formatted totals for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Subtotal before tax, formatted.
    pub subtotal: String,
    /// IVA, formatted.
    pub tax: String,
    /// Subtotal plus IVA, formatted.
    pub total: String,
    /// Sum of all line quantities (not the number of lines).
    pub item_count: u64,
}

/// Sum of `price_number * quantity` over the lines.
#[must_use]
pub fn subtotal(items: &[CartItem]) -> u64 {
    items
        .iter()
        .fold(0_u64, |sum, item| sum.saturating_add(item.line_total()))
}

/// Subtotal plus the IVA on it.
#[must_use]
pub fn total(items: &[CartItem]) -> u64 {
    let subtotal = subtotal(items);
    subtotal.saturating_add(tax_on(subtotal))
}

/// Sum of all line quantities.
#[must_use]
pub fn item_count(items: &[CartItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity)).sum()
}

/// Compute the formatted totals for a list of lines.
#[must_use]
pub fn summarize(items: &[CartItem]) -> CartTotals {
    let subtotal = subtotal(items);
    let tax = tax_on(subtotal);

    CartTotals {
        subtotal: format_price(subtotal),
        tax: format_price(tax),
        total: format_price(subtotal.saturating_add(tax)),
        item_count: item_count(items),
    }
}

#[cfg(test)]
mod tests {
    use gmexpress_core::{ItemKind, NewCartItem};

    use super::*;

    fn line(id: &str, price_number: u64, quantity: u32) -> CartItem {
        NewCartItem::new(id, id, "", ItemKind::Product)
            .with_price_number(price_number)
            .with_quantity(quantity)
            .into_cart_item()
    }

    #[test]
    fn test_subtotal_tax_total() {
        let items = [line("a", 1000, 2), line("b", 500, 1)];
        assert_eq!(subtotal(&items), 2500);
        assert_eq!(tax_on(subtotal(&items)), 475);
        assert_eq!(total(&items), 2975);
    }

    #[test]
    fn test_empty_cart() {
        assert_eq!(subtotal(&[]), 0);
        assert_eq!(total(&[]), 0);
        assert_eq!(
            summarize(&[]),
            CartTotals {
                subtotal: "$0".to_owned(),
                tax: "$0".to_owned(),
                total: "$0".to_owned(),
                item_count: 0,
            }
        );
    }

    #[test]
    fn test_summarize_counts_units() {
        let items = [line("a", 16990, 3), line("b", 2000, 1)];
        let totals = summarize(&items);

        assert_eq!(totals.subtotal, "$52.970");
        assert_eq!(totals.tax, "$10.064");
        assert_eq!(totals.total, "$63.034");
        assert_eq!(totals.item_count, 4);
    }
}
