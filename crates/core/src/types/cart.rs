//! Cart line-item types.
//!
//! These are the persisted shape of the storefront cart. Field names are
//! camelCase on the wire (`priceNumber`) so carts saved by earlier storefront
//! releases keep deserializing. Lines that no longer fit these types (a
//! fractional quantity, say) are dropped one by one by the cart store.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::price_to_number;

/// Kind of catalog entry a line item refers to.
///
/// Serialized with the catalog's Spanish names; the English spellings are
/// accepted when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    #[serde(rename = "producto", alias = "product")]
    Product,
    #[serde(rename = "servicio", alias = "service")]
    Service,
}

impl ItemKind {
    /// Wire name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "producto",
            Self::Service => "servicio",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single line in the cart.
///
/// `(id, kind)` identifies the line: the same product ID with a different
/// kind is a distinct line. `quantity` is never zero for a stored line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Catalog document ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Formatted display price (e.g. `"$16.990"`).
    pub price: String,
    /// Unit price in whole pesos.
    pub price_number: u64,
    /// Units of this line.
    pub quantity: u32,
    /// Product or service.
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// Image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Stock available when the item was added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
}

impl CartItem {
    /// Whether this line is the same `(id, kind)` as the given pair.
    #[must_use]
    pub fn matches(&self, id: &ProductId, kind: ItemKind) -> bool {
        self.kind == kind && &self.id == id
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> u64 {
        self.price_number.saturating_mul(u64::from(self.quantity))
    }
}

/// An item about to be added to the cart.
///
/// `quantity` and `price_number` are optional: a missing (or zero) quantity
/// means one unit, and a missing (or zero) unit price is derived from the
/// display `price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub price_number: Option<u64>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
}

impl NewCartItem {
    /// Create a new item with the required fields.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: impl Into<String>,
        kind: ItemKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: price.into(),
            price_number: None,
            quantity: None,
            kind,
            image: None,
            stock: None,
        }
    }

    /// Set an explicit unit price.
    #[must_use]
    pub const fn with_price_number(mut self, price_number: u64) -> Self {
        self.price_number = Some(price_number);
        self
    }

    /// Set the quantity to add.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Set the image URL.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Set the known stock.
    #[must_use]
    pub const fn with_stock(mut self, stock: i64) -> Self {
        self.stock = Some(stock);
        self
    }

    /// Units this item contributes, never less than one.
    #[must_use]
    pub fn effective_quantity(&self) -> u32 {
        self.quantity.filter(|&q| q > 0).unwrap_or(1)
    }

    /// Unit price, falling back to parsing the display price.
    #[must_use]
    pub fn effective_price_number(&self) -> u64 {
        self.price_number
            .filter(|&p| p > 0)
            .unwrap_or_else(|| price_to_number(&self.price))
    }

    /// Convert into a stored cart line.
    #[must_use]
    pub fn into_cart_item(self) -> CartItem {
        let quantity = self.effective_quantity();
        let price_number = self.effective_price_number();
        CartItem {
            id: self.id,
            name: self.name,
            price: self.price,
            price_number,
            quantity,
            kind: self.kind,
            image: self.image,
            stock: self.stock,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_shape() {
        let item = NewCartItem::new("p1", "Pizza", "$16.990", ItemKind::Product).into_cart_item();
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": "p1",
                "name": "Pizza",
                "price": "$16.990",
                "priceNumber": 16990,
                "quantity": 1,
                "type": "producto",
            })
        );
    }

    #[test]
    fn test_reads_english_kind_alias() {
        let item: CartItem = serde_json::from_str(
            r#"{"id":"s1","name":"Delivery","price":"$2.000","priceNumber":2000,"quantity":2,"type":"service"}"#,
        )
        .unwrap();
        assert_eq!(item.kind, ItemKind::Service);
        assert_eq!(item.line_total(), 4000);
    }

    #[test]
    fn test_zero_quantity_means_one() {
        let item = NewCartItem::new("p1", "Pizza", "$100", ItemKind::Product).with_quantity(0);
        assert_eq!(item.effective_quantity(), 1);
    }

    #[test]
    fn test_explicit_price_number_wins() {
        let item = NewCartItem::new("p1", "Pizza", "$100", ItemKind::Product).with_price_number(90);
        assert_eq!(item.effective_price_number(), 90);

        let derived = NewCartItem::new("p1", "Pizza", "$100", ItemKind::Product).with_price_number(0);
        assert_eq!(derived.effective_price_number(), 100);
    }

    #[test]
    fn test_matches_requires_same_kind() {
        let item = NewCartItem::new("p1", "Pizza", "$100", ItemKind::Product).into_cart_item();
        assert!(item.matches(&ProductId::new("p1"), ItemKind::Product));
        assert!(!item.matches(&ProductId::new("p1"), ItemKind::Service));
    }
}
