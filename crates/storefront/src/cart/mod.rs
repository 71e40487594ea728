//! Shopping cart store.
//!
//! The cart is a list of line items persisted in a single key/value slot
//! (`gmexpress-cart`). The store holds no copy of the list: each call reads
//! the slot, applies its change, writes the slot back, and publishes a
//! `cart-updated` event. Two stores sharing one slot therefore always see the
//! last write, with no merging between concurrent writers.
//!
//! Failures never reach the caller. A missing medium or unreadable contents
//! read as an empty cart, a single unreadable line is skipped, and a rejected
//! write is logged and dropped. Without a medium nothing is published.
//!
//! # Example
//!
//! ```
//! use gmexpress_core::{ItemKind, NewCartItem};
//! use gmexpress_storefront::cart::{CartStore, MemoryStorage};
//!
//! let cart = CartStore::new(MemoryStorage::new());
//! cart.add(NewCartItem::new("p1", "Pizza", "$16.990", ItemKind::Product));
//! cart.add(NewCartItem::new("p1", "Pizza", "$16.990", ItemKind::Product).with_quantity(2));
//!
//! assert_eq!(cart.get()[0].quantity, 3);
//! assert_eq!(cart.totals().total, "$60.654");
//! ```

mod events;
mod storage;
mod totals;

pub use events::{CART_UPDATED_EVENT, CartEvents, CartUpdated, SubscriptionId};
pub use storage::{CartStorage, FileStorage, MemoryStorage, NullStorage, StorageError};
pub use totals::{CartTotals, item_count, subtotal, summarize, total};

use std::sync::Arc;

use gmexpress_core::{CartItem, NewCartItem, tax_on};
use tracing::instrument;

/// Name of the persisted slot.
pub const CART_STORAGE_KEY: &str = "gmexpress-cart";

/// Cart operations over a persisted slot.
pub struct CartStore<S> {
    storage: S,
    events: Arc<CartEvents>,
}

impl<S> std::fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &CART_STORAGE_KEY)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl<S: CartStorage> CartStore<S> {
    /// Create a store with its own subscriber list.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::with_events(storage, Arc::new(CartEvents::new()))
    }

    /// Create a store publishing to an existing subscriber list.
    #[must_use]
    pub const fn with_events(storage: S, events: Arc<CartEvents>) -> Self {
        Self { storage, events }
    }

    /// Subscriber list this store publishes to.
    #[must_use]
    pub fn events(&self) -> &Arc<CartEvents> {
        &self.events
    }

    /// Shorthand for `events().subscribe(..)`.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&CartUpdated) + Send + Sync + 'static,
    {
        self.events.subscribe(callback)
    }

    /// Current lines, or an empty list if nothing usable is stored.
    #[must_use]
    pub fn get(&self) -> Vec<CartItem> {
        let raw = match self.storage.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = CART_STORAGE_KEY, error = %e, "Cart storage unreadable");
                return Vec::new();
            }
        };

        let lines: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(key = CART_STORAGE_KEY, error = %e, "Discarding corrupt cart data");
                return Vec::new();
            }
        };

        lines
            .into_iter()
            .enumerate()
            .filter_map(|(index, line)| match serde_json::from_value::<CartItem>(line) {
                Ok(item) if item.quantity > 0 => Some(item),
                Ok(_) => {
                    tracing::warn!(index, "Dropping cart line with zero quantity");
                    None
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "Dropping unreadable cart line");
                    None
                }
            })
            .collect()
    }

    /// Overwrite the slot and notify subscribers.
    ///
    /// A failed write is logged and nobody is notified. Without a storage
    /// medium nothing is written or published.
    #[instrument(skip_all, fields(lines = items.len()))]
    pub fn save(&self, items: &[CartItem]) {
        if !self.storage.is_available() {
            return;
        }

        let raw = match serde_json::to_string(items) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize cart");
                return;
            }
        };

        if let Err(e) = self.storage.write(&raw) {
            tracing::error!(key = CART_STORAGE_KEY, error = %e, "Failed to save cart");
            return;
        }

        self.events.publish(&CartUpdated {
            items: items.to_vec(),
        });
    }

    /// Add an item, merging into the line with the same `(id, kind)`.
    #[instrument(skip_all, fields(id = %item.id, kind = %item.kind))]
    pub fn add(&self, item: NewCartItem) {
        let mut items = self.get();
        let quantity = item.effective_quantity();

        if let Some(existing) = items
            .iter_mut()
            .find(|line| line.matches(&item.id, item.kind))
        {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            items.push(item.into_cart_item());
        }

        self.save(&items);
    }

    /// Remove the line at `index`. Out-of-range indices do nothing.
    ///
    /// Returns whether a line was removed.
    pub fn remove(&self, index: usize) -> bool {
        let mut items = self.get();
        if index >= items.len() {
            return false;
        }

        items.remove(index);
        self.save(&items);
        true
    }

    /// Set the quantity of the line at `index`; zero or less removes it.
    ///
    /// Out-of-range indices do nothing. Returns whether the cart changed.
    pub fn update(&self, index: usize, quantity: i64) -> bool {
        let mut items = self.get();
        if index >= items.len() {
            return false;
        }

        if quantity <= 0 {
            items.remove(index);
        } else if let Some(line) = items.get_mut(index) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }

        self.save(&items);
        true
    }

    /// Empty the cart.
    pub fn clear(&self) {
        self.save(&[]);
    }

    /// Subtotal of `items`, or of the current lines when `None`.
    #[must_use]
    pub fn subtotal(&self, items: Option<&[CartItem]>) -> u64 {
        match items {
            Some(items) => subtotal(items),
            None => subtotal(&self.get()),
        }
    }

    /// IVA on `subtotal`, or on the current subtotal when `None`.
    #[must_use]
    pub fn tax(&self, subtotal: Option<u64>) -> u64 {
        tax_on(subtotal.unwrap_or_else(|| self.subtotal(None)))
    }

    /// Subtotal plus IVA of `items`, or of the current lines when `None`.
    #[must_use]
    pub fn total(&self, items: Option<&[CartItem]>) -> u64 {
        match items {
            Some(items) => total(items),
            None => total(&self.get()),
        }
    }

    /// Formatted totals of the current lines.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        summarize(&self.get())
    }
}

impl Default for CartStore<NullStorage> {
    fn default() -> Self {
        Self::new(NullStorage)
    }
}
