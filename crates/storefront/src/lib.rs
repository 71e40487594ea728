//! GMExpress Storefront library.
//!
//! Holds the shopping cart state used by the public shop: line items kept in
//! a persisted slot, merged by `(id, type)`, with IVA-inclusive totals.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;

pub use cart::{CartStore, CartTotals, CartUpdated};
