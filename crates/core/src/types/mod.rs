//! Core types for GMExpress.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod role;

pub use cart::{CartItem, ItemKind, NewCartItem};
pub use id::*;
pub use price::{TAX_RATE, format_price, price_to_number, tax_on};
pub use role::UserRole;
