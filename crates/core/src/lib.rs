//! GMExpress Core - Shared types library.
//!
//! This crate provides common types used across all GMExpress components:
//! - `storefront` - Cart store backing the public shop
//! - `admin` - Administrative API (user deletion) and maintenance services
//! - `cli` - One-shot maintenance commands
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! platform access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - IDs, cart line items, roles, and CLP price handling

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
