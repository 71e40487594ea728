//! GMExpress Admin library.
//!
//! This crate provides the admin functionality as a library,
//! allowing it to be tested and reused by `gm-cli`.
//!
//! # Security
//!
//! This crate holds privileged platform access:
//! - Identity provider account deletion and listing
//! - Document database writes (`users`, `categories`)
//!
//! Every destructive HTTP operation re-checks the caller's `admin` role.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod platform;
pub mod routes;
pub mod services;
pub mod state;
