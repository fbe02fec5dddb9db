//! Bookstore Core - shared domain types.
//!
//! Used by the storefront server and its integration tests. The crate holds
//! only types and parsing rules: no I/O, no database access, no HTTP.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, validated form inputs (quantity, rating, username)
//!   and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
