//! Bookstore storefront library.
//!
//! The binary in `main.rs` wires configuration, tracing and Sentry around
//! [`app::build_router`]; the integration tests drive the same router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod flash;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
