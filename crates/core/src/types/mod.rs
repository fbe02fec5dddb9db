//! Core types for the bookstore.
//!
//! Form input arrives as raw text; the parsers here are the single place where
//! that text becomes a value the storage layer will accept.

pub mod id;
pub mod price;
pub mod quantity;
pub mod rating;
pub mod username;

pub use id::*;
pub use price::{CurrencyCode, Price};
pub use quantity::{Quantity, QuantityError};
pub use rating::{Rating, RatingError};
pub use username::{Username, UsernameError};
