//! Domain models for the storefront.
//!
//! Row types decoded from the bookstore's stored procedures and tables, plus
//! the identity kept in the session.

pub mod cart;
pub mod catalog;
pub mod customer;
pub mod session;

pub use cart::{Branch, CartLine, Membership, PaymentMethod};
pub use catalog::{Book, BookCategory, BookStock, Review};
pub use customer::{
    CustomerProfile, OrderLine, OrderSummary, PaymentRecord, ProfileUpdate, WishlistEntry,
};
pub use session::{Identity, keys as session_keys};
