//! Cart, branch and membership rows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use bookstore_core::{BookId, BranchId, Price};

/// One book in a customer's cart, as returned by `get_customer_cart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CartLine {
    pub book_id: BookId,
    pub title: String,
    pub quantity: i32,
    /// Unit price of the book.
    pub price: Decimal,
}

impl CartLine {
    /// Unit price times quantity, for display next to the line.
    ///
    /// The cart total shown to the customer always comes from
    /// `get_customer_cart_total`, never from summing these.
    #[must_use]
    pub fn line_price(&self) -> Price {
        Price::usd(self.price * Decimal::from(self.quantity))
    }
}

/// A store location that fulfils orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Branch {
    pub branch_id: BranchId,
    pub store_name: String,
}

/// A payment method offered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PaymentMethod {
    pub method: String,
}

/// Loyalty standing derived by the database from past orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Membership {
    pub loyalty_points: i32,
    pub discount_rate: Decimal,
    pub membership_status: String,
    pub shipping_discount: Decimal,
}
