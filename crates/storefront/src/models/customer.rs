//! Customer profile, wishlist and order history rows.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use bookstore_core::{BookId, CustomerId, OrderId};

/// A customer's profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CustomerProfile {
    pub customer_id: CustomerId,
    pub username: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Profile fields submitted from the personal info form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// A book on the customer's wishlist (`get_customer_wishlist`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WishlistEntry {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub price: Decimal,
}

/// A completed order (`get_customer_order_ids`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub order_date: NaiveDate,
    pub store_name: Option<String>,
}

/// A book purchased in an order (`get_customer_order_books`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OrderLine {
    pub order_id: OrderId,
    pub book_id: BookId,
    pub title: String,
    pub quantity: i32,
}

/// Payment recorded for an order (`get_customer_payment`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PaymentRecord {
    pub order_id: OrderId,
    pub payment_method: String,
    pub amount: Decimal,
}
