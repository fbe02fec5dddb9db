//! Catalog rows: books, categories, stock and reviews.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use bookstore_core::{BookId, CategoryId, CustomerId};

/// A book in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub price: Decimal,
    pub description: Option<String>,
}

/// A category a book is filed under (`get_book_categories`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BookCategory {
    pub category_id: CategoryId,
    pub category_name: String,
}

/// Copies of a book on hand at one branch (`get_book_stock`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BookStock {
    pub store_name: String,
    pub quantity: i32,
}

/// A customer review of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub customer_id: CustomerId,
    pub rating: i16,
    pub review_text: Option<String>,
    pub review_date: NaiveDate,
}
