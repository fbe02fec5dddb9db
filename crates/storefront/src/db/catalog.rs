//! Catalog repository: books, categories, stock and reviews.
//!
//! Read-only; every query runs outside any explicit transaction.

use sqlx::PgPool;

use bookstore_core::BookId;

use super::RepositoryError;
use crate::models::{Book, BookCategory, BookStock, Review};

/// Repository for catalog reads.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All books, ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_books(&self) -> Result<Vec<Book>, RepositoryError> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT book_id, title, author, price, description FROM book ORDER BY title",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(books)
    }

    /// A single book.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_book(&self, book_id: BookId) -> Result<Option<Book>, RepositoryError> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT book_id, title, author, price, description FROM book WHERE book_id = $1",
        )
        .bind(book_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(book)
    }

    /// Reviews of a book, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn reviews(&self, book_id: BookId) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(
            r"
            SELECT customer_id, rating, review_text, review_date
            FROM review
            WHERE book_id = $1
            ORDER BY review_date DESC
            ",
        )
        .bind(book_id)
        .fetch_all(self.pool)
        .await?;
        Ok(reviews)
    }

    /// Categories a book belongs to.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories(&self, book_id: BookId) -> Result<Vec<BookCategory>, RepositoryError> {
        let categories = sqlx::query_as::<_, BookCategory>(
            "SELECT category_id, category_name FROM get_book_categories($1)",
        )
        .bind(book_id)
        .fetch_all(self.pool)
        .await?;
        Ok(categories)
    }

    /// Copies on hand at each branch.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stock(&self, book_id: BookId) -> Result<Vec<BookStock>, RepositoryError> {
        let stock = sqlx::query_as::<_, BookStock>(
            "SELECT store_name, quantity FROM get_book_stock($1)",
        )
        .bind(book_id)
        .fetch_all(self.pool)
        .await?;
        Ok(stock)
    }
}
