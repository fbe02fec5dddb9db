//! Customer repository: profile, wishlist, reviews and order history.

use sqlx::PgPool;

use bookstore_core::{BookId, CustomerId, Rating, Username};

use super::RepositoryError;
use crate::models::{
    CustomerProfile, OrderLine, OrderSummary, PaymentRecord, ProfileUpdate, WishlistEntry,
};

/// Repository for customer-owned data outside the cart.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Get a customer's profile by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_profile(
        &self,
        username: &Username,
    ) -> Result<Option<CustomerProfile>, RepositoryError> {
        let profile = sqlx::query_as::<_, CustomerProfile>(
            r"
            SELECT customer_id, username, first_name, middle_name, last_name,
                   email, phone_number, address, date_of_birth
            FROM customer
            WHERE username = $1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;
        Ok(profile)
    }

    /// Update profile fields through `update_customer`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a constraint violation.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        username: &Username,
        update: &ProfileUpdate,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT update_customer($1, $2, $3, $4, $5, $6, $7, $8)")
            .bind(username.as_str())
            .bind(&update.first_name)
            .bind(update.middle_name.as_deref())
            .bind(&update.last_name)
            .bind(update.email.as_deref())
            .bind(update.phone_number.as_deref())
            .bind(update.address.as_deref())
            .bind(update.date_of_birth)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::classify)?;

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Books on the customer's wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn wishlist(
        &self,
        username: &Username,
    ) -> Result<Vec<WishlistEntry>, RepositoryError> {
        let entries = sqlx::query_as::<_, WishlistEntry>(
            "SELECT book_id, title, author, price FROM get_customer_wishlist($1)",
        )
        .bind(username.as_str())
        .fetch_all(self.pool)
        .await?;
        Ok(entries)
    }

    /// Add a book to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the book does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_to_wishlist(
        &self,
        customer_id: CustomerId,
        book_id: BookId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT add_book_to_wishlist($1, $2)")
            .bind(customer_id)
            .bind(book_id)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::classify)?;
        tx.commit().await?;
        Ok(())
    }

    /// Remove a book from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_from_wishlist(
        &self,
        customer_id: CustomerId,
        book_id: BookId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT remove_book_from_wishlist($1, $2)")
            .bind(customer_id)
            .bind(book_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// Create or replace the customer's review of a book.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the book does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn upsert_review(
        &self,
        customer_id: CustomerId,
        book_id: BookId,
        rating: Rating,
        review_text: &str,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT add_or_update_review($1, $2, $3, $4)")
            .bind(customer_id)
            .bind(book_id)
            .bind(rating.get())
            .bind(review_text)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::classify)?;
        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// The customer's orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn orders(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        let orders = sqlx::query_as::<_, OrderSummary>(
            "SELECT order_id, order_date, store_name FROM get_customer_order_ids($1)",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;
        Ok(orders)
    }

    /// Books purchased across all of the customer's orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn order_lines(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<OrderLine>, RepositoryError> {
        let lines = sqlx::query_as::<_, OrderLine>(
            "SELECT order_id, book_id, title, quantity FROM get_customer_order_books($1)",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;
        Ok(lines)
    }

    /// Payments recorded against the customer's orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn payments(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<PaymentRecord>, RepositoryError> {
        let payments = sqlx::query_as::<_, PaymentRecord>(
            "SELECT order_id, payment_method, amount FROM get_customer_payment($1)",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;
        Ok(payments)
    }
}
