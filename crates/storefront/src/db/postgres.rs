//! `PostgreSQL` implementation of the procedure surface.
//!
//! Each call is a `SELECT` of a stored procedure bound with typed parameters.
//! Procedures that return `void` are run with `execute`; set-returning ones
//! are decoded into the row types in [`crate::models`].

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use sqlx::{PgPool, Postgres, Transaction};

use bookstore_core::{BookId, BranchId, CustomerId, Quantity, Username};

use super::RepositoryError;
use super::store::{Store, StoreTx};
use crate::models::{Branch, CartLine, Membership, PaymentMethod};

/// Store backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Store for PgStore {
    type Tx = PgTx;

    async fn begin(&self) -> Result<PgTx, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(PgTx { tx })
    }
}

/// An open `PostgreSQL` transaction.
///
/// Dropping it without calling [`StoreTx::commit`] rolls back.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

impl StoreTx for PgTx {
    async fn create_customer(
        &mut self,
        username: &Username,
        password: &SecretString,
        first_name: &str,
        last_name: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query("SELECT create_customer($1, $2, $3, $4)")
            .bind(username.as_str())
            .bind(password.expose_secret())
            .bind(first_name)
            .bind(last_name)
            .execute(&mut *self.tx)
            .await
            .map_err(RepositoryError::classify)?;
        Ok(())
    }

    async fn verify_customer(
        &mut self,
        username: &Username,
        password: &SecretString,
    ) -> Result<bool, RepositoryError> {
        let verified = sqlx::query_scalar::<_, Option<bool>>("SELECT verify_customer($1, $2)")
            .bind(username.as_str())
            .bind(password.expose_secret())
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(verified.unwrap_or(false))
    }

    async fn find_customer_id(
        &mut self,
        username: &Username,
    ) -> Result<Option<CustomerId>, RepositoryError> {
        let id = sqlx::query_scalar::<_, CustomerId>(
            "SELECT customer_id FROM customer WHERE username = $1",
        )
        .bind(username.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn get_membership_details(
        &mut self,
        username: &Username,
    ) -> Result<Option<Membership>, RepositoryError> {
        let membership = sqlx::query_as::<_, Membership>(
            r"
            SELECT loyalty_points, discount_rate, membership_status, shipping_discount
            FROM get_membership_details($1)
            ",
        )
        .bind(username.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(membership)
    }

    async fn has_cart(&mut self, customer_id: CustomerId) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM cart WHERE customer_id = $1)",
        )
        .bind(customer_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(exists)
    }

    async fn get_customer_cart(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Vec<CartLine>, RepositoryError> {
        let lines = sqlx::query_as::<_, CartLine>(
            "SELECT book_id, title, quantity, price FROM get_customer_cart($1)",
        )
        .bind(customer_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(lines)
    }

    async fn get_customer_cart_total(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Decimal, RepositoryError> {
        let total = sqlx::query_scalar::<_, Option<Decimal>>(
            "SELECT * FROM get_customer_cart_total($1)",
        )
        .bind(customer_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }

    async fn create_new_cart(&mut self, customer_id: CustomerId) -> Result<(), RepositoryError> {
        sqlx::query("SELECT create_new_cart($1)")
            .bind(customer_id)
            .execute(&mut *self.tx)
            .await
            .map_err(RepositoryError::classify)?;
        Ok(())
    }

    async fn add_book_to_customer_cart(
        &mut self,
        customer_id: CustomerId,
        book_id: BookId,
        quantity: Quantity,
    ) -> Result<(), RepositoryError> {
        sqlx::query("SELECT add_book_to_customer_cart($1, $2, $3)")
            .bind(customer_id)
            .bind(book_id)
            .bind(quantity.get())
            .execute(&mut *self.tx)
            .await
            .map_err(RepositoryError::classify)?;
        Ok(())
    }

    async fn remove_book_from_customer_cart(
        &mut self,
        customer_id: CustomerId,
        book_id: BookId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("SELECT remove_book_from_customer_cart($1, $2)")
            .bind(customer_id)
            .bind(book_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_customer_cart(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("SELECT delete_customer_cart($1)")
            .bind(customer_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn list_branches(&mut self) -> Result<Vec<Branch>, RepositoryError> {
        let branches = sqlx::query_as::<_, Branch>(
            "SELECT location_id AS branch_id, store_name FROM store_location ORDER BY store_name",
        )
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(branches)
    }

    async fn update_customer_branch(
        &mut self,
        customer_id: CustomerId,
        branch_id: BranchId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("SELECT update_customer_branch($1, $2)")
            .bind(customer_id)
            .bind(branch_id)
            .execute(&mut *self.tx)
            .await
            .map_err(RepositoryError::classify)?;
        Ok(())
    }

    async fn get_customer_branch(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Option<Branch>, RepositoryError> {
        // The procedure yields a row of NULLs when nothing was selected.
        let row = sqlx::query_as::<_, (Option<BranchId>, Option<String>)>(
            "SELECT branch_id, store_name FROM get_customer_branch($1)",
        )
        .bind(customer_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(match row {
            Some((Some(branch_id), store_name)) => Some(Branch {
                branch_id,
                store_name: store_name.unwrap_or_default(),
            }),
            _ => None,
        })
    }

    async fn get_payment_methods(&mut self) -> Result<Vec<PaymentMethod>, RepositoryError> {
        let methods = sqlx::query_as::<_, PaymentMethod>("SELECT method FROM get_payment_methods()")
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(methods)
    }

    async fn complete_purchase(
        &mut self,
        customer_id: CustomerId,
        payment_method: &str,
        branch_id: BranchId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("SELECT complete_purchase($1, $2, $3)")
            .bind(customer_id)
            .bind(payment_method)
            .bind(branch_id)
            .execute(&mut *self.tx)
            .await
            .map_err(RepositoryError::classify)?;
        Ok(())
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), RepositoryError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
