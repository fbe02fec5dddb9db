//! Cart manager.
//!
//! A customer has at most one open cart. It is created lazily by the first
//! add, loses lines on removal, and is deleted as part of a completed
//! purchase. The fulfilment branch is stored per customer, independent of
//! whether the cart currently has lines.

use bookstore_core::{BookId, BranchId, CustomerId, Price, Quantity};
use tracing::instrument;

use super::{ServiceError, ValidationError, finish};
use crate::db::{RepositoryError, Store, StoreTx};
use crate::models::{Branch, CartLine};

/// Everything the cart page shows.
#[derive(Debug, Clone)]
pub struct CartPage {
    pub lines: Vec<CartLine>,
    pub total: Price,
    pub branches: Vec<Branch>,
    pub selected_branch: Option<Branch>,
}

/// Operations on a customer's open cart.
pub struct CartManager<'a, S: Store> {
    store: &'a S,
}

impl<'a, S: Store> CartManager<'a, S> {
    /// Create a cart manager over a store.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Lines in the customer's cart; empty if there is no cart.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the database call fails.
    #[instrument(skip(self))]
    pub async fn get_cart(&self, customer_id: CustomerId) -> Result<Vec<CartLine>, ServiceError> {
        let mut tx = self.store.begin().await?;
        let result = tx.get_customer_cart(customer_id).await;
        Ok(finish(tx, result).await?)
    }

    /// Cart total as computed by the database; zero for an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the database call fails.
    #[instrument(skip(self))]
    pub async fn get_cart_total(&self, customer_id: CustomerId) -> Result<Price, ServiceError> {
        let mut tx = self.store.begin().await?;
        let result = tx.get_customer_cart_total(customer_id).await;
        Ok(Price::usd(finish(tx, result).await?))
    }

    /// Create the customer's cart if they do not have one.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the customer does not exist.
    /// Returns `ServiceError::Storage` if the database call fails.
    #[instrument(skip(self))]
    pub async fn ensure_cart(&self, customer_id: CustomerId) -> Result<(), ServiceError> {
        let mut tx = self.store.begin().await?;
        let result = ensure_cart_in(&mut tx, customer_id)
            .await
            .map_err(|e| ServiceError::from_repository(e, "customer"));
        finish(tx, result).await
    }

    /// Add copies of a book, creating the cart first if needed.
    ///
    /// `raw_quantity` is the form text as submitted. It is validated before
    /// any database call. Adding a book already in the cart increases that
    /// line's quantity. Cart creation and the insert share one transaction.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if the quantity is not a positive
    /// whole number. Returns `ServiceError::NotFound` if the book does not
    /// exist. Returns `ServiceError::Storage` if any database call fails;
    /// nothing is left applied in that case.
    #[instrument(skip(self))]
    pub async fn add_line(
        &self,
        customer_id: CustomerId,
        book_id: BookId,
        raw_quantity: &str,
    ) -> Result<Quantity, ServiceError> {
        let quantity = Quantity::parse(raw_quantity).map_err(ValidationError::from)?;

        let mut tx = self.store.begin().await?;
        let result = async {
            ensure_cart_in(&mut tx, customer_id)
                .await
                .map_err(|e| ServiceError::from_repository(e, "customer"))?;
            tx.add_book_to_customer_cart(customer_id, book_id, quantity)
                .await
                .map_err(|e| ServiceError::from_repository(e, "book"))
        }
        .await;
        finish(tx, result).await?;

        tracing::info!(%customer_id, %book_id, %quantity, "Added book to cart");
        Ok(quantity)
    }

    /// Remove a book from the cart. Removing an absent book is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the database call fails.
    #[instrument(skip(self))]
    pub async fn remove_line(
        &self,
        customer_id: CustomerId,
        book_id: BookId,
    ) -> Result<(), ServiceError> {
        let mut tx = self.store.begin().await?;
        let result = tx
            .remove_book_from_customer_cart(customer_id, book_id)
            .await;
        Ok(finish(tx, result).await?)
    }

    /// Select the branch that will fulfil the customer's orders.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the branch does not exist.
    /// Returns `ServiceError::Storage` if the database call fails.
    #[instrument(skip(self))]
    pub async fn set_branch(
        &self,
        customer_id: CustomerId,
        branch_id: BranchId,
    ) -> Result<(), ServiceError> {
        let mut tx = self.store.begin().await?;
        let result = tx
            .update_customer_branch(customer_id, branch_id)
            .await
            .map_err(|e| ServiceError::from_repository(e, "branch"));
        finish(tx, result).await
    }

    /// The customer's selected branch.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no branch was ever selected.
    /// Returns `ServiceError::Storage` if the database call fails.
    #[instrument(skip(self))]
    pub async fn get_branch(&self, customer_id: CustomerId) -> Result<Branch, ServiceError> {
        let mut tx = self.store.begin().await?;
        let result = tx.get_customer_branch(customer_id).await;
        finish(tx, result)
            .await?
            .ok_or(ServiceError::NotFound("branch"))
    }

    /// Lines, total, branches and the selected branch, read together.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if any database call fails.
    #[instrument(skip(self))]
    pub async fn cart_page(&self, customer_id: CustomerId) -> Result<CartPage, ServiceError> {
        let mut tx = self.store.begin().await?;
        let result = async {
            Ok::<_, RepositoryError>(CartPage {
                lines: tx.get_customer_cart(customer_id).await?,
                total: Price::usd(tx.get_customer_cart_total(customer_id).await?),
                branches: tx.list_branches().await?,
                selected_branch: tx.get_customer_branch(customer_id).await?,
            })
        }
        .await;
        Ok(finish(tx, result).await?)
    }
}

/// Create a cart inside `tx` unless the customer already has one.
pub(crate) async fn ensure_cart_in<Tx: StoreTx>(
    tx: &mut Tx,
    customer_id: CustomerId,
) -> Result<(), RepositoryError> {
    if !tx.has_cart(customer_id).await? {
        tx.create_new_cart(customer_id).await?;
        tracing::debug!(%customer_id, "Created new cart");
    }
    Ok(())
}
