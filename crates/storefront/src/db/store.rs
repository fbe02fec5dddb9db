//! The stored-procedure surface, one transaction at a time.
//!
//! Every mutating storefront operation is a short sequence of procedure
//! calls that must commit together or not at all. [`Store::begin`] opens that
//! unit of work; the caller issues calls on the returned [`StoreTx`] and
//! finishes with [`StoreTx::commit`]. A transaction that is dropped without
//! being committed is rolled back.

use std::future::Future;

use rust_decimal::Decimal;
use secrecy::SecretString;

use bookstore_core::{BookId, BranchId, CustomerId, Quantity, Username};

use super::RepositoryError;
use crate::models::{Branch, CartLine, Membership, PaymentMethod};

/// Source of transactions against the bookstore database.
pub trait Store: Clone + Send + Sync + 'static {
    /// Transaction handle.
    type Tx: StoreTx;

    /// Open a new transaction.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx, RepositoryError>> + Send;
}

/// Procedure calls available inside a transaction.
pub trait StoreTx: Send + Sized {
    // =========================================================================
    // Identity
    // =========================================================================

    /// `create_customer`. Fails with `Conflict` if the username is taken.
    fn create_customer(
        &mut self,
        username: &Username,
        password: &SecretString,
        first_name: &str,
        last_name: &str,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// `verify_customer`. Opaque credential check.
    fn verify_customer(
        &mut self,
        username: &Username,
        password: &SecretString,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Map a username to its customer ID.
    fn find_customer_id(
        &mut self,
        username: &Username,
    ) -> impl Future<Output = Result<Option<CustomerId>, RepositoryError>> + Send;

    /// `get_membership_details`.
    fn get_membership_details(
        &mut self,
        username: &Username,
    ) -> impl Future<Output = Result<Option<Membership>, RepositoryError>> + Send;

    // =========================================================================
    // Cart
    // =========================================================================

    /// Whether the customer has an open cart, with or without lines.
    fn has_cart(
        &mut self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// `get_customer_cart`. Empty if there is no cart.
    fn get_customer_cart(
        &mut self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<Vec<CartLine>, RepositoryError>> + Send;

    /// `get_customer_cart_total`. Zero if the cart is empty or missing.
    fn get_customer_cart_total(
        &mut self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<Decimal, RepositoryError>> + Send;

    /// `create_new_cart`. Not idempotent; check [`StoreTx::has_cart`] first.
    fn create_new_cart(
        &mut self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// `add_book_to_customer_cart`. Adds to an existing line for the same book.
    fn add_book_to_customer_cart(
        &mut self,
        customer_id: CustomerId,
        book_id: BookId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// `remove_book_from_customer_cart`. No-op if the book is not in the cart.
    fn remove_book_from_customer_cart(
        &mut self,
        customer_id: CustomerId,
        book_id: BookId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// `delete_customer_cart`. Removes the cart and all its lines.
    fn delete_customer_cart(
        &mut self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    // =========================================================================
    // Branches
    // =========================================================================

    /// All store locations.
    fn list_branches(
        &mut self,
    ) -> impl Future<Output = Result<Vec<Branch>, RepositoryError>> + Send;

    /// `update_customer_branch`. Overwrites any previous selection.
    fn update_customer_branch(
        &mut self,
        customer_id: CustomerId,
        branch_id: BranchId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// `get_customer_branch`.
    fn get_customer_branch(
        &mut self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<Option<Branch>, RepositoryError>> + Send;

    // =========================================================================
    // Checkout
    // =========================================================================

    /// `get_payment_methods`.
    fn get_payment_methods(
        &mut self,
    ) -> impl Future<Output = Result<Vec<PaymentMethod>, RepositoryError>> + Send;

    /// `complete_purchase`. Creates the order and its payment record.
    fn complete_purchase(
        &mut self,
        customer_id: CustomerId,
        payment_method: &str,
        branch_id: BranchId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    // =========================================================================
    // Transaction control
    // =========================================================================

    /// Make every call in this transaction durable.
    fn commit(self) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Discard every call in this transaction.
    fn rollback(self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}
