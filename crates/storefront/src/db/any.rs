//! Runtime choice of store backend.
//!
//! Handlers hold one concrete state type, so the store behind it is picked
//! at startup: `PostgreSQL` in production, and with the `test-support`
//! feature the in-memory store, which lets the router be driven end to end
//! without a database.

use rust_decimal::Decimal;
use secrecy::SecretString;

use bookstore_core::{BookId, BranchId, CustomerId, Quantity, Username};

use super::RepositoryError;
#[cfg(any(test, feature = "test-support"))]
use super::memory::{MemoryStore, MemoryTx};
use super::postgres::{PgStore, PgTx};
use super::store::{Store, StoreTx};
use crate::models::{Branch, CartLine, Membership, PaymentMethod};

/// A store chosen at startup.
#[derive(Clone)]
pub enum AnyStore {
    Postgres(PgStore),
    #[cfg(any(test, feature = "test-support"))]
    Memory(MemoryStore),
}

impl From<PgStore> for AnyStore {
    fn from(store: PgStore) -> Self {
        Self::Postgres(store)
    }
}

#[cfg(any(test, feature = "test-support"))]
impl From<MemoryStore> for AnyStore {
    fn from(store: MemoryStore) -> Self {
        Self::Memory(store)
    }
}

/// A transaction on whichever backend opened it.
pub enum AnyTx {
    Postgres(PgTx),
    #[cfg(any(test, feature = "test-support"))]
    Memory(MemoryTx),
}

/// Forward a call to the active backend.
macro_rules! dispatch {
    ($value:expr, $tx:ident => $call:expr) => {
        match $value {
            AnyTx::Postgres($tx) => $call.await,
            #[cfg(any(test, feature = "test-support"))]
            AnyTx::Memory($tx) => $call.await,
        }
    };
}

impl Store for AnyStore {
    type Tx = AnyTx;

    async fn begin(&self) -> Result<AnyTx, RepositoryError> {
        match self {
            Self::Postgres(store) => store.begin().await.map(AnyTx::Postgres),
            #[cfg(any(test, feature = "test-support"))]
            Self::Memory(store) => store.begin().await.map(AnyTx::Memory),
        }
    }
}

impl StoreTx for AnyTx {
    async fn create_customer(
        &mut self,
        username: &Username,
        password: &SecretString,
        first_name: &str,
        last_name: &str,
    ) -> Result<(), RepositoryError> {
        dispatch!(self, tx => tx.create_customer(username, password, first_name, last_name))
    }

    async fn verify_customer(
        &mut self,
        username: &Username,
        password: &SecretString,
    ) -> Result<bool, RepositoryError> {
        dispatch!(self, tx => tx.verify_customer(username, password))
    }

    async fn find_customer_id(
        &mut self,
        username: &Username,
    ) -> Result<Option<CustomerId>, RepositoryError> {
        dispatch!(self, tx => tx.find_customer_id(username))
    }

    async fn get_membership_details(
        &mut self,
        username: &Username,
    ) -> Result<Option<Membership>, RepositoryError> {
        dispatch!(self, tx => tx.get_membership_details(username))
    }

    async fn has_cart(&mut self, customer_id: CustomerId) -> Result<bool, RepositoryError> {
        dispatch!(self, tx => tx.has_cart(customer_id))
    }

    async fn get_customer_cart(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Vec<CartLine>, RepositoryError> {
        dispatch!(self, tx => tx.get_customer_cart(customer_id))
    }

    async fn get_customer_cart_total(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Decimal, RepositoryError> {
        dispatch!(self, tx => tx.get_customer_cart_total(customer_id))
    }

    async fn create_new_cart(&mut self, customer_id: CustomerId) -> Result<(), RepositoryError> {
        dispatch!(self, tx => tx.create_new_cart(customer_id))
    }

    async fn add_book_to_customer_cart(
        &mut self,
        customer_id: CustomerId,
        book_id: BookId,
        quantity: Quantity,
    ) -> Result<(), RepositoryError> {
        dispatch!(self, tx => tx.add_book_to_customer_cart(customer_id, book_id, quantity))
    }

    async fn remove_book_from_customer_cart(
        &mut self,
        customer_id: CustomerId,
        book_id: BookId,
    ) -> Result<(), RepositoryError> {
        dispatch!(self, tx => tx.remove_book_from_customer_cart(customer_id, book_id))
    }

    async fn delete_customer_cart(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<(), RepositoryError> {
        dispatch!(self, tx => tx.delete_customer_cart(customer_id))
    }

    async fn list_branches(&mut self) -> Result<Vec<Branch>, RepositoryError> {
        dispatch!(self, tx => tx.list_branches())
    }

    async fn update_customer_branch(
        &mut self,
        customer_id: CustomerId,
        branch_id: BranchId,
    ) -> Result<(), RepositoryError> {
        dispatch!(self, tx => tx.update_customer_branch(customer_id, branch_id))
    }

    async fn get_customer_branch(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Option<Branch>, RepositoryError> {
        dispatch!(self, tx => tx.get_customer_branch(customer_id))
    }

    async fn get_payment_methods(&mut self) -> Result<Vec<PaymentMethod>, RepositoryError> {
        dispatch!(self, tx => tx.get_payment_methods())
    }

    async fn complete_purchase(
        &mut self,
        customer_id: CustomerId,
        payment_method: &str,
        branch_id: BranchId,
    ) -> Result<(), RepositoryError> {
        dispatch!(self, tx => tx.complete_purchase(customer_id, payment_method, branch_id))
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        dispatch!(self, tx => tx.commit())
    }

    async fn rollback(self) -> Result<(), RepositoryError> {
        dispatch!(self, tx => tx.rollback())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_commits_through_dispatch() {
        let memory = MemoryStore::new();
        let customer = memory.add_customer("reader", "secret");
        let store = AnyStore::from(memory.clone());

        let mut tx = store.begin().await.unwrap();
        tx.create_new_cart(customer).await.unwrap();
        tx.commit().await.unwrap();
        assert!(memory.has_open_cart(customer));

        let mut tx = store.begin().await.unwrap();
        tx.delete_customer_cart(customer).await.unwrap();
        tx.rollback().await.unwrap();
        assert!(memory.has_open_cart(customer));
    }

    #[tokio::test]
    async fn test_memory_backend_faults_pass_through() {
        let memory = MemoryStore::new();
        memory.fail_on("begin");
        let store = AnyStore::from(memory);
        assert!(matches!(
            store.begin().await,
            Err(RepositoryError::Database(_))
        ));
    }
}
