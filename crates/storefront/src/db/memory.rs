//! In-memory store for service and router tests.
//!
//! Models the stored procedures closely enough to exercise the services:
//! carts, branches, purchases and credentials. A transaction works on a copy
//! of the data and only publishes it on commit, so an uncommitted or failed
//! transaction leaves nothing behind. Any call can be made to fail with
//! [`MemoryStore::fail_on`].

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};

use bookstore_core::{BookId, BranchId, CustomerId, OrderId, Quantity, Username};

use super::RepositoryError;
use super::store::{Store, StoreTx};
use crate::models::{Branch, CartLine, Membership, PaymentMethod};

/// An order created by `complete_purchase`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryOrder {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub branch_id: BranchId,
    pub payment_method: String,
    pub lines: Vec<(BookId, i32)>,
    pub total: Decimal,
}

#[derive(Debug, Clone)]
struct MemoryCustomer {
    id: CustomerId,
    username: String,
    password: String,
}

#[derive(Debug, Clone, Default)]
struct MemoryData {
    customers: Vec<MemoryCustomer>,
    books: BTreeMap<BookId, (String, Decimal)>,
    branches: Vec<Branch>,
    payment_methods: Vec<String>,
    memberships: HashMap<String, Membership>,
    /// Open carts; a present key with no lines is an empty cart.
    carts: HashMap<CustomerId, Vec<(BookId, i32)>>,
    selected_branch: HashMap<CustomerId, BranchId>,
    orders: Vec<MemoryOrder>,
    carts_created: usize,
}

/// Shared in-memory database.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<MemoryData>>,
    faults: Arc<Mutex<HashSet<&'static str>>>,
}

impl MemoryStore {
    /// An empty store offering `card` and `cash`.
    #[must_use]
    pub fn new() -> Self {
        let store = Self::default();
        store.data().payment_methods = vec!["card".to_owned(), "cash".to_owned()];
        store
    }

    fn data(&self) -> MutexGuard<'_, MemoryData> {
        self.data.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Add a book to the catalog.
    #[must_use]
    pub fn with_book(self, id: i32, title: &str, price: Decimal) -> Self {
        self.data()
            .books
            .insert(BookId::new(id), (title.to_owned(), price));
        self
    }

    /// Add a store location.
    #[must_use]
    pub fn with_branch(self, id: i32, store_name: &str) -> Self {
        self.data().branches.push(Branch {
            branch_id: BranchId::new(id),
            store_name: store_name.to_owned(),
        });
        self
    }

    /// Register membership details for a username.
    #[must_use]
    pub fn with_membership(self, username: &str, membership: Membership) -> Self {
        self.data()
            .memberships
            .insert(username.to_owned(), membership);
        self
    }

    /// Create a customer directly, bypassing signup.
    pub fn add_customer(&self, username: &str, password: &str) -> CustomerId {
        let mut data = self.data();
        let id = CustomerId::new(i32::try_from(data.customers.len()).unwrap_or(i32::MAX) + 1);
        data.customers.push(MemoryCustomer {
            id,
            username: username.to_owned(),
            password: password.to_owned(),
        });
        id
    }

    /// Make every later call to `operation` fail with a database error.
    pub fn fail_on(&self, operation: &'static str) {
        self.faults
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(operation);
    }

    /// Stop injecting failures.
    pub fn clear_faults(&self) {
        self.faults
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }

    /// Committed orders.
    #[must_use]
    pub fn orders(&self) -> Vec<MemoryOrder> {
        self.data().orders.clone()
    }

    /// Whether a committed cart exists for the customer.
    #[must_use]
    pub fn has_open_cart(&self, customer_id: CustomerId) -> bool {
        self.data().carts.contains_key(&customer_id)
    }

    /// How many times `create_new_cart` has been committed.
    #[must_use]
    pub fn carts_created(&self) -> usize {
        self.data().carts_created
    }

    fn check(&self, operation: &'static str) -> Result<(), RepositoryError> {
        let faults = self
            .faults
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if faults.contains(operation) {
            return Err(RepositoryError::Database(sqlx::Error::Protocol(format!(
                "injected failure in {operation}"
            ))));
        }
        Ok(())
    }
}

impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, RepositoryError> {
        self.check("begin")?;
        Ok(MemoryTx {
            store: self.clone(),
            working: self.data().clone(),
        })
    }
}

/// A transaction over a private copy of the data.
pub struct MemoryTx {
    store: MemoryStore,
    working: MemoryData,
}

fn injected(message: &str) -> RepositoryError {
    RepositoryError::Database(sqlx::Error::Protocol(message.to_owned()))
}

impl StoreTx for MemoryTx {
    async fn create_customer(
        &mut self,
        username: &Username,
        password: &SecretString,
        _first_name: &str,
        _last_name: &str,
    ) -> Result<(), RepositoryError> {
        self.store.check("create_customer")?;
        if self
            .working
            .customers
            .iter()
            .any(|c| c.username == username.as_str())
        {
            return Err(RepositoryError::Conflict("customer_username_key".to_owned()));
        }
        let id = CustomerId::new(
            i32::try_from(self.working.customers.len()).unwrap_or(i32::MAX) + 1,
        );
        self.working.customers.push(MemoryCustomer {
            id,
            username: username.as_str().to_owned(),
            password: password.expose_secret().to_owned(),
        });
        Ok(())
    }

    async fn verify_customer(
        &mut self,
        username: &Username,
        password: &SecretString,
    ) -> Result<bool, RepositoryError> {
        self.store.check("verify_customer")?;
        Ok(self.working.customers.iter().any(|c| {
            c.username == username.as_str() && c.password == password.expose_secret()
        }))
    }

    async fn find_customer_id(
        &mut self,
        username: &Username,
    ) -> Result<Option<CustomerId>, RepositoryError> {
        self.store.check("find_customer_id")?;
        Ok(self
            .working
            .customers
            .iter()
            .find(|c| c.username == username.as_str())
            .map(|c| c.id))
    }

    async fn get_membership_details(
        &mut self,
        username: &Username,
    ) -> Result<Option<Membership>, RepositoryError> {
        self.store.check("get_membership_details")?;
        Ok(self.working.memberships.get(username.as_str()).cloned())
    }

    async fn has_cart(&mut self, customer_id: CustomerId) -> Result<bool, RepositoryError> {
        self.store.check("has_cart")?;
        Ok(self.working.carts.contains_key(&customer_id))
    }

    async fn get_customer_cart(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Vec<CartLine>, RepositoryError> {
        self.store.check("get_customer_cart")?;
        let Some(lines) = self.working.carts.get(&customer_id) else {
            return Ok(Vec::new());
        };
        Ok(lines
            .iter()
            .map(|(book_id, quantity)| {
                let (title, price) = self
                    .working
                    .books
                    .get(book_id)
                    .cloned()
                    .unwrap_or_default();
                CartLine {
                    book_id: *book_id,
                    title,
                    quantity: *quantity,
                    price,
                }
            })
            .collect())
    }

    async fn get_customer_cart_total(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Decimal, RepositoryError> {
        self.store.check("get_customer_cart_total")?;
        let lines = self.get_customer_cart(customer_id).await?;
        Ok(lines
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum())
    }

    async fn create_new_cart(&mut self, customer_id: CustomerId) -> Result<(), RepositoryError> {
        self.store.check("create_new_cart")?;
        if self.working.carts.contains_key(&customer_id) {
            return Err(RepositoryError::Conflict("cart_customer_id_key".to_owned()));
        }
        self.working.carts.insert(customer_id, Vec::new());
        self.working.carts_created += 1;
        Ok(())
    }

    async fn add_book_to_customer_cart(
        &mut self,
        customer_id: CustomerId,
        book_id: BookId,
        quantity: Quantity,
    ) -> Result<(), RepositoryError> {
        self.store.check("add_book_to_customer_cart")?;
        if !self.working.books.contains_key(&book_id) {
            return Err(RepositoryError::NotFound);
        }
        let lines = self
            .working
            .carts
            .get_mut(&customer_id)
            .ok_or_else(|| injected("customer has no cart"))?;
        match lines.iter_mut().find(|(id, _)| *id == book_id) {
            Some((_, existing)) => *existing += quantity.get(),
            None => lines.push((book_id, quantity.get())),
        }
        Ok(())
    }

    async fn remove_book_from_customer_cart(
        &mut self,
        customer_id: CustomerId,
        book_id: BookId,
    ) -> Result<(), RepositoryError> {
        self.store.check("remove_book_from_customer_cart")?;
        if let Some(lines) = self.working.carts.get_mut(&customer_id) {
            lines.retain(|(id, _)| *id != book_id);
        }
        Ok(())
    }

    async fn delete_customer_cart(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<(), RepositoryError> {
        self.store.check("delete_customer_cart")?;
        self.working.carts.remove(&customer_id);
        Ok(())
    }

    async fn list_branches(&mut self) -> Result<Vec<Branch>, RepositoryError> {
        self.store.check("list_branches")?;
        Ok(self.working.branches.clone())
    }

    async fn update_customer_branch(
        &mut self,
        customer_id: CustomerId,
        branch_id: BranchId,
    ) -> Result<(), RepositoryError> {
        self.store.check("update_customer_branch")?;
        if !self
            .working
            .branches
            .iter()
            .any(|b| b.branch_id == branch_id)
        {
            return Err(RepositoryError::NotFound);
        }
        self.working.selected_branch.insert(customer_id, branch_id);
        Ok(())
    }

    async fn get_customer_branch(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Option<Branch>, RepositoryError> {
        self.store.check("get_customer_branch")?;
        let Some(branch_id) = self.working.selected_branch.get(&customer_id) else {
            return Ok(None);
        };
        Ok(self
            .working
            .branches
            .iter()
            .find(|b| b.branch_id == *branch_id)
            .cloned())
    }

    async fn get_payment_methods(&mut self) -> Result<Vec<PaymentMethod>, RepositoryError> {
        self.store.check("get_payment_methods")?;
        Ok(self
            .working
            .payment_methods
            .iter()
            .map(|method| PaymentMethod {
                method: method.clone(),
            })
            .collect())
    }

    async fn complete_purchase(
        &mut self,
        customer_id: CustomerId,
        payment_method: &str,
        branch_id: BranchId,
    ) -> Result<(), RepositoryError> {
        self.store.check("complete_purchase")?;
        if !self
            .working
            .payment_methods
            .iter()
            .any(|m| m == payment_method)
        {
            return Err(injected("unknown payment method"));
        }
        let total = self.get_customer_cart_total(customer_id).await?;
        let lines = self
            .working
            .carts
            .get(&customer_id)
            .filter(|lines| !lines.is_empty())
            .cloned()
            .ok_or_else(|| injected("cart is empty"))?;
        let order_id = OrderId::new(
            i32::try_from(self.working.orders.len()).unwrap_or(i32::MAX) + 1,
        );
        self.working.orders.push(MemoryOrder {
            order_id,
            customer_id,
            branch_id,
            payment_method: payment_method.to_owned(),
            lines,
            total,
        });
        Ok(())
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        self.store.check("commit")?;
        *self.store.data() = self.working;
        Ok(())
    }

    async fn rollback(self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
