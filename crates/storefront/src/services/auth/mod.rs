//! Authentication service.
//!
//! Credentials are checked by the database (`verify_customer`); this service
//! never hashes or compares passwords itself. Passwords stay wrapped in
//! [`SecretString`] until they are bound to the query.

mod error;

pub use error::AuthError;

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use bookstore_core::Username;

use super::finish;
use crate::db::{RepositoryError, Store, StoreTx};
use crate::models::{Identity, Membership};

/// Signup and login against the identity procedures.
pub struct IdentityService<'a, S: Store> {
    store: &'a S,
}

impl<'a, S: Store> IdentityService<'a, S> {
    /// Create a new identity service.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Register a new customer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername`, `AuthError::MissingPassword` or
    /// `AuthError::MissingName` for unusable input.
    /// Returns `AuthError::UsernameTaken` if the username is registered.
    #[instrument(skip(self, password, first_name, last_name))]
    pub async fn signup(
        &self,
        username: &str,
        password: &SecretString,
        first_name: &str,
        last_name: &str,
    ) -> Result<Username, AuthError> {
        let username = Username::parse(username)?;
        require_password(password)?;
        let first_name = require_name(first_name, "first name")?;
        let last_name = require_name(last_name, "last name")?;

        let mut tx = self.store.begin().await?;
        let result = tx
            .create_customer(&username, password, first_name, last_name)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UsernameTaken,
                other => AuthError::Repository(other),
            });
        finish(tx, result).await?;

        tracing::info!(%username, "Customer account created");
        Ok(username)
    }

    /// Check credentials and resolve the customer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a malformed username, a
    /// wrong password or an unknown customer.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Identity, AuthError> {
        let username = Username::parse(username).map_err(|_| AuthError::InvalidCredentials)?;
        if password.expose_secret().is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let mut tx = self.store.begin().await?;
        let result = async {
            if !tx.verify_customer(&username, password).await? {
                return Err(AuthError::InvalidCredentials);
            }
            tx.find_customer_id(&username)
                .await?
                .ok_or(AuthError::InvalidCredentials)
        }
        .await;
        let customer_id = finish(tx, result).await?;

        Ok(Identity::new(customer_id, username))
    }

    /// Membership standing for a customer, if the database has one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database call fails.
    #[instrument(skip(self, identity), fields(customer_id = %identity.customer_id))]
    pub async fn membership(&self, identity: &Identity) -> Result<Option<Membership>, AuthError> {
        let mut tx = self.store.begin().await?;
        let result = tx.get_membership_details(&identity.username).await;
        Ok(finish(tx, result).await?)
    }
}

fn require_password(password: &SecretString) -> Result<(), AuthError> {
    if password.expose_secret().is_empty() {
        return Err(AuthError::MissingPassword);
    }
    Ok(())
}

fn require_name<'n>(name: &'n str, field: &'static str) -> Result<&'n str, AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::MissingName(field));
    }
    Ok(name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::memory::MemoryStore;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[tokio::test]
    async fn test_signup_then_authenticate() {
        let store = MemoryStore::new();
        let auth = IdentityService::new(&store);

        let username = auth
            .signup("reader", &secret("hunter2"), "Ada", "Lovelace")
            .await
            .unwrap();
        assert_eq!(username.as_str(), "reader");

        let identity = auth.authenticate("reader", &secret("hunter2")).await.unwrap();
        assert_eq!(identity.username.as_str(), "reader");
    }

    #[tokio::test]
    async fn test_duplicate_signup_is_username_taken() {
        let store = MemoryStore::new();
        store.add_customer("reader", "pw");
        let auth = IdentityService::new(&store);

        let err = auth
            .signup("reader", &secret("other"), "Ada", "Lovelace")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));
        assert_eq!(err.code(), "username_taken");
    }

    #[tokio::test]
    async fn test_signup_rejects_blank_fields() {
        let store = MemoryStore::new();
        let auth = IdentityService::new(&store);

        assert!(matches!(
            auth.signup("", &secret("pw"), "Ada", "Lovelace").await,
            Err(AuthError::InvalidUsername(_))
        ));
        assert!(matches!(
            auth.signup("reader", &secret(""), "Ada", "Lovelace").await,
            Err(AuthError::MissingPassword)
        ));
        assert!(matches!(
            auth.signup("reader", &secret("pw"), " ", "Lovelace").await,
            Err(AuthError::MissingName("first name"))
        ));
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let store = MemoryStore::new();
        store.add_customer("reader", "right");
        let auth = IdentityService::new(&store);

        for (user, pass) in [("reader", "wrong"), ("nobody", "right"), ("bad name", "right")] {
            let err = auth.authenticate(user, &secret(pass)).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials), "{user}/{pass}");
        }
    }

    #[tokio::test]
    async fn test_storage_failure_is_not_reported_as_bad_password() {
        let store = MemoryStore::new();
        store.add_customer("reader", "right");
        store.fail_on("verify_customer");
        let auth = IdentityService::new(&store);

        let err = auth.authenticate("reader", &secret("right")).await.unwrap_err();
        assert!(matches!(err, AuthError::Repository(_)));
    }

    #[tokio::test]
    async fn test_membership_lookup() {
        let membership = Membership {
            loyalty_points: 10,
            discount_rate: Decimal::ZERO,
            membership_status: "Bronze".to_owned(),
            shipping_discount: Decimal::ZERO,
        };
        let store = MemoryStore::new().with_membership("reader", membership.clone());
        let customer_id = store.add_customer("reader", "pw");
        let auth = IdentityService::new(&store);

        let identity = Identity::new(customer_id, Username::parse("reader").unwrap());
        assert_eq!(auth.membership(&identity).await.unwrap(), Some(membership));
    }
}
