//! Business services for the storefront.
//!
//! Services own transaction boundaries: each public operation opens one
//! transaction on a [`Store`](crate::db::Store), issues its procedure calls
//! and commits only if every call succeeded.
//!
//! - [`auth`] - signup, credential checks and membership lookups
//! - [`cart`] - the customer's open cart and fulfilment branch
//! - [`checkout`] - checkout review and purchase completion

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod error;

pub use auth::{AuthError, IdentityService};
pub use cart::{CartManager, CartPage};
pub use checkout::{CheckoutOrchestrator, CheckoutReview, CheckoutStage, Receipt};
pub use error::{ServiceError, ValidationError};

use crate::db::{RepositoryError, StoreTx};

/// Commit `tx` if `result` is `Ok`, roll it back otherwise.
///
/// A failed commit is reported as the operation's error. A failed rollback is
/// only logged: the original error is the one the caller needs, and the
/// database discards the transaction when the connection is released anyway.
pub(crate) async fn finish<Tx, T, E>(tx: Tx, result: Result<T, E>) -> Result<T, E>
where
    Tx: StoreTx,
    E: From<RepositoryError>,
{
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "Failed to roll back transaction");
            }
            Err(err)
        }
    }
}
