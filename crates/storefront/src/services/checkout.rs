//! Checkout orchestrator.
//!
//! Checkout is two requests. The review request shows the cart, the selected
//! branch and the payment methods. The payment request turns the cart into an
//! order: it resolves the branch, records the purchase and deletes the cart,
//! all in one transaction. Either the order exists and the cart is gone, or
//! the cart is untouched and no order exists.

use serde::Serialize;
use tracing::instrument;

use bookstore_core::Price;

use super::{ServiceError, ValidationError, finish};
use crate::db::{Store, StoreTx};
use crate::models::{Branch, CartLine, Identity, Membership, PaymentMethod};

/// Where a checkout attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStage {
    /// Cart has lines; checkout has not been opened.
    Reviewing,
    /// Checkout view shown; waiting for a payment method.
    AwaitingPayment,
    /// Order recorded and cart deleted.
    Completed,
    /// Payment step failed; nothing was changed.
    Failed,
}

impl CheckoutStage {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reviewing => "reviewing",
            Self::AwaitingPayment => "awaiting_payment",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Stage after opening the checkout view.
    ///
    /// Only a non-empty cart may leave `Reviewing`.
    #[must_use]
    pub const fn open(self, cart_is_empty: bool) -> Option<Self> {
        match self {
            Self::Reviewing if !cart_is_empty => Some(Self::AwaitingPayment),
            Self::AwaitingPayment => Some(Self::AwaitingPayment),
            _ => None,
        }
    }

    /// Stage after the payment step ends.
    #[must_use]
    pub const fn settle(self, succeeded: bool) -> Option<Self> {
        match (self, succeeded) {
            (Self::AwaitingPayment, true) => Some(Self::Completed),
            (Self::AwaitingPayment, false) => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Everything the checkout view shows.
#[derive(Debug, Clone)]
pub struct CheckoutReview {
    pub lines: Vec<CartLine>,
    pub total: Price,
    pub membership: Option<Membership>,
    pub branches: Vec<Branch>,
    pub selected_branch: Option<Branch>,
    pub payment_methods: Vec<PaymentMethod>,
    pub stage: CheckoutStage,
}

/// What was purchased.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub lines: Vec<CartLine>,
    pub total: Price,
    pub branch: Branch,
    pub payment_method: String,
    pub stage: CheckoutStage,
}

/// Sequences the purchase of a customer's cart.
pub struct CheckoutOrchestrator<'a, S: Store> {
    store: &'a S,
}

impl<'a, S: Store> CheckoutOrchestrator<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Open the checkout view.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyCart` if the cart has no lines.
    /// Returns `ServiceError::Storage` if any database call fails.
    #[instrument(skip(self, identity), fields(customer_id = %identity.customer_id))]
    pub async fn review(&self, identity: &Identity) -> Result<CheckoutReview, ServiceError> {
        let customer_id = identity.customer_id;
        let mut tx = self.store.begin().await?;
        let result = async {
            let lines = tx.get_customer_cart(customer_id).await?;
            let stage = CheckoutStage::Reviewing
                .open(lines.is_empty())
                .ok_or(ValidationError::EmptyCart)?;

            Ok::<_, ServiceError>(CheckoutReview {
                total: Price::usd(tx.get_customer_cart_total(customer_id).await?),
                membership: tx.get_membership_details(&identity.username).await?,
                branches: tx.list_branches().await?,
                selected_branch: tx.get_customer_branch(customer_id).await?,
                payment_methods: tx.get_payment_methods().await?,
                lines,
                stage,
            })
        }
        .await;
        finish(tx, result).await
    }

    /// Purchase the cart with `payment_method` at the selected branch.
    ///
    /// The purchase and the cart deletion commit together. On any error the
    /// transaction is rolled back and the cart is exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingPaymentMethod` for a blank method,
    /// `ValidationError::NoBranchSelected` if no branch was chosen and
    /// `ValidationError::EmptyCart` if there is nothing to buy.
    /// Returns `ServiceError::Storage` if any database call or the commit
    /// fails.
    #[instrument(skip(self, identity), fields(customer_id = %identity.customer_id))]
    pub async fn complete_checkout(
        &self,
        identity: &Identity,
        payment_method: &str,
    ) -> Result<Receipt, ServiceError> {
        let payment_method = payment_method.trim();
        if payment_method.is_empty() {
            return Err(ValidationError::MissingPaymentMethod.into());
        }

        let customer_id = identity.customer_id;
        let mut tx = self.store.begin().await?;
        let result = async {
            let branch = tx
                .get_customer_branch(customer_id)
                .await?
                .ok_or(ValidationError::NoBranchSelected)?;

            let lines = tx.get_customer_cart(customer_id).await?;
            if lines.is_empty() {
                return Err(ValidationError::EmptyCart.into());
            }
            let total = Price::usd(tx.get_customer_cart_total(customer_id).await?);

            tx.complete_purchase(customer_id, payment_method, branch.branch_id)
                .await?;
            tx.delete_customer_cart(customer_id).await?;

            Ok::<_, ServiceError>(Receipt {
                lines,
                total,
                branch,
                payment_method: payment_method.to_owned(),
                stage: CheckoutStage::AwaitingPayment,
            })
        }
        .await;

        let outcome = finish(tx, result).await;
        let stage = CheckoutStage::AwaitingPayment.settle(outcome.is_ok());
        match outcome {
            Ok(mut receipt) => {
                receipt.stage = stage.unwrap_or(CheckoutStage::Completed);
                tracing::info!(
                    branch = %receipt.branch.store_name,
                    payment_method = %receipt.payment_method,
                    total = %receipt.total.display(),
                    "Checkout completed"
                );
                Ok(receipt)
            }
            Err(err) => {
                tracing::warn!(stage = ?stage, code = err.code(), "Checkout failed");
                Err(err)
            }
        }
    }
}
