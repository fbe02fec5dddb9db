//! Service error taxonomy.
//!
//! Every failure surfaced to a customer is one of three kinds: their input
//! was rejected ([`ServiceError::Validation`]), something they referred to
//! does not exist ([`ServiceError::NotFound`]), or the database failed
//! ([`ServiceError::Storage`]). Storage errors keep the underlying error for
//! logging; only a generic message is ever shown.

use thiserror::Error;

use bookstore_core::{QuantityError, RatingError};

use crate::db::RepositoryError;

/// Input the customer can correct.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Cart quantity did not parse.
    #[error(transparent)]
    Quantity(#[from] QuantityError),

    /// Review rating did not parse.
    #[error(transparent)]
    Rating(#[from] RatingError),

    /// Checkout attempted before choosing a branch.
    #[error("no branch selected")]
    NoBranchSelected,

    /// Checkout attempted with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Payment submitted without a method.
    #[error("no payment method selected")]
    MissingPaymentMethod,

    /// A required form field was blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A form field could not be parsed.
    #[error("{0} is invalid")]
    InvalidField(&'static str),
}

impl ValidationError {
    /// Message code carried across redirects.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Quantity(_) => "invalid_quantity",
            Self::Rating(_) => "invalid_rating",
            Self::NoBranchSelected => "no_branch",
            Self::EmptyCart => "empty_cart",
            Self::MissingPaymentMethod => "no_payment_method",
            Self::MissingField(_) => "missing_field",
            Self::InvalidField(_) => "invalid_field",
        }
    }
}

/// Errors returned by storefront services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Customer input was rejected before reaching the database.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced customer, book or branch does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The database failed; the transaction was rolled back.
    #[error("storage error: {0}")]
    Storage(RepositoryError),
}

impl ServiceError {
    /// Convert a repository error, naming the entity for `NotFound`.
    #[must_use]
    pub fn from_repository(err: RepositoryError, entity: &'static str) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound(entity),
            other => Self::Storage(other),
        }
    }

    /// Message code carried across redirects.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.code(),
            Self::NotFound(_) => "not_found",
            Self::Storage(_) => "storage",
        }
    }

    /// Log the error at a level matching its kind.
    ///
    /// Storage errors carry database detail and go to `error` (and Sentry);
    /// the rest are ordinary customer mistakes.
    pub fn log(&self, operation: &str) {
        match self {
            Self::Storage(err) => {
                tracing::error!(
                    operation,
                    error = %err,
                    "Storage failure, transaction rolled back"
                );
            }
            Self::NotFound(entity) => {
                tracing::info!(operation, entity, "Referenced record not found");
            }
            Self::Validation(err) => {
                tracing::info!(operation, error = %err, "Rejected invalid input");
            }
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        Self::from_repository(err, "record")
    }
}
