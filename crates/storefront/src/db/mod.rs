//! Database access for the bookstore `PostgreSQL` schema.
//!
//! Business rules (password checks, cart totals, purchases, membership) live
//! in stored procedures. This module only calls them.
//!
//! - [`store`] - the transactional procedure surface used by the cart,
//!   checkout and identity services (`Store` / `StoreTx`)
//! - [`postgres`] - `PgStore`, the `sqlx` implementation of that surface
//! - [`any`] - `AnyStore`, the backend the application state holds
//! - [`catalog`] / [`customers`] - read-mostly repositories for pages that
//!   need no multi-step transaction
//!
//! Sessions are kept in the same database by `tower-sessions-sqlx-store`.

pub mod any;
pub mod catalog;
pub mod customers;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod postgres;
pub mod store;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use any::{AnyStore, AnyTx};
pub use catalog::CatalogRepository;
pub use customers::CustomerRepository;
pub use postgres::{PgStore, PgTx};
pub use store::{Store, StoreTx};

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A referenced row (customer, book, branch) does not exist.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Classify a sqlx error by the constraint it violated, if any.
    #[must_use]
    pub fn classify(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Self::Conflict(
                    db_err
                        .constraint()
                        .unwrap_or("unique constraint")
                        .to_owned(),
                );
            }
            if db_err.is_foreign_key_violation() {
                return Self::NotFound;
            }
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_passes_through_non_database_errors() {
        let err = RepositoryError::classify(sqlx::Error::RowNotFound);
        assert!(matches!(
            err,
            RepositoryError::Database(sqlx::Error::RowNotFound)
        ));
    }
}
