//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::{AnyStore, PgStore};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    store: AnyStore,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let store = PgStore::new(pool.clone()).into();
        Self::with_store(config, pool, store)
    }

    /// Create a state whose cart, checkout and identity calls go to `store`.
    ///
    /// Catalog and account pages still read from `pool`.
    #[must_use]
    pub fn with_store(config: StorefrontConfig, pool: PgPool, store: AnyStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                store,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Transactional store used by the cart, checkout and identity services.
    #[must_use]
    pub fn store(&self) -> &AnyStore {
        &self.inner.store
    }
}
