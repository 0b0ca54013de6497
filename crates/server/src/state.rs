//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::models::{Category, FoodItem};
use crate::services::gateway::{GatewayClient, GatewayError};

/// How long a cached catalog snapshot is served before the next read goes
/// back to the database. Mirrors the menu's refresh cadence.
pub const CATALOG_REFRESH: Duration = Duration::from_secs(300);

/// A point-in-time copy of the catalog, shared by menu reads.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub categories: Vec<Category>,
    pub items: Vec<FoodItem>,
}

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("gateway client error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    gateway: GatewayClient,
    catalog_cache: Cache<(), Arc<CatalogSnapshot>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway HTTP client cannot be built.
    pub fn new(config: ServerConfig, pool: PgPool) -> Result<Self, StateError> {
        let gateway = GatewayClient::new(&config.gateway)?;
        let catalog_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(CATALOG_REFRESH)
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                gateway,
                catalog_cache,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the payment gateway client.
    #[must_use]
    pub fn gateway(&self) -> &GatewayClient {
        &self.inner.gateway
    }

    /// Get a reference to the catalog snapshot cache.
    #[must_use]
    pub fn catalog_cache(&self) -> &Cache<(), Arc<CatalogSnapshot>> {
        &self.inner.catalog_cache
    }

    /// Drop the cached catalog snapshot so the next menu read refetches.
    ///
    /// Called after admin catalog mutations and the store-wide pause so the
    /// menu reflects them immediately instead of at the next TTL expiry.
    pub async fn invalidate_catalog(&self) {
        self.inner.catalog_cache.invalidate(&()).await;
    }
}
