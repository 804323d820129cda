//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::storage::StorageError;
use crate::services::{IdentityService, MediaStorage};
use crate::watch::ChangeHub;

/// Application state shared across all handlers.
///
/// Everything a handler needs is injected here; there is no module-level
/// mutable state anywhere in the service.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    hub: ChangeHub,
    storage: MediaStorage,
    identity: IdentityService,
}

impl AppState {
    /// Build application state from configuration and a database pool.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the configured storage backend cannot be
    /// opened.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, StorageError> {
        let storage = MediaStorage::from_config(&config.storage)?;
        let identity = IdentityService::new(pool.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                hub: ChangeHub::new(),
                storage,
                identity,
            }),
        })
    }

    /// Application configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Change notification hub.
    #[must_use]
    pub fn hub(&self) -> &ChangeHub {
        &self.inner.hub
    }

    /// Media storage.
    #[must_use]
    pub fn storage(&self) -> &MediaStorage {
        &self.inner.storage
    }

    /// Driver identity service.
    #[must_use]
    pub fn identity(&self) -> &IdentityService {
        &self.inner.identity
    }
}
