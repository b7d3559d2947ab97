//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use arioncomply_core::AppShell;

use crate::config::ConsoleConfig;
use crate::db::RepositoryError;
use crate::llm::{ProviderError, Providers};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ConsoleConfig,
    pool: Option<PgPool>,
    providers: Providers,
    shell: AppShell<'static>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider client cannot be built.
    pub fn new(config: ConsoleConfig, pool: Option<PgPool>) -> Result<Self, ProviderError> {
        let providers = Providers::from_config(&config)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                providers,
                shell: AppShell::default(),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ConsoleConfig {
        &self.inner.config
    }

    /// The database pool, if one is configured.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// The database pool, or [`RepositoryError::NotConfigured`].
    ///
    /// # Errors
    ///
    /// Returns an error when the console runs without a database.
    pub fn require_pool(&self) -> Result<&PgPool, RepositoryError> {
        self.pool().ok_or(RepositoryError::NotConfigured)
    }

    #[must_use]
    pub fn providers(&self) -> &Providers {
        &self.inner.providers
    }

    /// Layout and navigation tables.
    #[must_use]
    pub fn shell(&self) -> AppShell<'static> {
        self.inner.shell
    }
}
