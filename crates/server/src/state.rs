//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::catalogue::CatalogueCache;
use crate::services::email::EmailService;

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("email transport: {0}")]
    Email(#[from] lettre::transport::smtp::Error),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    email: EmailService,
    catalogue: CatalogueCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP transport cannot be built.
    pub fn new(config: ServerConfig, pool: PgPool) -> Result<Self, StateError> {
        let email = EmailService::new(&config)?;
        if email.is_log_only() {
            tracing::warn!("SMTP_HOST not set; emails will be logged, not sent");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                email,
                catalogue: CatalogueCache::default(),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }

    /// Cached active catalogue for the advisor endpoints.
    #[must_use]
    pub fn catalogue(&self) -> &CatalogueCache {
        &self.inner.catalogue
    }
}
