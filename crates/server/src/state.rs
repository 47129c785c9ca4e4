//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::google::GoogleVerifier;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the injected store handle and the
/// identity-provider verifier; nothing in here is mutable across requests.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    google: GoogleVerifier,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let google = GoogleVerifier::new(&config.google_client_id);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                google,
            }),
        }
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

    /// Get a reference to the Google ID token verifier.
    #[must_use]
    pub fn google(&self) -> &GoogleVerifier {
        &self.inner.google
    }
}
