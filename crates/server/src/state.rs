//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::BookSearchConfig;
use crate::services::openlibrary::{OpenLibraryClient, OpenLibraryError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool and the OpenLibrary client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    openlibrary: OpenLibraryClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the OpenLibrary HTTP client cannot be built.
    pub fn new(config: &BookSearchConfig, pool: PgPool) -> Result<Self, OpenLibraryError> {
        let openlibrary = OpenLibraryClient::new(&config.openlibrary)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                pool,
                openlibrary,
            }),
        })
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the OpenLibrary client.
    #[must_use]
    pub fn openlibrary(&self) -> &OpenLibraryClient {
        &self.inner.openlibrary
    }
}
