//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::imagekit::{ImageHostError, ImageKitClient};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    imagekit: ImageKitClient,
}

impl AppState {
    /// Build the shared state, constructing the image host client from
    /// config.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client for the image host fails to build.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, ImageHostError> {
        let imagekit = ImageKitClient::new(&config.imagekit)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                imagekit,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn imagekit(&self) -> &ImageKitClient {
        &self.inner.imagekit
    }
}
