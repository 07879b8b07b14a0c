//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::DirectoryConfig;
use crate::services::{
    CloudinaryClient, Geocoder, ImageHost, RadarClient, UnconfiguredGeocoder,
    UnconfiguredImageHost,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DirectoryConfig,
    pool: SqlitePool,
    image_host: Arc<dyn ImageHost>,
    geocoder: Arc<dyn Geocoder>,
}

impl AppState {
    /// Create application state, picking collaborators from configuration.
    ///
    /// Missing Cloudinary or Radar credentials, or a client that cannot be
    /// built, fall back to stand-ins that refuse uploads and find no
    /// coordinates.
    #[must_use]
    pub fn new(config: DirectoryConfig, pool: SqlitePool) -> Self {
        let image_host: Arc<dyn ImageHost> = match &config.cloudinary {
            Some(cloudinary) => match CloudinaryClient::new(cloudinary.clone()) {
                Ok(client) => Arc::new(client),
                Err(e) => {
                    tracing::error!(error = %e, "Cloudinary client failed, uploads disabled");
                    Arc::new(UnconfiguredImageHost)
                }
            },
            None => {
                tracing::warn!("CLOUDINARY_* not set, image uploads disabled");
                Arc::new(UnconfiguredImageHost)
            }
        };

        let geocoder: Arc<dyn Geocoder> = match &config.radar {
            Some(radar) => match RadarClient::new(radar.clone()) {
                Ok(client) => Arc::new(client),
                Err(e) => {
                    tracing::error!(error = %e, "Radar client failed, maps disabled");
                    Arc::new(UnconfiguredGeocoder)
                }
            },
            None => {
                tracing::warn!("RADAR_API_KEY not set, maps disabled");
                Arc::new(UnconfiguredGeocoder)
            }
        };

        Self::with_services(config, pool, image_host, geocoder)
    }

    /// Create application state with explicit collaborators.
    #[must_use]
    pub fn with_services(
        config: DirectoryConfig,
        pool: SqlitePool,
        image_host: Arc<dyn ImageHost>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                image_host,
                geocoder,
            }),
        }
    }

    /// Get a reference to the directory configuration.
    #[must_use]
    pub fn config(&self) -> &DirectoryConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get the image host used for café photos.
    #[must_use]
    pub fn image_host(&self) -> &dyn ImageHost {
        self.inner.image_host.as_ref()
    }

    /// Get the geocoder used for map markers.
    #[must_use]
    pub fn geocoder(&self) -> &dyn Geocoder {
        self.inner.geocoder.as_ref()
    }
}
