//! Business logic services and external collaborators.
//!
//! # Services
//!
//! - `auth` - Password registration and login (Argon2id)
//! - `image_host` - Café photo uploads (Cloudinary)
//! - `geocoding` - Map reference to coordinates (Radar)
//!
//! The two collaborators are traits so handlers depend on behaviour rather
//! than vendors; `AppState` holds them as `Arc<dyn _>` and tests swap in fakes.

pub mod auth;
pub mod geocoding;
pub mod image_host;

use std::time::Duration;

use reqwest::Client;

pub use auth::{AuthError, AuthService};
pub use geocoding::{
    Coordinates, GeocodeError, Geocoder, MapMarker, RadarClient, UnconfiguredGeocoder,
};
pub use image_host::{
    CloudinaryClient, ImageHost, ImageUpload, UnconfiguredImageHost, UploadError,
};

/// Time allowed to open a connection to an external API.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// HTTP client for an external API, with connecting and the whole request
/// bounded.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(timeout)
        .build()
}
