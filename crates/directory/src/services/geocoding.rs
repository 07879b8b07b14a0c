//! Forward geocoding for café map markers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::RadarConfig;

/// Radar forward geocoding endpoint.
const RADAR_GEOCODE_URL: &str = "https://api.radar.io/v1/geocode/forward";

/// Upper bound on one lookup. The detail page waits on it.
const GEOCODE_TIMEOUT: Duration = Duration::from_secs(5);

/// OpenStreetMap embeddable map page.
const OSM_EMBED_URL: &str = "https://www.openstreetmap.org/export/embed.html";

/// Half-width of the embedded map's bounding box, in degrees.
const EMBED_SPAN: f64 = 0.004;

/// Errors that can occur during a geocoding lookup.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The provider returned a non-success status.
    #[error("geocoder returned {0}")]
    Status(u16),

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// A point on the map.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A labelled marker rendered on the café detail page.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub lat: f64,
    pub lng: f64,
    pub label: String,
}

impl MapMarker {
    #[must_use]
    pub fn new(coordinates: Coordinates, label: impl Into<String>) -> Self {
        Self {
            lat: coordinates.latitude,
            lng: coordinates.longitude,
            label: label.into(),
        }
    }

    /// URL of an embeddable map centred on the marker.
    #[must_use]
    pub fn embed_url(&self) -> String {
        let bbox = format!(
            "{},{},{},{}",
            self.lng - EMBED_SPAN,
            self.lat - EMBED_SPAN,
            self.lng + EMBED_SPAN,
            self.lat + EMBED_SPAN
        );
        let marker = format!("{},{}", self.lat, self.lng);

        Url::parse_with_params(
            OSM_EMBED_URL,
            &[("bbox", bbox.as_str()), ("layer", "mapnik"), ("marker", marker.as_str())],
        )
        .map(String::from)
        .unwrap_or_else(|_| OSM_EMBED_URL.to_string())
    }
}

/// Turns a free-text place reference into coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync + 'static {
    /// Look up the best match for `query`. `Ok(None)` means no match.
    async fn locate(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

// =============================================================================
// Radar
// =============================================================================

/// Radar geocoding API client.
#[derive(Clone)]
pub struct RadarClient {
    client: Client,
    config: RadarConfig,
}

impl std::fmt::Debug for RadarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadarClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct ForwardResponse {
    #[serde(default)]
    addresses: Vec<Coordinates>,
}

impl RadarClient {
    /// Create a new Radar client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: RadarConfig) -> Result<Self, GeocodeError> {
        let client = super::http_client(GEOCODE_TIMEOUT)
            .map_err(|e| GeocodeError::Request(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn request_url(&self, query: &str) -> Result<Url, GeocodeError> {
        Url::parse_with_params(
            RADAR_GEOCODE_URL,
            &[("query", query), ("country", self.config.country.as_str())],
        )
        .map_err(|e| GeocodeError::Request(e.to_string()))
    }
}

/// First address in a forward-geocode response, if any.
fn parse_forward_response(body: &str) -> Result<Option<Coordinates>, GeocodeError> {
    let response: ForwardResponse =
        serde_json::from_str(body).map_err(|e| GeocodeError::Parse(e.to_string()))?;
    Ok(response.addresses.into_iter().next())
}

#[async_trait]
impl Geocoder for RadarClient {
    #[instrument(skip(self))]
    async fn locate(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let response = self
            .client
            .get(self.request_url(query)?)
            .header(
                reqwest::header::AUTHORIZATION,
                self.config.api_key.expose_secret(),
            )
            .send()
            .await
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Radar geocode failed");
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        let coordinates = parse_forward_response(&body)?;
        debug!(found = coordinates.is_some(), "Geocode complete");
        Ok(coordinates)
    }
}

// =============================================================================
// Unconfigured
// =============================================================================

/// Stand-in used when no Radar key is set. Never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredGeocoder;

#[async_trait]
impl Geocoder for UnconfiguredGeocoder {
    async fn locate(&self, _query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        Ok(None)
    }
}
