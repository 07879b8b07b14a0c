//! Integration tests for Cafe & Wifi.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cafe-and-wifi-integration-tests
//! ```
//!
//! Each test spawns the full router on an ephemeral port, backed by a private
//! in-memory `SQLite` database, and drives it with a cookie-keeping `reqwest`
//! client. Cloudinary and Radar are replaced by the in-process fakes below,
//! so no network access or credentials are needed.
//!
//! # Test Categories
//!
//! - `auth` - Registration, login and logout
//! - `cafes` - Listing, filtering, adding and liking cafés
//! - `comments` - Comments, replies and comment likes

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, header, multipart, redirect};
use secrecy::SecretString;
use sqlx::SqlitePool;
use url::Url;

use cafe_and_wifi_directory::config::DirectoryConfig;
use cafe_and_wifi_directory::db;
use cafe_and_wifi_directory::middleware::create_session_layer;
use cafe_and_wifi_directory::services::{
    Coordinates, GeocodeError, Geocoder, ImageHost, ImageUpload, UploadError,
};
use cafe_and_wifi_directory::state::AppState;

// =============================================================================
// Fake collaborators
// =============================================================================

/// Image host that keeps uploads in memory and hands back predictable URLs.
#[derive(Default)]
pub struct FakeImageHost {
    uploads: Mutex<Vec<String>>,
    rejecting: bool,
}

impl FakeImageHost {
    /// A host that turns every upload down the way Cloudinary does.
    pub fn rejecting() -> Self {
        Self {
            rejecting: true,
            ..Self::default()
        }
    }

    /// Filenames uploaded so far, in order.
    pub fn uploaded(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageHost for FakeImageHost {
    async fn upload(&self, image: ImageUpload) -> Result<Url, UploadError> {
        if self.rejecting {
            return Err(UploadError::Rejected {
                status: 401,
                message: format!(
                    "Invalid Signature abc123. String to sign - 'timestamp=1700000000'. ({})",
                    image.filename
                ),
            });
        }
        let url = Url::parse("https://res.cloudinary.com/demo/image/upload/")
            .and_then(|base| base.join(&image.filename))
            .map_err(|e| UploadError::Response(e.to_string()))?;
        self.uploads.lock().unwrap().push(image.filename);
        Ok(url)
    }
}

/// Scripted geocoder answers.
#[derive(Debug, Clone, Copy)]
pub enum FakeGeocoder {
    /// Every query lands in Central, Hong Kong.
    Central,
    /// Nothing matches.
    NoMatch,
    /// The provider is failing.
    Down,
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn locate(&self, _query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        match self {
            Self::Central => Ok(Some(Coordinates {
                latitude: 22.2819,
                longitude: 114.1581,
            })),
            Self::NoMatch => Ok(None),
            Self::Down => Err(GeocodeError::Status(503)),
        }
    }
}

// =============================================================================
// Test application
// =============================================================================

/// A running directory server plus a client that keeps its session cookie.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub pool: SqlitePool,
    pub images: Arc<FakeImageHost>,
}

fn test_config() -> DirectoryConfig {
    DirectoryConfig {
        database_url: SecretString::from("sqlite::memory:"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://localhost:5000".to_string(),
        session_secret: SecretString::from("kT9#vQ2mZ!r8Lw4$Xp7Nf1@Hb6Yc3Jd5"),
        cloudinary: None,
        radar: None,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

impl TestApp {
    /// Start the router on `127.0.0.1:0` with a fresh database.
    pub async fn spawn() -> Self {
        Self::spawn_with(FakeImageHost::default(), FakeGeocoder::Central).await
    }

    /// Start the router with the given collaborators.
    pub async fn spawn_with(images: FakeImageHost, geocoder: FakeGeocoder) -> Self {
        let config = test_config();
        let pool = db::create_memory_pool().await.unwrap();
        let images = Arc::new(images);

        let session_layer = create_session_layer(&pool, &config);
        let state = AppState::with_services(
            config,
            pool.clone(),
            images.clone(),
            Arc::new(geocoder),
        );
        let app = cafe_and_wifi_directory::app(state, session_layer);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            addr,
            client,
            pool,
            images,
        }
    }

    /// Absolute URL for a path on the test server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Response {
        self.post_form(
            "/register",
            &[("name", name), ("email", email), ("password", password)],
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.post_form("/login", &[("email", email), ("password", password)])
            .await
    }

    /// Register a fresh account and log in as it.
    pub async fn login_as_new_user(&self, name: &str, email: &str) {
        let registered = self.register(name, email, "correct horse").await;
        assert_eq!(registered.status(), StatusCode::SEE_OTHER);
        let logged_in = self.login(email, "correct horse").await;
        assert_eq!(logged_in.status(), StatusCode::SEE_OTHER);
    }

    /// Submit the add-café form with a small JPEG.
    pub async fn add_cafe(&self, cafe: &CafeSubmission<'_>) -> Response {
        let slug: String = cafe
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect();
        let image = multipart::Part::bytes(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10])
            .file_name(format!("{slug}.jpg"))
            .mime_str("image/jpeg")
            .unwrap();

        let mut form = multipart::Form::new()
            .text("name", cafe.name.to_string())
            .text("map_url", cafe.map_url.to_string())
            .part("img_url", image)
            .text("location", cafe.location.to_string())
            .text("seats", cafe.seats.to_string())
            .text("coffee_price", cafe.coffee_price.to_string())
            .text("opening_time", "08:00-18:00")
            .text("description", "Quiet upstairs room with big tables.");
        if cafe.has_wifi {
            form = form.text("has_wifi", "y");
        }

        self.client
            .post(self.url("/add_cafe"))
            .multipart(form)
            .send()
            .await
            .unwrap()
    }

    pub async fn cafe_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM cafes")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    /// Id of the café with this name.
    pub async fn cafe_id(&self, name: &str) -> i64 {
        sqlx::query_scalar("SELECT id FROM cafes WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

/// Values for one add-café submission.
pub struct CafeSubmission<'a> {
    pub name: &'a str,
    pub map_url: &'a str,
    pub location: &'a str,
    pub seats: &'a str,
    pub coffee_price: &'a str,
    pub has_wifi: bool,
}

impl<'a> CafeSubmission<'a> {
    /// A valid submission in Kowloon.
    pub const fn new(name: &'a str) -> Self {
        Self {
            name,
            map_url: "https://maps.app.goo.gl/abc123",
            location: "Kowloon",
            seats: "10-20",
            coffee_price: "38.5",
            has_wifi: true,
        }
    }

    #[must_use]
    pub const fn in_location(mut self, location: &'a str) -> Self {
        self.location = location;
        self
    }
}

/// The `Location` header of a redirect.
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
