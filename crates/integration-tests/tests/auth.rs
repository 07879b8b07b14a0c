//! Integration tests for registration, login and logout.

#![allow(clippy::unwrap_used)]

use cafe_and_wifi_integration_tests::{TestApp, location};
use reqwest::StatusCode;

async fn user_count(app: &TestApp) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&app.pool)
        .await
        .unwrap()
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_redirects_to_login_with_flash() {
    let app = TestApp::spawn().await;

    let resp = app
        .register("Ada Lovelace", "ada@example.com", "correct horse")
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    let page = app.get("/login").await.text().await.unwrap();
    assert!(page.contains("Account created, please login!"));

    // Flashes are shown once.
    let again = app.get("/login").await.text().await.unwrap();
    assert!(!again.contains("Account created, please login!"));
}

#[tokio::test]
async fn test_register_duplicate_email_is_rejected() {
    let app = TestApp::spawn().await;
    app.register("Ada", "ada@example.com", "correct horse").await;

    let resp = app
        .register("Another Ada", "ada@example.com", "different")
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("An account with this email already exists."));
    assert!(body.contains("Another Ada"));

    assert_eq!(user_count(&app).await, 1);
}

#[tokio::test]
async fn test_register_validates_fields() {
    let app = TestApp::spawn().await;

    let resp = app.register("", "not-an-email", "pw").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("This field is required."));
    assert!(body.contains("Invalid email address."));

    assert_eq!(user_count(&app).await, 0);
}

#[tokio::test]
async fn test_password_is_not_stored_in_plain_text() {
    let app = TestApp::spawn().await;
    app.register("Ada", "ada@example.com", "correct horse").await;

    let hash: String = sqlx::query_scalar("SELECT password_hash FROM users")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(!hash.contains("correct horse"));
}

// =============================================================================
// Login / logout
// =============================================================================

#[tokio::test]
async fn test_login_success_shows_user_in_navigation() {
    let app = TestApp::spawn().await;
    app.register("Ada Lovelace", "ada@example.com", "correct horse")
        .await;

    let resp = app.login("ada@example.com", "correct horse").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let home = app.get("/").await.text().await.unwrap();
    assert!(home.contains("Ada Lovelace"));
    assert!(home.contains("/logout"));
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_email_look_the_same() {
    let app = TestApp::spawn().await;
    app.register("Ada", "ada@example.com", "correct horse").await;

    for (email, password) in [
        ("ada@example.com", "wrong"),
        ("nobody@example.com", "correct horse"),
    ] {
        let resp = app.login(email, password).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.text().await.unwrap();
        assert!(body.contains("Invalid email or password"));
    }

    // Still anonymous.
    let resp = app.get("/add_cafe").await;
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::spawn().await;
    app.login_as_new_user("Ada", "ada@example.com").await;
    assert_eq!(app.get("/add_cafe").await.status(), StatusCode::OK);

    let resp = app.get("/logout").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let resp = app.get("/add_cafe").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

// =============================================================================
// Cross-cutting
// =============================================================================

#[tokio::test]
async fn test_responses_carry_security_headers_and_request_id() {
    let app = TestApp::spawn().await;

    let resp = app.get("/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    let csp = headers
        .get("content-security-policy")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(csp.contains("https://res.cloudinary.com https://www.gravatar.com;"));
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::spawn().await;

    assert_eq!(app.get("/health").await.status(), StatusCode::OK);
    assert_eq!(app.get("/health/ready").await.status(), StatusCode::OK);
}
