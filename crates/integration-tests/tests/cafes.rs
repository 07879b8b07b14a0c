//! Integration tests for listing, filtering, adding and liking cafés.

#![allow(clippy::unwrap_used)]

use cafe_and_wifi_integration_tests::{
    CafeSubmission, FakeGeocoder, FakeImageHost, TestApp, location,
};
use reqwest::StatusCode;

async fn cafe_likes(app: &TestApp, id: i64) -> i64 {
    sqlx::query_scalar("SELECT likes FROM cafes WHERE id = ?")
        .bind(id)
        .fetch_one(&app.pool)
        .await
        .unwrap()
}

// =============================================================================
// Adding cafés
// =============================================================================

#[tokio::test]
async fn test_add_cafe_requires_login() {
    let app = TestApp::spawn().await;

    let resp = app.get("/add_cafe").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    let resp = app.add_cafe(&CafeSubmission::new("Sneaky Beans")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    assert_eq!(app.cafe_count().await, 0);
    assert!(app.images.uploaded().is_empty());
}

#[tokio::test]
async fn test_add_cafe_end_to_end() {
    let app = TestApp::spawn().await;
    app.login_as_new_user("Ada", "ada@example.com").await;

    let resp = app.add_cafe(&CafeSubmission::new("Blue Bottle")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    assert_eq!(app.cafe_count().await, 1);
    assert_eq!(app.images.uploaded(), vec!["blue-bottle.jpg".to_string()]);

    let (img_url, has_wifi, has_toilet): (String, bool, bool) =
        sqlx::query_as("SELECT img_url, has_wifi, has_toilet FROM cafes WHERE name = ?")
            .bind("Blue Bottle")
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(
        img_url,
        "https://res.cloudinary.com/demo/image/upload/blue-bottle.jpg"
    );
    assert!(has_wifi);
    assert!(!has_toilet);

    let home = app.get("/").await.text().await.unwrap();
    assert!(home.contains("Blue Bottle"));
    assert!(home.contains("across 1 locations"));
}

#[tokio::test]
async fn test_add_cafe_duplicate_name_uploads_nothing() {
    let app = TestApp::spawn().await;
    app.login_as_new_user("Ada", "ada@example.com").await;
    app.add_cafe(&CafeSubmission::new("Blue Bottle")).await;

    let resp = app.add_cafe(&CafeSubmission::new("Blue Bottle")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("A cafe with this name already exists."));

    assert_eq!(app.cafe_count().await, 1);
    assert_eq!(app.images.uploaded().len(), 1);
}

#[tokio::test]
async fn test_add_cafe_upload_failure_is_shown_inline() {
    let app = TestApp::spawn_with(FakeImageHost::rejecting(), FakeGeocoder::Central).await;
    app.login_as_new_user("Ada", "ada@example.com").await;

    let resp = app.add_cafe(&CafeSubmission::new("Blue Bottle")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Image upload failed, please try again."));
    assert!(!body.contains("Invalid Signature"));
    assert!(!body.contains("String to sign"));
    // The rest of the submission is kept for correction.
    assert!(body.contains("Blue Bottle"));

    assert_eq!(app.cafe_count().await, 0);
}

#[tokio::test]
async fn test_add_cafe_rejects_out_of_range_price() {
    let app = TestApp::spawn().await;
    app.login_as_new_user("Ada", "ada@example.com").await;

    let mut cafe = CafeSubmission::new("Pricey Place");
    cafe.coffee_price = "900";
    let resp = app.add_cafe(&cafe).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Number must be between 0 and 500."));
    // The rest of the submission is kept for correction.
    assert!(body.contains("Pricey Place"));

    assert_eq!(app.cafe_count().await, 0);
    assert!(app.images.uploaded().is_empty());
}

#[tokio::test]
async fn test_add_cafe_rejects_unknown_location() {
    let app = TestApp::spawn().await;
    app.login_as_new_user("Ada", "ada@example.com").await;

    let resp = app
        .add_cafe(&CafeSubmission::new("Macau Corner").in_location("Macau"))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Not a valid choice."));
    assert_eq!(app.cafe_count().await, 0);
}

// =============================================================================
// Listing and filtering
// =============================================================================

#[tokio::test]
async fn test_location_filter_redirects_and_filters() {
    let app = TestApp::spawn().await;
    app.login_as_new_user("Ada", "ada@example.com").await;
    app.add_cafe(&CafeSubmission::new("Kowloon Roasters")).await;
    app.add_cafe(&CafeSubmission::new("Island Brew").in_location("Hong Kong Island"))
        .await;

    let resp = app.post_form("/", &[("location", "Kowloon")]).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/search_by_location?location=Kowloon");

    let page = app.get(location(&resp)).await.text().await.unwrap();
    assert!(page.contains("Cafes in Kowloon"));
    assert!(page.contains("Kowloon Roasters"));
    assert!(!page.contains("Island Brew"));

    let resp = app.post_form("/", &[("location", "All")]).await;
    assert_eq!(location(&resp), "/all_cafes");

    let page = app.get("/all_cafes").await.text().await.unwrap();
    assert!(page.contains("Kowloon Roasters"));
    assert!(page.contains("Island Brew"));

    let home = app.get("/").await.text().await.unwrap();
    assert!(home.contains("across 2 locations"));
}

#[tokio::test]
async fn test_register_login_add_then_find_by_location() {
    let app = TestApp::spawn().await;
    app.register("A", "a@x.com", "pw").await;
    app.login("a@x.com", "pw").await;

    let before = app.get("/").await.text().await.unwrap();
    assert!(before.contains("across 0 locations"));

    let mut cafe = CafeSubmission::new("Café X");
    cafe.coffee_price = "20";
    let resp = app.add_cafe(&cafe).await;
    assert_eq!(location(&resp), "/");

    let after = app.get("/").await.text().await.unwrap();
    assert!(after.contains("across 1 locations"));

    let results = app
        .get("/search_by_location?location=Kowloon")
        .await
        .text()
        .await
        .unwrap();
    assert_eq!(results.matches("class=\"cafe-name\"").count(), 1);
    assert!(results.contains("Café X"));
}

#[tokio::test]
async fn test_location_with_spaces_round_trips() {
    let app = TestApp::spawn().await;
    app.login_as_new_user("Ada", "ada@example.com").await;
    app.add_cafe(&CafeSubmission::new("Island Brew").in_location("Hong Kong Island"))
        .await;

    let resp = app.post_form("/", &[("location", "Hong Kong Island")]).await;
    let target = location(&resp).to_string();
    assert_eq!(target, "/search_by_location?location=Hong+Kong+Island");

    let page = app.get(&target).await.text().await.unwrap();
    assert!(page.contains("Island Brew"));
}

#[tokio::test]
async fn test_search_by_location_requires_known_location() {
    let app = TestApp::spawn().await;

    assert_eq!(
        app.get("/search_by_location").await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.get("/search_by_location?location=Macau").await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.get("/search_by_location?location=Kowloon").await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_home_rejects_unknown_filter_inline() {
    let app = TestApp::spawn().await;

    let resp = app.post_form("/", &[("location", "Macau")]).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Not a valid choice."));
}

// =============================================================================
// Details and likes
// =============================================================================

#[tokio::test]
async fn test_unknown_cafe_is_not_found() {
    let app = TestApp::spawn().await;

    assert_eq!(
        app.get("/cafe_details/999").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_cafe_details_shows_map() {
    let app = TestApp::spawn().await;
    app.login_as_new_user("Ada", "ada@example.com").await;
    app.add_cafe(&CafeSubmission::new("Blue Bottle")).await;
    let id = app.cafe_id("Blue Bottle").await;

    let resp = app.get(&format!("/cafe_details/{id}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Blue Bottle"));
    assert!(body.contains("https://www.openstreetmap.org/export/embed.html"));
}

#[tokio::test]
async fn test_cafe_details_without_geocode_has_no_map() {
    for geocoder in [FakeGeocoder::NoMatch, FakeGeocoder::Down] {
        let app = TestApp::spawn_with(FakeImageHost::default(), geocoder).await;
        app.login_as_new_user("Ada", "ada@example.com").await;
        app.add_cafe(&CafeSubmission::new("Blue Bottle")).await;
        let id = app.cafe_id("Blue Bottle").await;

        let resp = app.get(&format!("/cafe_details/{id}")).await;
        assert_eq!(resp.status(), StatusCode::OK, "{geocoder:?}");
        let body = resp.text().await.unwrap();
        assert!(body.contains("Blue Bottle"));
        assert!(!body.contains("<iframe"), "{geocoder:?}");
    }
}

#[tokio::test]
async fn test_like_cafe_counts_every_like() {
    let app = TestApp::spawn().await;
    app.login_as_new_user("Ada", "ada@example.com").await;
    app.add_cafe(&CafeSubmission::new("Blue Bottle")).await;
    let id = app.cafe_id("Blue Bottle").await;

    for _ in 0..3 {
        let resp = app.get(&format!("/like_cafe/{id}")).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), format!("/cafe_details/{id}"));
    }

    assert_eq!(cafe_likes(&app, id).await, 3);
}

#[tokio::test]
async fn test_like_cafe_requires_login() {
    let app = TestApp::spawn().await;
    app.login_as_new_user("Ada", "ada@example.com").await;
    app.add_cafe(&CafeSubmission::new("Blue Bottle")).await;
    let id = app.cafe_id("Blue Bottle").await;
    app.get("/logout").await;

    let resp = app.get(&format!("/like_cafe/{id}")).await;
    assert_eq!(location(&resp), "/login");
    assert_eq!(cafe_likes(&app, id).await, 0);
}

#[tokio::test]
async fn test_like_unknown_cafe_is_not_found() {
    let app = TestApp::spawn().await;
    app.login_as_new_user("Ada", "ada@example.com").await;

    assert_eq!(
        app.get("/like_cafe/999").await.status(),
        StatusCode::NOT_FOUND
    );
}
