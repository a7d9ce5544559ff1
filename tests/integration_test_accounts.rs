mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{parse_body, TestApp};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new().await;
    let (status, body) = app.request(Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn registration_validates_and_rejects_duplicates() {
    let app = TestApp::new().await;

    let (status, user) = app.request(
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "name": "Alice", "email": "Alice@Example.com", "password": "secret-pass" })),
    ).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["email"], "alice@example.com");
    assert_eq!(user["role"], "USER");
    assert!(user.get("passwordHash").is_none());

    let (status, _) = app.request(
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "name": "Alice Again", "email": "alice@example.com", "password": "secret-pass" })),
    ).await;
    assert_eq!(status, StatusCode::CONFLICT);

    for bad in [
        json!({ "name": "A", "email": "a@example.com", "password": "secret-pass" }),
        json!({ "name": "Alice", "email": "not-an-email", "password": "secret-pass" }),
        json!({ "name": "Alice", "email": "b@example.com", "password": "123" }),
    ] {
        let (status, _) = app.request(Method::POST, "/api/v1/auth/register", None, Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _) = app.request(
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "wrong-pass" })),
    ).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_rotates_the_session() {
    let app = TestApp::new().await;

    app.request(
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "name": "Alice", "email": "alice@example.com", "password": "secret-pass" })),
    ).await;

    let login = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "email": "alice@example.com", "password": "secret-pass" }).to_string()))
            .unwrap()
    ).await.unwrap();
    assert_eq!(login.status(), StatusCode::OK);

    let refresh_cookie = login.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|h| h.to_str().unwrap().to_string())
        .find(|c| c.starts_with("refresh_token="))
        .expect("No refresh_token cookie returned");
    let refresh_pair = refresh_cookie.split(';').next().unwrap().to_string();

    let refresh = |cookie: String| {
        app.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/refresh")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap()
        )
    };

    let response = refresh(refresh_pair.clone()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body(response.into_body()).await;
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert!(body["csrfToken"].as_str().is_some());

    // The old refresh token was rotated out.
    let response = refresh(refresh_pair).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_and_preferences_round_trip() {
    let app = TestApp::new().await;
    let alice = app.register_and_login("Alice").await;
    let bob = app.register_and_login("Bob").await;

    let (_, bob_profile) = app.request(Method::GET, "/api/v1/users/me", Some(&bob), None).await;

    let (status, me) = app.request(Method::GET, "/api/v1/users/me", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["preferences"]["timezone"], "UTC");

    let (status, updated) = app.request(
        Method::PATCH,
        "/api/v1/users/me",
        Some(&alice),
        Some(json!({ "name": "Alice Smith", "email": me["email"], "phone": "  ", "bio": "Jazz fan" })),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Alice Smith");
    assert!(updated["phone"].is_null());
    assert_eq!(updated["bio"], "Jazz fan");

    let (status, _) = app.request(
        Method::PATCH,
        "/api/v1/users/me",
        Some(&alice),
        Some(json!({ "name": "Alice Smith", "email": bob_profile["email"] })),
    ).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let mut preferences = me["preferences"].clone();
    preferences["timezone"] = json!("Europe/Berlin");
    let (status, updated) = app.request(
        Method::PATCH,
        "/api/v1/users/me/preferences",
        Some(&alice),
        Some(preferences.clone()),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["preferences"]["timezone"], "Europe/Berlin");

    preferences["timezone"] = json!("Mars/Olympus");
    let (status, _) = app.request(
        Method::PATCH,
        "/api/v1/users/me/preferences",
        Some(&alice),
        Some(preferences),
    ).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn site_settings_are_public_but_admin_managed() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let user = app.register_and_login("Alice").await;

    let (status, defaults) = app.request(Method::GET, "/api/v1/settings", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(defaults["siteName"], "Event Booking");

    let changes = json!({ "siteName": "Tickets Inc", "contactEmail": "hello@tickets.test", "twitterUrl": "" });

    let (status, _) = app.request(Method::PUT, "/api/v1/admin/settings", Some(&user), Some(changes.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request(
        Method::PUT,
        "/api/v1/admin/settings",
        Some(&admin),
        Some(json!({ "siteName": "Tickets Inc", "contactEmail": "nope" })),
    ).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, saved) = app.request(Method::PUT, "/api/v1/admin/settings", Some(&admin), Some(changes)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["siteName"], "Tickets Inc");
    assert!(saved["twitterUrl"].is_null());

    let (_, public) = app.request(Method::GET, "/api/v1/settings", None, None).await;
    assert_eq!(public["contactEmail"], "hello@tickets.test");
}

#[tokio::test]
async fn admin_user_deletion_rules() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let category = app.create_category(&admin, "Music").await;
    let event = app.create_event(&admin, &category, json!({})).await;
    let alice = app.register_and_login("Alice").await;

    let (_, booking) = app.book(&alice, event["id"].as_str().unwrap(), 1).await;
    app.pay(&alice, booking["id"].as_str().unwrap(), 50.0).await;

    let (status, users) = app.request(Method::GET, "/api/v1/admin/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);

    let (status, _) = app.request(Method::GET, "/api/v1/admin/users", Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request(
        Method::DELETE,
        &format!("/api/v1/admin/users/{}", admin.user_id),
        Some(&admin),
        None,
    ).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.request(Method::DELETE, "/api/v1/admin/users/missing", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.request(
        Method::DELETE,
        &format!("/api/v1/admin/users/{}", alice.user_id),
        Some(&admin),
        None,
    ).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for table in ["bookings", "notifications"] {
        let remaining: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE user_id = ?", table))
            .bind(&alice.user_id)
            .fetch_one(&app.pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0, "{} left behind", table);
    }
    let payments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(payments, 0);
}

#[tokio::test]
async fn analytics_summarise_sales() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let category = app.create_category(&admin, "Music").await;
    let event = app.create_event(&admin, &category, json!({ "price": 75.0 })).await;
    let event_id = event["id"].as_str().unwrap();
    let alice = app.register_and_login("Alice").await;
    let bob = app.register_and_login("Bob").await;

    let (_, booking) = app.book(&alice, event_id, 2).await;
    app.pay(&alice, booking["id"].as_str().unwrap(), 150.0).await;
    app.book(&bob, event_id, 1).await;

    let (status, summary) = app.request(Method::GET, "/api/v1/admin/analytics", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totalUsers"], 3);
    assert_eq!(summary["totalEvents"], 1);
    assert_eq!(summary["totalBookings"], 2);
    assert_eq!(summary["paidTickets"], 2);
    assert_eq!(summary["revenue"], 150.0);

    let (status, _) = app.request(Method::GET, "/api/v1/admin/analytics", Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn organizers_cannot_be_deleted() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let category = app.create_category(&admin, "Music").await;
    app.create_event(&admin, &category, json!({})).await;

    let (status, _) = app.request(
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "name": "Second Admin", "email": "second@test.local", "password": "secret-pass" })),
    ).await;
    assert_eq!(status, StatusCode::CREATED);
    let second_id: String = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
        .bind("second@test.local")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    sqlx::query("UPDATE users SET role = 'ADMIN' WHERE id = ?")
        .bind(&second_id)
        .execute(&app.pool)
        .await
        .unwrap();
    let second = app.login("second@test.local", "secret-pass").await;

    let (status, _) = app.request(
        Method::DELETE,
        &format!("/api/v1/admin/users/{}", admin.user_id),
        Some(&second),
        None,
    ).await;
    assert_eq!(status, StatusCode::CONFLICT);
}
