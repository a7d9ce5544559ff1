mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn booking_starts_pending_and_notifies_the_user() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let category = app.create_category(&admin, "Music").await;
    let event = app.create_event(&admin, &category, json!({})).await;
    let user = app.register_and_login("Alice").await;

    let (status, booking) = app.book(&user, event["id"].as_str().unwrap(), 2).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["status"], "PENDING");
    assert_eq!(booking["quantity"], 2);
    assert_eq!(booking["userId"], user.user_id.as_str());

    let (status, notifications) = app.request(Method::GET, "/api/v1/notifications", Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["type"], "BOOKING_UPDATE");
    assert_eq!(notifications[0]["isRead"], false);
}

#[tokio::test]
async fn booking_rejects_bad_quantities_and_hidden_events() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let category = app.create_category(&admin, "Music").await;
    let published = app.create_event(&admin, &category, json!({})).await;
    let draft = app.create_event(&admin, &category, json!({ "isPublished": false })).await;
    let user = app.register_and_login("Alice").await;

    let (status, _) = app.book(&user, published["id"].as_str().unwrap(), 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.book(&user, draft["id"].as_str().unwrap(), 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.book(&user, "missing-event", 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn booking_beyond_capacity_is_a_conflict() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let category = app.create_category(&admin, "Music").await;
    let event = app.create_event(&admin, &category, json!({ "capacity": 3 })).await;
    let event_id = event["id"].as_str().unwrap();
    let alice = app.register_and_login("Alice").await;
    let bob = app.register_and_login("Bob").await;

    let (status, _) = app.book(&alice, event_id, 2).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.book(&bob, event_id, 2).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.book(&bob, event_id, 1).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.book(&bob, event_id, 1).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn cancelled_bookings_free_their_seats() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let category = app.create_category(&admin, "Music").await;
    let event = app.create_event(&admin, &category, json!({ "capacity": 2 })).await;
    let event_id = event["id"].as_str().unwrap();
    let alice = app.register_and_login("Alice").await;
    let bob = app.register_and_login("Bob").await;

    let (_, booking) = app.book(&alice, event_id, 2).await;
    let (status, _) = app.book(&bob, event_id, 1).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.set_booking_status(&alice, booking["id"].as_str().unwrap(), "CANCELLED").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.book(&bob, event_id, 2).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn concurrent_bookings_never_oversell() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let category = app.create_category(&admin, "Music").await;
    let event = app.create_event(&admin, &category, json!({ "capacity": 5 })).await;
    let event_id = event["id"].as_str().unwrap().to_string();

    let mut users = Vec::new();
    for i in 0..8 {
        users.push(app.register_and_login(&format!("User{}", i)).await);
    }

    let attempts = users.iter().map(|u| app.book(u, &event_id, 1));
    let results = futures::future::join_all(attempts).await;

    let created = results.iter().filter(|(s, _)| *s == StatusCode::CREATED).count();
    let rejected = results.iter().filter(|(s, _)| *s == StatusCode::CONFLICT).count();
    assert_eq!(created, 5);
    assert_eq!(rejected, 3);

    let sold: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0) FROM bookings WHERE event_id = ?")
        .bind(&event_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(sold, 5);
}

#[tokio::test]
async fn owner_may_cancel_but_not_confirm() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let category = app.create_category(&admin, "Music").await;
    let event = app.create_event(&admin, &category, json!({})).await;
    let user = app.register_and_login("Alice").await;

    let (_, booking) = app.book(&user, event["id"].as_str().unwrap(), 1).await;
    let booking_id = booking["id"].as_str().unwrap();

    let (status, _) = app.set_booking_status(&user, booking_id, "CONFIRMED").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.set_booking_status(&user, booking_id, "CANCELLED").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELLED");

    // Terminal: nothing moves a cancelled booking.
    let (status, _) = app.set_booking_status(&admin, booking_id, "CONFIRMED").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn organizer_confirms_and_user_is_notified() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let category = app.create_category(&admin, "Music").await;
    let event = app.create_event(&admin, &category, json!({})).await;
    let user = app.register_and_login("Alice").await;
    let stranger = app.register_and_login("Mallory").await;

    let (_, booking) = app.book(&user, event["id"].as_str().unwrap(), 1).await;
    let booking_id = booking["id"].as_str().unwrap();

    let (status, _) = app.set_booking_status(&stranger, booking_id, "CANCELLED").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.set_booking_status(&admin, booking_id, "CONFIRMED").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CONFIRMED");

    let (_, notifications) = app.request(Method::GET, "/api/v1/notifications", Some(&user), None).await;
    let messages: Vec<&str> = notifications.as_array().unwrap()
        .iter()
        .map(|n| n["message"].as_str().unwrap())
        .collect();
    assert!(messages.iter().any(|m| m.contains("has been confirmed")));

    let (status, _) = app.set_booking_status(&admin, booking_id, "NOT_A_STATUS").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn booking_details_are_private_to_the_owner() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let category = app.create_category(&admin, "Music").await;
    let event = app.create_event(&admin, &category, json!({})).await;
    let user = app.register_and_login("Alice").await;
    let other = app.register_and_login("Bob").await;

    let (_, booking) = app.book(&user, event["id"].as_str().unwrap(), 1).await;
    let uri = format!("/api/v1/bookings/{}", booking["id"].as_str().unwrap());

    let (status, details) = app.request(Method::GET, &uri, Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["event"]["title"], "Jazz Night");
    assert!(details["payment"].is_null());

    let (status, _) = app.request(Method::GET, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_is_scoped_to_the_caller() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let category = app.create_category(&admin, "Music").await;
    let event = app.create_event(&admin, &category, json!({})).await;
    let event_id = event["id"].as_str().unwrap();
    let alice = app.register_and_login("Alice").await;
    let bob = app.register_and_login("Bob").await;

    app.book(&alice, event_id, 1).await;
    app.book(&bob, event_id, 1).await;

    let (status, mine) = app.request(Method::GET, "/api/v1/bookings", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);

    // Not the organizer: eventId only narrows her own bookings.
    let uri = format!("/api/v1/bookings?eventId={}", event_id);
    let (_, narrowed) = app.request(Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(narrowed.as_array().unwrap().len(), 1);

    let (_, all_for_event) = app.request(Method::GET, &uri, Some(&admin), None).await;
    assert_eq!(all_for_event.as_array().unwrap().len(), 2);

    let uri = format!("/api/v1/bookings?userId={}", bob.user_id);
    let (status, _) = app.request(Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, all) = app.request(Method::GET, "/api/v1/admin/bookings", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (status, _) = app.request(Method::GET, "/api/v1/admin/bookings", Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn owner_deletes_booking() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let category = app.create_category(&admin, "Music").await;
    let event = app.create_event(&admin, &category, json!({})).await;
    let user = app.register_and_login("Alice").await;
    let other = app.register_and_login("Bob").await;

    let (_, booking) = app.book(&user, event["id"].as_str().unwrap(), 1).await;
    let uri = format!("/api/v1/bookings?bookingId={}", booking["id"].as_str().unwrap());

    let (status, _) = app.request(Method::DELETE, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request(Method::DELETE, &uri, Some(&user), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.request(Method::DELETE, &uri, Some(&user), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.request(Method::DELETE, "/api/v1/bookings", Some(&user), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unauthenticated_and_csrf_less_requests_are_rejected() {
    let app = TestApp::new().await;
    let user = app.register_and_login("Alice").await;

    let (status, _) = app.request(Method::GET, "/api/v1/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = common::AuthHeaders {
        user_id: user.user_id.clone(),
        access_token: user.access_token.clone(),
        csrf_token: "wrong".into(),
    };
    let (status, _) = app.book(&forged, "any", 1).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
