mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::{json, Value};

fn titles(listing: &Value) -> Vec<&str> {
    listing.as_array().unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn search_is_case_insensitive_and_hides_drafts() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let category = app.create_category(&admin, "Music").await;
    app.create_event(&admin, &category, json!({ "title": "Jazz Night" })).await;
    app.create_event(&admin, &category, json!({ "title": "Rock Fest", "description": "Loud guitars" })).await;
    app.create_event(&admin, &category, json!({ "title": "Morning Show", "description": "Smooth JAZZ breakfast" })).await;
    app.create_event(&admin, &category, json!({ "title": "Jazz Rehearsal", "isPublished": false })).await;
    app.create_event(&admin, &category, json!({ "title": "CAFÉ Sessions", "location": "Straße 5" })).await;

    let (status, listing) = app.request(Method::GET, "/api/v1/events?search=jAzZ", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let mut found = titles(&listing);
    found.sort();
    assert_eq!(found, vec!["Jazz Night", "Morning Show"]);

    let (_, listing) = app.request(Method::GET, "/api/v1/events?search=jazz", Some(&admin), None).await;
    assert_eq!(listing.as_array().unwrap().len(), 3);

    // Non-ASCII letters fold on both sides.
    let (_, listing) = app.request(Method::GET, "/api/v1/events?search=caf%C3%A9", None, None).await;
    assert_eq!(titles(&listing), vec!["CAFÉ Sessions"]);

    let (_, listing) = app.request(Method::GET, "/api/v1/events?search=STRASSE", None, None).await;
    assert!(listing.as_array().unwrap().is_empty());

    let (_, listing) = app.request(Method::GET, "/api/v1/events?search=STRA%C3%9FE", None, None).await;
    assert_eq!(titles(&listing), vec!["CAFÉ Sessions"]);

    // A term never spans two fields.
    let (_, listing) = app.request(Method::GET, "/api/v1/events?search=night%20live", None, None).await;
    assert!(listing.as_array().unwrap().is_empty());

    // LIKE wildcards in the term are literal.
    let (_, listing) = app.request(Method::GET, "/api/v1/events?search=%25", None, None).await;
    assert!(listing.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn listing_filters_by_category_day_and_price() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let music = app.create_category(&admin, "Music").await;
    let sports = app.create_category(&admin, "Sports").await;
    app.create_event(&admin, &music, json!({ "title": "Cheap Gig", "price": 10.0, "date": "2030-06-20T09:00:00Z" })).await;
    app.create_event(&admin, &music, json!({ "title": "Gala", "price": 200.0, "date": "2030-06-21T20:00:00Z" })).await;
    app.create_event(&admin, &sports, json!({ "title": "Derby", "price": 60.0, "date": "2030-06-20T23:30:00Z" })).await;

    let (_, listing) = app.request(Method::GET, &format!("/api/v1/events?category={}", music), None, None).await;
    assert_eq!(titles(&listing), vec!["Cheap Gig", "Gala"]);
    assert_eq!(listing[0]["categoryName"], "Music");

    let (_, listing) = app.request(Method::GET, "/api/v1/events?date=2030-06-20", None, None).await;
    assert_eq!(titles(&listing), vec!["Cheap Gig", "Derby"]);

    let (_, listing) = app.request(Method::GET, "/api/v1/events?minPrice=50&maxPrice=100", None, None).await;
    assert_eq!(titles(&listing), vec!["Derby"]);

    let (_, listing) = app.request(Method::GET, "/api/v1/events?sortBy=price-desc", None, None).await;
    assert_eq!(titles(&listing), vec!["Gala", "Derby", "Cheap Gig"]);

    let (_, listing) = app.request(Method::GET, "/api/v1/events?sortBy=price-asc&minPrice=&search=", None, None).await;
    assert_eq!(titles(&listing), vec!["Cheap Gig", "Derby", "Gala"]);
}

#[tokio::test]
async fn malformed_filters_are_rejected() {
    let app = TestApp::new().await;

    let (status, _) = app.request(Method::GET, "/api/v1/events?date=20-06-2030", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.request(Method::GET, "/api/v1/events?minPrice=cheap", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.request(Method::GET, "/api/v1/events?minPrice=100&maxPrice=10", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn popularity_sort_ranks_by_bookings() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let category = app.create_category(&admin, "Music").await;
    let quiet = app.create_event(&admin, &category, json!({ "title": "Quiet", "date": "2030-01-01T10:00:00Z" })).await;
    let busy = app.create_event(&admin, &category, json!({ "title": "Busy", "date": "2030-12-01T10:00:00Z" })).await;
    let alice = app.register_and_login("Alice").await;
    let bob = app.register_and_login("Bob").await;

    app.book(&alice, busy["id"].as_str().unwrap(), 1).await;
    app.book(&bob, busy["id"].as_str().unwrap(), 1).await;
    app.book(&alice, quiet["id"].as_str().unwrap(), 1).await;

    let (_, listing) = app.request(Method::GET, "/api/v1/events?sortBy=popularity", None, None).await;
    assert_eq!(titles(&listing), vec!["Busy", "Quiet"]);
    assert_eq!(listing[0]["bookingCount"], 2);

    // Cancelled bookings no longer count towards popularity.
    let (_, bookings) = app.request(Method::GET, &format!("/api/v1/bookings?eventId={}", busy["id"].as_str().unwrap()), Some(&admin), None).await;
    for booking in bookings.as_array().unwrap() {
        let (status, _) = app.set_booking_status(&admin, booking["id"].as_str().unwrap(), "CANCELLED").await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, listing) = app.request(Method::GET, "/api/v1/events?sortBy=popularity", None, None).await;
    assert_eq!(titles(&listing), vec!["Quiet", "Busy"]);
    assert_eq!(listing[1]["bookingCount"], 0);

    let (_, listing) = app.request(Method::GET, "/api/v1/events?sortBy=unknown", None, None).await;
    assert_eq!(titles(&listing), vec!["Quiet", "Busy"]);
}

#[tokio::test]
async fn event_detail_counts_views_and_hides_drafts() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let category = app.create_category(&admin, "Music").await;
    let event = app.create_event(&admin, &category, json!({})).await;
    let draft = app.create_event(&admin, &category, json!({ "isPublished": false })).await;

    let uri = format!("/api/v1/events/{}", event["id"].as_str().unwrap());
    app.request(Method::GET, &uri, None, None).await;
    let (status, detail) = app.request(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["views"], 2);

    let draft_uri = format!("/api/v1/events/{}", draft["id"].as_str().unwrap());
    let (status, _) = app.request(Method::GET, &draft_uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.request(Method::GET, &draft_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn featured_lists_upcoming_published_events() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let category = app.create_category(&admin, "Music").await;
    app.create_event(&admin, &category, json!({ "title": "Past", "date": "2001-01-01T10:00:00Z" })).await;
    app.create_event(&admin, &category, json!({ "title": "Hidden", "isPublished": false })).await;
    for i in 0..7 {
        app.create_event(&admin, &category, json!({ "title": format!("Upcoming {}", i), "date": format!("2030-01-0{}T10:00:00Z", i + 1) })).await;
    }

    let (status, featured) = app.request(Method::GET, "/api/v1/events/featured", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let found = titles(&featured);
    assert_eq!(found.len(), 6);
    assert_eq!(found[0], "Upcoming 0");
    assert!(!found.contains(&"Past"));
    assert!(!found.contains(&"Hidden"));
}

#[tokio::test]
async fn event_management_is_admin_only_and_validated() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let user = app.register_and_login("Alice").await;
    let category = app.create_category(&admin, "Music").await;

    let (status, _) = app.request(
        Method::POST,
        "/api/v1/events",
        Some(&user),
        Some(json!({
            "title": "Mine", "description": "d", "date": "2030-01-01T10:00:00Z", "location": "x",
            "categoryId": category, "price": 1.0, "capacity": 1, "imageUrl": "https://img.test/a.png"
        })),
    ).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request(
        Method::POST,
        "/api/v1/events",
        Some(&admin),
        Some(json!({
            "title": "Bad", "description": "d", "date": "2030-01-01T10:00:00Z", "location": "x",
            "categoryId": category, "price": 1.0, "capacity": 0, "imageUrl": "https://img.test/a.png"
        })),
    ).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.request(
        Method::POST,
        "/api/v1/events",
        Some(&admin),
        Some(json!({
            "title": "Orphan", "description": "d", "date": "2030-01-01T10:00:00Z", "location": "x",
            "categoryId": "no-such-category", "price": 1.0, "capacity": 5, "imageUrl": "https://img.test/a.png"
        })),
    ).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let event = app.create_event(&admin, &category, json!({})).await;
    let id = event["id"].as_str().unwrap();

    let (status, updated) = app.request(
        Method::PUT,
        &format!("/api/v1/events/{}", id),
        Some(&admin),
        Some(json!({ "title": "Jazz Night II", "price": 65.5 })),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Jazz Night II");
    assert_eq!(updated["price"], 65.5);
    assert_eq!(updated["location"], "Blue Hall");

    let (_, listing) = app.request(Method::GET, "/api/v1/events?search=night%20ii", None, None).await;
    assert_eq!(titles(&listing), vec!["Jazz Night II"]);

    let (status, toggled) = app.request(Method::PATCH, &format!("/api/v1/events/{}/publish", id), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["isPublished"], false);
}

#[tokio::test]
async fn deleting_an_event_removes_its_bookings() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let category = app.create_category(&admin, "Music").await;
    let event = app.create_event(&admin, &category, json!({})).await;
    let event_id = event["id"].as_str().unwrap();
    let user = app.register_and_login("Alice").await;

    let (_, booking) = app.book(&user, event_id, 1).await;
    app.pay(&user, booking["id"].as_str().unwrap(), 50.0).await;
    app.request(
        Method::POST,
        "/api/v1/reviews",
        Some(&user),
        Some(json!({ "eventId": event_id, "rating": 4 })),
    ).await;

    let (status, _) = app.request(Method::DELETE, &format!("/api/v1/events/{}", event_id), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for table in ["bookings", "reviews"] {
        let remaining: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE event_id = ?", table))
            .bind(event_id)
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

    let (status, _) = app.request(Method::DELETE, &format!("/api/v1/events/{}", event_id), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reminders_reach_paid_and_confirmed_attendees() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let category = app.create_category(&admin, "Music").await;
    let event = app.create_event(&admin, &category, json!({ "date": "2030-06-20T19:00:00Z" })).await;
    let event_id = event["id"].as_str().unwrap();
    let paid = app.register_and_login("Alice").await;
    let pending = app.register_and_login("Bob").await;

    let (_, booking) = app.book(&paid, event_id, 1).await;
    app.pay(&paid, booking["id"].as_str().unwrap(), 50.0).await;
    app.book(&pending, event_id, 1).await;

    let (status, body) = app.request(
        Method::POST,
        &format!("/api/v1/events/{}/reminders", event_id),
        Some(&admin),
        None,
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (_, notifications) = app.request(Method::GET, "/api/v1/notifications", Some(&paid), None).await;
    let reminder = notifications.as_array().unwrap()
        .iter()
        .find(|n| n["type"] == "EVENT_REMINDER")
        .expect("no reminder");
    assert_eq!(reminder["message"], "Reminder: \"Jazz Night\" is happening tomorrow at 7:00 PM.");
}

#[tokio::test]
async fn categories_in_use_cannot_be_deleted() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let used = app.create_category(&admin, "Music").await;
    let unused = app.create_category(&admin, "Poetry").await;
    app.create_event(&admin, &used, json!({})).await;

    let (status, _) = app.request(
        Method::POST,
        "/api/v1/categories",
        Some(&admin),
        Some(json!({ "name": "Music" })),
    ).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, listed) = app.request(Method::GET, "/api/v1/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 2);

    let (status, _) = app.request(Method::DELETE, &format!("/api/v1/categories/{}", used), Some(&admin), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.request(Method::DELETE, &format!("/api/v1/categories/{}", unused), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.request(Method::DELETE, &format!("/api/v1/categories/{}", unused), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
