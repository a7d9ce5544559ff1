use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put, patch, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{admin, auth, booking, category, event, health, notification, payment, review, user};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))

        // Catalog
        .route("/api/v1/events", get(event::list_events).post(event::create_event))
        .route("/api/v1/events/featured", get(event::featured_events))
        .route("/api/v1/events/{id}", get(event::get_event).put(event::update_event).delete(event::delete_event))
        .route("/api/v1/events/{id}/publish", patch(event::toggle_publish))
        .route("/api/v1/events/{id}/reminders", post(event::send_reminders))
        .route("/api/v1/categories", get(category::list_categories).post(category::create_category))
        .route("/api/v1/categories/{id}", delete(category::delete_category))

        // Bookings & Payments
        .route("/api/v1/bookings", post(booking::create_booking)
            .get(booking::list_bookings)
            .patch(booking::update_booking)
            .delete(booking::delete_booking))
        .route("/api/v1/bookings/{id}", get(booking::get_booking))
        .route("/api/v1/payments", post(payment::create_payment).get(payment::get_payment))

        // Reviews & Notifications
        .route("/api/v1/reviews", get(review::list_reviews).post(review::create_review))
        .route("/api/v1/notifications", get(notification::list_notifications).patch(notification::mark_read))
        .route("/api/v1/notifications/read-all", patch(notification::mark_all_read))

        // Profile
        .route("/api/v1/users/me", get(user::get_me).patch(user::update_me))
        .route("/api/v1/users/me/preferences", patch(user::update_preferences))

        // Site settings & Admin
        .route("/api/v1/settings", get(admin::get_settings))
        .route("/api/v1/admin/settings", put(admin::update_settings))
        .route("/api/v1/admin/users", get(admin::list_users))
        .route("/api/v1/admin/users/{id}", delete(admin::delete_user))
        .route("/api/v1/admin/bookings", get(booking::list_all_bookings))
        .route("/api/v1/admin/analytics", get(admin::analytics))
        .route("/api/v1/admin/notifications/broadcast", post(admin::broadcast))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
