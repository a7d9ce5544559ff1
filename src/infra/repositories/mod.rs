pub mod sqlite_auth_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_category_repo;
pub mod sqlite_event_repo;
pub mod sqlite_notification_repo;
pub mod sqlite_payment_repo;
pub mod sqlite_review_repo;
pub mod sqlite_settings_repo;
pub mod sqlite_user_repo;

pub mod postgres_auth_repo;
pub mod postgres_booking_repo;
pub mod postgres_category_repo;
pub mod postgres_event_repo;
pub mod postgres_notification_repo;
pub mod postgres_payment_repo;
pub mod postgres_review_repo;
pub mod postgres_settings_repo;
pub mod postgres_user_repo;

use crate::error::{is_unique_violation, AppError};

/// Event columns plus the counters shown in listings.
pub(crate) const LISTING_SELECT: &str = "SELECT e.*, c.name AS category_name,
    (SELECT COUNT(*) FROM bookings b WHERE b.event_id = e.id AND b.status != 'CANCELLED') AS booking_count,
    (SELECT COUNT(*) FROM reviews r WHERE r.event_id = e.id) AS review_count
    FROM events e LEFT JOIN categories c ON c.id = e.category_id";

/// Maps a unique-index violation to `Conflict`, anything else to `Database`.
pub(crate) fn conflict_on_duplicate(message: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        if is_unique_violation(&e) {
            AppError::Conflict(message.to_string())
        } else {
            AppError::Database(e)
        }
    }
}
