use crate::domain::models::{
    analytics::AnalyticsSummary,
    auth::RefreshTokenRecord,
    booking::{Booking, BookingScope, BookingStatus},
    category::Category,
    event::{Event, EventFilter, EventListing},
    notification::Notification,
    payment::Payment,
    review::{Review, ReviewWithAuthor},
    settings::SiteSettings,
    user::User,
};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn list(&self) -> Result<Vec<User>, AppError>;
    async fn update(&self, user: &User) -> Result<User, AppError>;
    /// Removes the user together with their notifications, reviews, bookings,
    /// payments and refresh tokens.
    async fn delete_cascade(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AppError>;
    async fn delete_refresh_token(&self, token_hash: &str) -> Result<(), AppError>;
    async fn delete_refresh_family(&self, family_id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: &Category) -> Result<Category, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Category>, AppError>;
    async fn list(&self) -> Result<Vec<Category>, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<Event, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError>;
    async fn search(&self, filter: &EventFilter) -> Result<Vec<EventListing>, AppError>;
    async fn list_featured(&self, limit: i64) -> Result<Vec<EventListing>, AppError>;
    async fn count_by_category(&self, category_id: &str) -> Result<i64, AppError>;
    async fn count_by_organizer(&self, organizer_id: &str) -> Result<i64, AppError>;
    async fn update(&self, event: &Event) -> Result<Event, AppError>;
    async fn increment_views(&self, id: &str) -> Result<(), AppError>;
    /// Deletes reviews, payments and bookings of the event, then the event
    /// itself, in one transaction. Returns the number of bookings removed.
    async fn delete_cascade(&self, id: &str) -> Result<u64, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Inserts the booking only if the event's remaining capacity covers its
    /// quantity. Returns `None` when the event would be oversold.
    async fn create_within_capacity(&self, booking: &Booking) -> Result<Option<Booking>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn list(&self, scope: &BookingScope) -> Result<Vec<Booking>, AppError>;
    async fn list_all(&self) -> Result<Vec<Booking>, AppError>;
    /// Moves the booking from `from` to `to`. Returns `None` when the stored
    /// status is no longer `from`.
    async fn update_status(&self, id: &str, from: BookingStatus, to: BookingStatus) -> Result<Option<Booking>, AppError>;
    async fn exists_with_status(&self, user_id: &str, event_id: &str, statuses: &[BookingStatus]) -> Result<bool, AppError>;
    async fn list_user_ids_with_status(&self, event_id: &str, statuses: &[BookingStatus]) -> Result<Vec<String>, AppError>;
    /// Deletes the booking and its payment in one transaction.
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Inserts the payment and flips the owning booking to PAID atomically.
    async fn record_and_mark_paid(&self, payment: &Payment) -> Result<(Payment, Booking), AppError>;
    async fn find_by_booking(&self, booking_id: &str) -> Result<Option<Payment>, AppError>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn create(&self, review: &Review) -> Result<Review, AppError>;
    async fn find_by_user_and_event(&self, user_id: &str, event_id: &str) -> Result<Option<Review>, AppError>;
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<ReviewWithAuthor>, AppError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &Notification) -> Result<Notification, AppError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Notification>, AppError>;
    /// Returns `None` when no notification with that id belongs to the user.
    async fn mark_read(&self, user_id: &str, id: &str) -> Result<Option<Notification>, AppError>;
    async fn mark_all_read(&self, user_id: &str) -> Result<u64, AppError>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get(&self) -> Result<Option<SiteSettings>, AppError>;
    async fn upsert(&self, settings: &SiteSettings) -> Result<SiteSettings, AppError>;
    async fn analytics(&self) -> Result<AnalyticsSummary, AppError>;
}
