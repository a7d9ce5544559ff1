use std::sync::Arc;
use tracing::info;
use crate::domain::{
    models::{
        booking::BookingStatus,
        review::{Review, ReviewWithAuthor},
        user::Caller,
    },
    ports::{BookingRepository, EventRepository, ReviewRepository},
};
use crate::error::AppError;

pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
    bookings: Arc<dyn BookingRepository>,
    events: Arc<dyn EventRepository>,
}

impl ReviewService {
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        bookings: Arc<dyn BookingRepository>,
        events: Arc<dyn EventRepository>,
    ) -> Self {
        Self { reviews, bookings, events }
    }

    pub async fn create(&self, caller: &Caller, event_id: &str, rating: i32, comment: Option<String>) -> Result<Review, AppError> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::Validation("Rating must be between 1 and 5".into()));
        }

        let event = self.events.find_by_id(event_id).await?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        let attended = self.bookings
            .exists_with_status(&caller.id, &event.id, &BookingStatus::REVIEW_QUALIFYING)
            .await?;
        if !attended {
            return Err(AppError::Forbidden("Only paid attendees can review this event".into()));
        }

        if self.reviews.find_by_user_and_event(&caller.id, &event.id).await?.is_some() {
            return Err(AppError::Conflict("You have already reviewed this event".into()));
        }

        let comment = comment.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
        let review = self.reviews.create(&Review::new(caller.id.clone(), event.id, rating, comment)).await?;
        info!(review_id = %review.id, event_id = %review.event_id, rating, "review created");
        Ok(review)
    }

    pub async fn list(&self, event_id: &str) -> Result<Vec<ReviewWithAuthor>, AppError> {
        self.reviews.list_by_event(event_id).await
    }
}
