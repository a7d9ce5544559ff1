use std::sync::Arc;
use serde::Serialize;
use tracing::info;
use crate::domain::{
    models::{
        booking::{Booking, BookingScope, BookingStatus},
        event::Event,
        notification::NotificationPayload,
        payment::Payment,
        user::Caller,
    },
    ports::{BookingRepository, EventRepository, PaymentRepository},
    services::{booking_policy, notification_service::NotificationService},
};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub event: Event,
    pub payment: Option<Payment>,
}

pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    events: Arc<dyn EventRepository>,
    payments: Arc<dyn PaymentRepository>,
    notifications: Arc<NotificationService>,
}

impl BookingService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        events: Arc<dyn EventRepository>,
        payments: Arc<dyn PaymentRepository>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self { bookings, events, payments, notifications }
    }

    pub async fn create(&self, caller: &Caller, event_id: &str, quantity: i32) -> Result<Booking, AppError> {
        if quantity < 1 {
            return Err(AppError::Validation("Quantity must be at least 1".into()));
        }

        let event = self.events.find_by_id(event_id).await?
            .filter(|e| e.is_published)
            .ok_or(AppError::NotFound("Event not found".into()))?;

        let booking = Booking::new(caller.id.clone(), event.id.clone(), quantity);
        let booking = self.bookings.create_within_capacity(&booking).await?
            .ok_or_else(|| AppError::Conflict("Not enough tickets left for this event".into()))?;

        info!(booking_id = %booking.id, event_id = %event.id, quantity, "booking created");

        self.notifications.emit_best_effort(&caller.id, NotificationPayload::BookingUpdate {
            event_title: event.title.clone(),
            status: booking.status,
        }).await;

        Ok(booking)
    }

    /// Resolves who the caller may see before listing.
    pub async fn list(&self, caller: &Caller, event_id: Option<String>, user_id: Option<String>) -> Result<Vec<Booking>, AppError> {
        let scope = self.resolve_scope(caller, event_id, user_id).await?;
        self.bookings.list(&scope).await
    }

    async fn resolve_scope(&self, caller: &Caller, event_id: Option<String>, user_id: Option<String>) -> Result<BookingScope, AppError> {
        if let Some(user_id) = user_id {
            if user_id != caller.id && !caller.is_admin() {
                return Err(AppError::Forbidden("Cannot list another user's bookings".into()));
            }
            return Ok(BookingScope::User { user_id, event_id });
        }

        if let Some(event_id) = event_id.as_deref()
            && let Some(event) = self.events.find_by_id(event_id).await?
            && booking_policy::can_view_event_bookings(caller, &event)
        {
            return Ok(BookingScope::Event { event_id: event.id });
        }

        Ok(BookingScope::User { user_id: caller.id.clone(), event_id })
    }

    pub async fn get_details(&self, caller: &Caller, id: &str) -> Result<BookingDetails, AppError> {
        let booking = self.bookings.find_by_id(id).await?
            .filter(|b| b.user_id == caller.id)
            .ok_or(AppError::NotFound("Booking not found".into()))?;

        let event = self.events.find_by_id(&booking.event_id).await?
            .ok_or(AppError::NotFound("Event not found".into()))?;
        let payment = self.payments.find_by_booking(&booking.id).await?;

        Ok(BookingDetails { booking, event, payment })
    }

    pub async fn update_status(&self, caller: &Caller, id: &str, next: BookingStatus) -> Result<Booking, AppError> {
        let booking = self.bookings.find_by_id(id).await?
            .ok_or(AppError::NotFound("Booking not found".into()))?;
        let event = self.events.find_by_id(&booking.event_id).await?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        if !booking.status.can_become(next) {
            return Err(AppError::Validation(format!(
                "Cannot change booking from {} to {}", booking.status, next
            )));
        }
        if !booking_policy::can_transition(caller, &booking, &event, next) {
            return Err(AppError::Forbidden("Not allowed to change this booking".into()));
        }

        let updated = self.bookings.update_status(&booking.id, booking.status, next).await?
            .ok_or_else(|| AppError::Conflict("Booking was changed by another request".into()))?;
        info!(booking_id = %updated.id, from = %booking.status, to = %next, "booking status changed");

        self.notifications.emit_best_effort(&updated.user_id, NotificationPayload::BookingUpdate {
            event_title: event.title,
            status: next,
        }).await;

        Ok(updated)
    }

    pub async fn delete(&self, caller: &Caller, id: &str) -> Result<(), AppError> {
        let booking = self.bookings.find_by_id(id).await?
            .ok_or(AppError::NotFound("Booking not found".into()))?;
        let event = self.events.find_by_id(&booking.event_id).await?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        if !booking_policy::can_delete(caller, &booking, &event) {
            return Err(AppError::Forbidden("Not allowed to delete this booking".into()));
        }

        self.bookings.delete(&booking.id).await?;
        info!(booking_id = %booking.id, "booking deleted");
        Ok(())
    }

    pub async fn list_all(&self) -> Result<Vec<Booking>, AppError> {
        self.bookings.list_all().await
    }
}
