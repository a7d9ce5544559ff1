use std::sync::Arc;
use tracing::{info, warn};
use crate::domain::{
    models::{notification::NotificationPayload, payment::Payment, user::Caller},
    ports::{BookingRepository, EventRepository, PaymentRepository},
    services::notification_service::NotificationService,
};
use crate::error::AppError;

pub struct PaymentService {
    payments: Arc<dyn PaymentRepository>,
    bookings: Arc<dyn BookingRepository>,
    events: Arc<dyn EventRepository>,
    notifications: Arc<NotificationService>,
}

impl PaymentService {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        bookings: Arc<dyn BookingRepository>,
        events: Arc<dyn EventRepository>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self { payments, bookings, events, notifications }
    }

    pub async fn record(&self, caller: &Caller, booking_id: &str, amount: f64, method: &str) -> Result<Payment, AppError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(AppError::Validation("Amount must be a positive number".into()));
        }
        if !has_cent_precision(amount) {
            return Err(AppError::Validation("Amount cannot have more than two decimals".into()));
        }
        if method.trim().is_empty() {
            return Err(AppError::Validation("Payment method is required".into()));
        }

        let booking = self.bookings.find_by_id(booking_id).await?
            .ok_or(AppError::NotFound("Booking not found".into()))?;
        if booking.user_id != caller.id {
            return Err(AppError::Forbidden("Booking belongs to another user".into()));
        }
        if self.payments.find_by_booking(&booking.id).await?.is_some() {
            return Err(AppError::Conflict("Booking is already paid".into()));
        }
        if !booking.status.accepts_payment() {
            return Err(AppError::Conflict(format!("Cannot pay a {} booking", booking.status)));
        }

        // Status is re-checked inside the transaction; a racing payment loses on the unique index.
        let payment = Payment::succeeded(booking.id.clone(), amount, method.trim().to_string());
        let (payment, booking) = self.payments.record_and_mark_paid(&payment).await?;
        info!(payment_id = %payment.id, booking_id = %booking.id, amount, "payment recorded");

        let event_title = match self.events.find_by_id(&booking.event_id).await {
            Ok(Some(event)) => event.title,
            Ok(None) => "your event".to_string(),
            Err(e) => {
                warn!(booking_id = %booking.id, event_id = %booking.event_id, error = ?e, "event lookup failed after payment");
                "your event".to_string()
            }
        };
        self.notifications.emit_best_effort(&caller.id, NotificationPayload::PaymentSuccess {
            event_title,
            amount,
        }).await;

        Ok(payment)
    }

    pub async fn get(&self, caller: &Caller, booking_id: &str) -> Result<Payment, AppError> {
        let booking = self.bookings.find_by_id(booking_id).await?
            .filter(|b| b.user_id == caller.id)
            .ok_or(AppError::NotFound("Booking not found".into()))?;

        self.payments.find_by_booking(&booking.id).await?
            .ok_or(AppError::NotFound("Payment not found".into()))
    }
}

/// Tolerates the binary representation error of values like `19.99`.
fn has_cent_precision(amount: f64) -> bool {
    let cents = amount * 100.0;
    (cents - cents.round()).abs() < 1e-6
}
