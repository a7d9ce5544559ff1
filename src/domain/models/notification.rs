use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;
use super::{booking::BookingStatus, UnknownVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    BookingUpdate,
    EventReminder,
    System,
    PaymentSuccess,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::BookingUpdate => "BOOKING_UPDATE",
            NotificationType::EventReminder => "EVENT_REMINDER",
            NotificationType::System => "SYSTEM",
            NotificationType::PaymentSuccess => "PAYMENT_SUCCESS",
        }
    }
}

impl FromStr for NotificationType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BOOKING_UPDATE" => Ok(NotificationType::BookingUpdate),
            "EVENT_REMINDER" => Ok(NotificationType::EventReminder),
            "SYSTEM" => Ok(NotificationType::System),
            "PAYMENT_SUCCESS" => Ok(NotificationType::PaymentSuccess),
            other => Err(UnknownVariant { kind: "notification type", value: other.to_string() }),
        }
    }
}

impl TryFrom<String> for NotificationType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// What happened, independent of how it is worded.
#[derive(Debug, Clone)]
pub enum NotificationPayload {
    BookingUpdate { event_title: String, status: BookingStatus },
    PaymentSuccess { event_title: String, amount: f64 },
    EventReminder { event_title: String, starts_at: DateTime<Tz> },
    System { title: String, text: String },
}

impl NotificationPayload {
    pub fn kind(&self) -> NotificationType {
        match self {
            NotificationPayload::BookingUpdate { .. } => NotificationType::BookingUpdate,
            NotificationPayload::PaymentSuccess { .. } => NotificationType::PaymentSuccess,
            NotificationPayload::EventReminder { .. } => NotificationType::EventReminder,
            NotificationPayload::System { .. } => NotificationType::System,
        }
    }

    /// Returns `(title, message)`.
    pub fn render(&self) -> (String, String) {
        match self {
            NotificationPayload::BookingUpdate { event_title, status } => (
                "Booking Update".to_string(),
                format!(
                    "Your booking for \"{}\" has been {}.",
                    event_title,
                    status.as_str().to_lowercase()
                ),
            ),
            NotificationPayload::PaymentSuccess { event_title, amount } => (
                "Payment Successful".to_string(),
                format!(
                    "Your payment of ${:.2} for {} has been processed successfully.",
                    amount, event_title
                ),
            ),
            NotificationPayload::EventReminder { event_title, starts_at } => (
                "Event Reminder".to_string(),
                format!(
                    "Reminder: \"{}\" is happening tomorrow at {}.",
                    event_title,
                    starts_at.format("%-I:%M %p")
                ),
            ),
            NotificationPayload::System { title, text } => (title.clone(), text.clone()),
        }
    }

    pub fn into_notification(self, user_id: String) -> Notification {
        let (title, message) = self.render();
        Notification {
            id: Uuid::new_v4().to_string(),
            user_id,
            notification_type: self.kind(),
            title,
            message,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}
