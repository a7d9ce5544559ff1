use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub const PAYMENT_SUCCEEDED: &str = "SUCCESS";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub booking_id: String,
    pub amount: f64,
    pub status: String,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn succeeded(booking_id: String, amount: f64, payment_method: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id,
            amount,
            status: PAYMENT_SUCCEEDED.to_string(),
            payment_method,
            created_at: Utc::now(),
        }
    }
}
