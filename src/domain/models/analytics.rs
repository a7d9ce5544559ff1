use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Serialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_users: i64,
    pub total_events: i64,
    pub total_bookings: i64,
    pub paid_tickets: i64,
    pub revenue: f64,
}
