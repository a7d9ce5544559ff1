use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Primary key of the single settings row.
pub const SITE_SETTINGS_ID: &str = "site";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub id: String,
    pub site_name: String,
    pub site_description: Option<String>,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub facebook_url: Option<String>,
    pub twitter_url: Option<String>,
    pub instagram_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}
