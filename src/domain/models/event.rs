use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// Keeps a search term from matching across two fields.
const SEARCH_FIELD_SEPARATOR: &str = "\u{1f}";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub category_id: String,
    pub price: f64,
    pub capacity: i32,
    pub image_url: String,
    pub is_published: bool,
    pub tags: Json<Vec<String>>,
    pub organizer_id: String,
    pub views: i64,
    pub created_at: DateTime<Utc>,
}

pub struct NewEventParams {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub category_id: String,
    pub price: f64,
    pub capacity: i32,
    pub image_url: String,
    pub is_published: bool,
    pub tags: Vec<String>,
    pub organizer_id: String,
}

impl Event {
    pub fn new(params: NewEventParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: params.title,
            description: params.description,
            date: params.date,
            location: params.location,
            category_id: params.category_id,
            price: params.price,
            capacity: params.capacity,
            image_url: params.image_url,
            is_published: params.is_published,
            tags: Json(params.tags),
            organizer_id: params.organizer_id,
            views: 0,
            created_at: Utc::now(),
        }
    }

    pub fn is_organized_by(&self, user_id: &str) -> bool {
        self.organizer_id == user_id
    }

    /// Lower-cased title, description and location, stored beside the row so
    /// both backends fold case the same way when searching.
    pub fn search_text(&self) -> String {
        [self.title.as_str(), self.description.as_str(), self.location.as_str()]
            .join(SEARCH_FIELD_SEPARATOR)
            .to_lowercase()
    }
}

/// Event row annotated with catalog counters for listings.
#[derive(Debug, Serialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EventListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
    pub category_name: Option<String>,
    pub booking_count: i64,
    pub review_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventSort {
    #[default]
    Date,
    PriceAsc,
    PriceDesc,
    Popularity,
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub day: Option<NaiveDate>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: EventSort,
    pub include_unpublished: bool,
}
