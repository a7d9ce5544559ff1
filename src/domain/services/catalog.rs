use std::sync::Arc;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{info, warn};
use crate::domain::{
    models::{
        booking::BookingStatus,
        category::Category,
        event::{Event, EventFilter, EventListing, EventSort, NewEventParams},
        notification::NotificationPayload,
        user::Caller,
    },
    ports::{BookingRepository, CategoryRepository, EventRepository, UserRepository},
    services::notification_service::NotificationService,
};
use crate::error::AppError;

pub const FEATURED_LIMIT: i64 = 6;

/// Raw listing query as it arrives on `GET /events`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort_by: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_price(field: &str, value: &Option<String>) -> Result<Option<f64>, AppError> {
    match non_empty(value) {
        None => Ok(None),
        Some(raw) => raw.parse::<f64>().ok()
            .filter(|p| p.is_finite())
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("{field} must be a number"))),
    }
}

impl EventSort {
    /// Unknown values fall back to date order.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("price-asc") => EventSort::PriceAsc,
            Some("price-desc") => EventSort::PriceDesc,
            Some("popularity") => EventSort::Popularity,
            _ => EventSort::Date,
        }
    }

    pub fn order_clause(&self) -> &'static str {
        match self {
            EventSort::Date => " ORDER BY e.date ASC",
            EventSort::PriceAsc => " ORDER BY e.price ASC, e.date ASC",
            EventSort::PriceDesc => " ORDER BY e.price DESC, e.date ASC",
            EventSort::Popularity => " ORDER BY booking_count DESC, e.views DESC, e.date ASC",
        }
    }
}

pub fn build_filter(query: &EventQuery, caller: Option<&Caller>) -> Result<EventFilter, AppError> {
    let day = match non_empty(&query.date) {
        None => None,
        Some(raw) => Some(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| AppError::Validation("date must be formatted as YYYY-MM-DD".into()))?,
        ),
    };

    let min_price = parse_price("minPrice", &query.min_price)?;
    let max_price = parse_price("maxPrice", &query.max_price)?;
    if let (Some(min), Some(max)) = (min_price, max_price)
        && min > max
    {
        return Err(AppError::Validation("minPrice cannot exceed maxPrice".into()));
    }

    Ok(EventFilter {
        search: non_empty(&query.search).map(str::to_string),
        category_id: non_empty(&query.category).map(str::to_string),
        day,
        min_price,
        max_price,
        sort: EventSort::parse(non_empty(&query.sort_by)),
        include_unpublished: caller.is_some_and(Caller::is_admin),
    })
}

/// Lower-cased `%term%` with LIKE wildcards escaped by `\`.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Half-open UTC range covering the calendar day.
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub category_id: String,
    pub price: f64,
    pub capacity: i32,
    pub image_url: String,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub category_id: Option<String>,
    pub price: Option<f64>,
    pub capacity: Option<i32>,
    pub image_url: Option<String>,
    pub is_published: Option<bool>,
    pub tags: Option<Vec<String>>,
}

impl EventChanges {
    fn apply(self, event: &mut Event) {
        if let Some(v) = self.title { event.title = v; }
        if let Some(v) = self.description { event.description = v; }
        if let Some(v) = self.date { event.date = v; }
        if let Some(v) = self.location { event.location = v; }
        if let Some(v) = self.category_id { event.category_id = v; }
        if let Some(v) = self.price { event.price = v; }
        if let Some(v) = self.capacity { event.capacity = v; }
        if let Some(v) = self.image_url { event.image_url = v; }
        if let Some(v) = self.is_published { event.is_published = v; }
        if let Some(v) = self.tags { event.tags.0 = v; }
    }
}

pub fn validate_event(event: &Event) -> Result<(), AppError> {
    for (field, value) in [("title", &event.title), ("description", &event.description), ("location", &event.location)] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }
    if !event.price.is_finite() || event.price < 0.0 {
        return Err(AppError::Validation("price must be zero or more".into()));
    }
    if event.capacity <= 0 {
        return Err(AppError::Validation("capacity must be greater than zero".into()));
    }
    let url = event.image_url.trim();
    let rest = url.strip_prefix("https://").or_else(|| url.strip_prefix("http://"));
    if rest.is_none_or(str::is_empty) {
        return Err(AppError::Validation("imageUrl must be an http(s) URL".into()));
    }
    Ok(())
}

pub struct CatalogService {
    categories: Arc<dyn CategoryRepository>,
    events: Arc<dyn EventRepository>,
    bookings: Arc<dyn BookingRepository>,
    users: Arc<dyn UserRepository>,
    notifications: Arc<NotificationService>,
    display_tz: Tz,
}

impl CatalogService {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        events: Arc<dyn EventRepository>,
        bookings: Arc<dyn BookingRepository>,
        users: Arc<dyn UserRepository>,
        notifications: Arc<NotificationService>,
        display_tz: Tz,
    ) -> Self {
        Self { categories, events, bookings, users, notifications, display_tz }
    }

    pub async fn list_events(&self, query: &EventQuery, caller: Option<&Caller>) -> Result<Vec<EventListing>, AppError> {
        let filter = build_filter(query, caller)?;
        self.events.search(&filter).await
    }

    pub async fn featured_events(&self) -> Result<Vec<EventListing>, AppError> {
        self.events.list_featured(FEATURED_LIMIT).await
    }

    /// Unpublished events are only visible to their organizer and admins.
    pub async fn get_event(&self, id: &str, caller: Option<&Caller>) -> Result<Event, AppError> {
        let mut event = self.events.find_by_id(id).await?
            .filter(|e| e.is_published || caller.is_some_and(|c| c.is_admin() || e.is_organized_by(&c.id)))
            .ok_or(AppError::NotFound("Event not found".into()))?;

        self.events.increment_views(&event.id).await?;
        event.views += 1;
        Ok(event)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.categories.list().await
    }

    pub async fn create_category(&self, name: &str, description: Option<String>) -> Result<Category, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("name is required".into()));
        }
        let category = self.categories.create(&Category::new(name.to_string(), description)).await?;
        info!(category_id = %category.id, "category created");
        Ok(category)
    }

    pub async fn delete_category(&self, id: &str) -> Result<(), AppError> {
        self.categories.find_by_id(id).await?
            .ok_or(AppError::NotFound("Category not found".into()))?;

        if self.events.count_by_category(id).await? > 0 {
            return Err(AppError::Conflict("Category is still used by events".into()));
        }

        self.categories.delete(id).await?;
        info!(category_id = %id, "category deleted");
        Ok(())
    }

    async fn ensure_category(&self, id: &str) -> Result<(), AppError> {
        match self.categories.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::Validation("categoryId does not exist".into())),
        }
    }

    pub async fn create_event(&self, caller: &Caller, draft: EventDraft) -> Result<Event, AppError> {
        let event = Event::new(NewEventParams {
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            date: draft.date,
            location: draft.location.trim().to_string(),
            category_id: draft.category_id,
            price: draft.price,
            capacity: draft.capacity,
            image_url: draft.image_url.trim().to_string(),
            is_published: draft.is_published,
            tags: draft.tags,
            organizer_id: caller.id.clone(),
        });
        validate_event(&event)?;
        self.ensure_category(&event.category_id).await?;

        let event = self.events.create(&event).await?;
        info!(event_id = %event.id, "event created");
        Ok(event)
    }

    pub async fn update_event(&self, id: &str, changes: EventChanges) -> Result<Event, AppError> {
        let mut event = self.events.find_by_id(id).await?
            .ok_or(AppError::NotFound("Event not found".into()))?;
        let category_changed = changes.category_id.as_ref().is_some_and(|c| *c != event.category_id);

        changes.apply(&mut event);
        validate_event(&event)?;
        if category_changed {
            self.ensure_category(&event.category_id).await?;
        }

        let event = self.events.update(&event).await?;
        info!(event_id = %event.id, "event updated");
        Ok(event)
    }

    pub async fn toggle_publish(&self, id: &str) -> Result<Event, AppError> {
        let mut event = self.events.find_by_id(id).await?
            .ok_or(AppError::NotFound("Event not found".into()))?;
        event.is_published = !event.is_published;

        let event = self.events.update(&event).await?;
        info!(event_id = %event.id, published = event.is_published, "event publish toggled");
        Ok(event)
    }

    pub async fn delete_event(&self, id: &str) -> Result<(), AppError> {
        let removed = self.events.delete_cascade(id).await?;
        info!(event_id = %id, bookings_removed = removed, "event deleted");
        Ok(())
    }

    /// Sends one reminder per distinct attendee. Returns how many were stored.
    pub async fn send_reminders(&self, event_id: &str) -> Result<usize, AppError> {
        let event = self.events.find_by_id(event_id).await?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        let recipients = self.bookings
            .list_user_ids_with_status(&event.id, &[BookingStatus::Paid, BookingStatus::Confirmed])
            .await?;

        let mut sent = 0;
        for user_id in recipients {
            let tz = match self.users.find_by_id(&user_id).await {
                Ok(Some(user)) => user.preferences.timezone.parse::<Tz>().unwrap_or(self.display_tz),
                Ok(None) => continue,
                Err(e) => {
                    warn!(event_id = %event.id, user_id = %user_id, error = ?e, "skipping reminder, user lookup failed");
                    continue;
                }
            };
            let payload = NotificationPayload::EventReminder {
                event_title: event.title.clone(),
                starts_at: event.date.with_timezone(&tz),
            };
            if self.notifications.emit_best_effort(&user_id, payload).await.is_some() {
                sent += 1;
            }
        }

        info!(event_id = %event.id, sent, "event reminders sent");
        Ok(sent)
    }
}
