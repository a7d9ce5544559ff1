use crate::domain::{
    models::event::{Event, EventFilter, EventListing},
    ports::EventRepository,
    services::catalog::{day_bounds, like_pattern},
};
use crate::error::AppError;
use crate::infra::repositories::LISTING_SELECT;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

pub struct SqliteEventRepo {
    pool: SqlitePool,
}

impl SqliteEventRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepo {
    async fn create(&self, event: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            r#"INSERT INTO events (
                id, title, description, date, location, category_id, price, capacity,
                image_url, is_published, tags, organizer_id, views, created_at, search_text
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *"#
        )
            .bind(&event.id)
            .bind(&event.title)
            .bind(&event.description)
            .bind(event.date)
            .bind(&event.location)
            .bind(&event.category_id)
            .bind(event.price)
            .bind(event.capacity)
            .bind(&event.image_url)
            .bind(event.is_published)
            .bind(&event.tags)
            .bind(&event.organizer_id)
            .bind(event.views)
            .bind(event.created_at)
            .bind(event.search_text())
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn search(&self, filter: &EventFilter) -> Result<Vec<EventListing>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new(LISTING_SELECT);
        qb.push(" WHERE 1 = 1");

        if !filter.include_unpublished {
            qb.push(" AND e.is_published = ").push_bind(true);
        }
        if let Some(term) = &filter.search {
            let pattern = like_pattern(term);
            qb.push(" AND e.search_text LIKE ").push_bind(pattern).push(" ESCAPE '\\'");
        }
        if let Some(category_id) = &filter.category_id {
            qb.push(" AND e.category_id = ").push_bind(category_id.clone());
        }
        if let Some(day) = filter.day {
            let (start, end) = day_bounds(day);
            qb.push(" AND e.date >= ").push_bind(start).push(" AND e.date < ").push_bind(end);
        }
        if let Some(min) = filter.min_price {
            qb.push(" AND e.price >= ").push_bind(min);
        }
        if let Some(max) = filter.max_price {
            qb.push(" AND e.price <= ").push_bind(max);
        }
        qb.push(filter.sort.order_clause());

        qb.build_query_as::<EventListing>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_featured(&self, limit: i64) -> Result<Vec<EventListing>, AppError> {
        let sql = format!("{LISTING_SELECT} WHERE e.is_published = ? AND e.date >= ? ORDER BY e.date ASC LIMIT ?");
        sqlx::query_as::<_, EventListing>(&sql)
            .bind(true)
            .bind(Utc::now())
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_by_category(&self, category_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events WHERE category_id = ?")
            .bind(category_id).fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn count_by_organizer(&self, organizer_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events WHERE organizer_id = ?")
            .bind(organizer_id).fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, event: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            r#"UPDATE events SET
                title = ?, description = ?, date = ?, location = ?, category_id = ?, price = ?,
                capacity = ?, image_url = ?, is_published = ?, tags = ?, search_text = ?
            WHERE id = ?
            RETURNING *"#
        )
            .bind(&event.title)
            .bind(&event.description)
            .bind(event.date)
            .bind(&event.location)
            .bind(&event.category_id)
            .bind(event.price)
            .bind(event.capacity)
            .bind(&event.image_url)
            .bind(event.is_published)
            .bind(&event.tags)
            .bind(event.search_text())
            .bind(&event.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Event not found".into()))
    }

    async fn increment_views(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE events SET views = views + 1 WHERE id = ?")
            .bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn delete_cascade(&self, id: &str) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM reviews WHERE event_id = ?").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM payments WHERE booking_id IN (SELECT id FROM bookings WHERE event_id = ?)").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        let bookings = sqlx::query("DELETE FROM bookings WHERE event_id = ?").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;

        let result = sqlx::query("DELETE FROM events WHERE id = ?").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Event not found".into())); }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(bookings.rows_affected())
    }
}
