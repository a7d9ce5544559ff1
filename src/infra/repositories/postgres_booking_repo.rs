use crate::domain::{
    models::booking::{Booking, BookingScope, BookingStatus},
    ports::BookingRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_statuses(qb: &mut QueryBuilder<'_, Postgres>, statuses: &[BookingStatus]) {
    qb.push(" AND status IN (");
    let mut separated = qb.separated(", ");
    for status in statuses {
        separated.push_bind(status.as_str());
    }
    separated.push_unseparated(")");
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create_within_capacity(&self, booking: &Booking) -> Result<Option<Booking>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Row lock on the event serializes concurrent bookings for it.
        let capacity = sqlx::query_scalar::<_, i32>("SELECT capacity FROM events WHERE id = $1 FOR UPDATE")
            .bind(&booking.event_id).fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Event not found".into()))?;
        let reserved = sqlx::query_scalar::<_, i64>("SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM bookings WHERE event_id = $1 AND status != 'CANCELLED'")
            .bind(&booking.event_id).fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        if reserved + i64::from(booking.quantity) > i64::from(capacity) {
            return Ok(None);
        }

        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, user_id, event_id, quantity, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *"
        )
            .bind(&booking.id).bind(&booking.user_id).bind(&booking.event_id).bind(booking.quantity)
            .bind(booking.status.as_str()).bind(booking.created_at).bind(booking.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(Some(created))
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list(&self, scope: &BookingScope) -> Result<Vec<Booking>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM bookings WHERE ");
        match scope {
            BookingScope::User { user_id, event_id } => {
                qb.push("user_id = ").push_bind(user_id.clone());
                if let Some(event_id) = event_id {
                    qb.push(" AND event_id = ").push_bind(event_id.clone());
                }
            }
            BookingScope::Event { event_id } => {
                qb.push("event_id = ").push_bind(event_id.clone());
            }
        }
        qb.push(" ORDER BY created_at DESC");
        qb.build_query_as::<Booking>().fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_all(&self) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings ORDER BY created_at DESC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn update_status(&self, id: &str, from: BookingStatus, to: BookingStatus) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4 RETURNING *")
            .bind(to.as_str()).bind(Utc::now()).bind(id).bind(from.as_str())
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn exists_with_status(&self, user_id: &str, event_id: &str, statuses: &[BookingStatus]) -> Result<bool, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT EXISTS(SELECT 1 FROM bookings WHERE user_id = ");
        qb.push_bind(user_id.to_string()).push(" AND event_id = ").push_bind(event_id.to_string());
        push_statuses(&mut qb, statuses);
        qb.push(")");
        qb.build_query_scalar::<bool>().fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_user_ids_with_status(&self, event_id: &str, statuses: &[BookingStatus]) -> Result<Vec<String>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT DISTINCT user_id FROM bookings WHERE event_id = ");
        qb.push_bind(event_id.to_string());
        push_statuses(&mut qb, statuses);
        qb.build_query_scalar::<String>().fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM payments WHERE booking_id = $1").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Booking not found".into())); }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
