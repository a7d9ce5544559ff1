use crate::domain::{
    models::{booking::Booking, payment::Payment},
    ports::PaymentRepository,
};
use crate::error::AppError;
use crate::infra::repositories::conflict_on_duplicate;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresPaymentRepo { pool: PgPool }
impl PostgresPaymentRepo { pub fn new(pool: PgPool) -> Self { Self { pool } } }

#[async_trait]
impl PaymentRepository for PostgresPaymentRepo {
    async fn record_and_mark_paid(&self, payment: &Payment) -> Result<(Payment, Booking), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, Payment>(
            "INSERT INTO payments (id, booking_id, amount, status, payment_method, created_at) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *"
        )
            .bind(&payment.id).bind(&payment.booking_id).bind(payment.amount)
            .bind(&payment.status).bind(&payment.payment_method).bind(payment.created_at)
            .fetch_one(&mut *tx).await.map_err(conflict_on_duplicate("Booking is already paid"))?;

        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'PAID', updated_at = $1 WHERE id = $2 AND status IN ('PENDING', 'CONFIRMED') RETURNING *"
        )
            .bind(created.created_at).bind(&payment.booking_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::Conflict("Booking can no longer be paid".into()))?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok((created, booking))
    }

    async fn find_by_booking(&self, booking_id: &str) -> Result<Option<Payment>, AppError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE booking_id = $1")
            .bind(booking_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
}
