use crate::domain::{models::notification::Notification, ports::NotificationRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresNotificationRepo { pool: PgPool }
impl PostgresNotificationRepo { pub fn new(pool: PgPool) -> Self { Self { pool } } }

#[async_trait]
impl NotificationRepository for PostgresNotificationRepo {
    async fn create(&self, notification: &Notification) -> Result<Notification, AppError> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (id, user_id, notification_type, title, message, is_read, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *"
        )
            .bind(&notification.id).bind(&notification.user_id).bind(notification.notification_type.as_str())
            .bind(&notification.title).bind(&notification.message).bind(notification.is_read).bind(notification.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Notification>, AppError> {
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn mark_read(&self, user_id: &str, id: &str) -> Result<Option<Notification>, AppError> {
        sqlx::query_as::<_, Notification>("UPDATE notifications SET is_read = $1 WHERE id = $2 AND user_id = $3 RETURNING *")
            .bind(true).bind(id).bind(user_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn mark_all_read(&self, user_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE notifications SET is_read = $1 WHERE user_id = $2 AND is_read = $3")
            .bind(true).bind(user_id).bind(false).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
