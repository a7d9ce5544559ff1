use crate::domain::{models::notification::Notification, ports::NotificationRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteNotificationRepo { pool: SqlitePool }
impl SqliteNotificationRepo { pub fn new(pool: SqlitePool) -> Self { Self { pool } } }

#[async_trait]
impl NotificationRepository for SqliteNotificationRepo {
    async fn create(&self, notification: &Notification) -> Result<Notification, AppError> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (id, user_id, notification_type, title, message, is_read, created_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&notification.id).bind(&notification.user_id).bind(notification.notification_type.as_str())
            .bind(&notification.title).bind(&notification.message).bind(notification.is_read).bind(notification.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Notification>, AppError> {
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE user_id = ? ORDER BY created_at DESC")
            .bind(user_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn mark_read(&self, user_id: &str, id: &str) -> Result<Option<Notification>, AppError> {
        sqlx::query_as::<_, Notification>("UPDATE notifications SET is_read = ? WHERE id = ? AND user_id = ? RETURNING *")
            .bind(true).bind(id).bind(user_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn mark_all_read(&self, user_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE notifications SET is_read = ? WHERE user_id = ? AND is_read = ?")
            .bind(true).bind(user_id).bind(false).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
