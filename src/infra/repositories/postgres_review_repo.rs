use crate::domain::{
    models::review::{Review, ReviewWithAuthor},
    ports::ReviewRepository,
};
use crate::error::AppError;
use crate::infra::repositories::conflict_on_duplicate;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresReviewRepo { pool: PgPool }
impl PostgresReviewRepo { pub fn new(pool: PgPool) -> Self { Self { pool } } }

#[async_trait]
impl ReviewRepository for PostgresReviewRepo {
    async fn create(&self, review: &Review) -> Result<Review, AppError> {
        sqlx::query_as::<_, Review>(
            "INSERT INTO reviews (id, user_id, event_id, rating, comment, created_at) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *"
        )
            .bind(&review.id).bind(&review.user_id).bind(&review.event_id)
            .bind(review.rating).bind(&review.comment).bind(review.created_at)
            .fetch_one(&self.pool).await.map_err(conflict_on_duplicate("You have already reviewed this event"))
    }
    async fn find_by_user_and_event(&self, user_id: &str, event_id: &str) -> Result<Option<Review>, AppError> {
        sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE user_id = $1 AND event_id = $2")
            .bind(user_id).bind(event_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<ReviewWithAuthor>, AppError> {
        sqlx::query_as::<_, ReviewWithAuthor>(
            "SELECT r.*, u.name AS user_name, u.image AS user_image
             FROM reviews r JOIN users u ON u.id = r.user_id
             WHERE r.event_id = $1 ORDER BY r.created_at DESC"
        )
            .bind(event_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
