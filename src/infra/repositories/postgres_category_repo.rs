use crate::domain::{models::category::Category, ports::CategoryRepository};
use crate::error::AppError;
use crate::infra::repositories::conflict_on_duplicate;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresCategoryRepo { pool: PgPool }
impl PostgresCategoryRepo { pub fn new(pool: PgPool) -> Self { Self { pool } } }

#[async_trait]
impl CategoryRepository for PostgresCategoryRepo {
    async fn create(&self, category: &Category) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>("INSERT INTO categories (id, name, description) VALUES ($1, $2, $3) RETURNING *")
            .bind(&category.id).bind(&category.name).bind(&category.description)
            .fetch_one(&self.pool).await.map_err(conflict_on_duplicate("Category already exists"))
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<Category>, AppError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list(&self) -> Result<Vec<Category>, AppError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Category not found".into())); }
        Ok(())
    }
}
