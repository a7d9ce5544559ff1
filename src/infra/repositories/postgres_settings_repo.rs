use crate::domain::{
    models::{analytics::AnalyticsSummary, settings::{SiteSettings, SITE_SETTINGS_ID}},
    ports::SettingsRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresSettingsRepo { pool: PgPool }
impl PostgresSettingsRepo { pub fn new(pool: PgPool) -> Self { Self { pool } } }

#[async_trait]
impl SettingsRepository for PostgresSettingsRepo {
    async fn get(&self) -> Result<Option<SiteSettings>, AppError> {
        sqlx::query_as::<_, SiteSettings>("SELECT * FROM site_settings WHERE id = $1")
            .bind(SITE_SETTINGS_ID).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn upsert(&self, settings: &SiteSettings) -> Result<SiteSettings, AppError> {
        sqlx::query_as::<_, SiteSettings>(
            r#"INSERT INTO site_settings (
                id, site_name, site_description, contact_email, contact_phone,
                facebook_url, twitter_url, instagram_url, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                site_name = excluded.site_name,
                site_description = excluded.site_description,
                contact_email = excluded.contact_email,
                contact_phone = excluded.contact_phone,
                facebook_url = excluded.facebook_url,
                twitter_url = excluded.twitter_url,
                instagram_url = excluded.instagram_url,
                updated_at = excluded.updated_at
            RETURNING *"#
        )
            .bind(&settings.id)
            .bind(&settings.site_name)
            .bind(&settings.site_description)
            .bind(&settings.contact_email)
            .bind(&settings.contact_phone)
            .bind(&settings.facebook_url)
            .bind(&settings.twitter_url)
            .bind(&settings.instagram_url)
            .bind(settings.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn analytics(&self) -> Result<AnalyticsSummary, AppError> {
        sqlx::query_as::<_, AnalyticsSummary>(
            r#"SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM events) AS total_events,
                (SELECT COUNT(*) FROM bookings) AS total_bookings,
                (SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM bookings WHERE status IN ('PAID', 'COMPLETED')) AS paid_tickets,
                (SELECT COALESCE(SUM(amount), 0)::DOUBLE PRECISION FROM payments) AS revenue"#
        )
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
