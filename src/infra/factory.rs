use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use chrono_tz::Tz;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::{info, warn};
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::models::user::Role;
use crate::domain::ports::{
    AuthRepository, BookingRepository, CategoryRepository, EventRepository, NotificationRepository,
    PaymentRepository, ReviewRepository, SettingsRepository, UserRepository,
};
use crate::domain::services::{
    account_service::AccountService, auth_service::AuthService, booking_service::BookingService,
    catalog::CatalogService, notification_service::NotificationService,
    payment_service::PaymentService, review_service::ReviewService,
};
use crate::infra::repositories::{
    postgres_auth_repo::PostgresAuthRepo, postgres_booking_repo::PostgresBookingRepo,
    postgres_category_repo::PostgresCategoryRepo, postgres_event_repo::PostgresEventRepo,
    postgres_notification_repo::PostgresNotificationRepo, postgres_payment_repo::PostgresPaymentRepo,
    postgres_review_repo::PostgresReviewRepo, postgres_settings_repo::PostgresSettingsRepo,
    postgres_user_repo::PostgresUserRepo,
    sqlite_auth_repo::SqliteAuthRepo, sqlite_booking_repo::SqliteBookingRepo,
    sqlite_category_repo::SqliteCategoryRepo, sqlite_event_repo::SqliteEventRepo,
    sqlite_notification_repo::SqliteNotificationRepo, sqlite_payment_repo::SqlitePaymentRepo,
    sqlite_review_repo::SqliteReviewRepo, sqlite_settings_repo::SqliteSettingsRepo,
    sqlite_user_repo::SqliteUserRepo,
};

/// One storage handle per aggregate, all backed by the same pool.
struct Repositories {
    users: Arc<dyn UserRepository>,
    auth: Arc<dyn AuthRepository>,
    categories: Arc<dyn CategoryRepository>,
    events: Arc<dyn EventRepository>,
    bookings: Arc<dyn BookingRepository>,
    payments: Arc<dyn PaymentRepository>,
    reviews: Arc<dyn ReviewRepository>,
    notifications: Arc<dyn NotificationRepository>,
    settings: Arc<dyn SettingsRepository>,
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let repos = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        Repositories {
            users: Arc::new(PostgresUserRepo::new(pool.clone())),
            auth: Arc::new(PostgresAuthRepo::new(pool.clone())),
            categories: Arc::new(PostgresCategoryRepo::new(pool.clone())),
            events: Arc::new(PostgresEventRepo::new(pool.clone())),
            bookings: Arc::new(PostgresBookingRepo::new(pool.clone())),
            payments: Arc::new(PostgresPaymentRepo::new(pool.clone())),
            reviews: Arc::new(PostgresReviewRepo::new(pool.clone())),
            notifications: Arc::new(PostgresNotificationRepo::new(pool.clone())),
            settings: Arc::new(PostgresSettingsRepo::new(pool)),
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        Repositories {
            users: Arc::new(SqliteUserRepo::new(pool.clone())),
            auth: Arc::new(SqliteAuthRepo::new(pool.clone())),
            categories: Arc::new(SqliteCategoryRepo::new(pool.clone())),
            events: Arc::new(SqliteEventRepo::new(pool.clone())),
            bookings: Arc::new(SqliteBookingRepo::new(pool.clone())),
            payments: Arc::new(SqlitePaymentRepo::new(pool.clone())),
            reviews: Arc::new(SqliteReviewRepo::new(pool.clone())),
            notifications: Arc::new(SqliteNotificationRepo::new(pool.clone())),
            settings: Arc::new(SqliteSettingsRepo::new(pool)),
        }
    };

    let state = build_state(config, repos);
    seed_admin(config, &state).await;
    state
}

fn build_state(config: &Config, repos: Repositories) -> AppState {
    let display_tz = config.display_timezone.parse::<Tz>().unwrap_or_else(|_| {
        warn!("Unknown DISPLAY_TIMEZONE {}, falling back to UTC", config.display_timezone);
        Tz::UTC
    });

    let notification_service = Arc::new(NotificationService::new(
        repos.notifications.clone(),
        config.notification_max_attempts,
    ));

    AppState {
        config: config.clone(),
        auth_service: Arc::new(AuthService::new(repos.auth.clone(), config.clone())),
        account_service: Arc::new(AccountService::new(
            repos.users.clone(), repos.events.clone(), repos.settings.clone(),
        )),
        catalog_service: Arc::new(CatalogService::new(
            repos.categories.clone(), repos.events.clone(), repos.bookings.clone(),
            repos.users.clone(), notification_service.clone(), display_tz,
        )),
        booking_service: Arc::new(BookingService::new(
            repos.bookings.clone(), repos.events.clone(), repos.payments.clone(), notification_service.clone(),
        )),
        payment_service: Arc::new(PaymentService::new(
            repos.payments.clone(), repos.bookings.clone(), repos.events.clone(), notification_service.clone(),
        )),
        review_service: Arc::new(ReviewService::new(
            repos.reviews.clone(), repos.bookings.clone(), repos.events.clone(),
        )),
        notification_service,
        user_repo: repos.users,
    }
}

/// Creates the ADMIN account from ADMIN_EMAIL / ADMIN_PASSWORD when missing.
async fn seed_admin(config: &Config, state: &AppState) {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return;
    };

    match state.user_repo.find_by_email(&email.to_lowercase()).await {
        Ok(Some(_)) => info!("Admin account {} already present", email),
        Ok(None) => match state.account_service.register("Administrator", email, password, Role::Admin).await {
            Ok(user) => info!("Seeded admin account {}", user.id),
            Err(e) => warn!("Failed to seed admin account: {}", e),
        },
        Err(e) => warn!("Failed to look up admin account: {}", e),
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
