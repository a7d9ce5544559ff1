use std::sync::Arc;
use chrono::Utc;
use chrono_tz::Tz;
use serde::Deserialize;
use sqlx::types::Json;
use tracing::info;
use crate::domain::{
    models::{
        analytics::AnalyticsSummary,
        settings::{SiteSettings, SITE_SETTINGS_ID},
        user::{Caller, Role, User, UserPreferences},
    },
    ports::{EventRepository, SettingsRepository, UserRepository},
    services::auth_service::hash_password,
};
use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimal `local@domain.tld` shape check.
pub fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !email.contains(char::is_whitespace)
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
        }
        None => false,
    }
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().chars().count() < 2 {
        return Err(AppError::Validation("name must be at least 2 characters".into()));
    }
    Ok(())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChanges {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsChanges {
    pub site_name: String,
    pub site_description: Option<String>,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub facebook_url: Option<String>,
    pub twitter_url: Option<String>,
    pub instagram_url: Option<String>,
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    events: Arc<dyn EventRepository>,
    settings: Arc<dyn SettingsRepository>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        events: Arc<dyn EventRepository>,
        settings: Arc<dyn SettingsRepository>,
    ) -> Self {
        Self { users, events, settings }
    }

    pub async fn register(&self, name: &str, email: &str, password: &str, role: Role) -> Result<User, AppError> {
        validate_name(name)?;
        let email = email.trim().to_lowercase();
        if !looks_like_email(&email) {
            return Err(AppError::Validation("email is invalid".into()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!("password must be at least {MIN_PASSWORD_LEN} characters")));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email is already registered".into()));
        }

        let user = User::new(name.trim().to_string(), email, hash_password(password)?, role);
        let user = self.users.create(&user).await?;
        info!(user_id = %user.id, role = user.role.as_str(), "user registered");
        Ok(user)
    }

    pub async fn profile(&self, user_id: &str) -> Result<User, AppError> {
        self.users.find_by_id(user_id).await?
            .ok_or(AppError::NotFound("User not found".into()))
    }

    pub async fn update_profile(&self, user_id: &str, changes: ProfileChanges) -> Result<User, AppError> {
        validate_name(&changes.name)?;
        let email = changes.email.trim().to_lowercase();
        if !looks_like_email(&email) {
            return Err(AppError::Validation("email is invalid".into()));
        }

        let mut user = self.profile(user_id).await?;
        if email != user.email
            && let Some(other) = self.users.find_by_email(&email).await?
            && other.id != user.id
        {
            return Err(AppError::Conflict("Email is already in use".into()));
        }

        user.name = changes.name.trim().to_string();
        user.email = email;
        user.phone = blank_to_none(changes.phone);
        user.address = blank_to_none(changes.address);
        user.bio = blank_to_none(changes.bio);
        user.image = blank_to_none(changes.image);
        user.updated_at = Utc::now();

        let user = self.users.update(&user).await?;
        info!(user_id = %user.id, "profile updated");
        Ok(user)
    }

    pub async fn update_preferences(&self, user_id: &str, preferences: UserPreferences) -> Result<User, AppError> {
        if preferences.timezone.parse::<Tz>().is_err() {
            return Err(AppError::Validation(format!("unknown timezone: {}", preferences.timezone)));
        }

        let mut user = self.profile(user_id).await?;
        user.preferences = Json(preferences);
        user.updated_at = Utc::now();

        let user = self.users.update(&user).await?;
        info!(user_id = %user.id, "preferences updated");
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.users.list().await
    }

    pub async fn delete_user(&self, caller: &Caller, id: &str) -> Result<(), AppError> {
        if caller.id == id {
            return Err(AppError::Conflict("You cannot delete your own account".into()));
        }
        self.profile(id).await?;

        if self.events.count_by_organizer(id).await? > 0 {
            return Err(AppError::Conflict("User still organizes events".into()));
        }

        self.users.delete_cascade(id).await?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Stored settings, or defaults when none were saved yet.
    pub async fn settings(&self) -> Result<SiteSettings, AppError> {
        Ok(self.settings.get().await?.unwrap_or_else(|| SiteSettings {
            id: SITE_SETTINGS_ID.to_string(),
            site_name: "Event Booking".to_string(),
            site_description: None,
            contact_email: "contact@example.com".to_string(),
            contact_phone: None,
            facebook_url: None,
            twitter_url: None,
            instagram_url: None,
            updated_at: Utc::now(),
        }))
    }

    pub async fn update_settings(&self, changes: SettingsChanges) -> Result<SiteSettings, AppError> {
        let site_name = changes.site_name.trim();
        if site_name.is_empty() {
            return Err(AppError::Validation("siteName is required".into()));
        }
        let contact_email = changes.contact_email.trim();
        if !looks_like_email(contact_email) {
            return Err(AppError::Validation("contactEmail is invalid".into()));
        }

        let settings = SiteSettings {
            id: SITE_SETTINGS_ID.to_string(),
            site_name: site_name.to_string(),
            site_description: blank_to_none(changes.site_description),
            contact_email: contact_email.to_string(),
            contact_phone: blank_to_none(changes.contact_phone),
            facebook_url: blank_to_none(changes.facebook_url),
            twitter_url: blank_to_none(changes.twitter_url),
            instagram_url: blank_to_none(changes.instagram_url),
            updated_at: Utc::now(),
        };

        let settings = self.settings.upsert(&settings).await?;
        info!("site settings updated");
        Ok(settings)
    }

    pub async fn analytics(&self) -> Result<AnalyticsSummary, AppError> {
        self.settings.analytics().await
    }
}
