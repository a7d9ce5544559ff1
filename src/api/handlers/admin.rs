use axum::{extract::{State, Path}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::dtos::{requests::BroadcastRequest, responses::CountResponse};
use crate::api::extractors::auth::AdminUser;
use crate::domain::services::account_service::SettingsChanges;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.account_service.settings().await?))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<SettingsChanges>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.account_service.update_settings(payload).await?))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.account_service.list_users().await?))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.account_service.delete_user(&admin, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn analytics(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.account_service.analytics().await?))
}

pub async fn broadcast(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<BroadcastRequest>,
) -> Result<impl IntoResponse, AppError> {
    let title = payload.title.trim();
    let message = payload.message.trim();
    if title.is_empty() || message.is_empty() {
        return Err(AppError::Validation("title and message are required".into()));
    }

    let user_ids: Vec<String> = state.account_service.list_users().await?
        .into_iter()
        .map(|u| u.id)
        .collect();
    let sent = state.notification_service.broadcast(&user_ids, title, message).await;

    info!("Broadcast by {} reached {} users", admin.id, sent);
    Ok(Json(CountResponse { count: sent as u64 }))
}
