use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::user::UserPreferences;
use crate::domain::services::account_service::ProfileChanges;
use crate::error::AppError;
use std::sync::Arc;

pub async fn get_me(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.account_service.profile(&caller.id).await?))
}

pub async fn update_me(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<ProfileChanges>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.account_service.update_profile(&caller.id, payload).await?))
}

pub async fn update_preferences(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<UserPreferences>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.account_service.update_preferences(&caller.id, payload).await?))
}
