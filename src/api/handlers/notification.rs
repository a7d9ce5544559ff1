use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::{requests::MarkReadRequest, responses::CountResponse};
use crate::api::extractors::auth::AuthUser;
use crate::error::AppError;
use std::sync::Arc;

pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.notification_service.list(&caller.id).await?))
}

pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<MarkReadRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.id.trim().is_empty() {
        return Err(AppError::Validation("id is required".into()));
    }
    Ok(Json(state.notification_service.mark_read(&caller.id, &payload.id).await?))
}

pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let count = state.notification_service.mark_all_read(&caller.id).await?;
    Ok(Json(CountResponse { count }))
}
