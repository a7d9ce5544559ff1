use axum::{extract::{State, Path, Query}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::dtos::responses::CountResponse;
use crate::api::extractors::{auth::AdminUser, maybe_auth::MaybeAuthUser};
use crate::domain::services::catalog::{EventChanges, EventDraft, EventQuery};
use crate::error::AppError;
use std::sync::Arc;

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(caller): MaybeAuthUser,
    Query(query): Query<EventQuery>,
) -> Result<impl IntoResponse, AppError> {
    let events = state.catalog_service.list_events(&query, caller.as_ref()).await?;
    Ok(Json(events))
}

pub async fn featured_events(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.catalog_service.featured_events().await?))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(caller): MaybeAuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.catalog_service.get_event(&id, caller.as_ref()).await?))
}

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<EventDraft>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.catalog_service.create_event(&admin, payload).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<EventChanges>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.catalog_service.update_event(&id, payload).await?))
}

pub async fn toggle_publish(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.catalog_service.toggle_publish(&id).await?))
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.catalog_service.delete_event(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn send_reminders(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let sent = state.catalog_service.send_reminders(&id).await?;
    Ok(Json(CountResponse { count: sent as u64 }))
}
