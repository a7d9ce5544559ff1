use axum::{extract::{State, Path}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::dtos::requests::CreateCategoryRequest;
use crate::api::extractors::auth::AdminUser;
use crate::error::AppError;
use std::sync::Arc;

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.catalog_service.list_categories().await?))
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let category = state.catalog_service.create_category(&payload.name, payload.description).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.catalog_service.delete_category(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
