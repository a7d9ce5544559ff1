use axum::{extract::{State, Query}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::dtos::requests::{CreateReviewRequest, ReviewListQuery};
use crate::api::extractors::auth::AuthUser;
use crate::error::AppError;
use std::sync::Arc;

pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReviewListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let event_id = query.event_id.filter(|v| !v.is_empty())
        .ok_or(AppError::Validation("eventId is required".into()))?;

    Ok(Json(state.review_service.list(&event_id).await?))
}

pub async fn create_review(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let review = state.review_service
        .create(&caller, &payload.event_id, payload.rating, payload.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}
