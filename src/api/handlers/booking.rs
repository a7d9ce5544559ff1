use axum::{extract::{State, Path, Query}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::dtos::requests::{BookingIdQuery, BookingListQuery, CreateBookingRequest, UpdateBookingRequest};
use crate::api::extractors::auth::{AdminUser, AuthUser};
use crate::domain::models::booking::BookingStatus;
use crate::error::AppError;
use std::sync::Arc;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_service.create(&caller, &payload.event_id, payload.quantity).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Query(query): Query<BookingListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let event_id = query.event_id.filter(|v| !v.is_empty());
    let user_id = query.user_id.filter(|v| !v.is_empty());
    Ok(Json(state.booking_service.list(&caller, event_id, user_id).await?))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.booking_service.get_details(&caller, &id).await?))
}

pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<UpdateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = payload.status.parse::<BookingStatus>()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Ok(Json(state.booking_service.update_status(&caller, &payload.booking_id, status).await?))
}

pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Query(query): Query<BookingIdQuery>,
) -> Result<impl IntoResponse, AppError> {
    let booking_id = query.booking_id.filter(|v| !v.is_empty())
        .ok_or(AppError::Validation("bookingId is required".into()))?;

    state.booking_service.delete(&caller, &booking_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_all_bookings(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.booking_service.list_all().await?))
}
