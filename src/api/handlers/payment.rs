use axum::{extract::{State, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::{BookingIdQuery, CreatePaymentRequest};
use crate::api::extractors::auth::AuthUser;
use crate::error::AppError;
use std::sync::Arc;

pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let payment = state.payment_service
        .record(&caller, &payload.booking_id, payload.amount, &payload.payment_method)
        .await?;
    Ok(Json(payment))
}

pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Query(query): Query<BookingIdQuery>,
) -> Result<impl IntoResponse, AppError> {
    let booking_id = query.booking_id.filter(|v| !v.is_empty())
        .ok_or(AppError::Validation("bookingId is required".into()))?;

    Ok(Json(state.payment_service.get(&caller, &booking_id).await?))
}
