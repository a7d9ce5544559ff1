use axum::{extract::State, response::IntoResponse, Json, http::StatusCode};
use crate::api::dtos::requests::{LoginRequest, RegisterRequest};
use crate::api::extractors::auth::{ACCESS_COOKIE, REFRESH_COOKIE};
use crate::state::AppState;
use crate::error::AppError;
use crate::domain::models::{auth::{AuthResponse, UserProfile}, user::{Role, User}};
use crate::domain::services::auth_service::verify_password;
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use time::Duration;
use tracing::info;

fn profile(user: User) -> UserProfile {
    UserProfile { id: user.id, name: user.name, email: user.email, role: user.role }
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.account_service
        .register(&payload.name, &payload.email, &payload.password, Role::User)
        .await?;

    Ok((StatusCode::CREATED, Json(profile(user))))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_email(&payload.email.trim().to_lowercase()).await?
        .ok_or(AppError::Unauthorized)?;

    verify_password(&payload.password, &user.password_hash)?;

    let (access_jwt, refresh_token, csrf_token) = state.auth_service.login(&user).await?;

    set_cookies(&cookies, &access_jwt, &refresh_token);

    info!("User logged in: {}", user.id);

    Ok(Json(AuthResponse { csrf_token, user: profile(user) }))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    let refresh_cookie = cookies.get(REFRESH_COOKIE).ok_or(AppError::Unauthorized)?;
    let raw_token = refresh_cookie.value();

    let user_id = state.auth_service.refresh_token_owner(raw_token).await?;
    let user = state.user_repo.find_by_id(&user_id).await?
        .ok_or(AppError::Unauthorized)?;

    let (new_access, new_refresh, new_csrf) = state.auth_service.refresh(raw_token, &user).await?;

    set_cookies(&cookies, &new_access, &new_refresh);

    info!("Token refreshed for user: {}", user.id);

    Ok(Json(AuthResponse { csrf_token: new_csrf, user: profile(user) }))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    if let Some(cookie) = cookies.get(REFRESH_COOKIE) {
        let _ = state.auth_service.logout(cookie.value()).await;
    }

    cookies.remove(Cookie::build((ACCESS_COOKIE, "")).path("/").into());
    cookies.remove(Cookie::build((REFRESH_COOKIE, "")).path("/").into());

    info!("User logged out");

    Ok(StatusCode::OK)
}

fn set_cookies(cookies: &Cookies, access: &str, refresh: &str) {
    let mut access_c = Cookie::new(ACCESS_COOKIE, access.to_string());
    access_c.set_http_only(true);
    access_c.set_secure(true);
    access_c.set_same_site(SameSite::Strict);
    access_c.set_path("/");
    access_c.set_max_age(Duration::minutes(15));
    cookies.add(access_c);

    let mut refresh_c = Cookie::new(REFRESH_COOKIE, refresh.to_string());
    refresh_c.set_http_only(true);
    refresh_c.set_secure(true);
    refresh_c.set_same_site(SameSite::Strict);
    refresh_c.set_path("/");
    refresh_c.set_max_age(Duration::days(7));
    cookies.add(refresh_c);
}
