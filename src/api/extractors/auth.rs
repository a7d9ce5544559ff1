use axum::{
    extract::{FromRequestParts, FromRef},
    http::{request::Parts, Method, StatusCode},
};
use crate::state::AppState;
use crate::domain::models::auth::{Claims, TOKEN_AUDIENCE};
use crate::domain::models::user::Caller;
use std::sync::Arc;
use tower_cookies::Cookies;
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};
use tracing::Span;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Verifies the access-token cookie and returns its claims.
pub(crate) fn decode_claims(parts: &Parts, app_state: &AppState) -> Result<Claims, StatusCode> {
    let cookies = parts.extensions.get::<Cookies>()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    let access_token = cookies.get(ACCESS_COOKIE)
        .ok_or(StatusCode::UNAUTHORIZED)?
        .value()
        .to_string();

    let decoding_key = DecodingKey::from_ed_pem(app_state.config.jwt_public_key.as_bytes())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let mut validation = Validation::new(Algorithm::EdDSA);
    validation.set_audience(&[TOKEN_AUDIENCE]);
    validation.set_issuer(&[app_state.config.auth_issuer.as_str()]);

    decode::<Claims>(&access_token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|_| StatusCode::UNAUTHORIZED)
}

pub struct AuthUser(pub Caller);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let claims = decode_claims(parts, &app_state)?;

        let method = &parts.method;
        if method != Method::GET && method != Method::HEAD && method != Method::OPTIONS {
            let csrf_header_val = parts.headers.get(CSRF_HEADER)
                .ok_or(StatusCode::FORBIDDEN)?
                .to_str()
                .map_err(|_| StatusCode::FORBIDDEN)?;

            if csrf_header_val != claims.csrf_token {
                return Err(StatusCode::FORBIDDEN);
            }
        }

        let caller = Caller { id: claims.sub, role: claims.role };
        Span::current().record("user_id", caller.id.as_str());

        Ok(AuthUser(caller))
    }
}

/// Authenticated caller holding the ADMIN role.
pub struct AdminUser(pub Caller);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(caller) = AuthUser::from_request_parts(parts, state).await?;
        if !caller.is_admin() {
            return Err(StatusCode::FORBIDDEN);
        }
        Ok(AdminUser(caller))
    }
}
