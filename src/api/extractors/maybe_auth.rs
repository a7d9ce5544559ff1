use axum::{
    extract::{FromRequestParts, FromRef},
    http::{request::Parts, StatusCode},
};
use crate::api::extractors::auth::decode_claims;
use crate::state::AppState;
use crate::domain::models::user::Caller;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, Span};

/// Caller if a valid access token is present; anonymous otherwise.
pub struct MaybeAuthUser(pub Option<Caller>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        match decode_claims(parts, &app_state) {
            Ok(claims) => {
                Span::current().record("user_id", claims.sub.as_str());
                Ok(MaybeAuthUser(Some(Caller { id: claims.sub, role: claims.role })))
            }
            Err(StatusCode::INTERNAL_SERVER_ERROR) => {
                debug!("MaybeAuth: token could not be checked, treating caller as guest");
                Ok(MaybeAuthUser(None))
            }
            Err(_) => Ok(MaybeAuthUser(None)),
        }
    }
}
