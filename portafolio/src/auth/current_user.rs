//! Bearer-token authentication for handlers.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{instrument, trace};

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
};

/// Pull the token out of `Authorization: Bearer <jwt>`.
///
/// - `None`: no usable bearer credentials were sent
/// - `Some(token)`: the raw token, not yet verified
fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let Some(token) = bearer_token(parts) else {
            trace!("No bearer token in request");
            return Err(Error::Unauthenticated { message: None });
        };

        let user = session::verify_session_token(token, &state.config)?;
        trace!(user_id = user.id, "Authenticated bearer token");
        Ok(user)
    }
}
