//! Acting-user extractor.

use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};
use domain::models::ActorContext;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::{bearer_token, UserAuth};

/// The authenticated caller as an [`ActorContext`].
///
/// Uses the identity stored by `require_user_auth` when the middleware ran,
/// otherwise validates the Bearer token itself.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub ActorContext);

#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts.extensions.get::<UserAuth>() {
            return Ok(Actor(auth.actor()));
        }

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let token = bearer_token(header_value)
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let auth = UserAuth::validate(&state.jwt, token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(Actor(auth.actor()))
    }
}
