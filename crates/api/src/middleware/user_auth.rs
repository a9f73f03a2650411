//! User JWT authentication middleware.
//!
//! Validates the Bearer token on protected routes and stores the caller's
//! identity in request extensions.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::models::ActorContext;
use shared::jwt::{extract_identity, JwtConfig};
use uuid::Uuid;

use super::trace_id::get_request_id;
use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated user information extracted from JWT.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// User ID from the JWT subject claim.
    pub user_id: Uuid,
    /// Company the user acts for.
    pub company_id: Uuid,
    /// JWT ID (jti) for session tracking.
    pub jti: String,
}

impl UserAuth {
    /// Validates an access token and returns the caller's identity.
    pub fn validate(jwt_config: &JwtConfig, token: &str) -> Result<Self, String> {
        let claims = jwt_config
            .validate_token(token)
            .map_err(|e| format!("Invalid token: {}", e))?;

        let (user_id, company_id) =
            extract_identity(&claims).map_err(|_| "Invalid identity in token".to_string())?;

        Ok(UserAuth {
            user_id,
            company_id,
            jti: claims.jti,
        })
    }

    pub fn actor(&self) -> ActorContext {
        ActorContext::new(self.user_id, self.company_id)
    }
}

/// Returns the token of a `Bearer` Authorization header value.
pub fn bearer_token(header_value: Option<&str>) -> Option<&str> {
    header_value
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware that requires JWT user authentication.
///
/// Requests without a valid Bearer token are rejected with 401.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(token) = bearer_token(header_value) else {
        return ApiError::Unauthorized("Missing or invalid Authorization header".to_string())
            .into_response();
    };

    match UserAuth::validate(&state.jwt, token) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(
                request_id = %get_request_id(req.extensions()),
                "JWT validation failed: {}",
                e
            );
            ApiError::Unauthorized("Invalid or expired token".to_string()).into_response()
        }
    }
}
