use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{validate_jwt, Claims};
use crate::config::SecurityConfig;
use crate::error::ApiError;

/// Authenticated identity extracted from the token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub is_admin: bool,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            is_admin: claims.is_admin,
        }
    }
}

/// Rejects requests without a valid signed token and injects `AuthUser`
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let security = &state.config.security;

    let token = extract_token(request.headers(), security)
        .ok_or_else(|| ApiError::unauthorized("Access denied. No token provided."))?;

    let claims = validate_jwt(&token, security).map_err(|e| {
        tracing::debug!("Token rejected: {}", e);
        ApiError::unauthorized("Invalid token.")
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Requires the elevated-privilege claim; must run after `require_auth`
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Access denied. No token provided."))?;

    if !user.is_admin {
        tracing::warn!("User {} attempted an admin operation", user.user_id);
        return Err(ApiError::forbidden("Access denied."));
    }

    Ok(next.run(request).await)
}

/// Token from the configured header, falling back to `Authorization: Bearer`
fn extract_token(headers: &HeaderMap, security: &SecurityConfig) -> Option<String> {
    let from_header = headers
        .get(security.token_header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let token = from_header.or_else(|| {
        headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    })?;

    Some(token.to_string())
}
