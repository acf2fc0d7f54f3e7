// handlers/auth.rs - POST /api/auth

use axum::{extract::State, routing::post, Router};
use serde::Serialize;

use crate::app::AppState;
use crate::auth::{generate_jwt, verify_password, Claims};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, ValidatedJson};
use crate::models::{LoginInput, User};

pub fn routes(_state: &AppState) -> Router<AppState> {
    Router::new().route("/api/auth", post(login))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    pub expires_in: u64,
}

/// POST /api/auth - exchange email and password for a signed token
///
/// Unknown email and wrong password produce the same 400 so accounts
/// cannot be enumerated.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<LoginInput>,
) -> ApiResult<LoginResponse> {
    let invalid = || ApiError::bad_request("Invalid email or password.");

    let user = state
        .store
        .find_user_by_email(&input.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&input.password, &user.password_hash) {
        tracing::debug!(user = %user.id, "Login rejected");
        return Err(invalid());
    }

    let security = &state.config.security;
    let token = generate_jwt(&Claims::new(user.id, user.is_admin, security), security).map_err(|e| {
        tracing::error!("Failed to sign token: {}", e);
        ApiError::internal_server_error("Something failed.")
    })?;

    Ok(ApiResponse::success(LoginResponse {
        token,
        expires_in: security.jwt_expiry_hours * 3600,
        user,
    }))
}
