// handlers/users.rs - /api/users

use axum::{
    extract::State,
    http::{header::HeaderName, HeaderValue},
    middleware::from_fn_with_state,
    routing::{get, post},
    Extension, Router,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{generate_jwt, hash_password, Claims};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::{require_auth, ApiResponse, ApiResult, AuthUser, ValidatedJson};
use crate::models::{User, UserInput};

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new().route("/api/users", post(register));

    let protected = Router::new()
        .route("/api/users/me", get(me))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    public.merge(protected)
}

/// GET /api/users/me - the caller's own account
pub async fn me(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<User> {
    let user = state
        .store
        .find_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found."))?;
    Ok(ApiResponse::success(user))
}

/// POST /api/users - register and receive a token in the auth header
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<UserInput>,
) -> ApiResult<User> {
    let email = User::normalize_email(&input.email);
    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::bad_request("User already registered."));
    }

    let password_hash = hash_password(&input.password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal_server_error("Something failed.")
    })?;

    let user = User {
        id: Uuid::new_v4(),
        name: input.name,
        email,
        password_hash,
        is_admin: false,
    };

    match state.store.insert_user(&user).await {
        Ok(()) => {}
        // Lost a race with a concurrent registration
        Err(DatabaseError::Duplicate(_)) => return Err(ApiError::bad_request("User already registered.")),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(user = %user.id, "User registered");

    let security = &state.config.security;
    let token = generate_jwt(&Claims::new(user.id, user.is_admin, security), security).map_err(|e| {
        tracing::error!("Failed to sign token: {}", e);
        ApiError::internal_server_error("Something failed.")
    })?;

    let (name, value) = token_header(&security.token_header, &token)?;
    Ok(ApiResponse::success(user).with_header(name, value))
}

fn token_header(header: &str, token: &str) -> Result<(HeaderName, HeaderValue), ApiError> {
    let name = HeaderName::from_bytes(header.as_bytes())
        .map_err(|_| ApiError::internal_server_error("Something failed."))?;
    let value = HeaderValue::from_str(token).map_err(|_| ApiError::internal_server_error("Something failed."))?;
    Ok((name, value))
}
