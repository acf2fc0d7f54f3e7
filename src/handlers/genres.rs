// handlers/genres.rs - /api/genres

use axum::{
    extract::{Path, State},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use uuid::Uuid;

use super::path_id;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{require_admin, require_auth, ApiResponse, ApiResult, ValidatedJson};
use crate::models::{Genre, GenreInput};

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/genres", get(list))
        .route("/api/genres/:id", get(show));

    let protected = Router::new()
        .route("/api/genres", post(create))
        .route("/api/genres/:id", put(update))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/api/genres/:id", delete(remove))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    public.merge(protected).merge(admin)
}

/// GET /api/genres - all genres sorted by name
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Genre>> {
    Ok(ApiResponse::success(state.store.list_genres().await?))
}

/// GET /api/genres/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Genre> {
    let id = path_id(&id)?;
    let genre = state.store.find_genre(id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(genre))
}

/// POST /api/genres
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<GenreInput>,
) -> ApiResult<Genre> {
    let genre = input.into_genre(Uuid::new_v4());
    state.store.insert_genre(&genre).await?;
    Ok(ApiResponse::success(genre))
}

/// PUT /api/genres/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<GenreInput>,
) -> ApiResult<Genre> {
    let id = path_id(&id)?;
    let genre = state
        .store
        .update_genre(&input.into_genre(id))
        .await?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::success(genre))
}

/// DELETE /api/genres/:id - admin only
pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Genre> {
    let id = path_id(&id)?;
    let genre = state.store.delete_genre(id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(genre))
}

fn not_found() -> ApiError {
    ApiError::not_found("The genre with the given ID was not found.")
}
