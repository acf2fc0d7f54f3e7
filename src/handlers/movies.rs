// handlers/movies.rs - /api/movies

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
use crate::models::{Genre, Movie, MovieInput};

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/movies", get(list))
        .route("/api/movies/:id", get(show));

    let protected = Router::new()
        .route("/api/movies", post(create))
        .route("/api/movies/:id", put(update))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/api/movies/:id", delete(remove))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    public.merge(protected).merge(admin)
}

/// GET /api/movies - all movies sorted by title
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Movie>> {
    Ok(ApiResponse::success(state.store.list_movies().await?))
}

/// GET /api/movies/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Movie> {
    let id = path_id(&id)?;
    let movie = state.store.find_movie(id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(movie))
}

/// POST /api/movies - the genre is snapshotted into the movie
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<MovieInput>,
) -> ApiResult<Movie> {
    let genre = referenced_genre(&state, &input).await?;
    let movie = input.into_movie(Uuid::new_v4(), &genre);
    state.store.insert_movie(&movie).await?;
    Ok(ApiResponse::success(movie))
}

/// PUT /api/movies/:id - refreshes the genre snapshot
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<MovieInput>,
) -> ApiResult<Movie> {
    let id = path_id(&id)?;
    let genre = referenced_genre(&state, &input).await?;
    let movie = state
        .store
        .update_movie(&input.into_movie(id, &genre))
        .await?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::success(movie))
}

/// DELETE /api/movies/:id - admin only
pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Movie> {
    let id = path_id(&id)?;
    let movie = state.store.delete_movie(id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(movie))
}

async fn referenced_genre(state: &AppState, input: &MovieInput) -> Result<Genre, ApiError> {
    state
        .store
        .find_genre(input.genre_id())
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid genre."))
}

fn not_found() -> ApiError {
    ApiError::not_found("The movie with the given ID was not found.")
}
