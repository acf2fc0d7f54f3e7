// handlers/rentals.rs - /api/rentals

use axum::{
    extract::{Path, State},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};

use super::path_id;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{require_auth, ApiResponse, ApiResult, ValidatedJson};
use crate::models::{Rental, RentalInput};

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/rentals", get(list).post(create))
        .route("/api/rentals/:id", get(show))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

/// GET /api/rentals - newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Rental>> {
    Ok(ApiResponse::success(state.store.list_rentals().await?))
}

pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Rental> {
    let id = path_id(&id)?;
    let rental = state
        .store
        .find_rental(id)
        .await?
        .ok_or_else(|| ApiError::not_found("The rental with the given ID was not found."))?;
    Ok(ApiResponse::success(rental))
}

/// POST /api/rentals - check a copy out to a customer
///
/// Body: `{"customerId": "...", "movieId": "..."}`. Unknown references are
/// 404, an empty shelf is 409; on success the movie has one copy fewer.
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RentalInput>,
) -> ApiResult<Rental> {
    let rental = state
        .rentals
        .create(input.customer_id(), input.movie_id())
        .await?;
    Ok(ApiResponse::success(rental))
}
