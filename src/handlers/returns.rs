// handlers/returns.rs - POST /api/returns

use axum::{extract::State, middleware::from_fn_with_state, routing::post, Router};

use crate::app::AppState;
use crate::middleware::{require_auth, ApiResponse, ApiResult, ValidatedJson};
use crate::models::{Rental, RentalInput};

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/returns", post(create))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

/// POST /api/returns - close the open rental for a customer/movie pair
///
/// Responds with the rental carrying `dateReturned` and `rentalFee`.
/// No matching rental is 404; a rental already returned is 409.
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RentalInput>,
) -> ApiResult<Rental> {
    let rental = state
        .rentals
        .process_return(input.customer_id(), input.movie_id())
        .await?;
    Ok(ApiResponse::success(rental))
}
