// handlers/customers.rs - /api/customers

use axum::{
    extract::{Path, State},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get},
    Router,
};
use uuid::Uuid;

use super::path_id;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{require_admin, require_auth, ApiResponse, ApiResult, ValidatedJson};
use crate::models::{Customer, CustomerInput};

pub fn routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/customers", get(list).post(create))
        .route("/api/customers/:id", get(show).put(update))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/api/customers/:id", delete(remove))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    protected.merge(admin)
}

/// GET /api/customers - all customers sorted by name
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Customer>> {
    Ok(ApiResponse::success(state.store.list_customers().await?))
}

pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Customer> {
    let id = path_id(&id)?;
    let customer = state.store.find_customer(id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(customer))
}

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CustomerInput>,
) -> ApiResult<Customer> {
    let customer = input.into_customer(Uuid::new_v4());
    state.store.insert_customer(&customer).await?;
    Ok(ApiResponse::success(customer))
}

/// PUT /api/customers/:id - existing rentals keep their snapshot
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<CustomerInput>,
) -> ApiResult<Customer> {
    let id = path_id(&id)?;
    let customer = state
        .store
        .update_customer(&input.into_customer(id))
        .await?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::success(customer))
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Customer> {
    let id = path_id(&id)?;
    let customer = state.store.delete_customer(id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(customer))
}

fn not_found() -> ApiError {
    ApiError::not_found("The customer with the given ID was not found.")
}
