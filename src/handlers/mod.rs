pub mod auth;
pub mod customers;
pub mod genres;
pub mod movies;
pub mod rentals;
pub mod returns;
pub mod users;

use axum::{extract::State, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// Parse a `:id` path segment; malformed ids never reach the store
pub(crate) fn path_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Invalid ID."))
}

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Vidly API",
            "version": version,
            "description": "Video rental backend built with Rust (Axum)",
            "endpoints": {
                "health": "/health (public)",
                "genres": "/api/genres[/:id] (read public, write protected, delete admin)",
                "movies": "/api/movies[/:id] (read public, write protected, delete admin)",
                "customers": "/api/customers[/:id] (protected, delete admin)",
                "rentals": "/api/rentals[/:id] (protected)",
                "returns": "/api/returns (protected)",
                "users": "/api/users (public register), /api/users/me (protected)",
                "auth": "/api/auth (public login)"
            }
        }
    }))
}

/// GET /health - liveness plus a backend ping
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    state.store.health_check().await.map_err(|e| {
        tracing::error!("Health check failed: {}", e);
        ApiError::service_unavailable("Database unavailable")
    })?;

    Ok(ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "database": "ok"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, Environment};
    use crate::database::PgStore;
    use axum::http::StatusCode;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn malformed_path_id_is_not_found() {
        let err = path_id("1234").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Invalid ID.");

        let id = Uuid::new_v4();
        assert_eq!(path_id(&id.to_string()).unwrap(), id);
    }

    #[tokio::test]
    async fn unreachable_database_is_service_unavailable() {
        // Nothing listens on port 1, so the first acquire fails
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(2))
            .connect_lazy("postgres://vidly@127.0.0.1:1/vidly")
            .unwrap();
        let mut config = AppConfig::preset(Environment::Development);
        config.security.jwt_secret = "unit-test-secret".to_string();
        let state = AppState::new(config, Arc::new(PgStore::new(pool)));

        let err = health(State(state)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_json()["code"], "SERVICE_UNAVAILABLE");
        assert_eq!(err.message(), "Database unavailable");
    }
}
