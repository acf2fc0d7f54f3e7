use axum::{
    http::{header::HeaderName, HeaderValue},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::Store;
use crate::handlers;
use crate::services::RentalService;

/// Shared per-process state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub rentals: RentalService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        Self {
            config: Arc::new(config),
            rentals: RentalService::new(store.clone()),
            store,
        }
    }
}

/// Build the full HTTP application
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Resources, each mixing public, protected and admin routes
        .merge(handlers::genres::routes(&state))
        .merge(handlers::movies::routes(&state))
        .merge(handlers::customers::routes(&state))
        .merge(handlers::rentals::routes(&state))
        .merge(handlers::returns::routes(&state))
        .merge(handlers::users::routes(&state))
        .merge(handlers::auth::routes(&state))
        .with_state(state.clone());

    let router = match cors_layer(&state.config.security) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    if state.config.server.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    if security.cors_origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let mut layer = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clients read the token issued on registration from this header
    if let Ok(name) = HeaderName::from_bytes(security.token_header.as_bytes()) {
        layer = layer.expose_headers([name]);
    }

    Some(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::database::MemoryStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn state() -> AppState {
        let mut config = AppConfig::preset(Environment::Development);
        config.security.jwt_secret = "unit-test-secret".to_string();
        config.server.enable_request_logging = false;
        AppState::new(config, Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn reads_are_public() {
        let response = app(state())
            .oneshot(Request::get("/api/genres").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn writes_check_auth_before_body() {
        let response = app(state())
            .oneshot(
                Request::post("/api/genres")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn cors_can_be_disabled() {
        let mut security = AppConfig::preset(Environment::Production).security;
        assert!(cors_layer(&security).is_some());
        security.enable_cors = false;
        assert!(cors_layer(&security).is_none());
    }
}
