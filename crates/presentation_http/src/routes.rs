//! Route definitions

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use infrastructure::ServerConfig;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers, state::AppState};

/// Create the main router with all routes and layers
pub fn create_router(state: AppState) -> Router {
    let server = state.config.server.clone();

    let router = Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // Quoting API (v1)
        .route("/v1/quote", post(handlers::quote::quote))
        .route("/v1/geocode", post(handlers::geocode::geocode))
        // Tariff API (v1)
        .route(
            "/v1/tariff",
            get(handlers::tariff::current).put(handlers::tariff::update),
        )
        .route("/v1/tariff/history", get(handlers::tariff::history))
        .route(
            "/v1/featured-trips/refresh",
            post(handlers::featured_trips::refresh),
        )
        .layer(DefaultBodyLimit::max(server.max_body_size_json_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match cors_layer(&server) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

fn cors_layer(server: &ServerConfig) -> Option<CorsLayer> {
    if !server.cors_enabled {
        return None;
    }

    let layer = if server.allowed_origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = server
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    Some(
        layer
            .allow_methods([Method::GET, Method::POST, Method::PUT])
            .allow_headers(Any),
    )
}
