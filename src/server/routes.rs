//! Router configuration for the web server.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Per-country feed, filtered by the request payload
        .route("/covid", get(handlers::covid).post(handlers::covid))
        // Per-state regional table
        .route(
            "/covid/de",
            get(handlers::covid_regions).post(handlers::covid_regions),
        )
        .route("/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
