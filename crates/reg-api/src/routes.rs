//! # Routes
//!
//! Axum router configuration for the registration payment API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Create the main application router
///
/// Routes:
/// - POST /create-checkout-session - Create a hosted checkout session
/// - POST /webhook - Provider webhook (raw body, signature-verified)
/// - GET  / - Health check
///
/// CORS is restricted to the configured origin allow-list. Requests with
/// no Origin header (the provider's server-to-server webhook deliveries)
/// are not CORS requests and pass untouched.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| {
                    warn!(origin = %origin, "Skipping unparseable allowed origin");
                })
                .ok()
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::health))
        .route(
            "/create-checkout-session",
            post(handlers::create_checkout_session),
        )
        .route("/webhook", post(handlers::webhook))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
