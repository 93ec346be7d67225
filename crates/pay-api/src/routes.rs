//! # Routes
//!
//! Axum router configuration for the payment API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - API:
///   - POST /api/v1/checkout - Create payment, returns the payment page URL
///   - GET  /api/v1/orders/{trade_no} - Query order at the gateway
///   - POST /api/v1/refunds - Request a refund
///
/// - Webhooks:
///   - GET|POST /webhook/epay/notify - Gateway notification
///
/// - Static pages:
///   - GET /checkout/success - Return page
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - allow all origins for now
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let checkout_routes = Router::new().route("/success", get(handlers::checkout_success));

    let api_routes = Router::new()
        .route("/checkout", post(handlers::create_checkout))
        .route("/orders/{trade_no}", get(handlers::get_order))
        .route("/refunds", post(handlers::create_refund));

    // Gateway notifications arrive as either query string or form body
    let webhook_routes = Router::new().route(
        "/epay/notify",
        get(handlers::notify_get).post(handlers::notify_post),
    );

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/checkout", checkout_routes)
        .nest("/api/v1", api_routes)
        .nest("/webhook", webhook_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
