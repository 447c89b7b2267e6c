//! Request pipeline assembly: policy middleware, routing, and fallbacks.
//!
//! Stage order for every request: trace span, security headers, CORS,
//! then (under `/api` only) rate limiting, and finally body parsing
//! inside namespace dispatch. The rate limiter is the only stage allowed
//! to short-circuit the chain; everything else runs in fixed order.

pub mod handlers;

use axum::Router;
use axum::http::{HeaderName, Method, header};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::config::GatewayConfig;
use crate::domain::Namespace;
use crate::middleware;

/// Builds the complete application router around one [`AppState`].
///
/// Dispatch order: API namespaces first, then the named static views,
/// then the terminal not-found handlers (JSON under `/api`, the static
/// document elsewhere).
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::system::health_handler))
        .route("/info", get(handlers::system::info_handler))
        .nest("/auth", handlers::dispatch::routes(Namespace::Auth))
        .nest("/user", handlers::dispatch::routes(Namespace::User))
        .nest("/transactions", handlers::dispatch::routes(Namespace::Transactions))
        .nest("/investments", handlers::dispatch::routes(Namespace::Investments))
        .nest("/webhook", handlers::dispatch::routes(Namespace::Webhook))
        .fallback(handlers::views::api_not_found)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::rate_limit::enforce,
        ));

    Router::new()
        .nest("/api", api)
        .merge(handlers::views::routes())
        .fallback(handlers::views::static_not_found)
        .layer(cors_layer(&state.config))
        .layer(from_fn(middleware::security::security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Cross-origin policy: one allowed origin with credentials.
fn cors_layer(config: &GatewayConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(config.allowed_origin.clone())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
}
