//! Gateway-owned endpoints: health check and capability descriptor.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::app_state::AppState;
use crate::domain::Namespace;

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    database: &'static str,
    environment: &'static str,
}

/// `GET /api/health` — recomputes store reachability on every call.
///
/// An unreachable store is a healthy 200 with `database: "Disconnected"`;
/// only a faulting probe becomes a 500 envelope.
pub async fn health_handler(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(reachable) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "OK",
                timestamp: Utc::now().to_rfc3339(),
                database: if reachable { "Connected" } else { "Disconnected" },
                environment: state.config.environment.as_str(),
            }),
        )
            .into_response(),
        Err(error) => {
            tracing::error!(error = %error, "health probe failed");
            state.normalizer.respond(&error)
        }
    }
}

/// `GET /api/info` — static capability and version descriptor.
pub async fn info_handler() -> Response {
    let endpoints: serde_json::Map<String, serde_json::Value> = Namespace::ALL
        .iter()
        .map(|ns| {
            (
                ns.name().to_string(),
                serde_json::Value::String(ns.prefix().to_string()),
            )
        })
        .collect();

    Json(serde_json::json!({
        "name": "AI Investment Platform API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "HTTP gateway for the AI compute investment platform",
        "endpoints": endpoints,
        "features": [
            "User Authentication (JWT)",
            "Crypto Payment Gateway",
            "Multi-language Support",
            "Investment Management",
            "Transaction History",
            "KYC Verification",
        ],
    }))
    .into_response()
}
