//! Gateway failure taxonomy with HTTP status code mapping.
//!
//! [`GatewayError`] is the failure-kind sum type returned by middleware
//! stages and domain handler groups. [`ErrorNormalizer`] is the single
//! terminal stage that turns any failure into exactly one JSON response.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured JSON body for every non-2xx response.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": "Validation failed",
///   "message": "email is required"
/// }
/// ```
///
/// Not-found responses for API paths carry `path` and `method` instead of
/// `message`; `stack` is only attached outside production configuration.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    /// Short failure label, fixed per failure kind.
    pub error: String,
    /// Human-readable explanation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Requested path, for API not-found responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Request method, for API not-found responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Diagnostic trace, never present in production configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Failure kinds surfaced by middleware stages and domain handler groups.
///
/// | Kind                | HTTP Status              |
/// |---------------------|--------------------------|
/// | `DuplicateEntry`    | 400 Bad Request          |
/// | `InvalidToken`      | 401 Unauthorized         |
/// | `ValidationFailed`  | 400 Bad Request          |
/// | `RateLimitExceeded` | 429 Too Many Requests    |
/// | `NotFound`          | 404 Not Found            |
/// | `Internal`          | 500 or handler-supplied  |
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// A uniqueness constraint was violated by a write in a handler group.
    #[error("duplicate entry")]
    DuplicateEntry,

    /// An identity token failed verification.
    #[error("invalid token")]
    InvalidToken,

    /// Input failed domain-level validation; the message reaches the
    /// client verbatim.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Client exceeded the configured request budget in the current window.
    #[error("rate limit exceeded")]
    RateLimitExceeded,

    /// No route or resource matched the request.
    #[error("no route matched {method} {path}")]
    NotFound {
        /// Requested path.
        path: String,
        /// Request method.
        method: String,
    },

    /// Default catch-all for anything else.
    #[error("{message}")]
    Internal {
        /// Handler-supplied status code; 500 when absent or invalid.
        status: Option<u16>,
        /// Failure message; replaced by a generic one when empty.
        message: String,
        /// Diagnostic detail, surfaced only outside production.
        detail: Option<String>,
    },
}

impl GatewayError {
    /// Builds an internal failure with the default 500 status.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            status: None,
            message: message.into(),
            detail: None,
        }
    }

    /// Builds a catch-all failure carrying an explicit status code.
    #[must_use]
    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Internal {
            status: Some(status.as_u16()),
            message: message.into(),
            detail: None,
        }
    }

    /// Rejection for bodies exceeding the configured size ceiling.
    #[must_use]
    pub fn payload_too_large() -> Self {
        Self::with_status(StatusCode::PAYLOAD_TOO_LARGE, "request entity too large")
    }

    /// Returns the HTTP status code for this failure kind.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DuplicateEntry | Self::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal { status, .. } => status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

/// Terminal stage mapping any [`GatewayError`] to one response.
///
/// Constructed once at startup from the runtime environment; diagnostic
/// detail is attached only when `include_diagnostics` is set. This stage
/// is infallible: the envelope is a plain struct whose serialization
/// cannot fail, so every failure collapses to a well-shaped response.
#[derive(Debug, Clone, Copy)]
pub struct ErrorNormalizer {
    include_diagnostics: bool,
}

impl ErrorNormalizer {
    /// Creates a normalizer; `include_diagnostics` must be false in
    /// production configuration.
    #[must_use]
    pub const fn new(include_diagnostics: bool) -> Self {
        Self {
            include_diagnostics,
        }
    }

    /// Maps a failure to its status code and envelope.
    #[must_use]
    pub fn envelope(&self, error: &GatewayError) -> (StatusCode, ErrorEnvelope) {
        let status = error.status_code();
        let envelope = match error {
            GatewayError::DuplicateEntry => ErrorEnvelope {
                error: "Duplicate entry".to_string(),
                message: Some("The provided data already exists".to_string()),
                path: None,
                method: None,
                stack: None,
            },
            GatewayError::InvalidToken => ErrorEnvelope {
                error: "Invalid token".to_string(),
                message: Some("Please login again".to_string()),
                path: None,
                method: None,
                stack: None,
            },
            GatewayError::ValidationFailed(message) => ErrorEnvelope {
                error: "Validation failed".to_string(),
                message: Some(message.clone()),
                path: None,
                method: None,
                stack: None,
            },
            GatewayError::RateLimitExceeded => ErrorEnvelope {
                error: "Rate limit exceeded".to_string(),
                message: Some(
                    "Too many requests from this IP, please try again later.".to_string(),
                ),
                path: None,
                method: None,
                stack: None,
            },
            GatewayError::NotFound { path, method } => ErrorEnvelope {
                error: "API endpoint not found".to_string(),
                message: None,
                path: Some(path.clone()),
                method: Some(method.clone()),
                stack: None,
            },
            GatewayError::Internal {
                message, detail, ..
            } => ErrorEnvelope {
                error: if message.is_empty() {
                    "Internal server error".to_string()
                } else {
                    message.clone()
                },
                message: None,
                path: None,
                method: None,
                stack: if self.include_diagnostics {
                    detail.clone()
                } else {
                    None
                },
            },
        };
        (status, envelope)
    }

    /// Produces the final response for a failure.
    #[must_use]
    pub fn respond(&self, error: &GatewayError) -> Response {
        let (status, envelope) = self.envelope(error);
        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn dev() -> ErrorNormalizer {
        ErrorNormalizer::new(true)
    }

    fn prod() -> ErrorNormalizer {
        ErrorNormalizer::new(false)
    }

    #[test]
    fn duplicate_entry_maps_to_400() {
        let (status, envelope) = dev().envelope(&GatewayError::DuplicateEntry);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(envelope.error, "Duplicate entry");
        assert_eq!(
            envelope.message.as_deref(),
            Some("The provided data already exists")
        );
    }

    #[test]
    fn invalid_token_maps_to_401() {
        let (status, envelope) = dev().envelope(&GatewayError::InvalidToken);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(envelope.error, "Invalid token");
        assert_eq!(envelope.message.as_deref(), Some("Please login again"));
    }

    #[test]
    fn validation_message_passes_through_verbatim() {
        let error = GatewayError::ValidationFailed("X".to_string());
        let (status, envelope) = prod().envelope(&error);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(envelope.error, "Validation failed");
        assert_eq!(envelope.message.as_deref(), Some("X"));
        assert!(envelope.stack.is_none());
    }

    #[test]
    fn rate_limit_maps_to_429() {
        let (status, envelope) = dev().envelope(&GatewayError::RateLimitExceeded);
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(envelope.error, "Rate limit exceeded");
    }

    #[test]
    fn not_found_carries_path_and_method() {
        let error = GatewayError::NotFound {
            path: "/api/nope".to_string(),
            method: "GET".to_string(),
        };
        let (status, envelope) = dev().envelope(&error);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(envelope.error, "API endpoint not found");
        assert_eq!(envelope.path.as_deref(), Some("/api/nope"));
        assert_eq!(envelope.method.as_deref(), Some("GET"));
        assert!(envelope.message.is_none());
    }

    #[test]
    fn internal_defaults_to_500_with_generic_message() {
        let error = GatewayError::Internal {
            status: None,
            message: String::new(),
            detail: None,
        };
        let (status, envelope) = prod().envelope(&error);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(envelope.error, "Internal server error");
    }

    #[test]
    fn internal_honors_handler_supplied_status() {
        let error = GatewayError::payload_too_large();
        let (status, envelope) = prod().envelope(&error);
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(envelope.error, "request entity too large");
    }

    #[test]
    fn internal_with_invalid_status_falls_back_to_500() {
        let error = GatewayError::Internal {
            status: Some(42),
            message: "odd".to_string(),
            detail: None,
        };
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn diagnostic_detail_gated_by_configuration() {
        let error = GatewayError::Internal {
            status: None,
            message: "boom".to_string(),
            detail: Some("trace line".to_string()),
        };
        let (_, with_diag) = dev().envelope(&error);
        assert_eq!(with_diag.stack.as_deref(), Some("trace line"));

        let (_, without_diag) = prod().envelope(&error);
        assert!(without_diag.stack.is_none());
    }

    #[test]
    fn stack_is_omitted_from_serialized_envelope_when_absent() {
        let (_, envelope) = prod().envelope(&GatewayError::ValidationFailed("X".to_string()));
        let Ok(json) = serde_json::to_value(&envelope) else {
            panic!("envelope serializes");
        };
        assert_eq!(
            json,
            serde_json::json!({"error": "Validation failed", "message": "X"})
        );
    }
}
