//! Request context handed to domain handler groups.

use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::http::{Extensions, HeaderMap, Method, header};
use std::net::SocketAddr;

use crate::error::GatewayError;

/// Request payload after the body-parsing stage, selected by
/// `Content-Type`. Bodies arrive already capped at the configured size
/// ceiling.
#[derive(Debug, Clone)]
pub enum ParsedBody {
    /// No payload.
    Empty,
    /// `application/json` payload.
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` payload.
    Form(Vec<(String, String)>),
    /// Anything else, unparsed.
    Raw(Bytes),
}

impl ParsedBody {
    /// Parses a size-capped body according to its content type.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ValidationFailed`] on malformed JSON.
    pub fn parse(headers: &HeaderMap, bytes: Bytes) -> Result<Self, GatewayError> {
        if bytes.is_empty() {
            return Ok(Self::Empty);
        }

        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if content_type.starts_with("application/json") {
            serde_json::from_slice(&bytes)
                .map(Self::Json)
                .map_err(|e| GatewayError::ValidationFailed(format!("malformed JSON body: {e}")))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let pairs = url::form_urlencoded::parse(&bytes).into_owned().collect();
            Ok(Self::Form(pairs))
        } else {
            Ok(Self::Raw(bytes))
        }
    }
}

/// Everything the gateway guarantees to a domain handler group: the
/// request line, headers, parsed body, the client identity used for rate
/// limiting, and the bearer token when one was presented. Immutable after
/// construction.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request method.
    pub method: Method,
    /// Full request path, including the `/api/<namespace>` prefix.
    pub path: String,
    /// Request headers, unmodified.
    pub headers: HeaderMap,
    /// Parsed, size-capped body.
    pub body: ParsedBody,
    /// Network-derived client identity.
    pub client: String,
    /// Bearer token from the `Authorization` header, if present.
    pub identity_token: Option<String>,
}

/// Derives the rate-limit key for a request: first hop of
/// `X-Forwarded-For` when present, then the peer socket address, then
/// `"unknown"` for transports without one.
#[must_use]
pub fn client_identity(headers: &HeaderMap, extensions: &Extensions) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |info| info.0.ip().to_string())
}

/// Lifts a bearer token out of the `Authorization` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::net::{IpAddr, Ipv4Addr};

    fn header_map(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            let Ok(value) = HeaderValue::from_str(value) else {
                panic!("valid header value");
            };
            headers.insert(*name, value);
        }
        headers
    }

    #[test]
    fn empty_body_parses_to_empty() {
        let result = ParsedBody::parse(&HeaderMap::new(), Bytes::new());
        assert!(matches!(result, Ok(ParsedBody::Empty)));
    }

    #[test]
    fn json_body_parses_to_value() {
        let headers = header_map(&[("content-type", "application/json")]);
        let result = ParsedBody::parse(&headers, Bytes::from_static(b"{\"a\":1}"));
        let Ok(ParsedBody::Json(value)) = result else {
            panic!("expected JSON body");
        };
        assert_eq!(value, serde_json::json!({"a": 1}));
    }

    #[test]
    fn malformed_json_is_a_validation_failure() {
        let headers = header_map(&[("content-type", "application/json")]);
        let result = ParsedBody::parse(&headers, Bytes::from_static(b"{nope"));
        assert!(matches!(result, Err(GatewayError::ValidationFailed(_))));
    }

    #[test]
    fn form_body_parses_to_pairs() {
        let headers = header_map(&[("content-type", "application/x-www-form-urlencoded")]);
        let result = ParsedBody::parse(&headers, Bytes::from_static(b"a=1&b=two%20words"));
        let Ok(ParsedBody::Form(pairs)) = result else {
            panic!("expected form body");
        };
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "two words".to_string())
            ]
        );
    }

    #[test]
    fn unknown_content_type_stays_raw() {
        let headers = header_map(&[("content-type", "application/octet-stream")]);
        let result = ParsedBody::parse(&headers, Bytes::from_static(b"\x00\x01"));
        assert!(matches!(result, Ok(ParsedBody::Raw(_))));
    }

    #[test]
    fn forwarded_header_wins_over_peer_address() {
        let headers = header_map(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1")]);
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::new(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            4000,
        )));
        assert_eq!(client_identity(&headers, &extensions), "203.0.113.7");
    }

    #[test]
    fn peer_address_used_without_forwarded_header() {
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::new(
            IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)),
            4000,
        )));
        assert_eq!(client_identity(&HeaderMap::new(), &extensions), "192.0.2.1");
    }

    #[test]
    fn unknown_identity_without_any_source() {
        assert_eq!(
            client_identity(&HeaderMap::new(), &Extensions::new()),
            "unknown"
        );
    }

    #[test]
    fn bearer_token_extraction() {
        let headers = header_map(&[("authorization", "Bearer abc.def.ghi")]);
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def.ghi"));

        let headers = header_map(&[("authorization", "Basic dXNlcg==")]);
        assert!(bearer_token(&headers).is_none());

        assert!(bearer_token(&HeaderMap::new()).is_none());
    }
}
