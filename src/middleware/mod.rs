//! Policy middleware: security headers and rate limiting.
//!
//! Cross-origin policy is built directly from `tower_http::cors` in the
//! router assembly; body-size capping happens in the dispatch stage where
//! the body is read.

pub mod rate_limit;
pub mod security;
