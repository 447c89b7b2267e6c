//! Per-client fixed-window rate limiting for `/api` routes.
//!
//! Buckets are keyed by client identity and hold a counter plus the
//! window start. The bucket table is the only shared mutable state in
//! the middleware chain; increments for one key are serialized by the
//! table lock. Expired buckets are evicted on every check, so the table
//! holds at most the identities seen within the current window.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use axum::middleware::Next;
use axum::response::Response;

use crate::app_state::AppState;
use crate::domain::client_identity;
use crate::error::GatewayError;

/// Standard draft rate-limit response headers.
const LIMIT_HEADER: HeaderName = HeaderName::from_static("ratelimit-limit");
const REMAINING_HEADER: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RESET_HEADER: HeaderName = HeaderName::from_static("ratelimit-reset");

/// Rate limiter settings, fixed at startup.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Maximum requests per client identity within one window.
    pub max_requests: u64,
    /// Window length.
    pub window: Duration,
}

/// Counter state for one client identity.
#[derive(Debug, Clone, Copy)]
struct Bucket {
    count: u64,
    window_start: Instant,
}

/// Outcome of one counter check.
#[derive(Debug, Clone, Copy)]
pub struct Decision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Configured window maximum.
    pub limit: u64,
    /// Requests left in the current window.
    pub remaining: u64,
    /// Time until the current window resets.
    pub reset_after: Duration,
}

/// Shared fixed-window rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Arc<Mutex<HashMap<String, Bucket>>>,
}

impl RateLimiter {
    /// Creates a limiter with an empty bucket table.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Checks and increments the counter for one client identity.
    #[must_use]
    pub fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Decision {
        let mut buckets = match self.buckets.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        // Drop every expired bucket, including this key's own: spoofed
        // identities must not pin table entries past their window. A
        // re-inserted key opens a fresh window with a zeroed counter.
        let window = self.config.window;
        buckets.retain(|_, bucket| now.duration_since(bucket.window_start) < window);

        let bucket = buckets.entry(key.to_string()).or_insert(Bucket {
            count: 0,
            window_start: now,
        });

        let limit = self.config.max_requests;
        let reset_after = self
            .config
            .window
            .saturating_sub(now.duration_since(bucket.window_start));

        if bucket.count >= limit {
            Decision {
                allowed: false,
                limit,
                remaining: 0,
                reset_after,
            }
        } else {
            bucket.count += 1;
            Decision {
                allowed: true,
                limit,
                remaining: limit - bucket.count,
                reset_after,
            }
        }
    }
}

/// Middleware enforcing the per-client request budget.
///
/// Allowed requests proceed down the chain and carry the standard
/// rate-limit headers on their response; a rejected request is answered
/// immediately with the normalized 429 envelope, and downstream stages
/// never run.
pub async fn enforce(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let key = client_identity(request.headers(), request.extensions());
    let decision = state.limiter.check(&key);

    if decision.allowed {
        let mut response = next.run(request).await;
        apply_headers(response.headers_mut(), &decision);
        return response;
    }

    tracing::warn!(client = %key, "rate limit exceeded");
    let mut response = state.normalizer.respond(&GatewayError::RateLimitExceeded);
    apply_headers(response.headers_mut(), &decision);
    if let Ok(value) = HeaderValue::from_str(&decision.reset_after.as_secs().to_string()) {
        response.headers_mut().insert(RETRY_AFTER, value);
    }
    response
}

fn apply_headers(headers: &mut HeaderMap, decision: &Decision) {
    let entries = [
        (LIMIT_HEADER, decision.limit),
        (REMAINING_HEADER, decision.remaining),
        (RESET_HEADER, decision.reset_after.as_secs()),
    ];
    for (name, value) in entries {
        if let Ok(value) = HeaderValue::from_str(&value.to_string()) {
            headers.insert(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u64, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(window_secs),
        })
    }

    #[test]
    fn requests_within_budget_are_allowed() {
        let limiter = limiter(3, 60);
        let t0 = Instant::now();
        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check_at("203.0.113.1", t0);
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }
    }

    #[test]
    fn request_over_budget_is_rejected() {
        let limiter = limiter(2, 60);
        let t0 = Instant::now();
        assert!(limiter.check_at("k", t0).allowed);
        assert!(limiter.check_at("k", t0).allowed);

        let decision = limiter.check_at("k", t0);
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
        assert_eq!(decision.limit, 2);
    }

    #[test]
    fn counter_resets_once_window_elapses() {
        let limiter = limiter(2, 10);
        let t0 = Instant::now();
        assert!(limiter.check_at("k", t0).allowed);
        assert!(limiter.check_at("k", t0).allowed);
        assert!(!limiter.check_at("k", t0).allowed);

        // First request after expiry counts as request one.
        let t1 = t0 + Duration::from_secs(10);
        let decision = limiter.check_at("k", t1);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 1);
    }

    #[test]
    fn client_identities_are_bucketed_independently() {
        let limiter = limiter(1, 60);
        let t0 = Instant::now();
        assert!(limiter.check_at("a", t0).allowed);
        assert!(!limiter.check_at("a", t0).allowed);
        assert!(limiter.check_at("b", t0).allowed);
    }

    #[test]
    fn expired_buckets_are_evicted_from_the_table() {
        let limiter = limiter(100, 10);
        let t0 = Instant::now();
        for n in 0..500 {
            limiter.check_at(&format!("198.51.100.{n}"), t0);
        }

        // One check after every window has lapsed leaves a single live
        // bucket, not 501.
        limiter.check_at("203.0.113.9", t0 + Duration::from_secs(60));
        let buckets = match limiter.buckets.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        assert_eq!(buckets.len(), 1);
        assert!(buckets.contains_key("203.0.113.9"));
    }

    #[test]
    fn reset_counts_down_within_the_window() {
        let limiter = limiter(10, 60);
        let t0 = Instant::now();
        let first = limiter.check_at("k", t0);
        assert_eq!(first.reset_after, Duration::from_secs(60));

        let later = limiter.check_at("k", t0 + Duration::from_secs(45));
        assert_eq!(later.reset_after, Duration::from_secs(15));
    }
}
