//! Shared application state injected into all handlers and middleware.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::domain::HandlerGroups;
use crate::error::ErrorNormalizer;
use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter};
use crate::persistence::DataStore;

/// Shared application state available to all handlers via Axum's
/// `State` extractor. Constructed once at startup; everything mutable
/// lives behind the rate limiter's own lock.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Process-wide configuration.
    pub config: Arc<GatewayConfig>,
    /// Backing data store, probed on demand.
    pub store: Arc<dyn DataStore>,
    /// Domain handler groups keyed by namespace.
    pub groups: HandlerGroups,
    /// Terminal failure-to-response mapping.
    pub normalizer: ErrorNormalizer,
    /// Per-client request budget enforcement.
    pub limiter: RateLimiter,
}

impl AppState {
    /// Assembles the state: the normalizer's diagnostic verbosity and the
    /// limiter's budget both derive from configuration.
    #[must_use]
    pub fn new(
        config: GatewayConfig,
        store: Arc<dyn DataStore>,
        groups: HandlerGroups,
    ) -> Self {
        let normalizer = ErrorNormalizer::new(!config.environment.is_production());
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: config.rate_limit_max_requests,
            window: config.rate_limit_window,
        });
        Self {
            config: Arc::new(config),
            store,
            groups,
            normalizer,
            limiter,
        }
    }
}
