//! Domain handler group trait and the namespace registry.

use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;
use futures_util::future::BoxFuture;

use crate::domain::context::RequestContext;
use crate::error::GatewayError;

/// URL namespaces owned by domain handler groups. Prefixes are disjoint
/// by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Registration, login, token refresh.
    Auth,
    /// Profile, settings, KYC status.
    User,
    /// Deposit and withdrawal history.
    Transactions,
    /// Investment plans and positions.
    Investments,
    /// Crypto payment provider callbacks.
    Webhook,
}

impl Namespace {
    /// Every namespace, in mount order.
    pub const ALL: [Self; 5] = [
        Self::Auth,
        Self::User,
        Self::Transactions,
        Self::Investments,
        Self::Webhook,
    ];

    /// Short name, as listed by `/api/info`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::User => "user",
            Self::Transactions => "transactions",
            Self::Investments => "investments",
            Self::Webhook => "webhook",
        }
    }

    /// Full URL prefix for this namespace.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Auth => "/api/auth",
            Self::User => "/api/user",
            Self::Transactions => "/api/transactions",
            Self::Investments => "/api/investments",
            Self::Webhook => "/api/webhook",
        }
    }
}

/// Successful output of a domain handler group.
#[derive(Debug, Clone)]
pub struct DomainResponse {
    /// Response status.
    pub status: StatusCode,
    /// JSON response body.
    pub body: serde_json::Value,
}

impl DomainResponse {
    /// Builds a response with an explicit status.
    #[must_use]
    pub const fn new(status: StatusCode, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    /// Builds a 200 response.
    #[must_use]
    pub const fn ok(body: serde_json::Value) -> Self {
        Self::new(StatusCode::OK, body)
    }
}

/// An external collaborator implementing the business logic for one
/// namespace. Implementations surface failures as [`GatewayError`] values
/// rather than writing responses; the error normalizer owns the mapping
/// to status codes and envelopes.
pub trait DomainHandler: fmt::Debug + Send + Sync {
    /// Handles one request routed into this group's namespace.
    fn handle(
        &self,
        ctx: RequestContext,
    ) -> BoxFuture<'static, Result<DomainResponse, GatewayError>>;
}

/// One handler group per namespace, built once at startup and immutable
/// for the process lifetime.
#[derive(Debug, Clone)]
pub struct HandlerGroups {
    auth: Arc<dyn DomainHandler>,
    user: Arc<dyn DomainHandler>,
    transactions: Arc<dyn DomainHandler>,
    investments: Arc<dyn DomainHandler>,
    webhook: Arc<dyn DomainHandler>,
}

impl HandlerGroups {
    /// Wires one collaborator per namespace.
    #[must_use]
    pub fn new(
        auth: Arc<dyn DomainHandler>,
        user: Arc<dyn DomainHandler>,
        transactions: Arc<dyn DomainHandler>,
        investments: Arc<dyn DomainHandler>,
        webhook: Arc<dyn DomainHandler>,
    ) -> Self {
        Self {
            auth,
            user,
            transactions,
            investments,
            webhook,
        }
    }

    /// Registry with no collaborators wired in: every namespace request
    /// resolves to a not-found failure. Service binaries replace entries
    /// via [`HandlerGroups::new`].
    #[must_use]
    pub fn detached() -> Self {
        let detached: Arc<dyn DomainHandler> = Arc::new(DetachedHandler);
        Self {
            auth: Arc::clone(&detached),
            user: Arc::clone(&detached),
            transactions: Arc::clone(&detached),
            investments: Arc::clone(&detached),
            webhook: Arc::clone(&detached),
        }
    }

    /// Looks up the collaborator owning a namespace.
    #[must_use]
    pub fn get(&self, namespace: Namespace) -> &Arc<dyn DomainHandler> {
        match namespace {
            Namespace::Auth => &self.auth,
            Namespace::User => &self.user,
            Namespace::Transactions => &self.transactions,
            Namespace::Investments => &self.investments,
            Namespace::Webhook => &self.webhook,
        }
    }
}

/// Stand-in collaborator for namespaces with no service mounted; answers
/// every request with a not-found failure carrying the requested path.
#[derive(Debug, Clone, Copy)]
pub struct DetachedHandler;

impl DomainHandler for DetachedHandler {
    fn handle(
        &self,
        ctx: RequestContext,
    ) -> BoxFuture<'static, Result<DomainResponse, GatewayError>> {
        Box::pin(async move {
            Err(GatewayError::NotFound {
                path: ctx.path,
                method: ctx.method.to_string(),
            })
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::context::ParsedBody;
    use axum::http::{HeaderMap, Method};

    fn context(path: &str) -> RequestContext {
        RequestContext {
            method: Method::GET,
            path: path.to_string(),
            headers: HeaderMap::new(),
            body: ParsedBody::Empty,
            client: "test".to_string(),
            identity_token: None,
        }
    }

    #[test]
    fn namespace_prefixes_are_disjoint() {
        for a in Namespace::ALL {
            for b in Namespace::ALL {
                if a != b {
                    assert!(!a.prefix().starts_with(b.prefix()));
                }
            }
        }
    }

    #[test]
    fn prefixes_follow_names() {
        for namespace in Namespace::ALL {
            assert_eq!(namespace.prefix(), format!("/api/{}", namespace.name()));
        }
    }

    #[tokio::test]
    async fn detached_handler_reports_not_found() {
        let result = DetachedHandler.handle(context("/api/auth/login")).await;
        let Err(GatewayError::NotFound { path, method }) = result else {
            panic!("expected not-found failure");
        };
        assert_eq!(path, "/api/auth/login");
        assert_eq!(method, "GET");
    }

    #[tokio::test]
    async fn detached_registry_serves_every_namespace() {
        let groups = HandlerGroups::detached();
        for namespace in Namespace::ALL {
            let result = groups.get(namespace).handle(context(namespace.prefix())).await;
            assert!(result.is_err());
        }
    }
}
