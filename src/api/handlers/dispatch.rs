//! Namespace dispatch: reads and parses the request, builds the
//! [`RequestContext`], and hands it to the owning domain handler group.

use axum::Json;
use axum::extract::{OriginalUri, Request, State};
use axum::response::{IntoResponse, Response};
use axum::Router;

use crate::app_state::AppState;
use crate::domain::{Namespace, ParsedBody, RequestContext, bearer_token, client_identity};
use crate::error::GatewayError;

/// Builds the router for one namespace: every method and sub-path falls
/// through to the namespace's handler group.
pub fn routes(namespace: Namespace) -> Router<AppState> {
    Router::new().fallback(move |state: State<AppState>, request: Request| {
        dispatch(namespace, state, request)
    })
}

/// Terminal stage for one namespaced request.
///
/// The body is read under the configured size ceiling and parsed before
/// the handler group runs; any failure on the way in or out goes through
/// the error normalizer exactly once.
async fn dispatch(
    namespace: Namespace,
    State(state): State<AppState>,
    request: Request,
) -> Response {
    let (parts, body) = request.into_parts();

    // Nested routers see the stripped path; the original URI rides along
    // as an extension.
    let path = parts
        .extensions
        .get::<OriginalUri>()
        .map_or_else(|| parts.uri.path().to_string(), |uri| uri.path().to_string());

    let client = client_identity(&parts.headers, &parts.extensions);
    let identity_token = bearer_token(&parts.headers);

    let bytes = match axum::body::to_bytes(body, state.config.body_limit_bytes).await {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!(client = %client, path = %path, "request body over size ceiling");
            return state.normalizer.respond(&GatewayError::payload_too_large());
        }
    };

    let parsed = match ParsedBody::parse(&parts.headers, bytes) {
        Ok(parsed) => parsed,
        Err(error) => return state.normalizer.respond(&error),
    };

    let ctx = RequestContext {
        method: parts.method,
        path,
        headers: parts.headers,
        body: parsed,
        client,
        identity_token,
    };

    match state.groups.get(namespace).handle(ctx).await {
        Ok(response) => (response.status, Json(response.body)).into_response(),
        Err(error) => {
            tracing::debug!(namespace = %namespace.name(), error = %error, "handler group failure");
            state.normalizer.respond(&error)
        }
    }
}
