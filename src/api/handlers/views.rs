//! Fixed front-end views and terminal not-found responders.
//!
//! Views are a fixed lookup table from path to an embedded document;
//! there is no templating and no filesystem access at request time.

use axum::Router;
use axum::extract::{OriginalUri, State};
use axum::http::{Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;

use crate::app_state::AppState;
use crate::error::GatewayError;

const INDEX: &str = include_str!("../../../static/index.html");
const LOGIN: &str = include_str!("../../../static/login.html");
const DASHBOARD: &str = include_str!("../../../static/dashboard.html");
const PROFILE: &str = include_str!("../../../static/profile.html");
const KYC: &str = include_str!("../../../static/kyc.html");
const ASSETS: &str = include_str!("../../../static/assets.html");
const NOT_FOUND_PAGE: &str = include_str!("../../../static/404.html");

/// Path-to-document table for the named front-end views.
const VIEWS: &[(&str, &str)] = &[
    ("/", INDEX),
    ("/login", LOGIN),
    ("/dashboard", DASHBOARD),
    ("/profile", PROFILE),
    ("/kyc", KYC),
    ("/assets", ASSETS),
];

/// Routes for every named view.
///
/// Views answer GET only; any other method on a view path falls through
/// to the static 404 document rather than a bare 405.
pub fn routes() -> Router<AppState> {
    VIEWS
        .iter()
        .fold(Router::new(), |router, &(path, document)| {
            router.route(
                path,
                get(move || async move { Html(document) }).fallback(static_not_found),
            )
        })
}

/// Terminal not-found responder for paths under `/api`.
pub async fn api_not_found(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    method: Method,
) -> Response {
    state.normalizer.respond(&GatewayError::NotFound {
        path: uri.path().to_string(),
        method: method.to_string(),
    })
}

/// Terminal not-found responder for everything outside `/api`.
pub async fn static_not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response()
}
