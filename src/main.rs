//! invest-gateway server entry point.
//!
//! Startup sequence: configuration, data store probe (fail-fast), socket
//! bind, serve. A termination signal logs and exits 0 without draining
//! in-flight requests; any fault escaping handler logic exits 1.

use std::future::IntoFuture;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use invest_gateway::api;
use invest_gateway::app_state::AppState;
use invest_gateway::config::GatewayConfig;
use invest_gateway::domain::HandlerGroups;
use invest_gateway::persistence::DataStore;
use invest_gateway::persistence::postgres::PostgresStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    install_fatal_panic_hook();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(
        environment = %config.environment.as_str(),
        "starting invest-gateway"
    );

    // Probe the backing data store before accepting any traffic. Serving
    // requests without a working store risks silent corruption, so an
    // unreachable store aborts startup instead of degrading.
    tracing::info!("probing backing data store");
    let store: Arc<dyn DataStore> = match PostgresStore::connect(&config).await {
        Ok(store) => Arc::new(store),
        Err(error) => {
            tracing::error!(error = %error, "data store unreachable, aborting startup");
            std::process::exit(1);
        }
    };
    match store.ping().await {
        Ok(true) => tracing::info!("data store reachable"),
        Ok(false) => {
            tracing::error!("data store unreachable, aborting startup");
            std::process::exit(1);
        }
        Err(error) => {
            tracing::error!(error = %error, "data store probe failed, aborting startup");
            std::process::exit(1);
        }
    }

    let port = config.port;
    let environment = config.environment;
    let state = AppState::new(config, store, HandlerGroups::detached());
    let app = api::build_router(state);

    // Bind and announce readiness
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, environment = %environment.as_str(), "server listening");
    tracing::info!("api descriptor: http://localhost:{port}/api/info");
    tracing::info!("health check:   http://localhost:{port}/api/health");

    let serve = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );

    // Exit promptly on a termination signal; in-flight requests are not
    // drained since domain writes belong to collaborator services.
    tokio::select! {
        result = serve.into_future() => result?,
        () = shutdown_signal() => {
            tracing::info!("termination signal received, shutting down");
        }
    }

    Ok(())
}

/// Resolves when the process receives SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

/// Any panic escaping handler logic terminates the process instead of
/// leaving it in an unknown state.
fn install_fatal_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        default_hook(info);
        tracing::error!("unrecoverable fault, terminating");
        std::process::exit(1);
    }));
}
