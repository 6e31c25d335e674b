//! Server: binds the gateway and runs it until a shutdown signal.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use super::routes::RoutingTable;
use super::{index, proxy};
use crate::config::GatewayConfig;
use crate::state::AppState;

/// Every path goes through the fallback: there are no fixed routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .fallback(handle)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle(State(state): State<AppState>, req: Request) -> Response {
    let port = state.routes.resolve(req.uri().path()).map(|(_, port)| port);
    match port {
        Some(port) => proxy::forward_or_bad_gateway(&state, port, req).await,
        None => index::render(&state.routes).into_response(),
    }
}

pub async fn run(config: &GatewayConfig, routes: RoutingTable) -> Result<()> {
    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Invalid bind address")?;

    if routes.is_empty() {
        warn!("No routes declared; every request will get the index page");
    }
    for prefix in routes.prefixes() {
        info!("  - {}", prefix);
    }

    let app = router(AppState::new(routes, &config.upstream_host));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    info!("Listening on: http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Gateway shut down gracefully");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
