//! HTTP surface over the query planner
//!
//! Thin adapter: parses query strings, maps legacy parameter names and
//! routes, and turns planner errors into status codes.

mod handlers;
mod router;
pub mod types;

pub use handlers::ApiError;
pub use router::{AppState, create_router};

use axum::Router;
use eyre::{Context, Result};
use tracing::{info, warn};

/// Bind `addr` and serve `app` until Ctrl-C
pub async fn serve(app: Router, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind {}", addr))?;
    info!("HTTP API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to install Ctrl-C handler");
                std::future::pending::<()>().await;
            }
            info!("Received shutdown signal, gracefully shutting down");
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}
