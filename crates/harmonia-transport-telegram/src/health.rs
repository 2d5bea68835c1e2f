//! Liveness endpoint: `GET /` answers 200 with a fixed body.
//!
//! Hosting platforms poll it to decide whether the process is alive; it
//! carries no bot state.

use anyhow::Result;
use axum::{http::StatusCode, routing::get, Router};
use harmonia_core::persona::LIVENESS_BODY;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

async fn handle_liveness() -> (StatusCode, &'static str) {
    (StatusCode::OK, LIVENESS_BODY)
}

/// Build the liveness router (GET /).
pub fn router() -> Router {
    Router::new().route("/", get(handle_liveness))
}

/// Serve the liveness router on `addr` until `cancel` fires.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve_liveness(addr: SocketAddr, cancel: CancellationToken) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Liveness server listening on {}", listener.local_addr()?);

    axum::serve(listener, router())
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    info!("Liveness server stopped");
    Ok(())
}
