//! HTTP server lifecycle.

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::error::ServiceError;

/// Bind `addr` and serve the API until `shutdown_signal` resolves.
///
/// In-flight requests are allowed to finish before this returns.
pub async fn run_server_with_shutdown<F>(
    addr: SocketAddr,
    state: AppState,
    shutdown_signal: F,
) -> Result<(), ServiceError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    serve_listener(listener, state, shutdown_signal).await
}

/// Serve the API on an already bound listener.
pub async fn serve_listener<F>(
    listener: TcpListener,
    state: AppState,
    shutdown_signal: F,
) -> Result<(), ServiceError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    info!(
        addr = %local_addr,
        cluster_path = %state.config.cluster_path(),
        "HTTP server ready"
    );

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("HTTP server shutdown complete");
    Ok(())
}
