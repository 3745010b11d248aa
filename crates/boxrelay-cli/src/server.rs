//! Server startup and lifecycle

use crate::{routes, AppState, GatewayConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Run the gateway until Ctrl-C
pub async fn run_server(config: GatewayConfig) -> anyhow::Result<()> {
    run_server_with_shutdown(config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Can't listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Run server with graceful shutdown
pub async fn run_server_with_shutdown(
    config: GatewayConfig,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(config.clone())?);
    let app = routes::create_router(state);

    let listener = TcpListener::bind(config.bind_addr()).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "boxrelay gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!(addr = %local_addr, "Gateway stopped");
    Ok(())
}
