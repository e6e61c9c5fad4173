//! HTTP front-end for the sparring chat service.
//!
//! Wires [`config::ServerConfig`] into a shared [`coordination::ResponseGenerator`]
//! and serves the [`routes::router`] until Ctrl-C.

pub mod config;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use coordination::ResponseGenerator;

pub use config::ServerConfig;
pub use routes::{router, AppState};

/// Build the generator described by `config`: live when a key is present,
/// mock otherwise.
pub fn build_generator(config: &ServerConfig) -> Result<Arc<ResponseGenerator>> {
    Ok(Arc::new(ResponseGenerator::from_config(&config.anthropic())?))
}

/// Bind `0.0.0.0:{port}` and serve until the process receives Ctrl-C.
pub async fn serve(config: &ServerConfig) -> Result<()> {
    let state = AppState::new(build_generator(config)?);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        chat = %format!("http://localhost:{}/chat", config.port),
        health = %format!("http://localhost:{}/health", config.port),
        "API server running"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down");
        })
        .await
        .context("server error")
}
