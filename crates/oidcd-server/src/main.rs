//! # oidcd development server
//!
//! Serves the protocol endpoints with the built-in JSON codec, an empty
//! client registry and default hooks. Intended for local experiments;
//! real deployments embed `oidcd-protocol` with their own codecs,
//! client validator and provider.

#![forbid(unsafe_code)]
#![deny(warnings)]

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oidcd_core::{ServerConfig, SystemClock};
use oidcd_protocol::{
    protocol_router, CodecRegistry, DefaultServerProvider, JsonTicketCodec, ServerState,
    StaticClientValidator, TokenManager,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(ServerConfig::default());
    tracing::warn!("using the unprotected JSON ticket codec; do not expose this server");

    let tokens = Arc::new(TokenManager::new(
        config.clone(),
        CodecRegistry::uniform(Arc::new(JsonTicketCodec)),
        Arc::new(SystemClock),
    ));

    let state = ServerState::new(
        config.clone(),
        tokens,
        Arc::new(StaticClientValidator::new()),
        Arc::new(DefaultServerProvider),
    );

    let app = protocol_router(&config).with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
    tracing::info!("oidcd listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to install the shutdown signal handler");
    }
}
