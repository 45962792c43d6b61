//! Shared state for the endpoint pipelines.

use std::sync::Arc;

use oidcd_core::ServerConfig;

use crate::client::ClientValidator;
use crate::provider::ServerProvider;
use crate::token::TokenManager;

/// Everything an endpoint pipeline needs, assembled once at startup and
/// shared read-only across concurrent requests.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Extensibility hooks.
    pub provider: Arc<dyn ServerProvider>,

    /// Token lifecycle manager.
    pub tokens: Arc<TokenManager>,

    /// Client registry interface.
    pub clients: Arc<dyn ClientValidator>,
}

impl ServerState {
    /// Creates the endpoint state.
    #[must_use]
    pub fn new(
        config: Arc<ServerConfig>,
        tokens: Arc<TokenManager>,
        clients: Arc<dyn ClientValidator>,
        provider: Arc<dyn ServerProvider>,
    ) -> Self {
        Self {
            config,
            provider,
            tokens,
            clients,
        }
    }
}
