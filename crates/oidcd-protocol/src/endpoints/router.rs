//! Protocol router configuration.
//!
//! Wires the four endpoint pipelines into an axum router using the
//! paths from the server configuration. Routes accept any HTTP method:
//! verb policy is enforced inside the pipelines so that unexpected
//! methods produce protocol errors instead of bare 405 responses.

use axum::routing::any;
use axum::Router;

use oidcd_core::ServerConfig;

use super::authorization::authorize;
use super::introspection::introspect;
use super::revocation::revoke;
use super::state::ServerState;
use super::token::token;

/// Creates the protocol router.
///
/// | Path (default)         | Pipeline      |
/// |------------------------|---------------|
/// | `/connect/authorize`   | authorization |
/// | `/connect/token`       | token         |
/// | `/connect/introspect`  | introspection |
/// | `/connect/revoke`      | revocation    |
pub fn protocol_router(config: &ServerConfig) -> Router<ServerState> {
    Router::new()
        .route(&config.authorization_endpoint_path, any(authorize))
        .route(&config.token_endpoint_path, any(token))
        .route(&config.introspection_endpoint_path, any(introspect))
        .route(&config.revocation_endpoint_path, any(revoke))
}
