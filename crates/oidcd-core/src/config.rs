//! Server configuration.
//!
//! A single immutable struct holding everything the request pipelines need
//! to know at startup: the issuer identity, where each protocol endpoint is
//! mounted, and the default lifetime of each token kind.

use serde::{Deserialize, Serialize};

/// Authorization-server configuration.
///
/// Built once at startup and shared read-only across all concurrent
/// requests; per-request state never lives here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Issuer URL reported in introspection responses (`iss`).
    pub issuer: String,

    /// Authentication scheme name stamped on every ticket.
    pub scheme: String,

    /// Path of the authorization endpoint.
    pub authorization_endpoint_path: String,

    /// Path of the token endpoint.
    pub token_endpoint_path: String,

    /// Path of the introspection endpoint.
    pub introspection_endpoint_path: String,

    /// Path of the revocation endpoint.
    pub revocation_endpoint_path: String,

    /// Default authorization code lifetime in seconds.
    pub authorization_code_lifetime: i64,

    /// Default access token lifetime in seconds.
    pub access_token_lifetime: i64,

    /// Default identity token lifetime in seconds.
    pub identity_token_lifetime: i64,

    /// Default refresh token lifetime in seconds.
    pub refresh_token_lifetime: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            issuer: "http://localhost:8080/".to_string(),
            scheme: "oidcd".to_string(),
            authorization_endpoint_path: "/connect/authorize".to_string(),
            token_endpoint_path: "/connect/token".to_string(),
            introspection_endpoint_path: "/connect/introspect".to_string(),
            revocation_endpoint_path: "/connect/revoke".to_string(),
            authorization_code_lifetime: 300,        // 5 minutes
            access_token_lifetime: 3_600,            // 1 hour
            identity_token_lifetime: 1_200,          // 20 minutes
            refresh_token_lifetime: 1_209_600,       // 14 days
        }
    }
}
