//! Protocol error types.
//!
//! Implements the OAuth 2.0 error responses defined by RFC 6749 and the
//! introspection/revocation profiles (RFC 7662, RFC 7009).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

/// Protocol errors surfaced to client applications.
///
/// Validation-policy failures (expired, wrong presenter, confidential)
/// are deliberately *not* represented here: they collapse into a boolean
/// outcome before reaching the response layer.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Malformed request, missing required parameter or wrong HTTP verb.
    #[error("invalid_request: {0}")]
    InvalidRequest(String),

    /// Client authentication failed.
    #[error("invalid_client: {0}")]
    InvalidClient(String),

    /// Invalid or expired authorization grant.
    #[error("invalid_grant: {0}")]
    InvalidGrant(String),

    /// Client is not authorized for the requested operation.
    #[error("unauthorized_client: {0}")]
    UnauthorizedClient(String),

    /// Unsupported grant type.
    #[error("unsupported_grant_type: {0}")]
    UnsupportedGrantType(String),

    /// Unsupported response type.
    #[error("unsupported_response_type: {0}")]
    UnsupportedResponseType(String),

    /// The presented token is absent, expired, forged or not owned by
    /// the caller.
    #[error("invalid_token: {0}")]
    InvalidToken(String),

    /// Extension contract violation or internal failure.
    #[error("server_error: {0}")]
    ServerError(String),
}

impl ProtocolError {
    /// Returns the OAuth 2.0 error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidClient(_) => "invalid_client",
            Self::InvalidGrant(_) => "invalid_grant",
            Self::UnauthorizedClient(_) => "unauthorized_client",
            Self::UnsupportedGrantType(_) => "unsupported_grant_type",
            Self::UnsupportedResponseType(_) => "unsupported_response_type",
            Self::InvalidToken(_) => "invalid_token",
            Self::ServerError(_) => "server_error",
        }
    }

    /// Returns the human-readable description, without the code prefix.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::InvalidRequest(description)
            | Self::InvalidClient(description)
            | Self::InvalidGrant(description)
            | Self::UnauthorizedClient(description)
            | Self::UnsupportedGrantType(description)
            | Self::UnsupportedResponseType(description)
            | Self::InvalidToken(description)
            | Self::ServerError(description) => description,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRequest(_)
            | Self::InvalidGrant(_)
            | Self::UnsupportedGrantType(_)
            | Self::UnsupportedResponseType(_) => 400,
            Self::InvalidClient(_) | Self::InvalidToken(_) => 401,
            Self::UnauthorizedClient(_) => 403,
            Self::ServerError(_) => 500,
        }
    }

    /// Creates the wire-level error response.
    #[must_use]
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.error_code().to_string(),
            error_description: Some(self.description().to_string()),
            error_uri: None,
        }
    }
}

/// Returns the HTTP status for an OAuth error code string.
///
/// Unknown (extension-supplied) codes map to 400.
#[must_use]
pub fn status_for_error_code(code: &str) -> u16 {
    match code {
        "invalid_client" | "invalid_token" => 401,
        "unauthorized_client" => 403,
        "server_error" => 500,
        _ => 400,
    }
}

/// OAuth 2.0 error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub error: String,

    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,

    /// URI with more information about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_uri: Option<String>,
}
