//! Common model types and reserved names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four token kinds minted and consumed by the engine.
///
/// Each kind has its own codec slot and its own default lifetime; the
/// string form doubles as the ticket `usage` tag and as the claim
/// destination name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// Authorization code (RFC 6749 Section 1.3.1).
    #[serde(rename = "authorization_code")]
    AuthorizationCode,

    /// Access token (RFC 6749 Section 1.4).
    #[serde(rename = "access_token")]
    AccessToken,

    /// Identity token (OpenID Connect Core 1.0).
    #[serde(rename = "id_token")]
    IdentityToken,

    /// Refresh token (RFC 6749 Section 1.5).
    #[serde(rename = "refresh_token")]
    RefreshToken,
}

impl TokenKind {
    /// Returns the wire string for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::AccessToken => "access_token",
            Self::IdentityToken => "id_token",
            Self::RefreshToken => "refresh_token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "authorization_code" => Ok(Self::AuthorizationCode),
            "access_token" => Ok(Self::AccessToken),
            "id_token" => Ok(Self::IdentityToken),
            "refresh_token" => Ok(Self::RefreshToken),
            _ => Err(format!("unknown token kind: {s}")),
        }
    }
}

/// Confidentiality level of a ticket.
///
/// A ticket is confidential iff it is explicitly marked private; any
/// other stored value, garbage included, reads as public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ConfidentialityLevel {
    /// Anyone may introspect or revoke the token.
    #[serde(rename = "public")]
    #[default]
    Public,

    /// Only the original presenter may introspect or revoke the token.
    #[serde(rename = "private")]
    Private,
}

impl ConfidentialityLevel {
    /// Returns the wire string for this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for ConfidentialityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reserved ticket property names.
///
/// These keys share the properties bag with arbitrary custom entries;
/// the accessors on [`crate::Ticket`] interpret them.
pub mod properties {
    /// Space-separated audiences list.
    pub const AUDIENCES: &str = "audiences";
    /// Space-separated presenters list.
    pub const PRESENTERS: &str = "presenters";
    /// Space-separated resources list.
    pub const RESOURCES: &str = "resources";
    /// Space-separated scopes list.
    pub const SCOPES: &str = "scopes";
    /// Token usage tag (one of the [`super::TokenKind`] strings).
    pub const USAGE: &str = "usage";
    /// Unique ticket identifier.
    pub const TICKET_ID: &str = "ticket_id";
    /// Confidentiality level (`public` or `private`).
    pub const CONFIDENTIALITY_LEVEL: &str = "confidentiality_level";
    /// Authorization code lifetime override, in whole seconds.
    pub const AUTHORIZATION_CODE_LIFETIME: &str = "authorization_code_lifetime";
    /// Access token lifetime override, in whole seconds.
    pub const ACCESS_TOKEN_LIFETIME: &str = "access_token_lifetime";
    /// Identity token lifetime override, in whole seconds.
    pub const IDENTITY_TOKEN_LIFETIME: &str = "identity_token_lifetime";
    /// Refresh token lifetime override, in whole seconds.
    pub const REFRESH_TOKEN_LIFETIME: &str = "refresh_token_lifetime";
    /// Redirect URI the authorization code was bound to.
    pub const REDIRECT_URI: &str = "redirect_uri";
    /// Space-separated claim destinations (claim-level property).
    pub const DESTINATIONS: &str = "destinations";
}

/// Standard claim type names used by the engine.
pub mod claims {
    /// Subject identifier.
    pub const SUB: &str = "sub";
    /// Full name.
    pub const NAME: &str = "name";
    /// Email address.
    pub const EMAIL: &str = "email";
}
