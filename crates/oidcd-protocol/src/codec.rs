//! Ticket codecs.
//!
//! A codec converts a ticket to and from an opaque token string. One
//! codec is registered per token kind; the protect/unprotect capability
//! (and whatever signing or encryption it applies) is supplied by the
//! host.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::sync::Arc;
use thiserror::Error;

use oidcd_model::{Ticket, TokenKind};

/// Errors raised by ticket codecs.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The opaque string is malformed, forged or otherwise undecodable.
    #[error("token decoding failed: {0}")]
    Decode(String),

    /// The ticket could not be serialized.
    #[error("token encoding failed: {0}")]
    Encode(String),
}

/// Converts tickets to and from opaque token strings.
///
/// Implementations must be pure with respect to the ticket: `unprotect`
/// returns an independent ticket and never aliases previously returned
/// data.
#[async_trait]
pub trait TicketCodec: Send + Sync {
    /// Serializes and protects a ticket into an opaque string.
    async fn protect(&self, ticket: &Ticket) -> Result<String, CodecError>;

    /// Unprotects and deserializes an opaque string back into a ticket.
    async fn unprotect(&self, token: &str) -> Result<Ticket, CodecError>;
}

/// Per-kind codec registry, built once at startup.
#[derive(Clone)]
pub struct CodecRegistry {
    authorization_code: Arc<dyn TicketCodec>,
    access_token: Arc<dyn TicketCodec>,
    identity_token: Arc<dyn TicketCodec>,
    refresh_token: Arc<dyn TicketCodec>,
}

impl CodecRegistry {
    /// Creates a registry using the same codec for every token kind.
    #[must_use]
    pub fn uniform(codec: Arc<dyn TicketCodec>) -> Self {
        Self {
            authorization_code: codec.clone(),
            access_token: codec.clone(),
            identity_token: codec.clone(),
            refresh_token: codec,
        }
    }

    /// Replaces the authorization code codec.
    #[must_use]
    pub fn with_authorization_code(mut self, codec: Arc<dyn TicketCodec>) -> Self {
        self.authorization_code = codec;
        self
    }

    /// Replaces the access token codec.
    #[must_use]
    pub fn with_access_token(mut self, codec: Arc<dyn TicketCodec>) -> Self {
        self.access_token = codec;
        self
    }

    /// Replaces the identity token codec.
    #[must_use]
    pub fn with_identity_token(mut self, codec: Arc<dyn TicketCodec>) -> Self {
        self.identity_token = codec;
        self
    }

    /// Replaces the refresh token codec.
    #[must_use]
    pub fn with_refresh_token(mut self, codec: Arc<dyn TicketCodec>) -> Self {
        self.refresh_token = codec;
        self
    }

    /// Returns the codec for the given kind.
    #[must_use]
    pub fn get(&self, kind: TokenKind) -> &Arc<dyn TicketCodec> {
        match kind {
            TokenKind::AuthorizationCode => &self.authorization_code,
            TokenKind::AccessToken => &self.access_token,
            TokenKind::IdentityToken => &self.identity_token,
            TokenKind::RefreshToken => &self.refresh_token,
        }
    }
}

/// JSON + URL-safe base64 codec.
///
/// This codec applies no cryptographic protection: anyone can decode and
/// forge its output. It exists for development setups and tests;
/// production hosts must register codecs backed by a real data
/// protector.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTicketCodec;

#[async_trait]
impl TicketCodec for JsonTicketCodec {
    async fn protect(&self, ticket: &Ticket) -> Result<String, CodecError> {
        let payload =
            serde_json::to_vec(ticket).map_err(|error| CodecError::Encode(error.to_string()))?;

        Ok(URL_SAFE_NO_PAD.encode(payload))
    }

    async fn unprotect(&self, token: &str) -> Result<Ticket, CodecError> {
        let payload = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|error| CodecError::Decode(error.to_string()))?;

        serde_json::from_slice(&payload).map_err(|error| CodecError::Decode(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oidcd_model::{Identity, Principal, Properties};

    #[tokio::test]
    async fn json_codec_round_trips_tickets() {
        let mut identity = Identity::new();
        identity
            .add_claim_with_destinations("sub", "bob", ["access_token"])
            .unwrap();

        let mut ticket = Ticket::new(
            Principal::from_identity(identity),
            Properties::new(),
            "test",
        );
        ticket.set_audiences(["fabrikam"]).unwrap();
        ticket.set_ticket_id("42");

        let codec = JsonTicketCodec;
        let token = codec.protect(&ticket).await.unwrap();
        let restored = codec.unprotect(&token).await.unwrap();

        assert_eq!(restored, ticket);
    }

    #[tokio::test]
    async fn json_codec_rejects_garbage() {
        let codec = JsonTicketCodec;
        assert!(codec.unprotect("not a token").await.is_err());
        assert!(codec.unprotect("bm90IGpzb24").await.is_err());
    }

    #[test]
    fn registry_routes_by_kind() {
        let registry = CodecRegistry::uniform(Arc::new(JsonTicketCodec))
            .with_refresh_token(Arc::new(JsonTicketCodec));

        let _ = registry.get(TokenKind::AccessToken);
        let _ = registry.get(TokenKind::RefreshToken);
    }
}
