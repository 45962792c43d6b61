//! Token lifecycle manager.
//!
//! Mints tickets into opaque tokens, unprotects inbound tokens, and
//! applies the presentation validation policy. Every rejection the
//! policy produces collapses into the same observable outcome; the
//! internal reason is only traced, never echoed to the caller.

use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use oidcd_core::{Clock, ServerConfig};
use oidcd_model::{Ticket, TokenKind};

use crate::codec::CodecRegistry;
use crate::error::{ProtocolError, ProtocolResult};

/// The party presenting a token to the engine.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    /// Declared client identifier, if any.
    pub client_id: Option<String>,

    /// Whether the caller's client credentials were validated.
    pub validated: bool,
}

impl Caller {
    /// A caller that declared no identity.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            client_id: None,
            validated: false,
        }
    }

    /// A caller that declared a client identifier without authenticating.
    #[must_use]
    pub fn declared(client_id: Option<String>) -> Self {
        Self {
            client_id,
            validated: false,
        }
    }

    /// A caller whose client credentials were validated.
    #[must_use]
    pub fn authenticated(client_id: String) -> Self {
        Self {
            client_id: Some(client_id),
            validated: true,
        }
    }
}

/// A freshly minted token: the opaque string plus the stamped ticket it
/// serializes.
#[derive(Debug, Clone)]
pub struct MintedToken {
    /// The opaque token string.
    pub value: String,

    /// The ticket as serialized, with usage, expiry and ticket id
    /// stamped.
    pub ticket: Ticket,
}

/// Mints, unprotects and validates tokens.
pub struct TokenManager {
    config: Arc<ServerConfig>,
    codecs: CodecRegistry,
    clock: Arc<dyn Clock>,
}

impl TokenManager {
    /// Creates a token manager.
    #[must_use]
    pub fn new(config: Arc<ServerConfig>, codecs: CodecRegistry, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            codecs,
            clock,
        }
    }

    /// Returns the clock driving expiry decisions.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Returns the default lifetime for the given kind.
    #[must_use]
    pub fn default_lifetime(&self, kind: TokenKind) -> Duration {
        let seconds = match kind {
            TokenKind::AuthorizationCode => self.config.authorization_code_lifetime,
            TokenKind::AccessToken => self.config.access_token_lifetime,
            TokenKind::IdentityToken => self.config.identity_token_lifetime,
            TokenKind::RefreshToken => self.config.refresh_token_lifetime,
        };

        Duration::seconds(seconds)
    }

    /// Mints a ticket into an opaque token of the given kind.
    ///
    /// Access and identity tokens only carry claims tagged for their
    /// destination; authorization codes and refresh tokens are
    /// server-confidential envelopes and keep the full principal. The
    /// minted copy is stamped with `usage`, issuance and expiry instants
    /// and a ticket id (a fresh UUID when the ticket has none).
    ///
    /// The lifetime is resolved in order: explicit override, per-kind
    /// ticket property, per-kind server default.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ServerError`] if the codec fails to
    /// protect the ticket.
    pub async fn mint(
        &self,
        ticket: &Ticket,
        kind: TokenKind,
        lifetime: Option<Duration>,
    ) -> ProtocolResult<MintedToken> {
        let mut copy = match kind {
            TokenKind::AccessToken | TokenKind::IdentityToken => {
                ticket.filtered(&|claim| claim.has_destination(kind.as_str()))
            }
            TokenKind::AuthorizationCode | TokenKind::RefreshToken => {
                ticket.filtered(&|_| true)
            }
        };

        let now = self.clock.now();
        let lifetime = lifetime
            .or_else(|| ticket.token_lifetime(kind))
            .unwrap_or_else(|| self.default_lifetime(kind));

        copy.set_usage(kind);
        copy.properties.issued_at = Some(now);
        copy.properties.expires_at = Some(now + lifetime);

        if copy.ticket_id().is_none() {
            copy.set_ticket_id(&Uuid::new_v4().to_string());
        }

        let value = self.codecs.get(kind).protect(&copy).await.map_err(|error| {
            tracing::error!(kind = %kind, %error, "ticket serialization failed");
            ProtocolError::ServerError("An internal server error occurred.".to_string())
        })?;

        Ok(MintedToken { value, ticket: copy })
    }

    /// Unprotects an opaque token of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidToken`] for any codec failure;
    /// codec-internal details are traced, not propagated.
    pub async fn unprotect(&self, token: &str, kind: TokenKind) -> ProtocolResult<Ticket> {
        self.codecs.get(kind).unprotect(token).await.map_err(|error| {
            tracing::debug!(kind = %kind, %error, "token unprotection failed");
            ProtocolError::InvalidToken("the token is invalid".to_string())
        })
    }

    /// Unprotects a token by trying the hinted kind first, then the
    /// remaining kinds in the given order.
    ///
    /// Returns the kind that decoded the token alongside the ticket.
    pub async fn resolve(
        &self,
        token: &str,
        hint: Option<TokenKind>,
        kinds: &[TokenKind],
    ) -> Option<(TokenKind, Ticket)> {
        if let Some(hint) = hint {
            if kinds.contains(&hint) {
                if let Ok(ticket) = self.unprotect(token, hint).await {
                    return Some((hint, ticket));
                }
            }
        }

        for kind in kinds {
            if Some(*kind) == hint {
                continue;
            }
            if let Ok(ticket) = self.unprotect(token, *kind).await {
                return Some((*kind, ticket));
            }
        }

        None
    }

    /// Applies the presentation validation policy to an unprotected
    /// ticket.
    ///
    /// A ticket is usable only if it has not expired, its usage tag
    /// matches the kind it decoded as, confidential tickets are presented
    /// by an authenticated caller, and a caller declaring a client id
    /// appears among the ticket's presenters (or, for tickets with no
    /// declared presenters, among its audiences).
    ///
    /// Every rejection returns plain `false`: callers must not be able
    /// to distinguish "not found" from "not authorized".
    #[must_use]
    pub fn validate_presented(&self, ticket: &Ticket, kind: TokenKind, caller: &Caller) -> bool {
        if let Some(expires_at) = ticket.properties.expires_at {
            if expires_at < self.clock.now() {
                tracing::debug!(kind = %kind, "rejected presented token: expired");
                return false;
            }
        }

        if let Some(usage) = ticket.usage() {
            if !usage.eq_ignore_ascii_case(kind.as_str()) {
                tracing::debug!(kind = %kind, usage, "rejected presented token: usage mismatch");
                return false;
            }
        }

        if ticket.is_confidential() && !caller.validated {
            tracing::debug!(kind = %kind, "rejected presented token: confidential ticket, unauthenticated caller");
            return false;
        }

        if let Some(client_id) = caller.client_id.as_deref() {
            if ticket.has_presenters() {
                if !ticket.has_presenter(client_id) {
                    tracing::debug!(kind = %kind, client_id, "rejected presented token: caller is not a presenter");
                    return false;
                }
            } else if ticket.has_audiences() && !ticket.has_audience(client_id) {
                tracing::debug!(kind = %kind, client_id, "rejected presented token: caller is not an audience");
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonTicketCodec;
    use chrono::{TimeZone, Utc};
    use oidcd_core::{FixedClock, SystemClock};
    use oidcd_model::{Identity, Principal, Properties};

    fn manager() -> TokenManager {
        TokenManager::new(
            Arc::new(ServerConfig::default()),
            CodecRegistry::uniform(Arc::new(JsonTicketCodec)),
            Arc::new(SystemClock),
        )
    }

    fn manager_at(clock: FixedClock) -> TokenManager {
        TokenManager::new(
            Arc::new(ServerConfig::default()),
            CodecRegistry::uniform(Arc::new(JsonTicketCodec)),
            Arc::new(clock),
        )
    }

    fn ticket_with_claims() -> Ticket {
        let mut identity = Identity::new();
        identity
            .add_claim_with_destinations("sub", "bob", ["access_token", "id_token"])
            .unwrap();
        identity
            .add_claim_with_destinations("email", "bob@contoso.com", ["id_token"])
            .unwrap();
        identity.add_claim("untagged", "value").unwrap();

        Ticket::new(Principal::from_identity(identity), Properties::new(), "test")
    }

    #[tokio::test]
    async fn mint_and_unprotect_round_trip() {
        let manager = manager();
        let mut ticket = ticket_with_claims();
        ticket.set_audiences(["fabrikam"]).unwrap();

        let minted = manager
            .mint(&ticket, TokenKind::AccessToken, None)
            .await
            .unwrap();
        let restored = manager
            .unprotect(&minted.value, TokenKind::AccessToken)
            .await
            .unwrap();

        assert_eq!(restored, minted.ticket);
        assert!(restored.is_access_token());
        assert_eq!(restored.audiences(), vec!["fabrikam"]);
        assert!(restored.ticket_id().is_some());
        assert!(restored.properties.expires_at.is_some());
    }

    #[tokio::test]
    async fn mint_filters_access_token_claims_by_destination() {
        let manager = manager();
        let minted = manager
            .mint(&ticket_with_claims(), TokenKind::AccessToken, None)
            .await
            .unwrap();

        assert_eq!(minted.ticket.principal.claim_value("sub"), Some("bob"));
        assert_eq!(minted.ticket.principal.claim_value("email"), None);
        assert_eq!(minted.ticket.principal.claim_value("untagged"), None);
    }

    #[tokio::test]
    async fn mint_keeps_the_full_principal_on_refresh_tokens() {
        let manager = manager();
        let minted = manager
            .mint(&ticket_with_claims(), TokenKind::RefreshToken, None)
            .await
            .unwrap();

        assert_eq!(minted.ticket.principal.claims().count(), 3);
        assert!(minted.ticket.is_refresh_token());
    }

    #[tokio::test]
    async fn mint_prefers_the_ticket_lifetime_over_the_default() {
        let instant = Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap();
        let manager = manager_at(FixedClock::new(instant));

        let mut ticket = ticket_with_claims();
        ticket.set_access_token_lifetime(Some(Duration::seconds(60)));

        let minted = manager
            .mint(&ticket, TokenKind::AccessToken, None)
            .await
            .unwrap();

        assert_eq!(
            minted.ticket.properties.expires_at,
            Some(instant + Duration::seconds(60))
        );
    }

    #[tokio::test]
    async fn mint_preserves_an_existing_ticket_id() {
        let manager = manager();
        let mut ticket = ticket_with_claims();
        ticket.set_ticket_id("66B65AED-4033-4E9C-B975-A8CA7FB6FA79");

        let minted = manager
            .mint(&ticket, TokenKind::AccessToken, None)
            .await
            .unwrap();

        assert_eq!(
            minted.ticket.ticket_id(),
            Some("66B65AED-4033-4E9C-B975-A8CA7FB6FA79")
        );
    }

    #[tokio::test]
    async fn unprotect_maps_codec_failures_to_invalid_token() {
        let manager = manager();
        let result = manager.unprotect("SlAV32hkKG", TokenKind::AccessToken).await;

        assert!(matches!(result, Err(ProtocolError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn resolve_tries_the_hint_first_then_falls_back() {
        let manager = manager();
        let minted = manager
            .mint(&ticket_with_claims(), TokenKind::RefreshToken, None)
            .await
            .unwrap();

        let kinds = [
            TokenKind::AccessToken,
            TokenKind::AuthorizationCode,
            TokenKind::IdentityToken,
            TokenKind::RefreshToken,
        ];

        let (kind, _) = manager
            .resolve(&minted.value, Some(TokenKind::RefreshToken), &kinds)
            .await
            .unwrap();
        assert_eq!(kind, TokenKind::RefreshToken);

        // With a uniform codec and no hint the first kind wins, but the
        // usage check rejects the mismatch downstream.
        let (kind, ticket) = manager.resolve(&minted.value, None, &kinds).await.unwrap();
        assert_eq!(kind, TokenKind::AccessToken);
        assert!(!manager.validate_presented(&ticket, kind, &Caller::anonymous()));
    }

    #[test]
    fn validation_rejects_expired_tickets() {
        let instant = Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap();
        let manager = manager_at(FixedClock::new(instant));

        let mut ticket = ticket_with_claims();
        ticket.properties.expires_at = Some(instant - Duration::days(1));

        assert!(!manager.validate_presented(
            &ticket,
            TokenKind::RefreshToken,
            &Caller::anonymous()
        ));
    }

    #[test]
    fn validation_rejects_confidential_tickets_for_unauthenticated_callers() {
        let manager = manager();
        let mut ticket = ticket_with_claims();
        ticket.set_confidentiality_level(Some(oidcd_model::ConfidentialityLevel::Private));

        assert!(!manager.validate_presented(
            &ticket,
            TokenKind::RefreshToken,
            &Caller::anonymous()
        ));
        assert!(manager.validate_presented(
            &ticket,
            TokenKind::RefreshToken,
            &Caller::authenticated("contoso".to_string())
        ));
    }

    #[test]
    fn validation_prefers_presenters_over_audiences() {
        let manager = manager();
        let mut ticket = ticket_with_claims();
        ticket.set_audiences(["AdventureWorks"]).unwrap();
        ticket.set_presenters(["Contoso"]).unwrap();

        // Fabrikam is neither audience nor presenter.
        assert!(!manager.validate_presented(
            &ticket,
            TokenKind::AccessToken,
            &Caller::declared(Some("Fabrikam".to_string()))
        ));

        // An audience match is not enough once presenters are declared.
        assert!(!manager.validate_presented(
            &ticket,
            TokenKind::AccessToken,
            &Caller::declared(Some("AdventureWorks".to_string()))
        ));

        assert!(manager.validate_presented(
            &ticket,
            TokenKind::AccessToken,
            &Caller::declared(Some("Contoso".to_string()))
        ));
    }

    #[test]
    fn validation_falls_back_to_audiences_without_presenters() {
        let manager = manager();
        let mut ticket = ticket_with_claims();
        ticket.set_audiences(["Fabrikam"]).unwrap();

        assert!(manager.validate_presented(
            &ticket,
            TokenKind::AccessToken,
            &Caller::declared(Some("Fabrikam".to_string()))
        ));
        assert!(!manager.validate_presented(
            &ticket,
            TokenKind::AccessToken,
            &Caller::declared(Some("Contoso".to_string()))
        ));
    }

    #[test]
    fn validation_rejects_usage_mismatches() {
        let manager = manager();
        let mut ticket = ticket_with_claims();
        ticket.set_usage(TokenKind::AccessToken);

        assert!(!manager.validate_presented(
            &ticket,
            TokenKind::RefreshToken,
            &Caller::anonymous()
        ));
        assert!(manager.validate_presented(
            &ticket,
            TokenKind::AccessToken,
            &Caller::anonymous()
        ));
    }
}
