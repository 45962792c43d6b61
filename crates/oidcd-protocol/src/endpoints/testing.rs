//! Shared fixtures for the endpoint pipeline tests.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use oidcd_core::{Clock, ServerConfig, SystemClock};
use oidcd_model::{Identity, Principal, Properties, Ticket};

use crate::client::{ClientValidator, StaticClientValidator};
use crate::codec::{CodecError, CodecRegistry, TicketCodec};
use crate::provider::{
    AuthorizeOutcome, Disposition, GrantOutcome, ServerProvider, ValidateOutcome,
};
use crate::request::{
    AuthorizationRequest, IntrospectionRequest, RevocationRequest, TokenRequest,
};
use crate::response::ProtocolResponse;
use crate::token::{Caller, TokenManager};

use super::{ServerState, Transaction};

/// Codec that fails to decode anything, like a real protector handed a
/// forged token.
pub(crate) struct FailingCodec;

#[async_trait]
impl TicketCodec for FailingCodec {
    async fn protect(&self, _ticket: &Ticket) -> Result<String, CodecError> {
        Err(CodecError::Encode("unsupported".to_string()))
    }

    async fn unprotect(&self, _token: &str) -> Result<Ticket, CodecError> {
        Err(CodecError::Decode("malformed".to_string()))
    }
}

/// Codec that unprotects every token into a fixed ticket, standing in
/// for the deserialization hooks of the pipeline tests.
pub(crate) struct StaticCodec {
    ticket: Ticket,
}

impl StaticCodec {
    pub(crate) fn returning(ticket: Ticket) -> Arc<Self> {
        Arc::new(Self { ticket })
    }
}

#[async_trait]
impl TicketCodec for StaticCodec {
    async fn protect(&self, _ticket: &Ticket) -> Result<String, CodecError> {
        Err(CodecError::Encode("static codec cannot protect".to_string()))
    }

    async fn unprotect(&self, _token: &str) -> Result<Ticket, CodecError> {
        Ok(self.ticket.clone())
    }
}

/// Provider whose hooks replay pre-configured dispositions.
#[derive(Default)]
pub(crate) struct HookProvider {
    pub extract_authorization: Option<Disposition>,
    pub validate_authorization: Option<ValidateOutcome>,
    pub handle_authorization: Option<AuthorizeOutcome>,
    pub apply_authorization: Option<Disposition>,
    pub extract_token: Option<Disposition>,
    pub validate_token: Option<ValidateOutcome>,
    pub handle_token: Option<GrantOutcome>,
    pub apply_token: Option<Disposition>,
    pub extract_introspection: Option<Disposition>,
    pub validate_introspection: Option<ValidateOutcome>,
    pub handle_introspection: Option<Disposition>,
    pub apply_introspection: Option<Disposition>,
    pub extract_revocation: Option<Disposition>,
    pub validate_revocation: Option<ValidateOutcome>,
    pub handle_revocation: Option<Disposition>,
    pub apply_revocation: Option<Disposition>,

    /// Extra parameter appended by the Apply hooks before continuing.
    pub apply_extra: Option<(String, Value)>,
}

impl HookProvider {
    fn apply(&self, stored: &Option<Disposition>, response: &mut ProtocolResponse) -> Disposition {
        if let Some((name, value)) = &self.apply_extra {
            response.set(name, value.clone());
        }
        stored.clone().unwrap_or_default()
    }
}

#[async_trait]
impl ServerProvider for HookProvider {
    async fn extract_authorization_request(&self, _transaction: &Transaction) -> Disposition {
        self.extract_authorization.clone().unwrap_or_default()
    }

    async fn validate_authorization_request(
        &self,
        _request: &AuthorizationRequest,
    ) -> ValidateOutcome {
        self.validate_authorization.clone().unwrap_or_default()
    }

    async fn handle_authorization_request(
        &self,
        _request: &AuthorizationRequest,
    ) -> AuthorizeOutcome {
        self.handle_authorization.clone().unwrap_or_default()
    }

    async fn apply_authorization_response(&self, response: &mut ProtocolResponse) -> Disposition {
        self.apply(&self.apply_authorization, response)
    }

    async fn extract_token_request(&self, _transaction: &Transaction) -> Disposition {
        self.extract_token.clone().unwrap_or_default()
    }

    async fn validate_token_request(&self, _request: &TokenRequest) -> ValidateOutcome {
        self.validate_token.clone().unwrap_or_default()
    }

    async fn handle_token_request(&self, _request: &TokenRequest, _caller: &Caller) -> GrantOutcome {
        self.handle_token.clone().unwrap_or_default()
    }

    async fn apply_token_response(&self, response: &mut ProtocolResponse) -> Disposition {
        self.apply(&self.apply_token, response)
    }

    async fn extract_introspection_request(&self, _transaction: &Transaction) -> Disposition {
        self.extract_introspection.clone().unwrap_or_default()
    }

    async fn validate_introspection_request(
        &self,
        _request: &IntrospectionRequest,
    ) -> ValidateOutcome {
        self.validate_introspection.clone().unwrap_or_default()
    }

    async fn handle_introspection_request(
        &self,
        _request: &IntrospectionRequest,
        _ticket: &Ticket,
    ) -> Disposition {
        self.handle_introspection.clone().unwrap_or_default()
    }

    async fn apply_introspection_response(&self, response: &mut ProtocolResponse) -> Disposition {
        self.apply(&self.apply_introspection, response)
    }

    async fn extract_revocation_request(&self, _transaction: &Transaction) -> Disposition {
        self.extract_revocation.clone().unwrap_or_default()
    }

    async fn validate_revocation_request(&self, _request: &RevocationRequest) -> ValidateOutcome {
        self.validate_revocation.clone().unwrap_or_default()
    }

    async fn handle_revocation_request(
        &self,
        _request: &RevocationRequest,
        _ticket: &Ticket,
    ) -> Disposition {
        self.handle_revocation.clone().unwrap_or_default()
    }

    async fn apply_revocation_response(&self, response: &mut ProtocolResponse) -> Disposition {
        self.apply(&self.apply_revocation, response)
    }
}

/// Assembles endpoint state from its parts.
pub(crate) fn state_with(
    provider: impl ServerProvider + 'static,
    registry: CodecRegistry,
    clock: Arc<dyn Clock>,
    clients: Arc<dyn ClientValidator>,
) -> ServerState {
    let config = Arc::new(ServerConfig::default());
    let tokens = Arc::new(TokenManager::new(config.clone(), registry, clock));
    ServerState::new(config, tokens, clients, Arc::new(provider))
}

/// State with failing codecs and an empty client registry; enough for
/// request-shape tests.
pub(crate) fn bare_state(provider: impl ServerProvider + 'static) -> ServerState {
    state_with(
        provider,
        CodecRegistry::uniform(Arc::new(FailingCodec)),
        Arc::new(SystemClock),
        Arc::new(StaticClientValidator::new()),
    )
}

/// An empty ticket in the default scheme.
pub(crate) fn empty_ticket() -> Ticket {
    Ticket::new(Principal::new(), Properties::new(), "oidcd")
}

/// A ticket whose single identity carries the given plain claims.
pub(crate) fn ticket_with_claims(claims: &[(&str, &str)]) -> Ticket {
    let mut identity = Identity::new();
    for (claim_type, value) in claims {
        identity
            .add_claim(*claim_type, *value)
            .expect("test claims are non-empty");
    }
    Ticket::new(Principal::from_identity(identity), Properties::new(), "oidcd")
}
