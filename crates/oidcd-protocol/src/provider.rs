//! Extensibility hooks.
//!
//! Every endpoint runs the same Extract → Validate → Handle → Apply
//! stage sequence. Before each built-in step the pipeline consults a
//! [`ServerProvider`] hook, whose returned disposition either defers to
//! the built-in logic or ends the pipeline. Dispositions are explicit
//! tagged variants consumed by the pipeline driver; there are no mutable
//! control flags on shared context objects, so the transition table is
//! visible in one place per endpoint.

use async_trait::async_trait;

use oidcd_model::Ticket;

use crate::endpoints::Transaction;
use crate::request::{
    AuthorizationRequest, IntrospectionRequest, RevocationRequest, TokenRequest,
};
use crate::response::ProtocolResponse;
use crate::token::Caller;

/// An error response requested by a hook.
///
/// An absent error code falls back to `invalid_request`; description and
/// URI are emitted only when present.
#[derive(Debug, Clone, Default)]
pub struct Rejection {
    /// Error code.
    pub error: Option<String>,

    /// Error description.
    pub description: Option<String>,

    /// Error URI.
    pub uri: Option<String>,
}

impl Rejection {
    /// Creates a rejection.
    #[must_use]
    pub fn new(error: Option<&str>, description: Option<&str>, uri: Option<&str>) -> Self {
        Self {
            error: error.map(ToString::to_string),
            description: description.map(ToString::to_string),
            uri: uri.map(ToString::to_string),
        }
    }
}

/// Disposition returned by Extract, Handle and Apply stage hooks.
///
/// Once a hook returns anything other than `Continue`, no later stage
/// runs.
#[derive(Debug, Clone, Default)]
pub enum Disposition {
    /// Proceed with the built-in logic for this and later stages.
    #[default]
    Continue,

    /// Abort the request and emit a protocol error response immediately.
    Reject(Rejection),

    /// The hook has fully produced the response; send it as-is and skip
    /// everything else.
    HandleResponse(ProtocolResponse),

    /// Abandon this pipeline and hand control back to the hosting
    /// transport without emitting a response.
    SkipToNextMiddleware,
}

/// Disposition returned by Validate stage hooks.
#[derive(Debug, Clone, Default)]
pub enum ValidateOutcome {
    /// Defer to the built-in validation.
    #[default]
    Continue,

    /// The hook vouches for the caller: the request is treated as
    /// validated without consulting the client validator. The request
    /// must carry a client identifier; marking an anonymous request
    /// validated is a contract violation answered with `server_error`.
    Validated,

    /// Abort the request and emit a protocol error response immediately.
    Reject(Rejection),

    /// The hook has fully produced the response.
    HandleResponse(ProtocolResponse),

    /// Abandon this pipeline without emitting a response.
    SkipToNextMiddleware,
}

/// Disposition returned by the token endpoint Handle stage hook.
#[derive(Debug, Clone, Default)]
pub enum GrantOutcome {
    /// Defer to the built-in grant handlers.
    #[default]
    Continue,

    /// The hook authenticated the grant itself: issue tokens from this
    /// ticket, skipping the built-in grant handlers.
    Grant(Box<Ticket>),

    /// Abort the request and emit a protocol error response immediately.
    Reject(Rejection),

    /// The hook has fully produced the response.
    HandleResponse(ProtocolResponse),

    /// Abandon this pipeline without emitting a response.
    SkipToNextMiddleware,
}

/// Disposition returned by the authorization endpoint Handle stage hook.
#[derive(Debug, Clone, Default)]
pub enum AuthorizeOutcome {
    /// No authenticated principal is available; the pipeline hands the
    /// request back to the host (login UI, consent, ...).
    #[default]
    Continue,

    /// Issue an authorization response for this authenticated ticket.
    Issue(Box<Ticket>),

    /// Abort the request and emit a protocol error response immediately.
    Reject(Rejection),

    /// The hook has fully produced the response.
    HandleResponse(ProtocolResponse),

    /// Abandon this pipeline without emitting a response.
    SkipToNextMiddleware,
}

/// Extensibility hooks consulted by the endpoint pipelines.
///
/// Every hook defaults to `Continue`, so an empty implementation yields
/// the built-in protocol behavior. Hooks receive shared references: the
/// sanctioned ways to alter the outcome are the returned dispositions
/// and, in the Apply stage, the mutable response object.
#[async_trait]
pub trait ServerProvider: Send + Sync {
    /// Invoked before the authorization request is extracted.
    async fn extract_authorization_request(&self, _transaction: &Transaction) -> Disposition {
        Disposition::Continue
    }

    /// Invoked before the authorization request is validated.
    async fn validate_authorization_request(
        &self,
        _request: &AuthorizationRequest,
    ) -> ValidateOutcome {
        ValidateOutcome::Continue
    }

    /// Invoked to resolve the authenticated principal for an
    /// authorization request.
    async fn handle_authorization_request(
        &self,
        _request: &AuthorizationRequest,
    ) -> AuthorizeOutcome {
        AuthorizeOutcome::Continue
    }

    /// Invoked before the authorization response is serialized.
    async fn apply_authorization_response(&self, _response: &mut ProtocolResponse) -> Disposition {
        Disposition::Continue
    }

    /// Invoked before the token request is extracted.
    async fn extract_token_request(&self, _transaction: &Transaction) -> Disposition {
        Disposition::Continue
    }

    /// Invoked before the token request is validated.
    async fn validate_token_request(&self, _request: &TokenRequest) -> ValidateOutcome {
        ValidateOutcome::Continue
    }

    /// Invoked before the built-in grant handlers run.
    async fn handle_token_request(&self, _request: &TokenRequest, _caller: &Caller) -> GrantOutcome {
        GrantOutcome::Continue
    }

    /// Invoked before the token response is serialized.
    async fn apply_token_response(&self, _response: &mut ProtocolResponse) -> Disposition {
        Disposition::Continue
    }

    /// Invoked before the introspection request is extracted.
    async fn extract_introspection_request(&self, _transaction: &Transaction) -> Disposition {
        Disposition::Continue
    }

    /// Invoked before the introspection request is validated.
    async fn validate_introspection_request(
        &self,
        _request: &IntrospectionRequest,
    ) -> ValidateOutcome {
        ValidateOutcome::Continue
    }

    /// Invoked after a presented token passed the validation policy,
    /// before the introspection payload is composed.
    async fn handle_introspection_request(
        &self,
        _request: &IntrospectionRequest,
        _ticket: &Ticket,
    ) -> Disposition {
        Disposition::Continue
    }

    /// Invoked before the introspection response is serialized.
    async fn apply_introspection_response(&self, _response: &mut ProtocolResponse) -> Disposition {
        Disposition::Continue
    }

    /// Invoked before the revocation request is extracted.
    async fn extract_revocation_request(&self, _transaction: &Transaction) -> Disposition {
        Disposition::Continue
    }

    /// Invoked before the revocation request is validated.
    async fn validate_revocation_request(&self, _request: &RevocationRequest) -> ValidateOutcome {
        ValidateOutcome::Continue
    }

    /// Invoked after a presented token passed the validation policy;
    /// this is where hosts remove the token from their stores.
    async fn handle_revocation_request(
        &self,
        _request: &RevocationRequest,
        _ticket: &Ticket,
    ) -> Disposition {
        Disposition::Continue
    }

    /// Invoked before the revocation response is serialized.
    async fn apply_revocation_response(&self, _response: &mut ProtocolResponse) -> Disposition {
        Disposition::Continue
    }
}

/// Provider with every hook left at its default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultServerProvider;

impl ServerProvider for DefaultServerProvider {}
