//! # oidcd-protocol
//!
//! The OAuth2/OpenID Connect protocol engine of the oidcd authorization
//! server: token lifecycle management and the endpoint request
//! pipelines.
//!
//! ## Modules
//!
//! - [`client`] - Client credential extraction and the validator seam
//! - [`codec`] - Ticket protect/unprotect codecs, one per token kind
//! - [`endpoints`] - The four endpoint pipelines and their axum adapters
//! - [`error`] - Protocol error taxonomy (RFC 6749 error responses)
//! - [`provider`] - Extensibility dispositions and the hook trait
//! - [`request`] - Typed protocol request objects
//! - [`response`] - The mutable response parameter map
//! - [`token`] - The token lifecycle manager
//!
//! ## Pipeline shape
//!
//! Every endpoint runs Extract → Validate → Handle → Apply. Each stage
//! consults a [`provider::ServerProvider`] hook that may defer to the
//! built-in logic, reject the request, substitute a complete response,
//! or abandon the pipeline; once a stage ends the pipeline, no later
//! stage runs.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod client;
pub mod codec;
pub mod endpoints;
pub mod error;
pub mod provider;
pub mod request;
pub mod response;
pub mod token;

pub use client::{extract_credentials, ClientCredentials, ClientValidator, StaticClientValidator};
pub use codec::{CodecError, CodecRegistry, JsonTicketCodec, TicketCodec};
pub use endpoints::authorization::process_authorization;
pub use endpoints::introspection::process_introspection;
pub use endpoints::revocation::process_revocation;
pub use endpoints::router::protocol_router;
pub use endpoints::token::process_token;
pub use endpoints::{Outcome, ServerState, Transaction};
pub use error::{status_for_error_code, ErrorResponse, ProtocolError, ProtocolResult};
pub use provider::{
    AuthorizeOutcome, DefaultServerProvider, Disposition, GrantOutcome, Rejection,
    ServerProvider, ValidateOutcome,
};
pub use request::{AuthorizationRequest, IntrospectionRequest, RevocationRequest, TokenRequest};
pub use response::{params, ProtocolResponse, TokenResponse};
pub use token::{Caller, MintedToken, TokenManager};
