//! Token introspection endpoint (RFC 7662).
//!
//! Runs the Extract → Validate → Handle → Apply pipeline over an
//! introspection transaction. Every validation-policy failure produces
//! the same `active: false` payload so callers cannot probe for the
//! existence of tokens they do not own.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use oidcd_model::{claims, Ticket, TokenKind};

use crate::client::extract_credentials;
use crate::error::ProtocolError;
use crate::provider::{Disposition, ValidateOutcome};
use crate::request::IntrospectionRequest;
use crate::response::{params, ProtocolResponse};
use crate::token::Caller;

use super::{Outcome, ServerState, Transaction};

/// Unprotect order when the hint is absent or unusable.
const FALLBACK_KINDS: [TokenKind; 4] = [
    TokenKind::AccessToken,
    TokenKind::AuthorizationCode,
    TokenKind::IdentityToken,
    TokenKind::RefreshToken,
];

/// Response parameters reserved for the basic claim set; principal
/// claims with these types are never disclosed as custom parameters.
const BASIC_PARAMS: [&str; 10] = [
    params::ACTIVE,
    params::SUB,
    params::ISS,
    params::IAT,
    params::NBF,
    params::EXP,
    params::TOKEN_TYPE,
    params::JTI,
    params::AUD,
    params::SCOPE,
];

/// Axum adapter for the introspection pipeline.
pub async fn introspect(State(state): State<ServerState>, request: Request<Body>) -> Response {
    let transaction = Transaction::from_request(request).await;
    process_introspection(&state, &transaction)
        .await
        .into_response()
}

/// Runs the introspection pipeline.
pub async fn process_introspection(state: &ServerState, transaction: &Transaction) -> Outcome {
    // Extract.
    match state
        .provider
        .extract_introspection_request(transaction)
        .await
    {
        Disposition::Continue => {}
        Disposition::Reject(rejection) => return Outcome::rejection(rejection, "invalid_request"),
        Disposition::HandleResponse(body) => return Outcome::ok(body),
        Disposition::SkipToNextMiddleware => return Outcome::Passthrough,
    }

    if transaction.method != Method::GET && transaction.method != Method::POST {
        return Outcome::error(&ProtocolError::InvalidRequest(
            "A malformed introspection request has been received: \
             make sure to use either GET or POST."
                .to_string(),
        ));
    }

    let credentials = match extract_credentials(
        transaction.authorization.as_deref(),
        transaction.param("client_id"),
        transaction.param("client_secret"),
    ) {
        Ok(credentials) => credentials,
        Err(error) => return Outcome::error(&error),
    };

    let request = IntrospectionRequest::from_transaction(transaction, credentials);

    // Validate.
    let validated = match state
        .provider
        .validate_introspection_request(&request)
        .await
    {
        ValidateOutcome::Continue => false,
        ValidateOutcome::Validated => true,
        ValidateOutcome::Reject(rejection) => return Outcome::rejection(rejection, "invalid_request"),
        ValidateOutcome::HandleResponse(body) => return Outcome::ok(body),
        ValidateOutcome::SkipToNextMiddleware => return Outcome::Passthrough,
    };

    let Some(token) = request.token.as_deref().filter(|token| !token.is_empty()) else {
        return Outcome::error(&ProtocolError::InvalidRequest(
            "A malformed introspection request has been received: a 'token' parameter \
             with an access, refresh, or identity token is required."
                .to_string(),
        ));
    };

    let caller = if validated {
        match request.client_id.clone() {
            Some(client_id) => Caller::authenticated(client_id),
            // The hook vouched for a request carrying no client identity.
            None => {
                tracing::error!(
                    "the introspection request was marked validated without a client_id"
                );
                return Outcome::error(&ProtocolError::ServerError(
                    "An internal server error occurred.".to_string(),
                ));
            }
        }
    } else if let (Some(client_id), Some(client_secret)) =
        (request.client_id.as_deref(), request.client_secret.as_deref())
    {
        match state
            .clients
            .validate_client(client_id, Some(client_secret))
            .await
        {
            Ok(true) => Caller::authenticated(client_id.to_string()),
            Ok(false) => {
                return Outcome::error(&ProtocolError::InvalidClient(
                    "the client credentials are invalid".to_string(),
                ))
            }
            Err(error) => return Outcome::error(&error),
        }
    } else {
        Caller::declared(request.client_id.clone())
    };

    // Handle: resolve the token, apply the validation policy.
    let Some((kind, ticket)) = state
        .tokens
        .resolve(token, request.hint(), &FALLBACK_KINDS)
        .await
    else {
        return inactive(state).await;
    };

    if !state.tokens.validate_presented(&ticket, kind, &caller) {
        return inactive(state).await;
    }

    match state
        .provider
        .handle_introspection_request(&request, &ticket)
        .await
    {
        Disposition::Continue => {}
        Disposition::Reject(rejection) => return Outcome::rejection(rejection, "invalid_request"),
        Disposition::HandleResponse(body) => return Outcome::ok(body),
        Disposition::SkipToNextMiddleware => return Outcome::Passthrough,
    }

    let mut response = ProtocolResponse::new();
    response.set(params::ACTIVE, true);

    if let Some(ticket_id) = ticket.ticket_id() {
        response.set(params::JTI, ticket_id);
    }

    let token_type = if kind == TokenKind::AccessToken {
        "Bearer"
    } else {
        kind.as_str()
    };
    response.set(params::TOKEN_TYPE, token_type);
    response.set(params::ISS, state.config.issuer.clone());

    if let Some(subject) = ticket.principal.claim_value(claims::SUB) {
        response.set(params::SUB, subject);
    }

    if let Some(issued_at) = ticket.properties.issued_at {
        response.set(params::IAT, issued_at.timestamp());
        response.set(params::NBF, issued_at.timestamp());
    }

    if let Some(expires_at) = ticket.properties.expires_at {
        response.set(params::EXP, expires_at.timestamp());
    }

    let audiences = ticket.audiences();
    if !audiences.is_empty() {
        response.set(
            params::AUD,
            Value::Array(audiences.into_iter().map(Value::String).collect()),
        );
    }

    // Non-basic claims are disclosed only to callers the ticket already
    // trusts: authenticated clients and declared audiences/presenters.
    if is_trusted_caller(&ticket, &caller) {
        let scopes = ticket.scopes();
        if !scopes.is_empty() {
            response.set(params::SCOPE, scopes.join(" "));
        }

        disclose_claims(&ticket, &mut response);
    }

    finish(state, response).await
}

fn is_trusted_caller(ticket: &Ticket, caller: &Caller) -> bool {
    if caller.validated {
        return true;
    }

    caller
        .client_id
        .as_deref()
        .is_some_and(|client_id| ticket.has_presenter(client_id) || ticket.has_audience(client_id))
}

fn disclose_claims(ticket: &Ticket, response: &mut ProtocolResponse) {
    let mut grouped: Vec<(String, Vec<Value>)> = Vec::new();
    for claim in ticket.principal.claims() {
        if BASIC_PARAMS.contains(&claim.claim_type.as_str()) {
            continue;
        }

        match grouped
            .iter_mut()
            .find(|(claim_type, _)| *claim_type == claim.claim_type)
        {
            Some((_, values)) => values.push(Value::String(claim.value.clone())),
            None => grouped.push((
                claim.claim_type.clone(),
                vec![Value::String(claim.value.clone())],
            )),
        }
    }

    for (claim_type, mut values) in grouped {
        if values.len() == 1 {
            // Single-valued claims serialize as scalars.
            if let Some(value) = values.pop() {
                response.set(&claim_type, value);
            }
        } else {
            response.set(&claim_type, Value::Array(values));
        }
    }
}

async fn inactive(state: &ServerState) -> Outcome {
    let mut response = ProtocolResponse::new();
    response.set(params::ACTIVE, false);
    finish(state, response).await
}

async fn finish(state: &ServerState, mut response: ProtocolResponse) -> Outcome {
    // Apply.
    match state
        .provider
        .apply_introspection_response(&mut response)
        .await
    {
        Disposition::Continue => Outcome::ok(response),
        Disposition::Reject(rejection) => Outcome::rejection(rejection, "invalid_request"),
        Disposition::HandleResponse(body) => Outcome::ok(body),
        Disposition::SkipToNextMiddleware => Outcome::Passthrough,
    }
}
