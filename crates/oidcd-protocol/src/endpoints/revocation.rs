//! Token revocation endpoint (RFC 7009).
//!
//! Invalid, expired or foreign tokens are answered with the same empty
//! 200 response as successful revocations, so the endpoint cannot be
//! used to scan for live tokens.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::Method;
use axum::response::{IntoResponse, Response};

use oidcd_model::TokenKind;

use crate::client::extract_credentials;
use crate::error::ProtocolError;
use crate::provider::{Disposition, ValidateOutcome};
use crate::request::RevocationRequest;
use crate::response::ProtocolResponse;
use crate::token::Caller;

use super::{Outcome, ServerState, Transaction};

/// Revocation handles access and refresh tokens only.
const FALLBACK_KINDS: [TokenKind; 2] = [TokenKind::AccessToken, TokenKind::RefreshToken];

/// Axum adapter for the revocation pipeline.
pub async fn revoke(State(state): State<ServerState>, request: Request<Body>) -> Response {
    let transaction = Transaction::from_request(request).await;
    process_revocation(&state, &transaction).await.into_response()
}

/// Runs the revocation pipeline.
pub async fn process_revocation(state: &ServerState, transaction: &Transaction) -> Outcome {
    // Extract.
    match state.provider.extract_revocation_request(transaction).await {
        Disposition::Continue => {}
        Disposition::Reject(rejection) => return Outcome::rejection(rejection, "invalid_request"),
        Disposition::HandleResponse(body) => return Outcome::ok(body),
        Disposition::SkipToNextMiddleware => return Outcome::Passthrough,
    }

    if transaction.method != Method::GET && transaction.method != Method::POST {
        return Outcome::error(&ProtocolError::InvalidRequest(
            "A malformed revocation request has been received: \
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

    let request = RevocationRequest::from_transaction(transaction, credentials);

    // Validate.
    let validated = match state.provider.validate_revocation_request(&request).await {
        ValidateOutcome::Continue => false,
        ValidateOutcome::Validated => true,
        ValidateOutcome::Reject(rejection) => return Outcome::rejection(rejection, "invalid_request"),
        ValidateOutcome::HandleResponse(body) => return Outcome::ok(body),
        ValidateOutcome::SkipToNextMiddleware => return Outcome::Passthrough,
    };

    let Some(token) = request.token.as_deref().filter(|token| !token.is_empty()) else {
        return Outcome::error(&ProtocolError::InvalidRequest(
            "A malformed revocation request has been received: a 'token' parameter \
             with an access or refresh token is required."
                .to_string(),
        ));
    };

    let caller = if validated {
        match request.client_id.clone() {
            Some(client_id) => Caller::authenticated(client_id),
            None => {
                tracing::error!("the revocation request was marked validated without a client_id");
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

    // Handle. A token that fails to resolve or fails the validation
    // policy is silently ignored: revocation is idempotent.
    let Some((kind, ticket)) = state
        .tokens
        .resolve(token, request.hint(), &FALLBACK_KINDS)
        .await
    else {
        return finish(state, ProtocolResponse::new()).await;
    };

    if !state.tokens.validate_presented(&ticket, kind, &caller) {
        return finish(state, ProtocolResponse::new()).await;
    }

    match state
        .provider
        .handle_revocation_request(&request, &ticket)
        .await
    {
        Disposition::Continue => {}
        Disposition::Reject(rejection) => return Outcome::rejection(rejection, "invalid_request"),
        Disposition::HandleResponse(body) => return Outcome::ok(body),
        Disposition::SkipToNextMiddleware => return Outcome::Passthrough,
    }

    // Token stores live outside this engine; the hook above is where
    // hosts drop the ticket id from their revocation lists.
    tracing::info!(
        kind = %kind,
        ticket_id = ticket.ticket_id().unwrap_or_default(),
        "token revoked"
    );

    finish(state, ProtocolResponse::new()).await
}

async fn finish(state: &ServerState, mut response: ProtocolResponse) -> Outcome {
    // Apply.
    match state.provider.apply_revocation_response(&mut response).await {
        Disposition::Continue => Outcome::ok(response),
        Disposition::Reject(rejection) => Outcome::rejection(rejection, "invalid_request"),
        Disposition::HandleResponse(body) => Outcome::ok(body),
        Disposition::SkipToNextMiddleware => Outcome::Passthrough,
    }
}
