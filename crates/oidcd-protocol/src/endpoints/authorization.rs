//! Authorization endpoint (RFC 6749 Section 3.1).
//!
//! The engine owns request validation and code issuance; resource-owner
//! authentication belongs to the host. When no hook supplies an
//! authenticated ticket the pipeline hands the request back to the
//! hosting transport so a login UI can run, exactly like any other
//! pass-through.
//!
//! Errors discovered before the client and redirect URI are validated
//! are returned directly; later errors are delivered to the client via
//! redirect parameters, as the protocol requires.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use url::Url;

use oidcd_model::{property_names, Ticket, TokenKind};

use crate::error::ProtocolError;
use crate::provider::{AuthorizeOutcome, Disposition, Rejection, ValidateOutcome};
use crate::request::AuthorizationRequest;
use crate::response::{params, ProtocolResponse};

use super::{Outcome, ServerState, Transaction};

/// Axum adapter for the authorization pipeline.
pub async fn authorize(State(state): State<ServerState>, request: Request<Body>) -> Response {
    let transaction = Transaction::from_request(request).await;
    process_authorization(&state, &transaction)
        .await
        .into_response()
}

/// Runs the authorization pipeline.
pub async fn process_authorization(state: &ServerState, transaction: &Transaction) -> Outcome {
    // Extract.
    match state
        .provider
        .extract_authorization_request(transaction)
        .await
    {
        Disposition::Continue => {}
        Disposition::Reject(rejection) => return Outcome::rejection(rejection, "invalid_request"),
        Disposition::HandleResponse(body) => return Outcome::ok(body),
        Disposition::SkipToNextMiddleware => return Outcome::Passthrough,
    }

    if transaction.method != Method::GET && transaction.method != Method::POST {
        return Outcome::error(&ProtocolError::InvalidRequest(
            "A malformed authorization request has been received: \
             make sure to use either GET or POST."
                .to_string(),
        ));
    }

    let request = AuthorizationRequest::from_transaction(transaction);

    // Validate.
    let validated = match state
        .provider
        .validate_authorization_request(&request)
        .await
    {
        ValidateOutcome::Continue => false,
        ValidateOutcome::Validated => true,
        ValidateOutcome::Reject(rejection) => return Outcome::rejection(rejection, "invalid_request"),
        ValidateOutcome::HandleResponse(body) => return Outcome::ok(body),
        ValidateOutcome::SkipToNextMiddleware => return Outcome::Passthrough,
    };

    let Some(client_id) = request.client_id.as_deref().filter(|value| !value.is_empty())
    else {
        if validated {
            tracing::error!(
                "the authorization request was marked validated without a client_id"
            );
            return Outcome::error(&ProtocolError::ServerError(
                "An internal server error occurred.".to_string(),
            ));
        }
        return Outcome::error(&ProtocolError::InvalidRequest(
            "A malformed authorization request has been received: \
             a 'client_id' parameter is required."
                .to_string(),
        ));
    };

    let Some(redirect_uri) = request.redirect_uri.as_deref().filter(|value| !value.is_empty())
    else {
        return Outcome::error(&ProtocolError::InvalidRequest(
            "A malformed authorization request has been received: \
             a 'redirect_uri' parameter is required."
                .to_string(),
        ));
    };

    if Url::parse(redirect_uri).is_err() {
        return Outcome::error(&ProtocolError::InvalidRequest(
            "the 'redirect_uri' parameter is malformed".to_string(),
        ));
    }

    if !validated {
        match state.clients.validate_client(client_id, None).await {
            Ok(true) => {}
            Ok(false) => {
                return Outcome::error(&ProtocolError::InvalidClient(
                    "the specified client identifier is invalid".to_string(),
                ))
            }
            Err(error) => return Outcome::error(&error),
        }
    }

    // The client and redirect URI are now trusted: protocol errors from
    // here on travel back on the redirect URI.
    let Some(response_type) = request.response_type.as_deref().filter(|value| !value.is_empty())
    else {
        return redirect_error(
            redirect_uri,
            "invalid_request",
            Some(
                "A malformed authorization request has been received: \
                 a 'response_type' parameter is required.",
            ),
            None,
            request.state.as_deref(),
        );
    };

    if response_type != "code" {
        return redirect_error(
            redirect_uri,
            "unsupported_response_type",
            Some("the specified response type is not supported by this authorization server"),
            None,
            request.state.as_deref(),
        );
    }

    // Handle.
    match state
        .provider
        .handle_authorization_request(&request)
        .await
    {
        AuthorizeOutcome::Continue => Outcome::Passthrough,
        AuthorizeOutcome::Issue(ticket) => {
            issue_code(state, *ticket, &request, client_id, redirect_uri).await
        }
        AuthorizeOutcome::Reject(rejection) => {
            redirect_rejection(redirect_uri, rejection, request.state.as_deref())
        }
        AuthorizeOutcome::HandleResponse(body) => Outcome::ok(body),
        AuthorizeOutcome::SkipToNextMiddleware => Outcome::Passthrough,
    }
}

/// Mints an authorization code for an authenticated ticket and builds
/// the redirect response.
async fn issue_code(
    state: &ServerState,
    mut ticket: Ticket,
    request: &AuthorizationRequest,
    client_id: &str,
    redirect_uri: &str,
) -> Outcome {
    if ticket.set_presenters([client_id]).is_err() {
        return Outcome::error(&ProtocolError::InvalidRequest(
            "the 'client_id' parameter is malformed".to_string(),
        ));
    }

    ticket.set_property(property_names::REDIRECT_URI, Some(redirect_uri));

    if !ticket.has_scopes() {
        let scopes = request.scopes();
        if !scopes.is_empty() && ticket.set_scopes(scopes).is_err() {
            return redirect_error(
                redirect_uri,
                "invalid_request",
                Some("the 'scope' parameter is malformed"),
                None,
                request.state.as_deref(),
            );
        }
    }

    let code = match state
        .tokens
        .mint(&ticket, TokenKind::AuthorizationCode, None)
        .await
    {
        Ok(minted) => minted,
        Err(error) => return Outcome::error(&error),
    };

    let mut response = ProtocolResponse::new();
    response.set(params::CODE, code.value);
    if let Some(state_parameter) = &request.state {
        response.set(params::STATE, state_parameter.clone());
    }

    // Apply.
    match state
        .provider
        .apply_authorization_response(&mut response)
        .await
    {
        Disposition::Continue => redirect_with(redirect_uri, &response),
        Disposition::Reject(rejection) => {
            redirect_rejection(redirect_uri, rejection, request.state.as_deref())
        }
        Disposition::HandleResponse(body) => Outcome::ok(body),
        Disposition::SkipToNextMiddleware => Outcome::Passthrough,
    }
}

/// Appends the response parameters to the redirect URI query.
fn redirect_with(redirect_uri: &str, response: &ProtocolResponse) -> Outcome {
    let Ok(mut url) = Url::parse(redirect_uri) else {
        return Outcome::error(&ProtocolError::InvalidRequest(
            "the 'redirect_uri' parameter is malformed".to_string(),
        ));
    };

    {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in response.iter() {
            match value {
                Value::String(value) => pairs.append_pair(name, value),
                other => pairs.append_pair(name, &other.to_string()),
            };
        }
    }

    Outcome::Redirect(url.to_string())
}

fn redirect_rejection(
    redirect_uri: &str,
    rejection: Rejection,
    state_parameter: Option<&str>,
) -> Outcome {
    let code = rejection.error.unwrap_or_else(|| "invalid_request".to_string());
    redirect_error(
        redirect_uri,
        &code,
        rejection.description.as_deref(),
        rejection.uri.as_deref(),
        state_parameter,
    )
}

fn redirect_error(
    redirect_uri: &str,
    code: &str,
    description: Option<&str>,
    uri: Option<&str>,
    state_parameter: Option<&str>,
) -> Outcome {
    let mut response = ProtocolResponse::new();
    response.set(params::ERROR, code);
    if let Some(description) = description {
        response.set(params::ERROR_DESCRIPTION, description);
    }
    if let Some(uri) = uri {
        response.set(params::ERROR_URI, uri);
    }
    if let Some(state_parameter) = state_parameter {
        response.set(params::STATE, state_parameter);
    }

    redirect_with(redirect_uri, &response)
}
