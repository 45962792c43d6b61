//! Token endpoint (RFC 6749 Section 3.2).
//!
//! Built-in grant handlers cover `authorization_code`, `refresh_token`
//! and `client_credentials`; the Handle stage hook can substitute a
//! ticket to implement extension grants.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::Method;
use axum::response::{IntoResponse, Response};

use oidcd_model::{
    claims, property_names, ConfidentialityLevel, Identity, Principal, Properties, Ticket,
    TokenKind,
};

use crate::client::extract_credentials;
use crate::error::{ProtocolError, ProtocolResult};
use crate::provider::{Disposition, GrantOutcome, ValidateOutcome};
use crate::request::TokenRequest;
use crate::response::{ProtocolResponse, TokenResponse};
use crate::token::Caller;

use super::{Outcome, ServerState, Transaction};

/// Axum adapter for the token pipeline.
pub async fn token(State(state): State<ServerState>, request: Request<Body>) -> Response {
    let transaction = Transaction::from_request(request).await;
    process_token(&state, &transaction).await.into_response()
}

/// Runs the token pipeline.
pub async fn process_token(state: &ServerState, transaction: &Transaction) -> Outcome {
    // Extract.
    match state.provider.extract_token_request(transaction).await {
        Disposition::Continue => {}
        Disposition::Reject(rejection) => return Outcome::rejection(rejection, "invalid_request"),
        Disposition::HandleResponse(body) => return Outcome::ok(body),
        Disposition::SkipToNextMiddleware => return Outcome::Passthrough,
    }

    if transaction.method != Method::POST {
        return Outcome::error(&ProtocolError::InvalidRequest(
            "A malformed token request has been received: make sure to use POST.".to_string(),
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

    let request = TokenRequest::from_transaction(transaction, credentials);

    // Validate.
    let validated = match state.provider.validate_token_request(&request).await {
        ValidateOutcome::Continue => false,
        ValidateOutcome::Validated => true,
        ValidateOutcome::Reject(rejection) => return Outcome::rejection(rejection, "invalid_request"),
        ValidateOutcome::HandleResponse(body) => return Outcome::ok(body),
        ValidateOutcome::SkipToNextMiddleware => return Outcome::Passthrough,
    };

    let Some(grant_type) = request.grant_type.as_deref().filter(|value| !value.is_empty())
    else {
        return Outcome::error(&ProtocolError::InvalidRequest(
            "A malformed token request has been received: a 'grant_type' parameter is required."
                .to_string(),
        ));
    };

    if grant_type == "authorization_code" && request.code.is_none() {
        return Outcome::error(&ProtocolError::InvalidRequest(
            "A malformed token request has been received: a 'code' parameter is required."
                .to_string(),
        ));
    }

    if grant_type == "refresh_token" && request.refresh_token.is_none() {
        return Outcome::error(&ProtocolError::InvalidRequest(
            "A malformed token request has been received: a 'refresh_token' parameter is required."
                .to_string(),
        ));
    }

    let caller = if validated {
        match request.client_id.clone() {
            Some(client_id) => Caller::authenticated(client_id),
            None => {
                tracing::error!("the token request was marked validated without a client_id");
                return Outcome::error(&ProtocolError::ServerError(
                    "An internal server error occurred.".to_string(),
                ));
            }
        }
    } else if let Some(client_id) = request.client_id.as_deref() {
        match state
            .clients
            .validate_client(client_id, request.client_secret.as_deref())
            .await
        {
            Ok(true) if request.client_secret.is_some() => {
                Caller::authenticated(client_id.to_string())
            }
            Ok(true) => Caller::declared(Some(client_id.to_string())),
            Ok(false) => {
                return Outcome::error(&ProtocolError::InvalidClient(
                    "the client credentials are invalid".to_string(),
                ))
            }
            Err(error) => return Outcome::error(&error),
        }
    } else {
        Caller::anonymous()
    };

    // Handle.
    match state.provider.handle_token_request(&request, &caller).await {
        GrantOutcome::Continue => {}
        GrantOutcome::Grant(ticket) => return issue(state, *ticket, &caller).await,
        GrantOutcome::Reject(rejection) => return Outcome::rejection(rejection, "invalid_request"),
        GrantOutcome::HandleResponse(body) => return Outcome::ok(body),
        GrantOutcome::SkipToNextMiddleware => return Outcome::Passthrough,
    }

    let ticket = match grant_type {
        "authorization_code" => exchange_authorization_code(state, &request, &caller).await,
        "refresh_token" => exchange_refresh_token(state, &request, &caller).await,
        "client_credentials" => grant_client_credentials(state, &request, &caller),
        _ => Err(ProtocolError::UnsupportedGrantType(
            "the specified grant type is not supported by this authorization server".to_string(),
        )),
    };

    match ticket {
        Ok(ticket) => issue(state, ticket, &caller).await,
        Err(error) => Outcome::error(&error),
    }
}

/// Exchanges an authorization code for its embedded ticket.
async fn exchange_authorization_code(
    state: &ServerState,
    request: &TokenRequest,
    caller: &Caller,
) -> ProtocolResult<Ticket> {
    let code = request.code.as_deref().unwrap_or_default();
    let ticket = state
        .tokens
        .unprotect(code, TokenKind::AuthorizationCode)
        .await
        .map_err(|_| {
            ProtocolError::InvalidGrant("the authorization code is invalid".to_string())
        })?;

    if let Some(usage) = ticket.usage() {
        if !usage.eq_ignore_ascii_case(TokenKind::AuthorizationCode.as_str()) {
            return Err(ProtocolError::InvalidGrant(
                "the presented token is not an authorization code".to_string(),
            ));
        }
    }

    if let Some(expires_at) = ticket.properties.expires_at {
        if expires_at < state.tokens.clock().now() {
            return Err(ProtocolError::InvalidGrant(
                "the authorization code is no longer valid".to_string(),
            ));
        }
    }

    if ticket.has_presenters() {
        let presenter = caller
            .client_id
            .as_deref()
            .filter(|client_id| ticket.has_presenter(client_id));
        if presenter.is_none() {
            return Err(ProtocolError::InvalidGrant(
                "the authorization code was issued to another client".to_string(),
            ));
        }
    }

    if let Some(bound) = ticket.get_property(property_names::REDIRECT_URI) {
        if request.redirect_uri.as_deref() != Some(bound) {
            return Err(ProtocolError::InvalidGrant(
                "the 'redirect_uri' parameter does not match the one used in \
                 the authorization request"
                    .to_string(),
            ));
        }
    }

    Ok(ticket)
}

/// Exchanges a refresh token for its embedded ticket.
async fn exchange_refresh_token(
    state: &ServerState,
    request: &TokenRequest,
    caller: &Caller,
) -> ProtocolResult<Ticket> {
    let token = request.refresh_token.as_deref().unwrap_or_default();
    let ticket = state
        .tokens
        .unprotect(token, TokenKind::RefreshToken)
        .await
        .map_err(|_| ProtocolError::InvalidGrant("the refresh token is invalid".to_string()))?;

    if let Some(usage) = ticket.usage() {
        if !usage.eq_ignore_ascii_case(TokenKind::RefreshToken.as_str()) {
            return Err(ProtocolError::InvalidGrant(
                "the presented token is not a refresh token".to_string(),
            ));
        }
    }

    if let Some(expires_at) = ticket.properties.expires_at {
        if expires_at < state.tokens.clock().now() {
            return Err(ProtocolError::InvalidGrant(
                "the refresh token is no longer valid".to_string(),
            ));
        }
    }

    if ticket.is_confidential() && !caller.validated {
        return Err(ProtocolError::InvalidGrant(
            "client authentication is required to use this refresh token".to_string(),
        ));
    }

    if ticket.has_presenters() {
        let presenter = caller
            .client_id
            .as_deref()
            .filter(|client_id| ticket.has_presenter(client_id));
        if presenter.is_none() {
            return Err(ProtocolError::InvalidGrant(
                "the refresh token was issued to another client".to_string(),
            ));
        }
    }

    Ok(ticket)
}

/// Builds a fresh ticket for an authenticated client acting as its own
/// subject.
fn grant_client_credentials(
    state: &ServerState,
    request: &TokenRequest,
    caller: &Caller,
) -> ProtocolResult<Ticket> {
    if !caller.validated {
        return Err(ProtocolError::InvalidClient(
            "client authentication is required for the client_credentials grant".to_string(),
        ));
    }

    let Some(client_id) = caller.client_id.clone() else {
        return Err(ProtocolError::ServerError(
            "An internal server error occurred.".to_string(),
        ));
    };

    let mut identity = Identity::new();
    identity
        .add_claim_with_destinations(
            claims::SUB,
            &client_id,
            [TokenKind::AccessToken.as_str(), TokenKind::IdentityToken.as_str()],
        )
        .map_err(|error| ProtocolError::ServerError(error.to_string()))?;

    let mut ticket = Ticket::new(
        Principal::from_identity(identity),
        Properties::new(),
        state.config.scheme.clone(),
    );

    let scopes = request.scopes();
    if !scopes.is_empty() {
        ticket.set_scopes(scopes).map_err(|_| {
            ProtocolError::InvalidRequest("the 'scope' parameter is malformed".to_string())
        })?;
    }

    ticket.set_presenters([client_id.as_str()]).map_err(|_| {
        ProtocolError::InvalidRequest("the 'client_id' parameter is malformed".to_string())
    })?;

    ticket.set_confidentiality_level(Some(ConfidentialityLevel::Private));

    Ok(ticket)
}

/// Mints the token response for an authenticated ticket.
async fn issue(state: &ServerState, mut ticket: Ticket, caller: &Caller) -> Outcome {
    if caller.validated {
        ticket.set_confidentiality_level(Some(ConfidentialityLevel::Private));
    }

    if let Some(client_id) = caller.client_id.as_deref() {
        if !ticket.has_presenters() && ticket.set_presenters([client_id]).is_err() {
            return Outcome::error(&ProtocolError::InvalidRequest(
                "the 'client_id' parameter is malformed".to_string(),
            ));
        }
    }

    let access = match state.tokens.mint(&ticket, TokenKind::AccessToken, None).await {
        Ok(minted) => minted,
        Err(error) => return Outcome::error(&error),
    };

    let expires_in = match (
        access.ticket.properties.issued_at,
        access.ticket.properties.expires_at,
    ) {
        (Some(issued_at), Some(expires_at)) => (expires_at - issued_at).num_seconds(),
        _ => 0,
    };

    let scopes = ticket.scopes();

    let id_token = if scopes.iter().any(|scope| scope == "openid") {
        match state.tokens.mint(&ticket, TokenKind::IdentityToken, None).await {
            Ok(minted) => Some(minted.value),
            Err(error) => return Outcome::error(&error),
        }
    } else {
        None
    };

    let refresh_token = if scopes.iter().any(|scope| scope == "offline_access") {
        match state.tokens.mint(&ticket, TokenKind::RefreshToken, None).await {
            Ok(minted) => Some(minted.value),
            Err(error) => return Outcome::error(&error),
        }
    } else {
        None
    };

    let response: ProtocolResponse = TokenResponse {
        access_token: access.value,
        token_type: "Bearer".to_string(),
        expires_in,
        refresh_token,
        id_token,
        scope: if scopes.is_empty() {
            None
        } else {
            Some(scopes.join(" "))
        },
    }
    .into();

    finish(state, response).await
}

async fn finish(state: &ServerState, mut response: ProtocolResponse) -> Outcome {
    // Apply.
    match state.provider.apply_token_response(&mut response).await {
        Disposition::Continue => Outcome::ok(response),
        Disposition::Reject(rejection) => Outcome::rejection(rejection, "invalid_request"),
        Disposition::HandleResponse(body) => Outcome::ok(body),
        Disposition::SkipToNextMiddleware => Outcome::Passthrough,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::StaticClientValidator;
    use crate::codec::{CodecRegistry, JsonTicketCodec};
    use crate::endpoints::testing::{bare_state, state_with, HookProvider};
    use crate::provider::DefaultServerProvider;
    use crate::response::params;
    use crate::token::TokenManager;
    use axum::http::StatusCode;
    use chrono::Duration;
    use oidcd_core::{ServerConfig, SystemClock};
    use serde_json::Value;
    use std::sync::Arc;

    fn body_of(outcome: Outcome) -> (StatusCode, ProtocolResponse) {
        match outcome {
            Outcome::Respond { status, body } => (status, body),
            other => panic!("expected a response, got {other:?}"),
        }
    }

    fn json_state(clients: StaticClientValidator) -> ServerState {
        state_with(
            DefaultServerProvider,
            CodecRegistry::uniform(Arc::new(JsonTicketCodec)),
            Arc::new(SystemClock),
            Arc::new(clients),
        )
    }

    fn code_ticket() -> Ticket {
        let mut identity = Identity::new();
        identity
            .add_claim_with_destinations("sub", "bob", ["access_token", "id_token"])
            .unwrap();

        let mut ticket = Ticket::new(Principal::from_identity(identity), Properties::new(), "oidcd");
        ticket.set_presenters(["Fabrikam"]).unwrap();
        ticket
            .set_scopes(["openid", "offline_access"])
            .unwrap();
        ticket.set_property(
            property_names::REDIRECT_URI,
            Some("https://client.example.com/callback"),
        );
        ticket
    }

    async fn mint_code(state: &ServerState) -> String {
        state
            .tokens
            .mint(&code_ticket(), TokenKind::AuthorizationCode, None)
            .await
            .unwrap()
            .value
    }

    #[tokio::test]
    async fn unexpected_methods_are_rejected() {
        let state = bare_state(DefaultServerProvider);
        let transaction = Transaction::new(Method::GET);

        let (_, body) = body_of(process_token(&state, &transaction).await);

        assert_eq!(body.error(), Some("invalid_request"));
        assert_eq!(
            body.get_str(params::ERROR_DESCRIPTION),
            Some("A malformed token request has been received: make sure to use POST.")
        );
    }

    #[tokio::test]
    async fn missing_grant_type_is_rejected() {
        let state = bare_state(DefaultServerProvider);
        let transaction = Transaction::new(Method::POST);

        let (_, body) = body_of(process_token(&state, &transaction).await);

        assert_eq!(body.error(), Some("invalid_request"));
        assert_eq!(
            body.get_str(params::ERROR_DESCRIPTION),
            Some("A malformed token request has been received: a 'grant_type' parameter is required.")
        );
    }

    #[tokio::test]
    async fn unknown_grant_types_are_rejected() {
        let state = bare_state(DefaultServerProvider);
        let transaction = Transaction::new(Method::POST)
            .with_param("grant_type", "urn:ietf:params:oauth:grant-type:saml2-bearer");

        let (_, body) = body_of(process_token(&state, &transaction).await);

        assert_eq!(body.error(), Some("unsupported_grant_type"));
    }

    #[tokio::test]
    async fn authorization_code_grant_requires_a_code() {
        let state = bare_state(DefaultServerProvider);
        let transaction =
            Transaction::new(Method::POST).with_param("grant_type", "authorization_code");

        let (_, body) = body_of(process_token(&state, &transaction).await);

        assert_eq!(body.error(), Some("invalid_request"));
        assert_eq!(
            body.get_str(params::ERROR_DESCRIPTION),
            Some("A malformed token request has been received: a 'code' parameter is required.")
        );
    }

    #[tokio::test]
    async fn invalid_client_credentials_are_rejected() {
        let state = json_state(
            StaticClientValidator::new().with_client("Fabrikam", Some("7Fjfp0ZBr1KtDRbnfVdmIw")),
        );
        let transaction = Transaction::new(Method::POST)
            .with_param("grant_type", "client_credentials")
            .with_param("client_id", "Fabrikam")
            .with_param("client_secret", "wrong");

        let (status, body) = body_of(process_token(&state, &transaction).await);

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error(), Some("invalid_client"));
    }

    #[tokio::test]
    async fn client_credentials_grant_requires_authentication() {
        let state = json_state(StaticClientValidator::new().with_client("Public", None));
        let transaction = Transaction::new(Method::POST)
            .with_param("grant_type", "client_credentials")
            .with_param("client_id", "Public");

        let (_, body) = body_of(process_token(&state, &transaction).await);

        assert_eq!(body.error(), Some("invalid_client"));
    }

    #[tokio::test]
    async fn client_credentials_grant_issues_an_access_token() {
        let state = json_state(
            StaticClientValidator::new().with_client("Fabrikam", Some("7Fjfp0ZBr1KtDRbnfVdmIw")),
        );
        let transaction = Transaction::new(Method::POST)
            .with_param("grant_type", "client_credentials")
            .with_param("client_id", "Fabrikam")
            .with_param("client_secret", "7Fjfp0ZBr1KtDRbnfVdmIw")
            .with_param("scope", "tasks:read");

        let (status, body) = body_of(process_token(&state, &transaction).await);

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get_str("token_type"), Some("Bearer"));
        assert_eq!(body.get("expires_in"), Some(&Value::from(3_600)));
        assert_eq!(body.get_str(params::SCOPE), Some("tasks:read"));
        assert!(!body.contains("refresh_token"));
        assert!(!body.contains("id_token"));

        // The minted access token carries the client as subject and
        // presenter and is marked confidential.
        let access_token = body.get_str("access_token").unwrap();
        let ticket = state
            .tokens
            .unprotect(access_token, TokenKind::AccessToken)
            .await
            .unwrap();

        assert!(ticket.is_access_token());
        assert!(ticket.is_confidential());
        assert_eq!(ticket.principal.claim_value("sub"), Some("Fabrikam"));
        assert!(ticket.has_presenter("Fabrikam"));
    }

    #[tokio::test]
    async fn authorization_code_grant_round_trips() {
        let state = json_state(StaticClientValidator::new().with_client("Fabrikam", None));
        let code = mint_code(&state).await;

        let transaction = Transaction::new(Method::POST)
            .with_param("grant_type", "authorization_code")
            .with_param("code", code)
            .with_param("client_id", "Fabrikam")
            .with_param("redirect_uri", "https://client.example.com/callback");

        let (status, body) = body_of(process_token(&state, &transaction).await);

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("access_token"));
        assert!(body.contains("id_token"), "openid scope must yield an id token");
        assert!(
            body.contains("refresh_token"),
            "offline_access scope must yield a refresh token"
        );
        assert_eq!(body.get_str(params::SCOPE), Some("openid offline_access"));

        // Destination filtering keeps the tagged subject claim.
        let access_token = body.get_str("access_token").unwrap();
        let ticket = state
            .tokens
            .unprotect(access_token, TokenKind::AccessToken)
            .await
            .unwrap();
        assert_eq!(ticket.principal.claim_value("sub"), Some("bob"));
    }

    #[tokio::test]
    async fn authorization_codes_cannot_be_exchanged_by_other_clients() {
        let state = json_state(
            StaticClientValidator::new()
                .with_client("Fabrikam", None)
                .with_client("Contoso", None),
        );
        let code = mint_code(&state).await;

        let transaction = Transaction::new(Method::POST)
            .with_param("grant_type", "authorization_code")
            .with_param("code", code)
            .with_param("client_id", "Contoso")
            .with_param("redirect_uri", "https://client.example.com/callback");

        let (_, body) = body_of(process_token(&state, &transaction).await);

        assert_eq!(body.error(), Some("invalid_grant"));
        assert_eq!(
            body.get_str(params::ERROR_DESCRIPTION),
            Some("the authorization code was issued to another client")
        );
    }

    #[tokio::test]
    async fn redirect_uri_must_match_the_authorization_request() {
        let state = json_state(StaticClientValidator::new().with_client("Fabrikam", None));
        let code = mint_code(&state).await;

        let transaction = Transaction::new(Method::POST)
            .with_param("grant_type", "authorization_code")
            .with_param("code", code)
            .with_param("client_id", "Fabrikam")
            .with_param("redirect_uri", "https://attacker.example.com/callback");

        let (_, body) = body_of(process_token(&state, &transaction).await);

        assert_eq!(body.error(), Some("invalid_grant"));
    }

    #[tokio::test]
    async fn expired_authorization_codes_are_rejected() {
        let state = json_state(StaticClientValidator::new().with_client("Fabrikam", None));

        let code = state
            .tokens
            .mint(
                &code_ticket(),
                TokenKind::AuthorizationCode,
                Some(Duration::seconds(-60)),
            )
            .await
            .unwrap()
            .value;

        let transaction = Transaction::new(Method::POST)
            .with_param("grant_type", "authorization_code")
            .with_param("code", code)
            .with_param("client_id", "Fabrikam")
            .with_param("redirect_uri", "https://client.example.com/callback");

        let (_, body) = body_of(process_token(&state, &transaction).await);

        assert_eq!(body.error(), Some("invalid_grant"));
    }

    #[tokio::test]
    async fn refresh_token_grant_issues_new_tokens() {
        let state = json_state(StaticClientValidator::new().with_client("Fabrikam", None));

        let refresh = state
            .tokens
            .mint(&code_ticket(), TokenKind::RefreshToken, None)
            .await
            .unwrap()
            .value;

        let transaction = Transaction::new(Method::POST)
            .with_param("grant_type", "refresh_token")
            .with_param("refresh_token", refresh)
            .with_param("client_id", "Fabrikam");

        let (status, body) = body_of(process_token(&state, &transaction).await);

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("access_token"));
        assert!(body.contains("refresh_token"));
    }

    #[tokio::test]
    async fn confidential_refresh_tokens_require_client_authentication() {
        let state = json_state(StaticClientValidator::new().with_client("Fabrikam", None));

        let mut ticket = code_ticket();
        ticket.set_confidentiality_level(Some(ConfidentialityLevel::Private));
        let refresh = state
            .tokens
            .mint(&ticket, TokenKind::RefreshToken, None)
            .await
            .unwrap()
            .value;

        let transaction = Transaction::new(Method::POST)
            .with_param("grant_type", "refresh_token")
            .with_param("refresh_token", refresh)
            .with_param("client_id", "Fabrikam");

        let (_, body) = body_of(process_token(&state, &transaction).await);

        assert_eq!(body.error(), Some("invalid_grant"));
    }

    #[tokio::test]
    async fn handle_stage_can_substitute_a_custom_grant() {
        let mut identity = Identity::new();
        identity
            .add_claim_with_destinations("sub", "device-42", ["access_token"])
            .unwrap();
        let ticket = Ticket::new(Principal::from_identity(identity), Properties::new(), "oidcd");

        let state = state_with(
            HookProvider {
                handle_token: Some(GrantOutcome::Grant(Box::new(ticket))),
                ..HookProvider::default()
            },
            CodecRegistry::uniform(Arc::new(JsonTicketCodec)),
            Arc::new(SystemClock),
            Arc::new(StaticClientValidator::new()),
        );

        let transaction = Transaction::new(Method::POST)
            .with_param("grant_type", "urn:ietf:params:oauth:grant-type:device_code");

        let (status, body) = body_of(process_token(&state, &transaction).await);

        assert_eq!(status, StatusCode::OK);
        let access_token = body.get_str("access_token").unwrap();
        let ticket = state
            .tokens
            .unprotect(access_token, TokenKind::AccessToken)
            .await
            .unwrap();
        assert_eq!(ticket.principal.claim_value("sub"), Some("device-42"));
    }

    #[tokio::test]
    async fn validated_requests_require_a_client_id() {
        let state = bare_state(HookProvider {
            validate_token: Some(ValidateOutcome::Validated),
            ..HookProvider::default()
        });

        let transaction = Transaction::new(Method::POST)
            .with_param("grant_type", "client_credentials");

        let (status, body) = body_of(process_token(&state, &transaction).await);

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error(), Some("server_error"));
    }

    #[tokio::test]
    async fn expires_in_tracks_the_ticket_lifetime_override() {
        let config = Arc::new(ServerConfig::default());
        let tokens = Arc::new(TokenManager::new(
            config.clone(),
            CodecRegistry::uniform(Arc::new(JsonTicketCodec)),
            Arc::new(SystemClock),
        ));
        let state = ServerState::new(
            config,
            tokens,
            Arc::new(StaticClientValidator::new().with_client("Fabrikam", None)),
            Arc::new(DefaultServerProvider),
        );

        let mut ticket = code_ticket();
        ticket.set_access_token_lifetime(Some(Duration::seconds(60)));
        let code = state
            .tokens
            .mint(&ticket, TokenKind::AuthorizationCode, None)
            .await
            .unwrap()
            .value;

        let transaction = Transaction::new(Method::POST)
            .with_param("grant_type", "authorization_code")
            .with_param("code", code)
            .with_param("client_id", "Fabrikam")
            .with_param("redirect_uri", "https://client.example.com/callback");

        let (_, body) = body_of(process_token(&state, &transaction).await);

        assert_eq!(body.get("expires_in"), Some(&Value::from(60)));
    }
}
