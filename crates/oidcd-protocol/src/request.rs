//! Typed protocol request objects.
//!
//! Each endpoint pipeline extracts one of these from the raw transaction
//! during its Extract stage. Parameters are optional at this level so the
//! pipelines can emit the protocol's own error responses for missing
//! values instead of failing during deserialization.

use crate::client::ClientCredentials;
use crate::endpoints::Transaction;

use oidcd_model::TokenKind;

/// Authorization endpoint request.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationRequest {
    /// Response type (`code` is the only built-in).
    pub response_type: Option<String>,

    /// Client identifier.
    pub client_id: Option<String>,

    /// Redirect URI.
    pub redirect_uri: Option<String>,

    /// Requested scope, space-separated.
    pub scope: Option<String>,

    /// Opaque client state, echoed back verbatim.
    pub state: Option<String>,

    /// OpenID Connect nonce.
    pub nonce: Option<String>,
}

impl AuthorizationRequest {
    /// Extracts the request from a transaction.
    #[must_use]
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            response_type: transaction.param("response_type").map(ToString::to_string),
            client_id: transaction.param("client_id").map(ToString::to_string),
            redirect_uri: transaction.param("redirect_uri").map(ToString::to_string),
            scope: transaction.param("scope").map(ToString::to_string),
            state: transaction.param("state").map(ToString::to_string),
            nonce: transaction.param("nonce").map(ToString::to_string),
        }
    }

    /// Returns the requested scopes as a list.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scope
            .as_deref()
            .map(|scope| scope.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// Token endpoint request.
#[derive(Debug, Clone, Default)]
pub struct TokenRequest {
    /// Grant type.
    pub grant_type: Option<String>,

    /// Authorization code, for the `authorization_code` grant.
    pub code: Option<String>,

    /// Redirect URI, for the `authorization_code` grant.
    pub redirect_uri: Option<String>,

    /// Client identifier.
    pub client_id: Option<String>,

    /// Client secret.
    pub client_secret: Option<String>,

    /// Requested scope, for the `client_credentials` grant.
    pub scope: Option<String>,

    /// Refresh token, for the `refresh_token` grant.
    pub refresh_token: Option<String>,

    /// Resource owner username, for extension grants.
    pub username: Option<String>,

    /// Resource owner password, for extension grants.
    pub password: Option<String>,
}

impl TokenRequest {
    /// Extracts the request from a transaction, applying the already
    /// extracted client credentials.
    #[must_use]
    pub fn from_transaction(transaction: &Transaction, credentials: ClientCredentials) -> Self {
        Self {
            grant_type: transaction.param("grant_type").map(ToString::to_string),
            code: transaction.param("code").map(ToString::to_string),
            redirect_uri: transaction.param("redirect_uri").map(ToString::to_string),
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            scope: transaction.param("scope").map(ToString::to_string),
            refresh_token: transaction.param("refresh_token").map(ToString::to_string),
            username: transaction.param("username").map(ToString::to_string),
            password: transaction.param("password").map(ToString::to_string),
        }
    }

    /// Returns the requested scopes as a list.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scope
            .as_deref()
            .map(|scope| scope.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// Introspection endpoint request.
#[derive(Debug, Clone, Default)]
pub struct IntrospectionRequest {
    /// The token to introspect.
    pub token: Option<String>,

    /// Token type hint.
    pub token_type_hint: Option<String>,

    /// Client identifier.
    pub client_id: Option<String>,

    /// Client secret.
    pub client_secret: Option<String>,
}

impl IntrospectionRequest {
    /// Extracts the request from a transaction, applying the already
    /// extracted client credentials.
    #[must_use]
    pub fn from_transaction(transaction: &Transaction, credentials: ClientCredentials) -> Self {
        Self {
            token: transaction.param("token").map(ToString::to_string),
            token_type_hint: transaction.param("token_type_hint").map(ToString::to_string),
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
        }
    }

    /// Returns the parsed token type hint; unknown hints read as absent,
    /// so the pipeline falls back to trying every kind.
    #[must_use]
    pub fn hint(&self) -> Option<TokenKind> {
        self.token_type_hint
            .as_deref()
            .and_then(|hint| hint.parse().ok())
    }
}

/// Revocation endpoint request.
#[derive(Debug, Clone, Default)]
pub struct RevocationRequest {
    /// The token to revoke.
    pub token: Option<String>,

    /// Token type hint.
    pub token_type_hint: Option<String>,

    /// Client identifier.
    pub client_id: Option<String>,

    /// Client secret.
    pub client_secret: Option<String>,
}

impl RevocationRequest {
    /// Extracts the request from a transaction, applying the already
    /// extracted client credentials.
    #[must_use]
    pub fn from_transaction(transaction: &Transaction, credentials: ClientCredentials) -> Self {
        Self {
            token: transaction.param("token").map(ToString::to_string),
            token_type_hint: transaction.param("token_type_hint").map(ToString::to_string),
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
        }
    }

    /// Returns the parsed token type hint; unknown hints read as absent.
    #[must_use]
    pub fn hint(&self) -> Option<TokenKind> {
        self.token_type_hint
            .as_deref()
            .and_then(|hint| hint.parse().ok())
    }
}
