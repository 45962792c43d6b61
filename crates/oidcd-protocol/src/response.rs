//! Protocol response objects.
//!
//! Endpoint pipelines build a [`ProtocolResponse`] - an ordered JSON
//! parameter map - so Apply-stage extensibility can add or replace
//! parameters before serialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ErrorResponse;

/// Well-known response parameter names.
pub mod params {
    /// Whether the introspected token is active.
    pub const ACTIVE: &str = "active";
    /// Subject.
    pub const SUB: &str = "sub";
    /// Issuer.
    pub const ISS: &str = "iss";
    /// Issued-at time, seconds since epoch.
    pub const IAT: &str = "iat";
    /// Not-before time, seconds since epoch.
    pub const NBF: &str = "nbf";
    /// Expiration time, seconds since epoch.
    pub const EXP: &str = "exp";
    /// Token type.
    pub const TOKEN_TYPE: &str = "token_type";
    /// Token identifier.
    pub const JTI: &str = "jti";
    /// Audience array.
    pub const AUD: &str = "aud";
    /// Scope.
    pub const SCOPE: &str = "scope";
    /// Authorization code.
    pub const CODE: &str = "code";
    /// Opaque client state echoed back on authorization responses.
    pub const STATE: &str = "state";
    /// Error code.
    pub const ERROR: &str = "error";
    /// Error description.
    pub const ERROR_DESCRIPTION: &str = "error_description";
    /// Error URI.
    pub const ERROR_URI: &str = "error_uri";
}

/// An ordered set of response parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolResponse {
    parameters: Map<String, Value>,
}

impl ProtocolResponse {
    /// Creates an empty response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, replacing any previous value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.parameters.insert(name.to_string(), value.into());
    }

    /// Removes a parameter.
    pub fn remove(&mut self, name: &str) {
        self.parameters.remove(name);
    }

    /// Returns a parameter value, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// Returns a parameter as a string, if present and textual.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Determines whether a parameter is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    /// Returns the error code, if this is an error response.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.get_str(params::ERROR)
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Determines whether the response has no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Iterates over the parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.parameters.iter()
    }
}

impl From<ErrorResponse> for ProtocolResponse {
    fn from(error: ErrorResponse) -> Self {
        let mut response = Self::new();
        response.set(params::ERROR, error.error);
        if let Some(description) = error.error_description {
            response.set(params::ERROR_DESCRIPTION, description);
        }
        if let Some(uri) = error.error_uri {
            response.set(params::ERROR_URI, uri);
        }
        response
    }
}

/// Token endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token.
    pub access_token: String,

    /// Token type (always "Bearer").
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: i64,

    /// Refresh token, if issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Identity token, if the `openid` scope was granted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Granted scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl From<TokenResponse> for ProtocolResponse {
    fn from(response: TokenResponse) -> Self {
        match serde_json::to_value(&response) {
            Ok(Value::Object(parameters)) => Self { parameters },
            // TokenResponse always serializes to an object.
            _ => Self::new(),
        }
    }
}
