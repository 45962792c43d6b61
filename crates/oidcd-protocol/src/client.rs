//! Client authentication.
//!
//! Implements credential extraction (HTTP Basic header first, request
//! body second) and the narrow validator interface through which the
//! engine consults the host's client registry.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;

use crate::error::{ProtocolError, ProtocolResult};

/// Client credentials carried by a request.
#[derive(Debug, Clone, Default)]
pub struct ClientCredentials {
    /// Declared client identifier.
    pub client_id: Option<String>,

    /// Client secret, when supplied.
    pub client_secret: Option<String>,
}

/// Extracts client credentials from the Authorization header and the
/// request parameters.
///
/// Credentials in a Basic Authorization header take precedence over
/// `client_id`/`client_secret` request parameters.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidClient`] if a Basic header is present
/// but malformed.
pub fn extract_credentials(
    authorization: Option<&str>,
    form_client_id: Option<&str>,
    form_client_secret: Option<&str>,
) -> ProtocolResult<ClientCredentials> {
    if let Some(authorization) = authorization {
        if let Some(basic) = authorization.strip_prefix("Basic ") {
            let decoded = STANDARD.decode(basic.trim()).map_err(|_| {
                ProtocolError::InvalidClient("invalid basic authentication encoding".to_string())
            })?;

            let credentials = String::from_utf8(decoded).map_err(|_| {
                ProtocolError::InvalidClient("invalid basic authentication encoding".to_string())
            })?;

            let (client_id, client_secret) = credentials.split_once(':').ok_or_else(|| {
                ProtocolError::InvalidClient("invalid basic authentication format".to_string())
            })?;

            let client_id = urlencoding::decode(client_id)
                .map_err(|_| {
                    ProtocolError::InvalidClient("invalid client_id encoding".to_string())
                })?
                .to_string();

            let client_secret = urlencoding::decode(client_secret)
                .map_err(|_| {
                    ProtocolError::InvalidClient("invalid client_secret encoding".to_string())
                })?
                .to_string();

            return Ok(ClientCredentials {
                client_id: Some(client_id),
                client_secret: Some(client_secret),
            });
        }
    }

    Ok(ClientCredentials {
        client_id: form_client_id.map(ToString::to_string),
        client_secret: form_client_secret.map(ToString::to_string),
    })
}

/// Confirms the existence and authorization of client applications.
///
/// The engine never stores clients itself; implement this trait over
/// your client registry.
#[async_trait]
pub trait ClientValidator: Send + Sync {
    /// Validates a declared client identifier and optional secret.
    ///
    /// Returns `false` when the client is unknown, disabled, or the
    /// secret does not match.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure failures; authentication
    /// failures are the `false` return.
    async fn validate_client(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> ProtocolResult<bool>;
}

/// In-memory client validator.
///
/// Clients registered with a secret are confidential and must present
/// it; clients registered without one are public.
#[derive(Debug, Clone, Default)]
pub struct StaticClientValidator {
    clients: HashMap<String, Option<String>>,
}

impl StaticClientValidator {
    /// Creates an empty validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client.
    #[must_use]
    pub fn with_client(mut self, client_id: impl Into<String>, secret: Option<&str>) -> Self {
        self.clients
            .insert(client_id.into(), secret.map(ToString::to_string));
        self
    }
}

#[async_trait]
impl ClientValidator for StaticClientValidator {
    async fn validate_client(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> ProtocolResult<bool> {
        match self.clients.get(client_id) {
            Some(expected) => Ok(expected.as_deref() == client_secret),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_header_takes_precedence_over_form_parameters() {
        // "client_id:client_secret"
        let credentials = extract_credentials(
            Some("Basic Y2xpZW50X2lkOmNsaWVudF9zZWNyZXQ="),
            Some("form_client"),
            Some("form_secret"),
        )
        .unwrap();

        assert_eq!(credentials.client_id.as_deref(), Some("client_id"));
        assert_eq!(credentials.client_secret.as_deref(), Some("client_secret"));
    }

    #[test]
    fn basic_header_credentials_are_url_decoded() {
        // "my%20client:my%20secret"
        let credentials =
            extract_credentials(Some("Basic bXklMjBjbGllbnQ6bXklMjBzZWNyZXQ="), None, None)
                .unwrap();

        assert_eq!(credentials.client_id.as_deref(), Some("my client"));
        assert_eq!(credentials.client_secret.as_deref(), Some("my secret"));
    }

    #[test]
    fn malformed_basic_header_is_rejected() {
        assert!(extract_credentials(Some("Basic !!!invalid!!!"), None, None).is_err());

        // "nocredentials" - no colon separator
        assert!(extract_credentials(Some("Basic bm9jcmVkZW50aWFscw=="), None, None).is_err());
    }

    #[test]
    fn form_parameters_are_used_without_a_header() {
        let credentials =
            extract_credentials(None, Some("public_client"), None).unwrap();

        assert_eq!(credentials.client_id.as_deref(), Some("public_client"));
        assert_eq!(credentials.client_secret, None);
    }

    #[tokio::test]
    async fn static_validator_distinguishes_public_and_confidential() {
        let validator = StaticClientValidator::new()
            .with_client("confidential", Some("s3cr3t"))
            .with_client("public", None);

        assert!(validator
            .validate_client("confidential", Some("s3cr3t"))
            .await
            .unwrap());
        assert!(!validator
            .validate_client("confidential", Some("wrong"))
            .await
            .unwrap());
        assert!(!validator
            .validate_client("confidential", None)
            .await
            .unwrap());
        assert!(validator.validate_client("public", None).await.unwrap());
        assert!(!validator.validate_client("unknown", None).await.unwrap());
    }
}
