//! Protocol endpoint pipelines.
//!
//! Each endpoint runs the same four-stage state machine over a
//! [`Transaction`] and produces an [`Outcome`]. The `process_*` functions
//! are transport-agnostic; the axum handlers in each module are thin
//! adapters over them.
//!
//! Pipelines hold no locks across their await points (codec calls and
//! hook invocations), and cancelling the future - as the transport does
//! when the client disconnects - simply abandons the request before
//! anything is written.

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Json, Redirect, Response};
use std::collections::HashMap;

use crate::error::{status_for_error_code, ProtocolError};
use crate::provider::Rejection;
use crate::response::{params, ProtocolResponse};

pub mod authorization;
pub mod introspection;
pub mod revocation;
pub mod router;
pub mod state;
#[cfg(test)]
pub(crate) mod testing;
pub mod token;

pub use state::ServerState;

/// A raw wire request, reduced to what the pipelines consume: the HTTP
/// method, the merged query/body parameters and the Authorization
/// header.
#[derive(Debug, Clone)]
pub struct Transaction {
    /// HTTP method.
    pub method: Method,

    /// Request parameters (query string on GET, form body otherwise).
    pub params: HashMap<String, String>,

    /// Raw Authorization header value, if any.
    pub authorization: Option<String>,
}

impl Transaction {
    /// Creates an empty transaction.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            params: HashMap::new(),
            authorization: None,
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Sets the Authorization header value.
    #[must_use]
    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    /// Returns a parameter value, if present.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Builds a transaction from an HTTP request.
    ///
    /// GET requests contribute their query string; other methods
    /// contribute their form-encoded body. An unreadable body yields an
    /// empty parameter set rather than an error, leaving the rejection
    /// to the pipeline's own validation.
    pub async fn from_request(request: Request<Body>) -> Self {
        let method = request.method().clone();
        let authorization = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);

        let raw = if method == Method::GET {
            request.uri().query().unwrap_or_default().as_bytes().to_vec()
        } else {
            match to_bytes(request.into_body(), 1024 * 1024).await {
                Ok(bytes) => bytes.to_vec(),
                Err(_) => Vec::new(),
            }
        };

        let params = url::form_urlencoded::parse(&raw)
            .into_owned()
            .collect::<HashMap<String, String>>();

        Self {
            method,
            params,
            authorization,
        }
    }
}

/// The result of running an endpoint pipeline.
#[derive(Debug)]
pub enum Outcome {
    /// Serialize this response body with the given status.
    Respond {
        /// HTTP status code.
        status: StatusCode,

        /// Response parameters.
        body: ProtocolResponse,
    },

    /// Redirect the user agent to this location.
    Redirect(String),

    /// Emit nothing and hand control back to the hosting transport.
    Passthrough,
}

impl Outcome {
    /// A successful (200) response.
    #[must_use]
    pub fn ok(body: ProtocolResponse) -> Self {
        Self::Respond {
            status: StatusCode::OK,
            body,
        }
    }

    /// An error response derived from a protocol error.
    #[must_use]
    pub fn error(error: &ProtocolError) -> Self {
        Self::Respond {
            status: StatusCode::from_u16(error.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: error.to_error_response().into(),
        }
    }

    /// An error response requested by an extensibility hook.
    ///
    /// The rejection's absent error code falls back to `fallback`.
    #[must_use]
    pub fn rejection(rejection: Rejection, fallback: &str) -> Self {
        let code = rejection.error.unwrap_or_else(|| fallback.to_string());
        let status = StatusCode::from_u16(status_for_error_code(&code))
            .unwrap_or(StatusCode::BAD_REQUEST);

        let mut body = ProtocolResponse::new();
        body.set(params::ERROR, code);
        if let Some(description) = rejection.description {
            body.set(params::ERROR_DESCRIPTION, description);
        }
        if let Some(uri) = rejection.uri {
            body.set(params::ERROR_URI, uri);
        }

        Self::Respond { status, body }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Self::Respond { status, body } => (status, Json(body)).into_response(),
            Self::Redirect(location) => Redirect::to(&location).into_response(),
            // axum has no linear next-middleware chain; hosts that need
            // real fall-through drive process_* from their own layer.
            Self::Passthrough => StatusCode::NOT_FOUND.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_params_round_trip() {
        let transaction = Transaction::new(Method::POST)
            .with_param("token", "SlAV32hkKG")
            .with_authorization("Basic Zm9vOmJhcg==");

        assert_eq!(transaction.param("token"), Some("SlAV32hkKG"));
        assert_eq!(transaction.param("missing"), None);
        assert!(transaction.authorization.is_some());
    }

    #[tokio::test]
    async fn from_request_reads_the_query_on_get() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/connect/introspect?token=SlAV32hkKG&token_type_hint=refresh_token")
            .body(Body::empty())
            .unwrap();

        let transaction = Transaction::from_request(request).await;
        assert_eq!(transaction.param("token"), Some("SlAV32hkKG"));
        assert_eq!(transaction.param("token_type_hint"), Some("refresh_token"));
    }

    #[tokio::test]
    async fn from_request_reads_the_body_on_post() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/connect/introspect")
            .body(Body::from("token=SlAV32hkKG&client_id=Fabrikam"))
            .unwrap();

        let transaction = Transaction::from_request(request).await;
        assert_eq!(transaction.param("token"), Some("SlAV32hkKG"));
        assert_eq!(transaction.param("client_id"), Some("Fabrikam"));
    }

    #[test]
    fn rejection_outcome_falls_back_to_the_stage_error() {
        let outcome = Outcome::rejection(Rejection::default(), "invalid_request");
        let Outcome::Respond { status, body } = outcome else {
            panic!("expected a response");
        };

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error(), Some("invalid_request"));
        assert!(!body.contains(params::ERROR_DESCRIPTION));
    }

    #[test]
    fn rejection_outcome_keeps_custom_fields() {
        let outcome = Outcome::rejection(
            Rejection::new(
                Some("custom_error"),
                Some("custom_description"),
                Some("custom_uri"),
            ),
            "invalid_request",
        );
        let Outcome::Respond { status, body } = outcome else {
            panic!("expected a response");
        };

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error(), Some("custom_error"));
        assert_eq!(body.get_str(params::ERROR_DESCRIPTION), Some("custom_description"));
        assert_eq!(body.get_str(params::ERROR_URI), Some("custom_uri"));
    }
}
