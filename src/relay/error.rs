//! Relay failure taxonomy.
//!
//! Every variant here is answered with a synthesized `{"error":{"message"}}`
//! body. Upstream replies with a non-2xx status are not errors: they are
//! relayed verbatim.

use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Response, StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::config::ConfigError;
use crate::relay::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Missing {0} header")]
    MissingCredential(String),

    #[error("Invalid request body")]
    InvalidBody(#[source] serde_json::Error),

    #[error("Request body too large")]
    BodyTooLarge,

    /// The client stopped sending or the stream broke mid-body.
    #[error("Failed to read request body")]
    BodyRead(#[source] axum::Error),

    /// A function event flagged base64 whose body does not decode.
    #[error("Invalid request body")]
    BodyEncoding(#[source] base64::DecodeError),

    #[error("Request to Anthropic API timed out. Please try again.")]
    Timeout,

    #[error("Proxy error: {0}")]
    Transport(#[source] UpstreamError),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::MissingCredential(_)
            | RelayError::InvalidBody(_)
            | RelayError::BodyRead(_)
            | RelayError::BodyEncoding(_) => StatusCode::BAD_REQUEST,
            RelayError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            RelayError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metric and log label.
    pub fn outcome(&self) -> &'static str {
        match self {
            RelayError::MethodNotAllowed
            | RelayError::MissingCredential(_)
            | RelayError::InvalidBody(_)
            | RelayError::BodyTooLarge
            | RelayError::BodyRead(_)
            | RelayError::BodyEncoding(_) => "client_error",
            RelayError::Timeout => "upstream_timeout",
            RelayError::Transport(_) => "upstream_transport_error",
        }
    }

    /// JSON error response, without CORS headers.
    pub fn into_response(self) -> Response<Bytes> {
        let body = json!({ "error": { "message": self.to_string() } }).to_string();
        let mut response = Response::new(Bytes::from(body));
        *response.status_mut() = self.status();
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}

/// Failure to build a relay from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(response: &Response<Bytes>) -> String {
        let value: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        value["error"]["message"].as_str().unwrap().to_string()
    }

    #[test]
    fn client_errors_map_to_4xx() {
        let response = RelayError::MissingCredential("x-api-key".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(message(&response), "Missing x-api-key header");

        let response = RelayError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(message(&response), "Method not allowed");

        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let response = RelayError::InvalidBody(parse).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(message(&response), "Invalid request body");
    }

    #[test]
    fn timeout_maps_to_504() {
        let response = RelayError::Timeout.into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            message(&response),
            "Request to Anthropic API timed out. Please try again."
        );
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn transport_error_embeds_underlying_text() {
        let err = RelayError::Transport(UpstreamError::Transport("connection reset".into()));
        assert_eq!(err.outcome(), "upstream_transport_error");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message(&response), "Proxy error: connection reset");
    }
}
