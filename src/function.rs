//! One-shot function adapter.
//!
//! Serverless hosts hand the function a single request event and expect a
//! single result back. [`FunctionHandler`] translates between that event
//! shape and the shared [`Relay`]; the relay itself is the same one the
//! standalone server uses, so validation and error bodies cannot drift.
//!
//! ```text
//! {"method": "POST", "headers": {"x-api-key": "..."}, "body": "{...}"}
//!     → FunctionHandler::invoke
//!     → {"status": 200, "headers": {...}, "body": "{...}", "isBase64Encoded": false}
//! ```
//!
//! Bodies travel as strings. A body that is not valid UTF-8 is base64-encoded
//! and flagged with `isBase64Encoded`, in both directions, so upstream bytes
//! reach the host unchanged.

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, Method, Request, Response};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use crate::config::RelayConfig;
use crate::relay::{HttpUpstream, Relay, RelayError, SetupError, Upstream};
use crate::security::CorsPolicy;

/// Request event delivered by the host.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FunctionEvent {
    #[serde(default = "default_method")]
    pub method: String,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Raw request body, base64 when `is_base64_encoded` is set.
    #[serde(default)]
    pub body: String,

    #[serde(rename = "isBase64Encoded", default)]
    pub is_base64_encoded: bool,
}

fn default_method() -> String {
    "POST".to_string()
}

/// Result returned to the host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FunctionResult {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,

    /// Set when `body` holds base64 of a non-UTF-8 upstream body.
    #[serde(rename = "isBase64Encoded", default)]
    pub is_base64_encoded: bool,
}

/// Relay wrapped for single invocations. The whole function is the relay
/// endpoint, so any method other than POST and OPTIONS is answered 405.
pub struct FunctionHandler<U> {
    relay: Relay<U>,
}

impl FunctionHandler<HttpUpstream> {
    pub fn from_config(config: &RelayConfig) -> Result<Self, SetupError> {
        Ok(Self::new(Relay::from_config(config, CorsPolicy::relay())?))
    }
}

impl<U: Upstream> FunctionHandler<U> {
    pub fn new(relay: Relay<U>) -> Self {
        Self { relay }
    }

    pub async fn invoke(&self, event: FunctionEvent) -> FunctionResult {
        let response = match to_request(event) {
            Ok(request) => self.relay.handle(request).await,
            Err(err) => self.relay.reject(err),
        };
        to_result(response)
    }
}

fn to_request(event: FunctionEvent) -> Result<Request<Bytes>, RelayError> {
    let method = Method::from_bytes(event.method.to_ascii_uppercase().as_bytes())
        .map_err(|_| RelayError::MethodNotAllowed)?;
    let body = if event.is_base64_encoded && method == Method::POST {
        general_purpose::STANDARD
            .decode(&event.body)
            .map_err(RelayError::BodyEncoding)?
    } else {
        event.body.into_bytes()
    };

    let mut request = Request::new(Bytes::from(body));
    *request.method_mut() = method;

    let headers = request.headers_mut();
    for (name, value) in event.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => tracing::warn!(header = %name, "Dropping malformed event header"),
        }
    }
    Ok(request)
}

fn to_result(response: Response<Bytes>) -> FunctionResult {
    let (parts, body) = response.into_parts();
    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.to_string(), value.to_string()))
        })
        .collect();

    let (body, is_base64_encoded) = match String::from_utf8(body.to_vec()) {
        Ok(text) => (text, false),
        Err(_) => (general_purpose::STANDARD.encode(&body), true),
    };

    FunctionResult {
        status: parts.status.as_u16(),
        headers,
        body,
        is_base64_encoded,
    }
}
