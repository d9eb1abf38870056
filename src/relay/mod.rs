//! Forwarding relay.
//!
//! # Data Flow
//! ```text
//! Request<Bytes> from an adapter (server or function)
//!     → OPTIONS? answer preflight, done
//!     → method gate (POST only)
//!     → credential header present?
//!     → projection.rs (parse body, keep model/max_tokens/messages)
//!     → upstream.rs (POST upstream) under resilience::with_ceiling
//!     → upstream reply relayed verbatim, or error.rs synthesizes one
//!     → CORS headers attached
//! ```
//!
//! # Design Decisions
//! - One relay shared by every hosting shape; adapters only translate
//!   requests and responses
//! - The relay holds no mutable state, requests never coordinate
//! - The credential is copied, never inspected or logged
//! - No retries: every failure is final for the request

pub mod error;
pub mod projection;
pub mod upstream;

use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method, Request, Response};

use crate::config::{ConfigError, RelayConfig, UpstreamConfig, ValidationError};
use crate::observability::metrics;
use crate::resilience::with_ceiling;
use crate::security::CorsPolicy;

pub use error::{RelayError, SetupError};
pub use projection::ProjectedBody;
pub use upstream::{HttpUpstream, Upstream, UpstreamError, UpstreamReply, UpstreamRequest};

/// Per-deployment relay behaviour.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Inbound header whose value is forwarded as the credential.
    pub credential_header: HeaderName,
    /// Sent as `anthropic-version`.
    pub api_version: HeaderValue,
    /// Ceiling on the upstream exchange; `None` defers to the host.
    pub timeout: Option<Duration>,
    /// Attached to every relay response.
    pub cors: CorsPolicy,
    /// Attached to preflight responses.
    pub preflight: CorsPolicy,
}

impl RelaySettings {
    pub fn from_config(
        config: &UpstreamConfig,
        preflight: CorsPolicy,
    ) -> Result<Self, ConfigError> {
        let credential_header = HeaderName::from_bytes(config.credential_header.as_bytes());
        let api_version = HeaderValue::from_str(&config.api_version);

        match (credential_header, api_version) {
            (Ok(credential_header), Ok(api_version)) => Ok(Self {
                credential_header,
                api_version,
                timeout: config.timeout_secs.map(Duration::from_secs),
                cors: CorsPolicy::relay(),
                preflight,
            }),
            (credential_header, api_version) => {
                let mut errors = Vec::new();
                if credential_header.is_err() {
                    errors.push(ValidationError::CredentialHeader(
                        config.credential_header.clone(),
                    ));
                }
                if api_version.is_err() {
                    errors.push(ValidationError::ApiVersion(config.api_version.clone()));
                }
                Err(ConfigError::Validation(errors))
            }
        }
    }
}

/// The forwarding proxy, generic over where requests go.
pub struct Relay<U> {
    upstream: U,
    settings: RelaySettings,
}

impl Relay<HttpUpstream> {
    /// Build a relay that forwards to the configured upstream URL.
    pub fn from_config(config: &RelayConfig, preflight: CorsPolicy) -> Result<Self, SetupError> {
        let settings = RelaySettings::from_config(&config.upstream, preflight)?;
        let upstream = HttpUpstream::new(&config.upstream.url)?;
        Ok(Self::new(upstream, settings))
    }
}

impl<U: Upstream> Relay<U> {
    pub fn new(upstream: U, settings: RelaySettings) -> Self {
        Self { upstream, settings }
    }

    /// Answer one inbound request. Never fails: every outcome is a response.
    pub async fn handle(&self, request: Request<Bytes>) -> Response<Bytes> {
        if request.method() == Method::OPTIONS {
            return self.preflight();
        }

        let start = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let (mut response, outcome) = match self.forward(request).await {
            Ok(response) => (response, "relayed"),
            Err(err) => {
                if matches!(err, RelayError::Timeout | RelayError::Transport(_)) {
                    tracing::error!(
                        method = %method,
                        path = %path,
                        error = %err,
                        "Upstream request failed"
                    );
                }
                let outcome = err.outcome();
                (err.into_response(), outcome)
            }
        };
        self.settings.cors.apply(response.headers_mut());

        tracing::info!(
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            outcome,
            "Relay response"
        );
        metrics::record_relay(outcome, response.status(), start);
        response
    }

    /// Empty 200 carrying the preflight CORS headers.
    pub fn preflight(&self) -> Response<Bytes> {
        let mut response = Response::new(Bytes::new());
        self.settings.preflight.apply(response.headers_mut());
        response
    }

    /// Synthesized error for failures detected by an adapter, with CORS.
    pub fn reject(&self, err: RelayError) -> Response<Bytes> {
        let status = err.status();
        let outcome = err.outcome();
        tracing::warn!(status = status.as_u16(), error = %err, "Request rejected");
        metrics::record_relay(outcome, status, Instant::now());

        let mut response = err.into_response();
        self.settings.cors.apply(response.headers_mut());
        response
    }

    async fn forward(&self, request: Request<Bytes>) -> Result<Response<Bytes>, RelayError> {
        if request.method() != Method::POST {
            return Err(RelayError::MethodNotAllowed);
        }

        let credential = request
            .headers()
            .get(&self.settings.credential_header)
            .filter(|value| !value.is_empty())
            .cloned()
            .ok_or_else(|| {
                RelayError::MissingCredential(self.settings.credential_header.as_str().to_string())
            })?;

        let body = ProjectedBody::from_slice(request.body())
            .and_then(|projected| projected.to_bytes())
            .map_err(RelayError::InvalidBody)?;

        let upstream_request = UpstreamRequest {
            credential_header: self.settings.credential_header.clone(),
            credential,
            api_version: self.settings.api_version.clone(),
            body,
        };

        tracing::debug!("Forwarding request upstream");
        let reply = with_ceiling(self.settings.timeout, self.upstream.send(upstream_request))
            .await
            .map_err(|_| RelayError::Timeout)?
            .map_err(RelayError::Transport)?;

        tracing::debug!(status = reply.status.as_u16(), "Upstream responded");
        Ok(relay_reply(reply))
    }
}

/// Upstream status and body verbatim, whatever the status.
fn relay_reply(reply: UpstreamReply) -> Response<Bytes> {
    let mut response = Response::new(reply.body);
    *response.status_mut() = reply.status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        reply
            .content_type
            .unwrap_or_else(|| HeaderValue::from_static("application/json")),
    );
    response
}
