//! Upstream request execution.
//!
//! # Responsibilities
//! - Define the capability the relay forwards through ([`Upstream`])
//! - Provide the reqwest-backed implementation used in production
//!
//! # Design Decisions
//! - The reply body is read in full inside the call, so the relay's ceiling
//!   bounds the whole exchange, not just the response headers
//! - Transport errors carry their whole source chain as text; the relay
//!   embeds it in the client-facing message

use std::error::Error as StdError;
use std::future::Future;

use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use thiserror::Error;
use url::Url;

const ANTHROPIC_VERSION: &str = "anthropic-version";

/// A fully prepared outbound request.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    /// Name of the credential header.
    pub credential_header: HeaderName,
    /// Credential copied verbatim from the inbound request.
    pub credential: HeaderValue,
    pub api_version: HeaderValue,
    /// Projected JSON body.
    pub body: Bytes,
}

/// What the upstream answered, whatever the status.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The exchange failed below HTTP (DNS, refused, reset, TLS...).
    #[error("{0}")]
    Transport(String),

    #[error("invalid upstream URL `{0}`")]
    InvalidUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl UpstreamError {
    fn transport(err: reqwest::Error) -> Self {
        UpstreamError::Transport(error_chain(&err))
    }
}

/// Render an error and its sources as `outer: inner: root`.
fn error_chain(err: &dyn StdError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

/// Something requests can be forwarded to.
pub trait Upstream: Send + Sync {
    fn send(
        &self,
        request: UpstreamRequest,
    ) -> impl Future<Output = Result<UpstreamReply, UpstreamError>> + Send;
}

/// HTTP(S) upstream backed by a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    url: Url,
}

impl HttpUpstream {
    pub fn new(url: &str) -> Result<Self, UpstreamError> {
        let url = Url::parse(url).map_err(|_| UpstreamError::InvalidUrl(url.to_string()))?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(UpstreamError::Client)?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Upstream for HttpUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamReply, UpstreamError> {
        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(request.credential_header, request.credential)
            .header(ANTHROPIC_VERSION, request.api_version)
            .body(request.body)
            .send()
            .await
            .map_err(UpstreamError::transport)?;

        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let body = response.bytes().await.map_err(UpstreamError::transport)?;

        Ok(UpstreamReply {
            status,
            content_type,
            body,
        })
    }
}
