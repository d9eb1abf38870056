//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, URLs and header names before they reach the relay
//! - Validate value ranges (timeouts > 0, body limit > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("upstream.url `{0}` is not an http(s) URL")]
    UpstreamUrl(String),

    #[error("upstream.api_version `{0}` is not a valid header value")]
    ApiVersion(String),

    #[error("upstream.credential_header `{0}` is not a valid header name")]
    CredentialHeader(String),

    #[error("upstream.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("endpoint.path `{0}` must start with `/`")]
    EndpointPath(String),

    #[error("static_files.index `{0}` must be a plain file name")]
    IndexDocument(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let upstream = &config.upstream;
    match Url::parse(&upstream.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::UpstreamUrl(upstream.url.clone())),
    }
    if HeaderValue::from_str(&upstream.api_version).is_err() {
        errors.push(ValidationError::ApiVersion(upstream.api_version.clone()));
    }
    if HeaderName::from_bytes(upstream.credential_header.as_bytes()).is_err() {
        errors.push(ValidationError::CredentialHeader(
            upstream.credential_header.clone(),
        ));
    }
    if upstream.timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout);
    }

    if !config.endpoint.path.starts_with('/') {
        errors.push(ValidationError::EndpointPath(config.endpoint.path.clone()));
    }

    let index = &config.static_files.index;
    if index.is_empty()
        || index.contains(['/', '\\'])
        || matches!(index.as_str(), "." | "..")
    {
        errors.push(ValidationError::IndexDocument(index.clone()));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
