//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Upstream messages endpoint.
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.anthropic.com/v1/messages";

/// Protocol version sent with every upstream request.
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Header carrying the caller's API key.
pub const DEFAULT_CREDENTIAL_HEADER: &str = "x-api-key";

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream provider settings.
    pub upstream: UpstreamConfig,

    /// Relay endpoint on the inbound side.
    pub endpoint: EndpointConfig,

    /// Static asset serving.
    pub static_files: StaticFilesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request limits.
    pub security: SecurityConfig,
}

impl RelayConfig {
    /// Defaults for one-shot function invocations.
    ///
    /// The function host enforces its own deadline, so no ceiling is set here.
    pub fn function_defaults() -> Self {
        let mut config = Self::default();
        config.upstream.timeout_secs = None;
        config
    }
}

/// Hosting shape a configuration is loaded for. The shapes differ only in
/// the defaults applied to settings a file leaves out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    /// Long-running standalone server.
    Server,
    /// One-shot function invocation.
    Function,
}

impl Deployment {
    /// Built-in configuration for this shape.
    pub fn defaults(self) -> RelayConfig {
        match self {
            Deployment::Server => RelayConfig::default(),
            Deployment::Function => RelayConfig::function_defaults(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Upstream provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Messages endpoint requests are forwarded to.
    pub url: String,

    /// Value of the `anthropic-version` header.
    pub api_version: String,

    /// Inbound header copied verbatim to the upstream request.
    pub credential_header: String,

    /// Ceiling for the whole upstream exchange in seconds. `None` leaves the
    /// deadline to the hosting environment.
    pub timeout_secs: Option<u64>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_UPSTREAM_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            credential_header: DEFAULT_CREDENTIAL_HEADER.to_string(),
            timeout_secs: Some(65),
        }
    }
}

/// What the server does with non-POST requests on the relay path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NonPostPolicy {
    /// Hand the request to static file serving.
    #[default]
    Static,
    /// Answer 405 with a JSON error body.
    Reject,
}

/// Inbound relay endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Path the relay is served at.
    pub path: String,

    /// Handling of non-POST requests on `path`.
    pub non_post: NonPostPolicy,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            path: "/api/anthropic".to_string(),
            non_post: NonPostPolicy::Static,
        }
    }
}

/// Static asset serving.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Serve files for requests that do not hit the relay.
    pub enabled: bool,

    /// Directory files are read from.
    pub root: String,

    /// Document served for `/`.
    pub index: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root: ".".to_string(),
            index: "index.html".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}
