//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Configure log level from config, overridable via `RUST_LOG`
//! - Open the per-request span that carries the request ID
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Logs go to stderr so `invoke` can keep stdout for its JSON result

use axum::http::Request;
use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Install the global subscriber. Later calls are ignored.
pub fn init(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Span for one inbound request. Every event logged while the request is
/// handled, the relay's response line included, is recorded inside it.
///
/// Expects `x-request-id` to be set already by `SetRequestIdLayer`.
pub fn request_span<B>(request: &Request<B>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

fn default_directives(level: &str) -> String {
    format!("anthropic_relay={level},tower_http={level}")
}
