//! Request limits.
//!
//! Oversized bodies are rejected with 413 Payload Too Large before the relay
//! buffers them.

use tower_http::limit::RequestBodyLimitLayer;

use crate::config::SecurityConfig;

pub fn body_limit_layer(config: &SecurityConfig) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(config.max_body_size)
}
