//! CORS response headers.
//!
//! # Responsibilities
//! - Attach permissive CORS headers to every relay response, failures included
//! - Describe the preflight answer for each hosting shape
//!
//! # Design Decisions
//! - Origin is always `*`; the credential travels in a header, never a cookie
//! - Static assets get no CORS headers

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue};

/// Set of CORS headers written onto a response.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
}

impl CorsPolicy {
    /// Headers carried by relay responses and by the function preflight.
    pub fn relay() -> Self {
        Self {
            allow_methods: HeaderValue::from_static("POST, OPTIONS"),
            allow_headers: HeaderValue::from_static("Content-Type, x-api-key, anthropic-version"),
        }
    }

    /// Preflight answer of the standalone server, which also serves assets.
    pub fn server_preflight() -> Self {
        Self {
            allow_methods: HeaderValue::from_static("GET, POST, OPTIONS"),
            allow_headers: HeaderValue::from_static(
                "Content-Type, x-api-key, anthropic-version, Authorization",
            ),
        }
    }

    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
    }
}
