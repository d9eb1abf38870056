//! Field projection of the inbound body.
//!
//! Only `model`, `max_tokens` and `messages` are forwarded; any other field
//! the client sent is dropped. Values are passed through untouched, the
//! upstream validates them.

use axum::body::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};

/// The forwarded subset of a messages request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Value>,
}

impl ProjectedBody {
    /// Parse a raw body, which must be a JSON object, and project it.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let mut object: Map<String, Value> = serde_json::from_slice(body)?;
        Ok(Self {
            model: object.remove("model"),
            max_tokens: object.remove("max_tokens"),
            messages: object.remove("messages"),
        })
    }

    pub fn to_bytes(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }
}
