//! Anthropic API relay.
//!
//! Forwards browser chat-completion requests to the Anthropic messages API
//! with a server-side timeout and CORS headers, so a static front-end can
//! call it. Hosted either as a standalone server ([`HttpServer`]) that also
//! serves the front-end's files, or as a one-shot function
//! ([`function::FunctionHandler`]). Both wrap the same [`Relay`].

// Core
pub mod config;
pub mod function;
pub mod http;
pub mod relay;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::Relay;
