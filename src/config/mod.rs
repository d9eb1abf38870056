//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), or built-in defaults
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → relay settings, server and function adapters built from it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no process-wide mutable setting
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_for, parse_config, parse_config_for, ConfigError};
pub use schema::{
    Deployment, EndpointConfig, ListenerConfig, NonPostPolicy, ObservabilityConfig, RelayConfig,
    SecurityConfig, StaticFilesConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
