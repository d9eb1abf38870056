//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, body limit, tracing)
//!     → dispatch:
//!         OPTIONS         → relay preflight
//!         POST relay path → relay (crate::relay)
//!         anything else   → static_files.rs
//!     → Send to client
//! ```

pub mod server;
pub mod static_files;

pub use server::{AppState, HttpServer};
pub use static_files::StaticFiles;
