//! Static asset serving for the standalone server.
//!
//! # Responsibilities
//! - Map a request path onto a file under the configured root
//! - Pick the content type from the file extension
//! - Answer 404/500 in plain text when the file cannot be read
//!
//! # Design Decisions
//! - Only normal path components are accepted; `..`, `.` and absolute
//!   segments resolve to nothing and are answered 404
//! - Files are read whole, assets are small

use std::io;
use std::path::{Component, Path, PathBuf};

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::config::StaticFilesConfig;

/// Content type for `path`, by extension.
pub fn mime_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html",
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") => "image/jpg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    index: String,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>, index: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            index: index.into(),
        }
    }

    pub fn from_config(config: &StaticFilesConfig) -> Self {
        Self::new(&config.root, &config.index)
    }

    /// File backing `uri_path`, if the path stays inside the root.
    pub fn resolve(&self, uri_path: &str) -> Option<PathBuf> {
        let relative = uri_path.trim_start_matches('/');
        let relative = if relative.is_empty() {
            self.index.as_str()
        } else {
            relative
        };

        let mut path = self.root.clone();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => path.push(part),
                _ => return None,
            }
        }
        Some(path)
    }

    pub async fn serve(&self, uri_path: &str) -> Response {
        let Some(path) = self.resolve(uri_path) else {
            tracing::debug!(path = %uri_path, "Rejected path outside static root");
            return not_found();
        };

        match tokio::fs::read(&path).await {
            Ok(content) => (StatusCode::OK, [(CONTENT_TYPE, mime_type(&path))], content).into_response(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => not_found(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read static file");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(CONTENT_TYPE, "text/plain")],
                    "500 Internal Server Error",
                )
                    .into_response()
            }
        }
    }
}

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, [(CONTENT_TYPE, "text/plain")], "404 Not Found").into_response()
}
