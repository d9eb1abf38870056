//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (tracing, body limit, request ID)
//! - Answer every oversized body with the relay's JSON 413 and CORS
//! - Answer preflight requests on every path
//! - Hand POSTs on the relay path to the relay
//! - Fall through to static assets for everything else
//! - Bind server to listener and shut down gracefully

use std::error::Error as StdError;
use std::io;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::ACCESS_CONTROL_ALLOW_ORIGIN, Method, Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    Router,
};
use http_body_util::LengthLimitError;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{EndpointConfig, NonPostPolicy, RelayConfig};
use crate::http::static_files::{self, StaticFiles};
use crate::observability::logging;
use crate::relay::{Relay, RelayError, SetupError, Upstream};
use crate::security::{limits, CorsPolicy};

/// Application state injected into handlers.
pub struct AppState<U> {
    pub relay: Arc<Relay<U>>,
    pub endpoint: EndpointConfig,
    pub static_files: Option<Arc<StaticFiles>>,
}

impl<U> Clone for AppState<U> {
    fn clone(&self) -> Self {
        Self {
            relay: self.relay.clone(),
            endpoint: self.endpoint.clone(),
            static_files: self.static_files.clone(),
        }
    }
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a server forwarding to the configured upstream.
    pub fn new(config: RelayConfig) -> Result<Self, SetupError> {
        let relay = Relay::from_config(&config, CorsPolicy::server_preflight())?;
        Ok(Self::with_relay(config, relay))
    }

    /// Create a server around an existing relay.
    pub fn with_relay<U: Upstream + 'static>(config: RelayConfig, relay: Relay<U>) -> Self {
        let static_files = config
            .static_files
            .enabled
            .then(|| Arc::new(StaticFiles::from_config(&config.static_files)));

        let state = AppState {
            relay: Arc::new(relay),
            endpoint: config.endpoint.clone(),
            static_files,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router<U: Upstream + 'static>(config: &RelayConfig, state: AppState<U>) -> Router {
        let relay = state.relay.clone();
        Router::new()
            .fallback(dispatch::<U>)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(
                        TraceLayer::new_for_http().make_span_with(logging::request_span::<Body>),
                    )
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(middleware::from_fn_with_state(relay, relay_rejections::<U>))
                    .layer(limits::body_limit_layer(&config.security)),
            )
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            relay_path = %self.config.endpoint.path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

/// Route one request: preflight, relay or static asset.
async fn dispatch<U: Upstream + 'static>(
    State(state): State<AppState<U>>,
    request: Request<Body>,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    tracing::debug!(method = %method, path = %path, "Incoming request");

    if method == Method::OPTIONS {
        return state.relay.preflight().map(Body::from);
    }

    let relay_path = path == state.endpoint.path;
    if relay_path && (method == Method::POST || state.endpoint.non_post == NonPostPolicy::Reject) {
        return relay_request(&state.relay, request).await;
    }

    match &state.static_files {
        Some(files) => files.serve(&path).await,
        None => static_files::not_found(),
    }
}

async fn relay_request<U: Upstream>(relay: &Relay<U>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) if exceeds_limit(&err) => {
            return relay.reject(RelayError::BodyTooLarge).map(Body::from)
        }
        Err(err) => return relay.reject(RelayError::BodyRead(err)).map(Body::from),
    };
    relay.handle(Request::from_parts(parts, bytes)).await.map(Body::from)
}

/// Whether a body read failed because the limit layer cut a streamed body off.
fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(err) = source {
        if err.is::<LengthLimitError>() {
            return true;
        }
        source = err.source();
    }
    false
}

/// The limit layer answers a declared oversized `Content-Length` itself,
/// before dispatch. Replace that answer with the relay's JSON error so every
/// 413 carries CORS, however the body was framed.
async fn relay_rejections<U: Upstream + 'static>(
    State(relay): State<Arc<Relay<U>>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE
        && !response.headers().contains_key(ACCESS_CONTROL_ALLOW_ORIGIN)
    {
        return relay.reject(RelayError::BodyTooLarge).map(Body::from);
    }
    response
}
