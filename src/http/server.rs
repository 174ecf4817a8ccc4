//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the relay handler
//! - Wire up middleware (request ID, tracing, inbound timeout, assertion gate)
//! - Build the pooled backend client with its timeouts
//! - Serve until the shutdown signal, draining in-flight requests

use std::sync::Arc;

use axum::{http::StatusCode, middleware, routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use url::Url;

use crate::config::GatewayConfig;
use crate::error::StartupError;
use crate::http::middleware::assertion::require_assertion;
use crate::http::relay::relay_handler;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::resilience::RetryPolicy;

/// Application state injected into the relay handler.
///
/// Everything here is read-only; the client pool is the only shared resource.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<Url>,
    pub client: reqwest::Client,
    pub retry: RetryPolicy,
    pub max_body_size: usize,
}

impl AppState {
    /// Build state from a validated configuration.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, StartupError> {
        let backend = Url::parse(&config.backend.url)?;

        // Redirects are relayed to the caller, not followed here.
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeouts.connect())
            .timeout(config.timeouts.request())
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()?;

        Ok(Self {
            backend: Arc::new(backend),
            client,
            retry: RetryPolicy::new(&config.retries),
            max_body_size: config.limits.max_body_size,
        })
    }
}

/// HTTP server for the edge gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<GatewayConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let state = AppState::from_config(&config)?;
        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config: Arc::new(config),
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The last layer added runs first: request ID, trace, timeout, then the
    /// assertion gate ahead of the relay. The body size limit is enforced by
    /// the relay when it reads the body, so a `GET` body is dropped unread.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(relay_handler))
            .route("/{*path}", any(relay_handler))
            .with_state(state)
            .layer(middleware::from_fn(require_assertion))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::GATEWAY_TIMEOUT,
                config.timeouts.inbound(),
            ))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The assembled router, for serving or for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.config.backend.url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
