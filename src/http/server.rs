//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Bind server to listener and drain on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::http::middleware::{request_span, track_metrics};
use crate::lifecycle::{shutdown, startup};
use crate::provider::ProviderError;
use crate::quiz::QuizOrchestrator;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<QuizOrchestrator>,
}

/// HTTP server for the quiz service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    orchestrator: Arc<QuizOrchestrator>,
}

impl HttpServer {
    /// Create a server backed by the configured question service.
    pub fn new(config: ServiceConfig) -> Result<Self, ProviderError> {
        let orchestrator = startup::build_orchestrator(&config)?;
        Ok(Self::with_orchestrator(config, orchestrator))
    }

    /// Create a server around an already wired orchestrator.
    pub fn with_orchestrator(config: ServiceConfig, orchestrator: Arc<QuizOrchestrator>) -> Self {
        let state = AppState {
            orchestrator: orchestrator.clone(),
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            orchestrator,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/quiz/create", post(handlers::create_quiz))
            .route("/quiz/get/{id}", get(handlers::get_quiz_questions))
            .route("/quiz/submit/{id}", post(handlers::submit_quiz))
            .route("/health", get(handlers::health))
            .route("/admin/circuit", get(handlers::circuit_status))
            .with_state(state)
            .layer(middleware::from_fn(track_metrics))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, shutdown_rx: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown::wait(shutdown_rx).await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &Arc<QuizOrchestrator> {
        &self.orchestrator
    }
}
