//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize logging and metrics from configuration
//! - Build the store, question service client and resilience policy
//!   in dependency order and wire them into the orchestrator

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::observability::{logging, metrics};
use crate::provider::{HttpQuestionProvider, ProviderError};
use crate::quiz::QuizOrchestrator;
use crate::resilience::Resilient;
use crate::store::MemoryQuizStore;

/// Name of the circuit guarding the question service.
pub const QUESTION_SERVICE: &str = "questionService";

/// Logging first, then the metrics exporter when enabled.
pub fn init_observability(config: &ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging(&config.observability)?;

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }
    Ok(())
}

/// Wire the orchestrator's collaborators from configuration.
pub fn build_orchestrator(config: &ServiceConfig) -> Result<Arc<QuizOrchestrator>, ProviderError> {
    let store = Arc::new(MemoryQuizStore::new());
    let provider = Arc::new(HttpQuestionProvider::new(&config.question_service)?);
    let resilient = Resilient::from_config(QUESTION_SERVICE, &config.resilience);

    tracing::info!(
        question_service = %config.question_service.base_url,
        max_attempts = config.resilience.retry.max_attempts,
        failure_rate_threshold = config.resilience.circuit_breaker.failure_rate_threshold,
        wait_in_open_ms = config.resilience.circuit_breaker.wait_in_open_ms,
        "Quiz orchestrator initialized"
    );

    Ok(Arc::new(QuizOrchestrator::new(store, provider, resilient)))
}
