//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, thresholds within (0, 100])
//! - The request timeout must outlast the worst-case retry sequence so the
//!   degraded response is the one that reaches the caller
//! - Check that addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: invalid URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} must be within (0, 100], got {value}")]
    OutOfRange { field: &'static str, value: f32 },

    #[error("timeouts.request_secs ({request_ms}ms) must exceed the worst-case question service call ({budget_ms}ms)")]
    RequestTimeoutTooShort { request_ms: u64, budget_ms: u64 },

    #[error("{field} ({value}) must not exceed {limit_field} ({limit})")]
    Exceeds {
        field: &'static str,
        value: u64,
        limit_field: &'static str,
        limit: u64,
    },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    match url::Url::parse(&config.question_service.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        _ => errors.push(ValidationError::InvalidUrl {
            field: "question_service.base_url",
            value: config.question_service.base_url.clone(),
        }),
    }

    let retry = &config.resilience.retry;
    check_nonzero(&mut errors, "resilience.retry.max_attempts", retry.max_attempts as u64);
    check_nonzero(&mut errors, "resilience.retry.call_timeout_ms", retry.call_timeout_ms);
    if retry.base_delay_ms > retry.max_delay_ms {
        errors.push(ValidationError::Exceeds {
            field: "resilience.retry.base_delay_ms",
            value: retry.base_delay_ms,
            limit_field: "resilience.retry.max_delay_ms",
            limit: retry.max_delay_ms,
        });
    }

    let cb = &config.resilience.circuit_breaker;
    check_nonzero(
        &mut errors,
        "resilience.circuit_breaker.sliding_window_size",
        cb.sliding_window_size as u64,
    );
    check_nonzero(
        &mut errors,
        "resilience.circuit_breaker.minimum_calls",
        cb.minimum_calls as u64,
    );
    check_nonzero(
        &mut errors,
        "resilience.circuit_breaker.half_open_trial_calls",
        cb.half_open_trial_calls as u64,
    );
    if cb.minimum_calls > cb.sliding_window_size {
        errors.push(ValidationError::Exceeds {
            field: "resilience.circuit_breaker.minimum_calls",
            value: cb.minimum_calls as u64,
            limit_field: "resilience.circuit_breaker.sliding_window_size",
            limit: cb.sliding_window_size as u64,
        });
    }
    let threshold = cb.failure_rate_threshold;
    if !(threshold > 0.0 && threshold <= 100.0) {
        errors.push(ValidationError::OutOfRange {
            field: "resilience.circuit_breaker.failure_rate_threshold",
            value: cb.failure_rate_threshold,
        });
    }

    check_nonzero(&mut errors, "timeouts.request_secs", config.timeouts.request_secs);
    let request_ms = config.timeouts.request_secs.saturating_mul(1000);
    let budget_ms = retry.worst_case_ms();
    if request_ms > 0 && request_ms <= budget_ms {
        errors.push(ValidationError::RequestTimeoutTooShort { request_ms, budget_ms });
    }
    check_nonzero(&mut errors, "security.max_body_size", config.security.max_body_size as u64);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_nonzero(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::Zero { field });
    }
}
