//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Question service call:
//!     → policy.rs (Resilient::call)
//!     → circuit_breaker.rs (permit or fail fast)
//!     → timeouts.rs (per-attempt deadline)
//!     → On failure: retries.rs + backoff.rs (wait, then next attempt)
//!     → Exhausted or rejected: caller's fallback produces the degraded value
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every remote attempt has a deadline
//! - Every attempt is recorded by the circuit breaker
//! - Fallbacks return a well-formed value tagged `Outcome::Degraded`,
//!   never an error

pub mod backoff;
pub mod circuit_breaker;
pub mod policy;
pub mod retries;
pub mod timeouts;

use std::time::Duration;

use thiserror::Error;

pub use circuit_breaker::{CallNotPermitted, CallPermit, CircuitBreaker, CircuitSnapshot, CircuitState};
pub use policy::{Outcome, Resilient};
pub use retries::RetryPolicy;

/// Why a protected call did not produce a value.
#[derive(Debug, Error)]
pub enum ResilienceError<E> {
    #[error("circuit breaker '{name}' is open")]
    CircuitOpen { name: String },

    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    #[error("call failed: {0}")]
    Call(E),
}

impl<E> ResilienceError<E> {
    /// Metric label for this failure.
    pub fn kind(&self) -> &'static str {
        match self {
            ResilienceError::CircuitOpen { .. } => "circuit_open",
            ResilienceError::Timeout(_) => "timeout",
            ResilienceError::Call(_) => "error",
        }
    }
}

impl<E> From<CallNotPermitted> for ResilienceError<E> {
    fn from(err: CallNotPermitted) -> Self {
        ResilienceError::CircuitOpen { name: err.name }
    }
}
