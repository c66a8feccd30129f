//! Resilience decorator.
//!
//! `Resilient` wraps any fallible async operation with the retry policy, the
//! per-attempt timeout and the shared circuit breaker. `call` additionally
//! takes a fallback that turns the final error into a degraded value.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ResilienceConfig;
use crate::observability::metrics;
use crate::resilience::circuit_breaker::CircuitBreaker;
use crate::resilience::retries::RetryPolicy;
use crate::resilience::timeouts::with_timeout;
use crate::resilience::ResilienceError;

/// Result of a protected call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The dependency answered.
    Success(T),
    /// The dependency was unavailable; the value came from the fallback.
    Degraded(T),
}

impl<T> Outcome<T> {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Success(v) | Outcome::Degraded(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Outcome::Success(v) | Outcome::Degraded(v) => v,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(v) => Outcome::Success(f(v)),
            Outcome::Degraded(v) => Outcome::Degraded(f(v)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Resilient {
    breaker: Arc<CircuitBreaker>,
    retry: RetryPolicy,
    call_timeout: Duration,
}

impl Resilient {
    pub fn new(breaker: Arc<CircuitBreaker>, retry: RetryPolicy, call_timeout: Duration) -> Self {
        Self {
            breaker,
            retry,
            call_timeout,
        }
    }

    /// Build the policy for one named dependency.
    pub fn from_config(name: &str, config: &ResilienceConfig) -> Self {
        Self::new(
            Arc::new(CircuitBreaker::new(name, config.circuit_breaker.clone())),
            RetryPolicy::from_config(&config.retry),
            config.retry.call_timeout(),
        )
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Run `call` under the policy, returning the last error on exhaustion.
    pub async fn execute<T, E, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T, ResilienceError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let permit = match self.breaker.try_acquire() {
                Ok(permit) => permit,
                Err(rejected) => {
                    tracing::debug!(operation, attempt, "Call short-circuited");
                    metrics::record_provider_call(operation, "circuit_open");
                    return Err(rejected.into());
                }
            };

            match with_timeout(self.call_timeout, call()).await {
                Ok(value) => {
                    permit.success();
                    metrics::record_provider_call(operation, "success");
                    return Ok(value);
                }
                Err(err) => {
                    permit.failure();
                    metrics::record_provider_call(operation, err.kind());

                    if !self.retry.should_retry(attempt) {
                        tracing::warn!(operation, attempts = attempt, error = %err, "Question service call failed");
                        return Err(err);
                    }

                    let delay = self.retry.delay_after(attempt);
                    tracing::info!(operation, attempt, delay = ?delay, error = %err, "Retrying question service call");
                    metrics::record_retry(operation);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Run `call` under the policy; on failure, `fallback` supplies a degraded value.
    pub async fn call<T, E, F, Fut, FB>(&self, operation: &'static str, call: F, fallback: FB) -> Outcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        FB: FnOnce(&ResilienceError<E>) -> T,
    {
        match self.execute(operation, call).await {
            Ok(value) => Outcome::Success(value),
            Err(err) => {
                tracing::warn!(operation, reason = err.kind(), "Question service degraded, using fallback");
                metrics::record_fallback(operation);
                Outcome::Degraded(fallback(&err))
            }
        }
    }
}
