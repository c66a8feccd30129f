//! Circuit breaker for the question service.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls fail fast
//! - Half-Open: a few trial calls decide whether it recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure rate >= threshold over the rolling window
//!                (once at least `minimum_calls` are recorded)
//! Open → Half-Open: first call after the cooldown
//! Half-Open → Closed: all trial calls succeed
//! Half-Open → Open: any trial call fails (cooldown restarts)
//! ```
//!
//! # Design Decisions
//! - Count-based window of the most recent outcomes
//! - State and window share one mutex so transitions and recordings never interleave
//! - Outcomes reported against an older state generation are discarded
//! - Permits are RAII guards; an abandoned trial permit frees its slot

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;

use crate::config::CircuitBreakerConfig;
use crate::observability::metrics;

/// Externally visible circuit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    /// Gauge encoding: 0 closed, 1 half-open, 2 open.
    pub fn as_gauge(self) -> f64 {
        match self {
            CircuitState::Closed => 0.0,
            CircuitState::HalfOpen => 1.0,
            CircuitState::Open => 2.0,
        }
    }
}

/// Returned when the circuit rejects a call.
#[derive(Debug, Clone, Error)]
#[error("circuit breaker '{name}' does not permit further calls")]
pub struct CallNotPermitted {
    pub name: String,
}

#[derive(Debug)]
enum Phase {
    Closed,
    Open { until: Instant },
    HalfOpen { in_flight: u32, succeeded: u32 },
}

impl Phase {
    fn state(&self) -> CircuitState {
        match self {
            Phase::Closed => CircuitState::Closed,
            Phase::Open { .. } => CircuitState::Open,
            Phase::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }
}

#[derive(Debug)]
struct Inner {
    phase: Phase,
    /// Bumped on every transition.
    generation: u64,
    /// Most recent outcomes while closed; `true` marks a failure.
    window: VecDeque<bool>,
}

/// Point-in-time view of a breaker, for the admin endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CircuitSnapshot {
    pub name: String,
    pub state: CircuitState,
    /// `None` until `minimum_calls` outcomes are buffered.
    pub failure_rate: Option<f32>,
    pub buffered_calls: usize,
    pub failed_calls: usize,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let name = name.into();
        metrics::record_circuit_state(&name, CircuitState::Closed);
        Self {
            name,
            inner: Mutex::new(Inner {
                phase: Phase::Closed,
                generation: 0,
                window: VecDeque::with_capacity(config.sliding_window_size),
            }),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> CircuitState {
        self.lock().phase.state()
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        let inner = self.lock();
        let failed_calls = inner.window.iter().filter(|failed| **failed).count();
        CircuitSnapshot {
            name: self.name.clone(),
            state: inner.phase.state(),
            failure_rate: self.failure_rate(&inner.window),
            buffered_calls: inner.window.len(),
            failed_calls,
        }
    }

    /// Ask for permission to make one call.
    pub fn try_acquire(self: &Arc<Self>) -> Result<CallPermit, CallNotPermitted> {
        let mut inner = self.lock();
        let trials = self.config.half_open_trial_calls;

        let trial = match inner.phase {
            Phase::Closed => false,
            Phase::Open { until } if Instant::now() < until => return Err(self.rejected()),
            Phase::Open { .. } => {
                self.transition(&mut inner, Phase::HalfOpen { in_flight: 1, succeeded: 0 });
                true
            }
            Phase::HalfOpen { in_flight, succeeded } => {
                if in_flight + succeeded >= trials {
                    return Err(self.rejected());
                }
                inner.phase = Phase::HalfOpen {
                    in_flight: in_flight + 1,
                    succeeded,
                };
                true
            }
        };

        Ok(CallPermit {
            breaker: self.clone(),
            generation: inner.generation,
            trial,
            settled: false,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Every update under the lock leaves `Inner` consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rejected(&self) -> CallNotPermitted {
        CallNotPermitted {
            name: self.name.clone(),
        }
    }

    fn failure_rate(&self, window: &VecDeque<bool>) -> Option<f32> {
        if window.is_empty() || window.len() < self.config.minimum_calls {
            return None;
        }
        let failed = window.iter().filter(|failed| **failed).count();
        Some(failed as f32 * 100.0 / window.len() as f32)
    }

    fn transition(&self, inner: &mut Inner, next: Phase) {
        let from = inner.phase.state();
        let to = next.state();
        inner.phase = next;
        inner.generation += 1;
        inner.window.clear();

        match to {
            CircuitState::Open => tracing::warn!(circuit = %self.name, ?from, ?to, "Circuit opened"),
            _ => tracing::info!(circuit = %self.name, ?from, ?to, "Circuit state changed"),
        }
        metrics::record_circuit_state(&self.name, to);
    }

    fn open(&self, inner: &mut Inner) {
        let until = Instant::now() + self.config.wait_in_open();
        self.transition(inner, Phase::Open { until });
    }

    fn record(&self, generation: u64, failed: bool) {
        let mut inner = self.lock();
        if inner.generation != generation {
            return;
        }

        match inner.phase {
            Phase::Closed => {
                if inner.window.len() >= self.config.sliding_window_size {
                    inner.window.pop_front();
                }
                inner.window.push_back(failed);

                if let Some(rate) = self.failure_rate(&inner.window) {
                    if rate >= self.config.failure_rate_threshold {
                        tracing::debug!(circuit = %self.name, failure_rate = rate, "Failure rate threshold reached");
                        self.open(&mut inner);
                    }
                }
            }
            Phase::HalfOpen { in_flight, succeeded } => {
                let in_flight = in_flight.saturating_sub(1);
                if failed {
                    self.open(&mut inner);
                } else if succeeded + 1 >= self.config.half_open_trial_calls {
                    self.transition(&mut inner, Phase::Closed);
                } else {
                    inner.phase = Phase::HalfOpen {
                        in_flight,
                        succeeded: succeeded + 1,
                    };
                }
            }
            Phase::Open { .. } => {}
        }
    }

    fn release(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.generation != generation {
            return;
        }
        if let Phase::HalfOpen { ref mut in_flight, .. } = inner.phase {
            *in_flight = in_flight.saturating_sub(1);
        }
    }
}

/// Permission for a single call. Report the outcome with `success` or `failure`.
#[derive(Debug)]
pub struct CallPermit {
    breaker: Arc<CircuitBreaker>,
    generation: u64,
    trial: bool,
    settled: bool,
}

impl CallPermit {
    /// Whether this call is a half-open trial.
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    pub fn success(mut self) {
        self.settled = true;
        self.breaker.record(self.generation, false);
    }

    pub fn failure(mut self) {
        self.settled = true;
        self.breaker.record(self.generation, true);
    }
}

impl Drop for CallPermit {
    fn drop(&mut self) {
        if !self.settled && self.trial {
            self.breaker.release(self.generation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn breaker(window: usize, minimum: usize, threshold: f32, trials: u32) -> Arc<CircuitBreaker> {
        Arc::new(CircuitBreaker::new(
            "test",
            CircuitBreakerConfig {
                sliding_window_size: window,
                minimum_calls: minimum,
                failure_rate_threshold: threshold,
                wait_in_open_ms: 1000,
                half_open_trial_calls: trials,
            },
        ))
    }

    fn fail(cb: &Arc<CircuitBreaker>, n: usize) {
        for _ in 0..n {
            cb.try_acquire().expect("permitted").failure();
        }
    }

    fn succeed(cb: &Arc<CircuitBreaker>, n: usize) {
        for _ in 0..n {
            cb.try_acquire().expect("permitted").success();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_starts_closed() {
        let cb = breaker(10, 5, 50.0, 1);
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.snapshot().failure_rate.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_evaluated_below_minimum_calls() {
        let cb = breaker(10, 5, 50.0, 1);
        fail(&cb, 4);
        assert_eq!(cb.state(), CircuitState::Closed);
        fail(&cb, 1);
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_opens_at_threshold() {
        let cb = breaker(4, 4, 50.0, 1);
        succeed(&cb, 2);
        fail(&cb, 1);
        assert_eq!(cb.state(), CircuitState::Closed);
        fail(&cb, 1);
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_rolls_old_outcomes_out() {
        let cb = breaker(4, 4, 75.0, 1);
        fail(&cb, 2);
        succeed(&cb, 2);
        // Window [F, F, S, S] → 50%.
        assert_eq!(cb.state(), CircuitState::Closed);
        succeed(&cb, 2);
        // Window [S, S, S, S]; earlier failures rolled out.
        assert_eq!(cb.snapshot().failed_calls, 0);
        fail(&cb, 2);
        assert_eq!(cb.state(), CircuitState::Closed);
        fail(&cb, 1);
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_rejects_until_cooldown() {
        let cb = breaker(2, 2, 50.0, 1);
        fail(&cb, 2);
        assert!(cb.try_acquire().is_err());

        tokio::time::advance(Duration::from_millis(999)).await;
        assert!(cb.try_acquire().is_err());

        tokio::time::advance(Duration::from_millis(1)).await;
        let permit = cb.try_acquire().expect("trial permitted");
        assert!(permit.is_trial());
        assert_eq!(cb.state(), CircuitState::HalfOpen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_success_closes() {
        let cb = breaker(2, 2, 50.0, 1);
        fail(&cb, 2);
        tokio::time::advance(Duration::from_secs(1)).await;

        cb.try_acquire().unwrap().success();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.snapshot().buffered_calls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_failure_reopens() {
        let cb = breaker(2, 2, 50.0, 2);
        fail(&cb, 2);
        tokio::time::advance(Duration::from_secs(1)).await;

        cb.try_acquire().unwrap().success();
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.try_acquire().unwrap().failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(cb.try_acquire().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_limits_trial_calls() {
        let cb = breaker(2, 2, 50.0, 2);
        fail(&cb, 2);
        tokio::time::advance(Duration::from_secs(1)).await;

        let first = cb.try_acquire().unwrap();
        let second = cb.try_acquire().unwrap();
        assert!(cb.try_acquire().is_err());

        // An abandoned trial frees its slot.
        drop(second);
        let third = cb.try_acquire().expect("slot released");

        first.success();
        third.success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_outcome_ignored() {
        let cb = breaker(2, 2, 50.0, 1);
        let late = cb.try_acquire().unwrap();
        fail(&cb, 2);
        assert_eq!(cb.state(), CircuitState::Open);

        // Started while closed, finishes after the circuit opened.
        late.success();
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn test_concurrent_recordings_not_lost() {
        let cb = breaker(1000, 1000, 100.0, 1);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let cb = cb.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    cb.try_acquire().unwrap().success();
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(cb.snapshot().buffered_calls, 400);
    }

    #[test]
    fn test_poisoned_lock_keeps_serving() {
        let cb = breaker(4, 2, 50.0, 1);
        let holder = cb.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.inner.lock().unwrap();
            panic!("panicked while holding the breaker lock");
        })
        .join();
        assert!(cb.inner.is_poisoned());

        cb.try_acquire().unwrap().success();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.snapshot().buffered_calls, 1);
    }
}
