//! Timeout enforcement.
//!
//! Every question service attempt runs under a deadline; an elapsed deadline
//! is reported as `ResilienceError::Timeout` and counts as a failed call.

use std::future::Future;
use std::time::Duration;

use crate::resilience::ResilienceError;

/// Run one attempt under `deadline`.
pub async fn with_timeout<T, E, F>(deadline: Duration, attempt: F) -> Result<T, ResilienceError<E>>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(deadline, attempt).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ResilienceError::Call(e)),
        Err(_) => Err(ResilienceError::Timeout(deadline)),
    }
}
