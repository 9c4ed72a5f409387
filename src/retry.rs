//! Retry logic with exponential backoff
//!
//! The pipeline itself never retries: a failed image fetch is recorded and
//! the job moves on. Callers that want a retry policy around the whole job
//! (or around individual fetches through [`crate::fetcher::Fetcher`]) can
//! wrap the operation with [`with_retry`].
//!
//! # Example
//!
//! ```no_run
//! use pagepack::retry::with_retry;
//! use pagepack::config::RetryConfig;
//! use pagepack::error::Error;
//!
//! # async fn example() -> Result<(), Error> {
//! let config = RetryConfig::default();
//! let result = with_retry(&config, || async {
//!     Ok::<_, Error>("success")
//! }).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::{Error, TransportError};
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, connection resets, server overload) should
/// return `true`. Permanent failures (bad input, undecodable images) should
/// return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for TransportError {
    fn is_retryable(&self) -> bool {
        match self {
            TransportError::Request { source, .. } => source.is_timeout() || source.is_connect(),
            // Server-side trouble is worth another attempt; client errors
            // like 404 are permanent.
            TransportError::Status { status, .. } => *status >= 500 || *status == 429,
        }
    }
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(e) => e.is_retryable(),
            Error::Network(e) => e.is_timeout() || e.is_connect(),
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
            ),
            // Bad input, bad images, packaging failures, and cancellation
            // stay failed no matter how often they are attempted.
            Error::Input(_)
            | Error::Processing(_)
            | Error::Packaging(_)
            | Error::NoImagesFound
            | Error::AllImagesFailed { .. }
            | Error::Cancelled => false,
        }
    }
}

/// Execute an async operation with exponential backoff retry logic
///
/// Returns the successful result, or the last error once the error is
/// non-retryable or the attempt budget is exhausted.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                attempt += 1;

                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis(),
                    "operation failed, retrying"
                );

                let jittered = if config.jitter { add_jitter(delay) } else { delay };
                tokio::time::sleep(jittered).await;

                let next = Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier);
                delay = next.min(config.max_delay);
            }
            Err(e) => {
                tracing::error!(error = %e, attempts = attempt + 1, "operation failed");
                return Err(e);
            }
        }
    }
}

/// Add random jitter to a delay to prevent thundering herd
///
/// Uniformly distributed between 0% and 100% of the delay, so the actual
/// wait lands between `delay` and `2 × delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}
