//! Bounded, retrying oracle calls

use crate::error::OracleError;
use backon::{ExponentialBuilder, Retryable};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: usize = 2;
const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(200);

/// One call contract for every oracle, independent of transport.
///
/// Each attempt is bounded by `timeout`; transient failures
/// ([`OracleError::is_transient`]) are retried with exponential backoff.
#[derive(Debug, Clone, Copy)]
pub struct OracleGuard {
    timeout: Duration,
    max_retries: usize,
    min_delay: Duration,
}

impl OracleGuard {
    pub fn new(timeout: Duration, max_retries: usize) -> Self {
        Self {
            timeout,
            max_retries,
            min_delay: DEFAULT_MIN_DELAY,
        }
    }

    /// Set the first backoff delay
    pub fn with_min_delay(mut self, min_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Run `op`, propagating the final error
    pub async fn call<T, F, Fut>(&self, oracle: &'static str, mut op: F) -> Result<T, OracleError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, OracleError>>,
    {
        let timeout = self.timeout;
        let attempt = || {
            let pending = op();
            async move {
                match tokio::time::timeout(timeout, pending).await {
                    Ok(result) => result,
                    Err(_) => Err(OracleError::Timeout {
                        oracle,
                        after: timeout,
                    }),
                }
            }
        };

        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_times(self.max_retries);

        attempt
            .retry(backoff)
            .when(OracleError::is_transient)
            .notify(|err: &OracleError, delay: Duration| {
                warn!(
                    oracle,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "Oracle call failed, retrying"
                );
            })
            .await
    }

    /// Run `op`, substituting `fallback` on any failure
    pub async fn call_or_else<T, F, Fut, D>(&self, oracle: &'static str, op: F, fallback: D) -> T
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, OracleError>>,
        D: FnOnce(&OracleError) -> T,
    {
        match self.call(oracle, op).await {
            Ok(value) => value,
            Err(err) => {
                warn!(oracle, error = %err, "Oracle unavailable, using fallback");
                fallback(&err)
            }
        }
    }
}

impl Default for OracleGuard {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_MAX_RETRIES)
    }
}
