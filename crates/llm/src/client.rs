//! Retrying Backend Client
//!
//! Wraps a `TextBackend` with bounded retries, exponential backoff with
//! jitter, a per-attempt timeout and cooperative cancellation.

use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::provider::TextBackend;
use crate::types::{BackendConfig, BackendError, BackendResult, Generation};

/// Retry behaviour for one logical generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Randomization factor applied to each delay
    pub jitter: f64,
    /// Upper bound on a single attempt
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
            jitter: config.retry_jitter,
            attempt_timeout: config.timeout(),
        }
    }

    /// Fresh backoff schedule: base, base*2, base*4 ... capped at `max_delay`.
    fn schedule(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.base_delay)
            .with_multiplier(2.0)
            .with_max_interval(self.max_delay)
            .with_randomization_factor(self.jitter)
            .with_max_elapsed_time(None)
            .build()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&BackendConfig::default())
    }
}

/// The only component that talks to a backend on the engine's behalf.
#[derive(Clone)]
pub struct BackendClient {
    backend: Arc<dyn TextBackend>,
    policy: RetryPolicy,
}

impl BackendClient {
    pub fn new(backend: Arc<dyn TextBackend>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Check the backend once, without retries.
    pub async fn health_check(&self) -> BackendResult<()> {
        self.backend.health_check().await
    }

    /// Generate text for `prompt` with retries and no external cancellation.
    pub async fn generate(&self, prompt: &str) -> BackendResult<Generation> {
        self.generate_with_cancel(prompt, &CancellationToken::new())
            .await
    }

    /// Generate text for `prompt`, giving up early when `cancel` fires.
    ///
    /// Retries only `Unavailable` and `Timeout`. The returned error carries
    /// the number of attempts made.
    pub async fn generate_with_cancel(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> BackendResult<Generation> {
        let started = Instant::now();
        let max_attempts = self.policy.max_attempts;
        let mut schedule = self.policy.schedule();
        let mut last_err: Option<BackendError> = None;

        for attempt in 1..=max_attempts {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => Err(BackendError::cancelled("request cancelled")),
                result = self.attempt(prompt) => result,
            };

            let err = match outcome {
                Ok(text) => {
                    return Ok(Generation {
                        text,
                        attempts: attempt,
                        latency_ms: started.elapsed().as_millis() as u64,
                    });
                }
                Err(err) => err,
            };

            if !err.is_retryable() || attempt == max_attempts {
                return Err(BackendError {
                    attempts: attempt,
                    ..err
                });
            }

            let wait = schedule.next_backoff().unwrap_or(self.policy.max_delay);

            tracing::warn!(
                backend = self.backend.name(),
                attempt,
                max_attempts,
                wait_ms = wait.as_millis() as u64,
                error = %err,
                "generate: retryable error, backing off"
            );

            last_err = Some(err);

            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(BackendError {
                        attempts: attempt,
                        ..BackendError::cancelled("request cancelled during backoff")
                    });
                }
                _ = tokio::time::sleep(wait) => {}
            }
        }

        Err(last_err.unwrap_or_else(|| BackendError::unavailable("retry attempts exhausted")))
    }

    /// A single bounded attempt.
    async fn attempt(&self, prompt: &str) -> BackendResult<String> {
        let timeout = self.policy.attempt_timeout;
        match tokio::time::timeout(timeout, self.backend.generate(prompt, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::timeout(format!(
                "{}: attempt exceeded {:?}",
                self.backend.name(),
                timeout
            ))),
        }
    }
}
