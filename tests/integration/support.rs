//! Shared fakes for engine integration tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use screen_insight::{BackendClient, EngineConfig, Orchestrator, RetryPolicy, TextBackend};
use screen_insight_llm::{BackendError, BackendResult};

/// Backend that replays scripted failures, then answers with a fixed reply.
///
/// Prompts containing `slow_marker` are held for `slow_delay` first.
pub struct ScriptedBackend {
    reply: String,
    failures: Mutex<VecDeque<BackendError>>,
    slow_marker: Option<(String, Duration)>,
    calls: AtomicU32,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            failures: Mutex::new(VecDeque::new()),
            slow_marker: None,
            calls: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fail with each error in turn before replying.
    pub fn failing_first(mut self, failures: Vec<BackendError>) -> Self {
        self.failures = Mutex::new(failures.into());
        self
    }

    /// Always fail with `err`.
    pub fn always_failing(err: BackendError) -> Self {
        Self::replying("unused").failing_first(vec![err; 64])
    }

    pub fn slow_when(mut self, marker: &str, delay: Duration) -> Self {
        self.slow_marker = Some((marker.to_string(), delay));
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl TextBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }

    async fn generate(&self, prompt: &str, _timeout: Duration) -> BackendResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());

        if let Some((marker, delay)) = &self.slow_marker {
            if prompt.contains(marker.as_str()) {
                tokio::time::sleep(*delay).await;
            }
        }

        let next_failure = self.failures.lock().pop_front();
        match next_failure {
            Some(err) => Err(err),
            None => Ok(self.reply.clone()),
        }
    }

    async fn health_check(&self) -> BackendResult<()> {
        Ok(())
    }
}

/// Retry policy with millisecond waits.
pub fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(2),
        max_delay: Duration::from_millis(5),
        jitter: 0.0,
        attempt_timeout: Duration::from_secs(5),
    }
}

pub fn engine_with(
    backend: Arc<ScriptedBackend>,
    config: EngineConfig,
    max_attempts: u32,
) -> Orchestrator {
    let client = BackendClient::new(backend, fast_policy(max_attempts));
    Orchestrator::new(config, client).unwrap()
}

pub fn engine(backend: Arc<ScriptedBackend>) -> Orchestrator {
    engine_with(backend, EngineConfig::default(), 3)
}
