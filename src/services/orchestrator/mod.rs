//! Analysis Orchestrator
//!
//! Owns every engine component and runs each submitted text through the
//! request pipeline on a background task. Results are committed to the
//! session store in submission order even when later requests finish first.

mod pipeline;

pub use pipeline::Stage;

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use screen_insight_core::{ActivityCategory, Clock, SystemClock};
use screen_insight_llm::{create_client, BackendClient, BackendResult};

use crate::models::{
    AnalysisRequest, AnalysisResult, EngineConfig, FallbackReason, SessionRecord,
    SessionSnapshot, SessionSummary,
};
use crate::services::cache::ResponseCache;
use crate::services::classifier::ActivityClassifier;
use crate::services::fallback::FallbackEngine;
use crate::services::prompt::{ContextBuilder, TemplateLibrary};
use crate::services::session::SessionStore;
use crate::utils::error::{AppError, AppResult};

// ============================================================================
// Engine
// ============================================================================

/// Shared, read-mostly state used by every request.
pub(crate) struct Engine {
    pub(crate) config: Arc<EngineConfig>,
    pub(crate) classifier: ActivityClassifier,
    pub(crate) library: TemplateLibrary,
    pub(crate) context_builder: ContextBuilder,
    pub(crate) client: BackendClient,
    pub(crate) fallback: FallbackEngine,
    pub(crate) cache: Arc<ResponseCache>,
    pub(crate) session: Arc<SessionStore>,
    pub(crate) clock: Arc<dyn Clock>,
    /// Bounds how many requests wait on the backend at once
    pub(crate) workers: Semaphore,
    in_flight: Mutex<HashMap<Uuid, CancellationToken>>,
}

impl Engine {
    fn new(config: EngineConfig, client: BackendClient, clock: Arc<dyn Clock>) -> Self {
        let analysis = &config.analysis;
        let ttl = i64::try_from(config.cache.ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds);
        let cache = match ttl {
            Some(ttl) if config.cache.enabled => {
                ResponseCache::new(config.cache.capacity, ttl, clock.clone())
            }
            Some(_) => ResponseCache::disabled(clock.clone()),
            None => {
                tracing::warn!(
                    ttl_secs = config.cache.ttl_secs,
                    "cache TTL out of range, caching disabled"
                );
                ResponseCache::disabled(clock.clone())
            }
        };

        Self {
            classifier: ActivityClassifier::new(),
            library: TemplateLibrary::new(&config.templates),
            context_builder: ContextBuilder::new(clock.clone(), analysis.context_window),
            fallback: FallbackEngine::new(analysis.max_questions),
            cache: Arc::new(cache),
            session: Arc::new(SessionStore::new(analysis.history_capacity, clock.clone())),
            workers: Semaphore::new(analysis.worker_count.max(1)),
            in_flight: Mutex::new(HashMap::new()),
            client,
            clock,
            config: Arc::new(config),
        }
    }
}

// ============================================================================
// Handles
// ============================================================================

/// A request that has been accepted and is running in the background.
#[derive(Debug)]
pub struct AnalysisHandle {
    request_id: Uuid,
    rx: oneshot::Receiver<AnalysisResult>,
}

impl AnalysisHandle {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Wait until the result has been committed to the session.
    pub async fn wait(self) -> AppResult<AnalysisResult> {
        self.rx.await.map_err(|_| {
            AppError::cancelled(format!(
                "engine shut down before request {} completed",
                self.request_id
            ))
        })
    }
}

struct PendingJob {
    request: Arc<AnalysisRequest>,
    started: Instant,
    task: JoinHandle<AnalysisResult>,
    reply: oneshot::Sender<AnalysisResult>,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Entry point of the engine.
///
/// Must be created inside a tokio runtime; the committer task is spawned on
/// it.
pub struct Orchestrator {
    engine: Arc<Engine>,
    runtime: Handle,
    jobs: mpsc::UnboundedSender<PendingJob>,
}

impl Orchestrator {
    /// Build an engine around an existing backend client.
    pub fn new(config: EngineConfig, client: BackendClient) -> AppResult<Self> {
        Self::with_clock(config, client, Arc::new(SystemClock))
    }

    /// Build an engine with an injected time source.
    pub fn with_clock(
        config: EngineConfig,
        client: BackendClient,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        config.validate().map_err(AppError::validation)?;
        let runtime = Handle::try_current()
            .map_err(|e| AppError::internal(format!("no tokio runtime: {}", e)))?;

        tracing::info!(
            backend = client.backend_name(),
            model = client.model(),
            workers = config.analysis.worker_count,
            cache = config.cache.enabled,
            "starting analysis engine"
        );

        let engine = Arc::new(Engine::new(config, client, clock));
        let (jobs, rx) = mpsc::unbounded_channel();
        runtime.spawn(commit_in_order(engine.clone(), rx));

        Ok(Self {
            engine,
            runtime,
            jobs,
        })
    }

    /// Build an engine and its backend client from configuration alone.
    pub fn from_config(config: EngineConfig) -> AppResult<Self> {
        let client = create_client(&config.backend).map_err(|e| AppError::config(e.to_string()))?;
        Self::new(config, client)
    }

    /// Accept a text for analysis and return immediately.
    ///
    /// Classification and rendering happen before this returns, so a
    /// template that needs a missing field fails here and nothing is
    /// recorded. Everything after rendering runs in the background.
    pub fn submit(
        &self,
        text: &str,
        hint: Option<ActivityCategory>,
    ) -> AppResult<AnalysisHandle> {
        let started = Instant::now();
        let request = Arc::new(pipeline::prepare(&self.engine, text, hint)?);
        let request_id = request.request_id;

        let cancel = CancellationToken::new();
        self.engine
            .in_flight
            .lock()
            .insert(request_id, cancel.clone());

        tracing::debug!(
            request_id = %request_id,
            category = %request.classification.category,
            confidence = request.classification.confidence,
            template = %request.template_id,
            "request accepted"
        );

        let task = self.runtime.spawn(pipeline::execute(
            self.engine.clone(),
            request.clone(),
            cancel,
            started,
        ));

        let (reply, rx) = oneshot::channel();
        let job = PendingJob {
            request,
            started,
            task,
            reply,
        };
        if let Err(mpsc::error::SendError(job)) = self.jobs.send(job) {
            job.task.abort();
            self.engine.in_flight.lock().remove(&request_id);
            return Err(AppError::internal("committer task has stopped"));
        }

        Ok(AnalysisHandle { request_id, rx })
    }

    /// Submit and wait for the committed result.
    pub async fn analyze(
        &self,
        text: &str,
        hint: Option<ActivityCategory>,
    ) -> AppResult<AnalysisResult> {
        self.submit(text, hint)?.wait().await
    }

    /// Cancel an in-flight request. It still completes, with a fallback
    /// result. Returns false when the request is unknown or already done.
    pub fn cancel(&self, request_id: Uuid) -> bool {
        match self.engine.in_flight.lock().get(&request_id) {
            Some(token) => {
                token.cancel();
                tracing::debug!(request_id = %request_id, "cancel requested");
                true
            }
            None => false,
        }
    }

    /// Number of accepted requests not yet committed.
    pub fn in_flight(&self) -> usize {
        self.engine.in_flight.lock().len()
    }

    /// Check the configured backend once.
    pub async fn backend_health(&self) -> BackendResult<()> {
        self.engine.client.health_check().await
    }

    pub fn recent_history(&self, n: usize) -> Vec<SessionRecord> {
        self.engine.session.recent(n)
    }

    pub fn recent_history_by_category(
        &self,
        category: ActivityCategory,
        n: usize,
    ) -> Vec<SessionRecord> {
        self.engine.session.recent_by_category(category, n)
    }

    pub fn export_snapshot(&self) -> SessionSnapshot {
        self.engine.session.export_snapshot()
    }

    pub fn summary(&self) -> SessionSummary {
        self.engine.session.summary()
    }

    pub fn session(&self) -> &SessionStore {
        &self.engine.session
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.engine.cache
    }

    pub fn config(&self) -> &EngineConfig {
        &self.engine.config
    }

    pub fn templates(&self) -> &TemplateLibrary {
        &self.engine.library
    }
}

/// Await each job in submission order, append its result and reply.
async fn commit_in_order(engine: Arc<Engine>, mut rx: mpsc::UnboundedReceiver<PendingJob>) {
    while let Some(job) = rx.recv().await {
        let request_id = job.request.request_id;
        let result = match job.task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "analysis task failed");
                pipeline::degraded(
                    &engine,
                    &job.request,
                    job.started,
                    FallbackReason::WorkerFailed,
                    0,
                )
            }
        };

        engine.in_flight.lock().remove(&request_id);
        let sequence_number = engine.session.append(result.clone());

        tracing::info!(
            request_id = %request_id,
            sequence_number,
            category = %result.category(),
            intent = %result.intent,
            source = %result.source,
            latency_ms = result.latency_ms,
            "analysis committed"
        );

        // The caller may have dropped its handle; the result is recorded anyway.
        let _ = job.reply.send(result);
    }
    tracing::debug!("committer stopped");
}
