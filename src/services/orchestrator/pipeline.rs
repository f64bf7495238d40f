//! Request Pipeline
//!
//! The per-request state machine:
//!
//! ```text
//! Classifying -> Rendering -> CacheLookup -> CacheHit -> ConfidenceCheck -> Done
//!                                         -> CacheMiss -> Backend -> BackendOk -> ConfidenceCheck -> Done
//!                                                                               \-> Fallback (merge) -> Done
//!                                                                 -> BackendFail -> Fallback -> Done
//! ```
//!
//! `prepare` covers Classifying and Rendering and runs on the submitting
//! task. `execute` covers the rest and runs on a background task.

use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use screen_insight_core::ActivityCategory;
use screen_insight_llm::BackendError;

use super::Engine;
use crate::models::{AnalysisRequest, AnalysisResult, FallbackReason, ResultSource};
use crate::services::cache::cache_key;
use crate::services::classifier::{extract_keywords, infer_intent};
use crate::services::prompt::{extract_suggestions, render};
use crate::utils::error::AppResult;

/// Pipeline stage, used for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Classifying,
    Rendering,
    CacheLookup,
    Backend,
    ConfidenceCheck,
    Fallback,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Classifying => "classifying",
            Stage::Rendering => "rendering",
            Stage::CacheLookup => "cache_lookup",
            Stage::Backend => "backend",
            Stage::ConfidenceCheck => "confidence_check",
            Stage::Fallback => "fallback",
            Stage::Done => "done",
        }
    }
}

fn enter(request_id: Uuid, stage: Stage) {
    tracing::trace!(request_id = %request_id, stage = stage.as_str(), "pipeline stage");
}

/// Classify, pick a template, build context and render.
///
/// Fails only with `TemplateFieldMissing`; nothing is recorded in that case.
pub(crate) fn prepare(
    engine: &Engine,
    text: &str,
    hint: Option<ActivityCategory>,
) -> AppResult<AnalysisRequest> {
    let request_id = Uuid::new_v4();

    enter(request_id, Stage::Classifying);
    let classification = match hint {
        Some(category) => engine.classifier.classify_with_hint(text, category),
        None => engine.classifier.classify(text),
    };
    let keywords = extract_keywords(text);
    let intent = infer_intent(classification.category, text);

    enter(request_id, Stage::Rendering);
    let template = engine
        .library
        .select_template(classification.category, Some(intent));
    let history = engine
        .session
        .recent(engine.config.analysis.context_window);
    let context = engine
        .context_builder
        .build(text, &classification, intent, &keywords, &history);

    let rendered_prompt = render(template, &context)?;
    let fingerprint = render(template, &context.stable())?;

    Ok(AnalysisRequest {
        request_id,
        raw_text: text.to_string(),
        cache_key: cache_key(classification.category, template.intent, &fingerprint),
        intent: template.intent,
        template_id: template.id(),
        classification,
        keywords,
        rendered_prompt,
        timestamp: engine.clock.now(),
    })
}

/// Run a prepared request to completion. Always yields exactly one result.
pub(crate) async fn execute(
    engine: Arc<Engine>,
    request: Arc<AnalysisRequest>,
    cancel: CancellationToken,
    started: Instant,
) -> AnalysisResult {
    let id = request.request_id;

    enter(id, Stage::CacheLookup);
    if let Some(text) = engine.cache.get(&request.cache_key) {
        tracing::debug!(request_id = %id, "cache hit");
        return check_confidence(&engine, &request, text, ResultSource::Cache, 0, started);
    }

    enter(id, Stage::Backend);
    let permit = tokio::select! {
        _ = cancel.cancelled() => None,
        permit = engine.workers.acquire() => permit.ok(),
    };
    let generation = match permit {
        Some(_permit) => {
            engine
                .client
                .generate_with_cancel(&request.rendered_prompt, &cancel)
                .await
        }
        None => Err(BackendError::cancelled("cancelled before a worker was free")),
    };

    match generation {
        Ok(generation) => {
            engine
                .cache
                .put(request.cache_key.clone(), generation.text.clone());
            check_confidence(
                &engine,
                &request,
                generation.text,
                ResultSource::Backend,
                generation.attempts,
                started,
            )
        }
        Err(err) => {
            enter(id, Stage::Fallback);
            tracing::warn!(
                request_id = %id,
                kind = %err.kind,
                attempts = err.attempts,
                error = %err,
                "backend failed, using fallback"
            );
            degraded(&engine, &request, started, FallbackReason::from(&err), err.attempts)
        }
    }
}

/// Shape generated text by classification confidence.
///
/// Confident requests keep the text as is. Below the threshold the text is
/// merged with the top guided question. The merge is deterministic, so a
/// cached answer comes out exactly as the backend answer did; only a fresh
/// low-confidence backend answer is tagged `fallback`.
fn check_confidence(
    engine: &Engine,
    request: &AnalysisRequest,
    text: String,
    source: ResultSource,
    attempts: u32,
    started: Instant,
) -> AnalysisResult {
    enter(request.request_id, Stage::ConfidenceCheck);
    let threshold = engine.config.analysis.confidence_threshold;
    if request.classification.is_confident(threshold) {
        let follow_ups = backend_follow_ups(engine, request, &text);
        return finish(request, source, text, follow_ups, started, None, attempts);
    }

    enter(request.request_id, Stage::Fallback);
    tracing::debug!(
        request_id = %request.request_id,
        confidence = request.classification.confidence,
        threshold,
        "low confidence, merging guided question"
    );
    let merged = engine.fallback.merge(
        &text,
        request.classification.category,
        &request.keywords,
    );
    let source = match source {
        ResultSource::Backend => ResultSource::Fallback,
        other => other,
    };
    finish(
        request,
        source,
        merged.text,
        merged.questions,
        started,
        Some(FallbackReason::LowConfidence),
        attempts,
    )
}

/// Fallback result for a request that produced nothing else.
pub(crate) fn degraded(
    engine: &Engine,
    request: &AnalysisRequest,
    started: Instant,
    reason: FallbackReason,
    attempts: u32,
) -> AnalysisResult {
    let content = engine.fallback.fallback(
        request.classification.category,
        request.intent,
        &request.keywords,
    );
    finish(
        request,
        ResultSource::Fallback,
        content.text,
        content.questions,
        started,
        Some(reason),
        attempts,
    )
}

fn backend_follow_ups(engine: &Engine, request: &AnalysisRequest, text: &str) -> Vec<String> {
    let suggestions = extract_suggestions(text, engine.config.analysis.max_suggestions);
    engine
        .fallback
        .fill_follow_ups(request.classification.category, suggestions)
}

fn finish(
    request: &AnalysisRequest,
    source: ResultSource,
    generated_text: String,
    follow_up_suggestions: Vec<String>,
    started: Instant,
    fallback_reason: Option<FallbackReason>,
    backend_attempts: u32,
) -> AnalysisResult {
    enter(request.request_id, Stage::Done);
    AnalysisResult {
        request_id: request.request_id,
        input_text: request.raw_text.clone(),
        timestamp: request.timestamp,
        intent: request.intent,
        source,
        generated_text,
        follow_up_suggestions,
        confidence: request.classification.confidence,
        classification: request.classification.clone(),
        latency_ms: started.elapsed().as_millis() as u64,
        fallback_reason,
        backend_attempts,
    }
}
