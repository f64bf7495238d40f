//! Engine Integration Tests
//!
//! Drive `Orchestrator` end to end against scripted backends.

use std::sync::Arc;
use std::time::Duration;

use screen_insight::models::TemplateOverride;
use screen_insight::services::fallback::is_guided_question;
use screen_insight::{
    ActivityCategory, AppError, EngineConfig, FallbackReason, Intent, ResultSource,
};
use screen_insight_llm::BackendError;

use super::support::{engine, engine_with, ScriptedBackend};

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn test_python_function_is_coding_from_backend() {
    let backend = Arc::new(ScriptedBackend::replying(
        "Consider edge cases for negative numbers.",
    ));
    let engine = engine(backend.clone());

    let result = engine
        .analyze("def calculate_sum(a, b): return a + b", None)
        .await
        .unwrap();

    assert_eq!(result.source, ResultSource::Backend);
    assert_eq!(result.category(), ActivityCategory::Coding);
    assert!(result.confidence > 0.5);
    assert!(result
        .classification
        .matched_keywords
        .contains(&"def".to_string()));
    assert_eq!(result.generated_text, "Consider edge cases for negative numbers.");
    assert_eq!(
        result.follow_up_suggestions[0],
        "Consider edge cases for negative numbers."
    );
    assert_eq!(result.follow_up_suggestions.len(), 3);
    assert!(result.fallback_reason.is_none());
    assert_eq!(backend.calls(), 1);

    let prompt = &backend.prompts()[0];
    assert!(prompt.contains("def calculate_sum(a, b): return a + b"));
}

#[tokio::test]
async fn test_no_keyword_match_is_general_with_zero_confidence() {
    let backend = Arc::new(ScriptedBackend::replying("A quiet moment."));
    let engine = engine(backend);

    let result = engine
        .analyze("the weather looks lovely over the hills", None)
        .await
        .unwrap();

    assert_eq!(result.category(), ActivityCategory::General);
    assert_eq!(result.confidence, 0.0);
    assert!(result.classification.matched_keywords.is_empty());
}

#[tokio::test]
async fn test_hint_overrides_classification() {
    let backend = Arc::new(ScriptedBackend::replying("Slide three needs a chart."));
    let engine = engine(backend);

    let result = engine
        .analyze("def calculate_sum(a, b): return a + b", Some(ActivityCategory::Presentation))
        .await
        .unwrap();

    assert_eq!(result.category(), ActivityCategory::Presentation);
    assert_eq!(result.confidence, 1.0);
    assert_eq!(result.source, ResultSource::Backend);
}

#[tokio::test]
async fn test_debug_intent_selects_debug_template() {
    let backend = Arc::new(ScriptedBackend::replying("Check the index bounds."));
    let engine = engine(backend.clone());

    let result = engine
        .analyze("Traceback: IndexError in def load_rows(): return rows[10]", None)
        .await
        .unwrap();

    assert_eq!(result.category(), ActivityCategory::Coding);
    assert_eq!(result.intent, Intent::Debug);
    assert!(backend.prompts()[0].contains("debug"));
}

#[tokio::test]
async fn test_workflow_text_selects_productivity_template() {
    let backend = Arc::new(ScriptedBackend::replying("Batch your email into two slots."));
    let engine = engine(backend.clone());

    let result = engine
        .analyze("how do I improve my daily workflow", None)
        .await
        .unwrap();

    assert_eq!(result.category(), ActivityCategory::General);
    assert_eq!(result.intent, Intent::Productivity);
    assert!(backend.prompts()[0].contains("Help improve productivity"));
}

// ============================================================================
// Cache
// ============================================================================

#[tokio::test]
async fn test_identical_text_is_served_from_cache() {
    let backend = Arc::new(ScriptedBackend::replying("Uses a loop; consider sum()."));
    let engine = engine(backend.clone());
    let text = "import math\ndef total(xs): return sum(xs)";

    let first = engine.analyze(text, None).await.unwrap();
    let second = engine.analyze(text, None).await.unwrap();

    assert_eq!(first.source, ResultSource::Backend);
    assert_eq!(second.source, ResultSource::Cache);
    assert_eq!(first.generated_text, second.generated_text);
    assert_eq!(second.backend_attempts, 0);
    assert_eq!(backend.calls(), 1);
    assert_eq!(engine.cache().stats().hits, 1);
}

#[tokio::test]
async fn test_disabled_cache_always_calls_backend() {
    let backend = Arc::new(ScriptedBackend::replying("Fine."));
    let mut config = EngineConfig::default();
    config.cache.enabled = false;
    let engine = engine_with(backend.clone(), config, 3);

    let text = "def f(): return 1";
    engine.analyze(text, None).await.unwrap();
    let second = engine.analyze(text, None).await.unwrap();

    assert_eq!(second.source, ResultSource::Backend);
    assert_eq!(backend.calls(), 2);
}

// ============================================================================
// Retry and fallback
// ============================================================================

#[tokio::test]
async fn test_unavailable_backend_degrades_to_fallback() {
    let backend = Arc::new(ScriptedBackend::always_failing(BackendError::unavailable(
        "connection refused",
    )));
    let engine = engine(backend.clone());

    let result = engine
        .analyze("sudo apt install nginx", None)
        .await
        .unwrap();

    assert_eq!(result.source, ResultSource::Fallback);
    assert_eq!(result.category(), ActivityCategory::Terminal);
    assert_eq!(result.fallback_reason, Some(FallbackReason::BackendUnavailable));
    assert!(!result.generated_text.is_empty());
    assert!(result
        .follow_up_suggestions
        .iter()
        .any(|q| is_guided_question(ActivityCategory::Terminal, q)));
    assert_eq!(result.backend_attempts, 3);
    assert_eq!(backend.calls(), 3);
    assert_eq!(engine.session().len(), 1);
}

#[tokio::test]
async fn test_retry_succeeds_on_third_attempt() {
    let backend = Arc::new(
        ScriptedBackend::replying("Recovered answer.").failing_first(vec![
            BackendError::unavailable("503").with_status(503),
            BackendError::timeout("slow"),
        ]),
    );
    let engine = engine(backend.clone());

    let result = engine
        .analyze("class Parser: def parse(self): return None", None)
        .await
        .unwrap();

    assert_eq!(result.source, ResultSource::Backend);
    assert_eq!(result.generated_text, "Recovered answer.");
    assert_eq!(result.backend_attempts, 3);
    assert_eq!(backend.calls(), 3);
}

#[tokio::test]
async fn test_malformed_response_is_not_retried() {
    let backend = Arc::new(ScriptedBackend::always_failing(BackendError::malformed(
        "missing choices",
    )));
    let engine = engine(backend.clone());

    let result = engine.analyze("git commit -m fix", None).await.unwrap();

    assert_eq!(result.source, ResultSource::Fallback);
    assert_eq!(result.fallback_reason, Some(FallbackReason::BackendMalformed));
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_empty_text_merges_backend_text_with_guided_question() {
    let backend = Arc::new(ScriptedBackend::replying("Nothing is visible yet."));
    let engine = engine(backend.clone());

    let result = engine.analyze("", None).await.unwrap();

    assert_eq!(result.source, ResultSource::Fallback);
    assert_eq!(result.fallback_reason, Some(FallbackReason::LowConfidence));
    assert_eq!(result.category(), ActivityCategory::General);
    assert_eq!(result.confidence, 0.0);
    assert!(result.generated_text.starts_with("Nothing is visible yet."));
    assert!(is_guided_question(
        ActivityCategory::General,
        &result.follow_up_suggestions[0]
    ));
    assert!(result
        .generated_text
        .ends_with(result.follow_up_suggestions[0].as_str()));
    assert_eq!(engine.cache().len(), 1);
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_low_confidence_repeat_is_served_from_cache() {
    let backend = Arc::new(ScriptedBackend::replying("A calm landscape."));
    let engine = engine(backend.clone());
    let text = "the weather looks lovely over the hills";

    let first = engine.analyze(text, None).await.unwrap();
    let second = engine.analyze(text, None).await.unwrap();

    assert_eq!(first.source, ResultSource::Fallback);
    assert_eq!(second.source, ResultSource::Cache);
    assert_eq!(second.generated_text, first.generated_text);
    assert_eq!(second.follow_up_suggestions, first.follow_up_suggestions);
    assert_eq!(second.fallback_reason, Some(FallbackReason::LowConfidence));
    assert_eq!(second.backend_attempts, 0);
    assert_eq!(backend.calls(), 1);
}

// ============================================================================
// Ordering, history and cancellation
// ============================================================================

#[tokio::test]
async fn test_results_are_committed_in_submission_order() {
    let backend = Arc::new(
        ScriptedBackend::replying("ok").slow_when("SLOWMARK", Duration::from_millis(200)),
    );
    let mut config = EngineConfig::default();
    config.analysis.worker_count = 3;
    let engine = engine_with(backend, config, 3);

    let r1 = engine.submit("sudo apt install nginx", None).unwrap();
    let r2 = engine.submit("SLOWMARK def slow(): return 2", None).unwrap();
    let r3 = engine.submit("email reply to the team", None).unwrap();
    let ids = [r1.request_id(), r2.request_id(), r3.request_id()];

    // R3 finishes first but is not committed before R2.
    let third = r3.wait().await.unwrap();
    let second = r2.wait().await.unwrap();
    let first = r1.wait().await.unwrap();
    assert!(second.latency_ms >= third.latency_ms);
    assert_eq!(first.request_id, ids[0]);

    let history = engine.recent_history(10);
    let committed: Vec<_> = history.iter().map(|r| r.result.request_id).collect();
    assert_eq!(committed, ids.to_vec());
    let seqs: Vec<u64> = history.iter().map(|r| r.sequence_number).collect();
    assert_eq!(seqs, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_recent_activity_reaches_next_prompt() {
    let backend = Arc::new(ScriptedBackend::replying("Refactor the helper into a module."));
    let engine = engine(backend.clone());

    engine.analyze("def helper(): return 42", None).await.unwrap();
    engine.analyze("sudo chmod +x deploy.sh", None).await.unwrap();

    let prompts = backend.prompts();
    assert!(prompts[0].contains("No recent activity"));
    assert!(prompts[1].contains("[coding] Refactor the helper into a module."));
}

#[tokio::test]
async fn test_history_filtered_by_category() {
    let backend = Arc::new(ScriptedBackend::replying("ok"));
    let engine = engine(backend);

    engine.analyze("def helper(): return 42", None).await.unwrap();
    engine.analyze("sudo chmod +x deploy.sh", None).await.unwrap();
    engine.analyze("import os\ndef main(): pass", None).await.unwrap();

    let coding = engine.recent_history_by_category(ActivityCategory::Coding, 5);
    assert_eq!(coding.len(), 2);
    assert_eq!(coding[0].result.input_text, "def helper(): return 42");
    assert!(coding
        .iter()
        .all(|r| r.result.category() == ActivityCategory::Coding));
    assert_eq!(engine.recent_history(10).len(), 3);
}

#[tokio::test]
async fn test_history_is_bounded() {
    let backend = Arc::new(ScriptedBackend::replying("ok"));
    let mut config = EngineConfig::default();
    config.analysis.history_capacity = 2;
    config.cache.enabled = false;
    let engine = engine_with(backend, config, 1);

    for text in ["git status", "git diff", "git log"] {
        engine.analyze(text, None).await.unwrap();
    }

    let history = engine.recent_history(10);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].result.input_text, "git diff");
    assert_eq!(engine.session().total_appended(), 3);
}

#[tokio::test]
async fn test_cancel_resolves_through_fallback() {
    let backend = Arc::new(
        ScriptedBackend::replying("too late").slow_when("def", Duration::from_secs(30)),
    );
    let engine = engine(backend);

    let handle = engine.submit("def wait_forever(): return None", None).unwrap();
    let id = handle.request_id();
    assert!(engine.cancel(id));

    let result = tokio::time::timeout(Duration::from_secs(5), handle.wait())
        .await
        .expect("cancelled request should resolve promptly")
        .unwrap();

    assert_eq!(result.source, ResultSource::Fallback);
    assert_eq!(result.fallback_reason, Some(FallbackReason::Cancelled));
    assert_eq!(engine.session().len(), 1);
    assert!(!engine.cancel(id));
}

// ============================================================================
// Custom templates
// ============================================================================

#[tokio::test]
async fn test_template_with_unknown_field_fails_without_recording() {
    let backend = Arc::new(ScriptedBackend::replying("unused"));
    let mut config = EngineConfig::default();
    config.templates.push(TemplateOverride {
        category: ActivityCategory::Terminal,
        intent: Intent::Analysis,
        text: "{{current_text}} run by {{username}}".to_string(),
    });
    let engine = engine_with(backend.clone(), config, 3);

    let err = engine
        .analyze("sudo apt install nginx", None)
        .await
        .unwrap_err();

    match err {
        AppError::TemplateFieldMissing { template, missing } => {
            assert_eq!(template, "terminal/analysis");
            assert_eq!(missing, vec!["username".to_string()]);
        }
        other => panic!("expected TemplateFieldMissing, got {:?}", other),
    }
    assert!(engine.session().is_empty());
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_custom_template_is_rendered() {
    let backend = Arc::new(ScriptedBackend::replying("ok"));
    let mut config = EngineConfig::default();
    config.templates.push(TemplateOverride {
        category: ActivityCategory::Communication,
        intent: Intent::Summarize,
        text: "Summarize this {{activity}} text: {{current_text}}".to_string(),
    });
    let engine = engine_with(backend.clone(), config, 3);

    engine.analyze("slack message from the team", None).await.unwrap();
    assert_eq!(
        backend.prompts()[0],
        "Summarize this communication text: slack message from the team"
    );
}

// ============================================================================
// Analytics
// ============================================================================

#[tokio::test]
async fn test_summary_counts_sources() {
    let backend = Arc::new(ScriptedBackend::replying("Add a docstring."));
    let engine = engine(backend);

    let text = "def area(r): return 3.14 * r * r";
    engine.analyze(text, None).await.unwrap();
    engine.analyze(text, None).await.unwrap();
    engine.analyze("", None).await.unwrap();

    let summary = engine.summary();
    assert_eq!(summary.records_held, 3);
    assert_eq!(summary.by_source.get("backend"), Some(&1));
    assert_eq!(summary.by_source.get("cache"), Some(&1));
    assert_eq!(summary.by_source.get("fallback"), Some(&1));
    assert_eq!(summary.by_category.get("coding"), Some(&2));
    assert_eq!(summary.top_keywords[0].0, "def");
}
