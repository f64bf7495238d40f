//! Analysis Models
//!
//! Data structures that flow through one analysis request: classification,
//! the immutable request, the result handed back to callers, and the
//! session-history records built from results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use screen_insight_core::{ActivityCategory, Intent};
use screen_insight_llm::{BackendError, BackendErrorKind};

// ============================================================================
// Classification
// ============================================================================

/// Outcome of keyword classification for one piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: ActivityCategory,
    /// Confidence in the winning category (0.0 - 1.0)
    pub confidence: f64,
    /// Keywords of the winning category, in order of first appearance
    pub matched_keywords: Vec<String>,
}

impl ClassificationResult {
    /// Result for empty or unclassifiable text.
    pub fn degenerate() -> Self {
        Self {
            category: ActivityCategory::General,
            confidence: 0.0,
            matched_keywords: Vec::new(),
        }
    }

    /// Check if the confidence reaches a threshold.
    pub fn is_confident(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }
}

// ============================================================================
// Request
// ============================================================================

/// A fully prepared request. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub request_id: Uuid,
    pub raw_text: String,
    pub classification: ClassificationResult,
    pub intent: Intent,
    /// Keywords extracted from the raw text
    pub keywords: Vec<String>,
    /// `category/intent` of the template that was rendered
    pub template_id: String,
    pub rendered_prompt: String,
    pub cache_key: String,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Result
// ============================================================================

/// Where the generated text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    Backend,
    Cache,
    Fallback,
}

impl ResultSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultSource::Backend => "backend",
            ResultSource::Cache => "cache",
            ResultSource::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for ResultSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a result was degraded to the fallback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    BackendUnavailable,
    BackendTimeout,
    BackendMalformed,
    Cancelled,
    /// Backend answered but classification confidence was below threshold
    LowConfidence,
    /// The background task for the request stopped without producing a result
    WorkerFailed,
}

impl From<&BackendError> for FallbackReason {
    fn from(err: &BackendError) -> Self {
        match err.kind {
            BackendErrorKind::Unavailable => FallbackReason::BackendUnavailable,
            BackendErrorKind::Timeout => FallbackReason::BackendTimeout,
            BackendErrorKind::Malformed => FallbackReason::BackendMalformed,
            BackendErrorKind::Cancelled => FallbackReason::Cancelled,
        }
    }
}

/// The answer to one `analyze` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub request_id: Uuid,
    pub input_text: String,
    pub timestamp: DateTime<Utc>,
    pub intent: Intent,
    pub source: ResultSource,
    pub generated_text: String,
    pub follow_up_suggestions: Vec<String>,
    pub confidence: f64,
    pub classification: ClassificationResult,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
    /// Backend attempts made for this request (0 for cache hits)
    #[serde(default)]
    pub backend_attempts: u32,
}

impl AnalysisResult {
    pub fn category(&self) -> ActivityCategory {
        self.classification.category
    }

    pub fn is_degraded(&self) -> bool {
        self.source == ResultSource::Fallback
    }
}

// ============================================================================
// Session history
// ============================================================================

/// One entry of the bounded session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Monotonic, starts at 1, never reused after eviction
    pub sequence_number: u64,
    pub result: AnalysisResult,
}

/// Point-in-time copy of the session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub exported_at: DateTime<Utc>,
    pub capacity: usize,
    pub total_appended: u64,
    pub records: Vec<SessionRecord>,
}

/// Productivity analytics over the records currently held.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_appended: u64,
    pub records_held: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_source: BTreeMap<String, usize>,
    pub average_confidence: f64,
    pub average_latency_ms: f64,
    /// Share of held records served from the cache (0.0 - 1.0)
    pub cache_hit_rate: f64,
    /// Share of held records that went through the fallback path (0.0 - 1.0)
    pub degraded_rate: f64,
    /// Most frequent matched keywords, highest count first
    pub top_keywords: Vec<(String, usize)>,
}
