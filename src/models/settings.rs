//! Settings Models
//!
//! Engine configuration. Loaded once, validated, then shared read-only
//! with every component for the lifetime of a session.

use serde::{Deserialize, Serialize};

use screen_insight_core::{ActivityCategory, Intent};
use screen_insight_llm::BackendConfig;

/// Engine configuration stored in config.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Text-generation backend connection and retry settings
    #[serde(default)]
    pub backend: BackendConfig,
    /// Classification, history and response shaping
    #[serde(default)]
    pub analysis: AnalysisSettings,
    /// Response cache
    #[serde(default)]
    pub cache: CacheSettings,
    /// Custom templates that override or extend the built-in set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<TemplateOverride>,
}

/// Analysis pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Minimum classification confidence before the backend text is trusted alone
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Number of recent session records folded into the prompt context
    #[serde(default = "default_context_window")]
    pub context_window: usize,
    /// Session history capacity; oldest records are evicted beyond this
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Guided questions attached to fallback results (2 or 3)
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,
    /// Suggestions extracted from backend text
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    /// Background workers allowed to wait on the backend at once (1-4)
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
}

fn default_confidence_threshold() -> f64 {
    0.3
}

fn default_context_window() -> usize {
    5
}

fn default_history_capacity() -> usize {
    50
}

fn default_max_questions() -> usize {
    2
}

fn default_max_suggestions() -> usize {
    3
}

fn default_worker_count() -> usize {
    2
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            context_window: default_context_window(),
            history_capacity: default_history_capacity(),
            max_questions: default_max_questions(),
            max_suggestions: default_max_suggestions(),
            worker_count: default_worker_count(),
        }
    }
}

/// Response cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Entry lifetime in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    /// Maximum number of entries before least-recently-used eviction
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

/// Longest entry lifetime accepted by `validate()` (30 days)
pub const MAX_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl_secs() -> u64 {
    1800
}

fn default_cache_capacity() -> usize {
    256
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_secs: default_cache_ttl_secs(),
            capacity: default_cache_capacity(),
        }
    }
}

/// A user-supplied template for one (category, intent) pair.
///
/// Required context fields are derived from the `{{placeholders}}` in `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateOverride {
    pub category: ActivityCategory,
    pub intent: Intent,
    pub text: String,
}

impl EngineConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        self.backend.validate().map_err(|e| e.to_string())?;

        let analysis = &self.analysis;
        if !(0.0..=1.0).contains(&analysis.confidence_threshold) {
            return Err(format!(
                "analysis.confidence_threshold must be within 0.0..=1.0, got {}",
                analysis.confidence_threshold
            ));
        }
        if analysis.history_capacity == 0 {
            return Err("analysis.history_capacity must be positive".to_string());
        }
        if !(2..=3).contains(&analysis.max_questions) {
            return Err(format!(
                "analysis.max_questions must be 2 or 3, got {}",
                analysis.max_questions
            ));
        }
        if !(1..=4).contains(&analysis.worker_count) {
            return Err(format!(
                "analysis.worker_count must be within 1..=4, got {}",
                analysis.worker_count
            ));
        }

        if self.cache.enabled {
            if self.cache.capacity == 0 {
                return Err("cache.capacity must be positive when the cache is enabled".to_string());
            }
            if self.cache.ttl_secs == 0 {
                return Err("cache.ttl_secs must be positive when the cache is enabled".to_string());
            }
            if self.cache.ttl_secs > MAX_CACHE_TTL_SECS {
                return Err(format!(
                    "cache.ttl_secs must be at most {}, got {}",
                    MAX_CACHE_TTL_SECS, self.cache.ttl_secs
                ));
            }
        }

        for template in &self.templates {
            if template.text.trim().is_empty() {
                return Err(format!(
                    "template override {}/{} has empty text",
                    template.category, template.intent
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.analysis.confidence_threshold, 0.3);
        assert_eq!(config.analysis.context_window, 5);
        assert_eq!(config.analysis.history_capacity, 50);
        assert_eq!(config.cache.ttl_secs, 1800);
    }

    #[test]
    fn test_invalid_threshold() {
        let mut config = EngineConfig::default();
        config.analysis.confidence_threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.contains("confidence_threshold"));
    }

    #[test]
    fn test_cache_ttl_upper_bound() {
        let mut config = EngineConfig::default();
        config.cache.ttl_secs = MAX_CACHE_TTL_SECS;
        assert!(config.validate().is_ok());

        config.cache.ttl_secs = 10_000_000_000_000_000;
        let err = config.validate().unwrap_err();
        assert!(err.contains("cache.ttl_secs"));

        // A disabled cache ignores its TTL.
        config.cache.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_worker_count_and_questions() {
        let mut config = EngineConfig::default();
        config.analysis.worker_count = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.analysis.worker_count = 5;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.analysis.max_questions = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_disabled_cache_skips_capacity_check() {
        let mut config = EngineConfig::default();
        config.cache.enabled = false;
        config.cache.capacity = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backend_errors_surface() {
        let mut config = EngineConfig::default();
        config.backend.temperature = 4.0;
        let err = config.validate().unwrap_err();
        assert!(err.contains("temperature"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "backend": { "model": "mistral:7b" },
            "analysis": { "confidence_threshold": 0.5 },
            "templates": [
                { "category": "coding", "intent": "debug", "text": "Fix: {{current_text}}" }
            ]
        }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.backend.model, "mistral:7b");
        assert_eq!(config.backend.max_retries, 3);
        assert_eq!(config.analysis.confidence_threshold, 0.5);
        assert_eq!(config.analysis.history_capacity, 50);
        assert!(config.cache.enabled);
        assert_eq!(config.templates.len(), 1);
        assert_eq!(config.templates[0].intent, Intent::Debug);
    }
}
