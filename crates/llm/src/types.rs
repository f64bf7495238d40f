//! Backend Types
//!
//! Configuration, error, and result types shared by every text-generation
//! backend and by the retrying `BackendClient`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use screen_insight_core::{CoreError, CoreResult};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Which wire protocol the configured endpoint speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Local Ollama server (`/api/generate`).
    Ollama,
    /// Any server exposing OpenAI-style `/chat/completions`.
    #[serde(alias = "openai")]
    OpenaiCompat,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Ollama => write!(f, "ollama"),
            BackendKind::OpenaiCompat => write!(f, "openai_compat"),
        }
    }
}

/// Connection and generation settings for the text-generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend wire protocol
    #[serde(default = "default_kind")]
    pub kind: BackendKind,
    /// Base URL override (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding an API key (OpenAI-compatible only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Sampling temperature (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Total attempts per request, including the first one
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff base delay in milliseconds
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    /// Backoff delay cap in milliseconds
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
    /// Jitter as a fraction of the current delay (0.0 disables it)
    #[serde(default = "default_retry_jitter")]
    pub retry_jitter: f64,
}

fn default_kind() -> BackendKind {
    BackendKind::Ollama
}

fn default_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    500
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

fn default_retry_max_delay_ms() -> u64 {
    10_000
}

fn default_retry_jitter() -> f64 {
    0.2
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            base_url: None,
            model: default_model(),
            api_key_env: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
            retry_jitter: default_retry_jitter(),
        }
    }
}

impl BackendConfig {
    /// Per-attempt timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate ranges before a backend is built from this config.
    pub fn validate(&self) -> CoreResult<()> {
        if self.model.trim().is_empty() {
            return Err(CoreError::config("backend.model must not be empty"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(CoreError::config(format!(
                "backend.temperature must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(CoreError::config("backend.max_tokens must be positive"));
        }
        if self.timeout_secs == 0 {
            return Err(CoreError::config("backend.timeout_secs must be positive"));
        }
        if self.max_retries == 0 {
            return Err(CoreError::config("backend.max_retries must be at least 1"));
        }
        if self.retry_base_delay_ms > self.retry_max_delay_ms {
            return Err(CoreError::config(
                "backend.retry_base_delay_ms cannot exceed backend.retry_max_delay_ms",
            ));
        }
        if !(0.0..1.0).contains(&self.retry_jitter) {
            return Err(CoreError::config(format!(
                "backend.retry_jitter must be within 0.0..1.0, got {}",
                self.retry_jitter
            )));
        }
        if let Some(url) = &self.base_url {
            url::Url::parse(url).map_err(|e| {
                CoreError::config(format!("backend.base_url is not a valid URL ({}): {}", url, e))
            })?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure classification for a backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendErrorKind {
    /// Connection refused, 5xx, rate limited. Transient.
    Unavailable,
    /// The attempt did not finish in time. Transient.
    Timeout,
    /// Bad request or unusable response shape. Never retried.
    Malformed,
    /// The caller abandoned the request. Never retried.
    Cancelled,
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendErrorKind::Unavailable => write!(f, "unavailable"),
            BackendErrorKind::Timeout => write!(f, "timeout"),
            BackendErrorKind::Malformed => write!(f, "malformed"),
            BackendErrorKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Structured failure returned by backends and by `BackendClient`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
    /// HTTP-equivalent status, when the backend answered at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Attempts made before giving up (filled in by `BackendClient`)
    #[serde(default)]
    pub attempts: u32,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            attempts: 0,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Unavailable, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Timeout, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Malformed, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Cancelled, message)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether this error is transient and the attempt should be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            BackendErrorKind::Unavailable | BackendErrorKind::Timeout
        )
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "backend {} (HTTP {}): {}", self.kind, status, self.message),
            None => write!(f, "backend {}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for BackendError {}

/// Convenience alias for backend results.
pub type BackendResult<T> = Result<T, BackendError>;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Successful generation as seen by the caller of `BackendClient`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    /// Attempts used, including the successful one
    pub attempts: u32,
    /// Wall time across all attempts and backoff waits
    pub latency_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BackendConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let mut config = BackendConfig::default();
        config.temperature = 3.5;
        assert!(config.validate().is_err());

        let mut config = BackendConfig::default();
        config.max_retries = 0;
        assert!(config.validate().is_err());

        let mut config = BackendConfig::default();
        config.base_url = Some("not a url".to_string());
        assert!(config.validate().is_err());

        let mut config = BackendConfig::default();
        config.retry_base_delay_ms = 20_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: BackendConfig =
            serde_json::from_str(r#"{"kind": "openai", "model": "gpt-4o-mini"}"#).unwrap();
        assert_eq!(config.kind, BackendKind::OpenaiCompat);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_tokens, 500);
        assert_eq!(config.retry_max_delay_ms, 10_000);
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(BackendError::unavailable("down").is_retryable());
        assert!(BackendError::timeout("slow").is_retryable());
        assert!(!BackendError::malformed("bad").is_retryable());
        assert!(!BackendError::cancelled("stop").is_retryable());
    }

    #[test]
    fn test_error_display_includes_status() {
        let err = BackendError::unavailable("overloaded").with_status(503);
        assert_eq!(err.to_string(), "backend unavailable (HTTP 503): overloaded");
        let err = BackendError::timeout("no answer");
        assert_eq!(err.to_string(), "backend timeout: no answer");
    }
}
