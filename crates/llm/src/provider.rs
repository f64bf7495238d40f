//! Text Backend Trait
//!
//! Defines the narrow capability every text-generation backend implements,
//! plus helpers that turn transport failures into `BackendError`s.

use async_trait::async_trait;
use std::time::Duration;

use super::types::{BackendError, BackendResult};

/// Trait that all text-generation backends must implement.
///
/// A backend performs exactly one request per `generate` call. Retries,
/// backoff and cancellation belong to `BackendClient`.
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Returns the backend name for identification.
    fn name(&self) -> &'static str;

    /// Returns the model identifier sent with each request.
    fn model(&self) -> &str;

    /// Send a rendered prompt and return the generated text.
    ///
    /// `timeout` bounds this single request.
    async fn generate(&self, prompt: &str, timeout: Duration) -> BackendResult<String>;

    /// Check if the backend is reachable.
    async fn health_check(&self) -> BackendResult<()>;
}

/// Map an HTTP status and body onto a backend failure.
pub fn parse_http_error(status: u16, body: &str, backend: &str) -> BackendError {
    match status {
        408 => BackendError::timeout(format!("{}: request timeout", backend)),
        429 => BackendError::unavailable(format!("{}: rate limited: {}", backend, body)),
        500..=599 => BackendError::unavailable(format!("{}: server error: {}", backend, body)),
        401 | 403 => BackendError::malformed(format!("{}: access denied", backend)),
        404 => BackendError::malformed(format!("{}: model or endpoint not found: {}", backend, body)),
        _ => BackendError::malformed(format!("{}: HTTP {}: {}", backend, status, body)),
    }
    .with_status(status)
}

/// Classify a `reqwest` transport error.
pub fn from_reqwest_error(err: &reqwest::Error, backend: &str) -> BackendError {
    if err.is_timeout() {
        BackendError::timeout(format!("{}: {}", backend, err))
    } else if err.is_connect() || err.is_request() {
        BackendError::unavailable(format!("{}: {}", backend, err))
    } else if err.is_decode() || err.is_body() {
        BackendError::malformed(format!("{}: {}", backend, err))
    } else if let Some(status) = err.status() {
        parse_http_error(status.as_u16(), &err.to_string(), backend)
    } else {
        BackendError::unavailable(format!("{}: {}", backend, err))
    }
}

/// Classify an error that only surfaces as a message (SDK errors).
pub fn from_error_message(msg: &str, backend: &str) -> BackendError {
    let msg_lower = msg.to_lowercase();

    if msg_lower.contains("timed out") || msg_lower.contains("timeout") {
        BackendError::timeout(format!("{}: {}", backend, msg))
    } else if msg_lower.contains("connect")
        || msg_lower.contains("connection refused")
        || msg_lower.contains("error sending request")
        || msg_lower.contains("unavailable")
        || msg_lower.contains("overloaded")
    {
        BackendError::unavailable(format!("{}: {}", backend, msg))
    } else {
        // Unknown model, bad JSON, schema drift: retrying will not help.
        BackendError::malformed(format!("{}: {}", backend, msg))
    }
}
