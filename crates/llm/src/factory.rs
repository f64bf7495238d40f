//! Backend Factory
//!
//! Maps a `BackendConfig` onto the concrete `TextBackend` implementation.

use std::sync::Arc;

use crate::client::{BackendClient, RetryPolicy};
use crate::ollama::OllamaBackend;
use crate::openai::OpenAiCompatBackend;
use crate::provider::TextBackend;
use crate::types::{BackendConfig, BackendKind, BackendResult};

/// Create a text backend from a configuration.
pub fn create_backend(config: &BackendConfig) -> BackendResult<Arc<dyn TextBackend>> {
    let backend: Arc<dyn TextBackend> = match config.kind {
        BackendKind::Ollama => Arc::new(OllamaBackend::new(config.clone())?),
        BackendKind::OpenaiCompat => Arc::new(OpenAiCompatBackend::new(config.clone())?),
    };
    tracing::debug!(
        backend = backend.name(),
        model = backend.model(),
        "created text backend"
    );
    Ok(backend)
}

/// Create a retrying client for the configured backend.
pub fn create_client(config: &BackendConfig) -> BackendResult<BackendClient> {
    let backend = create_backend(config)?;
    Ok(BackendClient::new(backend, RetryPolicy::from_config(config)))
}
