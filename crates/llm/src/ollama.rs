//! Ollama Backend
//!
//! Implementation of `TextBackend` for a local Ollama server using the
//! ollama-rs native SDK (`/api/generate`, non-streaming).

use async_trait::async_trait;
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::models::ModelOptions;
use ollama_rs::Ollama;
use std::time::Duration;

use super::http_client::build_http_client;
use super::provider::{from_error_message, TextBackend};
use super::types::{BackendConfig, BackendError, BackendResult};

/// Default Ollama API endpoint
const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";

/// Ollama backend for local inference
pub struct OllamaBackend {
    config: BackendConfig,
    client: Ollama,
}

impl OllamaBackend {
    /// Create a new Ollama backend with the given configuration
    pub fn new(config: BackendConfig) -> BackendResult<Self> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| OLLAMA_DEFAULT_URL.to_string());
        let http = build_http_client(config.timeout())?;
        let client = Self::create_client(&base_url, http)?;
        Ok(Self { config, client })
    }

    /// Create an Ollama SDK client from a base URL string.
    ///
    /// `Ollama::new_with_client` takes host and port separately.
    fn create_client(base_url: &str, http: reqwest::Client) -> BackendResult<Ollama> {
        let parsed = url::Url::parse(base_url).map_err(|e| {
            BackendError::malformed(format!("invalid Ollama base URL {}: {}", base_url, e))
        })?;
        let host = parsed.host_str().unwrap_or("localhost");
        let port = parsed.port().unwrap_or(11434);
        let host_url = format!("{}://{}", parsed.scheme(), host);
        Ok(Ollama::new_with_client(host_url, port, http))
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(OLLAMA_DEFAULT_URL)
    }

    fn model_options(&self) -> ModelOptions {
        ModelOptions::default()
            .temperature(self.config.temperature)
            .num_predict(self.config.max_tokens as i32)
    }
}

#[async_trait]
impl TextBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str, timeout: Duration) -> BackendResult<String> {
        let request = GenerationRequest::new(self.config.model.clone(), prompt.to_string())
            .options(self.model_options());

        let response = tokio::time::timeout(timeout, self.client.generate(request))
            .await
            .map_err(|_| {
                BackendError::timeout(format!(
                    "ollama: no response from {} within {:?}",
                    self.base_url(),
                    timeout
                ))
            })?
            .map_err(|e| from_error_message(&e.to_string(), self.name()))?;

        let text = response.response.trim().to_string();
        if text.is_empty() {
            return Err(BackendError::malformed("ollama: empty response"));
        }
        Ok(text)
    }

    async fn health_check(&self) -> BackendResult<()> {
        // Use the SDK's list_local_models as a health check
        self.client.list_local_models().await.map_err(|e| {
            let msg = e.to_string();
            if msg.contains("connect") || msg.contains("Connection refused") {
                BackendError::unavailable(format!("Cannot connect to Ollama at {}", self.base_url()))
            } else {
                from_error_message(&msg, "ollama")
            }
        })?;
        Ok(())
    }
}
