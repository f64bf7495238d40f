//! OpenAI-Compatible Backend
//!
//! Implementation of `TextBackend` for any server exposing the OpenAI
//! `/chat/completions` endpoint (OpenAI itself, LM Studio, vLLM, llama.cpp).

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::provider::{from_reqwest_error, parse_http_error, TextBackend};
use super::types::{BackendConfig, BackendError, BackendResult};
use crate::http_client::build_http_client;

/// Default OpenAI API base
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Backend speaking the OpenAI chat-completions protocol
pub struct OpenAiCompatBackend {
    config: BackendConfig,
    client: reqwest::Client,
}

impl OpenAiCompatBackend {
    /// Create a new backend with the given configuration
    pub fn new(config: BackendConfig) -> BackendResult<Self> {
        let client = build_http_client(config.timeout())?;
        Ok(Self { config, client })
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(OPENAI_API_BASE)
            .trim_end_matches('/')
    }

    /// Resolve the bearer token, if one is configured.
    ///
    /// Local servers usually need none; when `api_key_env` is set the
    /// variable must exist.
    fn api_key(&self) -> BackendResult<Option<String>> {
        match &self.config.api_key_env {
            None => Ok(None),
            Some(var) => std::env::var(var).map(Some).map_err(|_| {
                BackendError::malformed(format!(
                    "{}: API key not configured (environment variable {} is unset)",
                    self.name(),
                    var
                ))
            }),
        }
    }

    fn build_request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "stream": false,
        })
    }

    fn authorize(
        &self,
        request: reqwest::RequestBuilder,
    ) -> BackendResult<reqwest::RequestBuilder> {
        Ok(match self.api_key()? {
            Some(key) => request.header("Authorization", format!("Bearer {}", key)),
            None => request,
        })
    }
}

#[async_trait]
impl TextBackend for OpenAiCompatBackend {
    fn name(&self) -> &'static str {
        "openai_compat"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str, timeout: Duration) -> BackendResult<String> {
        let url = format!("{}/chat/completions", self.base_url());
        let request = self
            .client
            .post(&url)
            .timeout(timeout)
            .header("Content-Type", "application/json")
            .json(&self.build_request_body(prompt));

        let response = self
            .authorize(request)?
            .send()
            .await
            .map_err(|e| from_reqwest_error(&e, self.name()))?;

        let status = response.status().as_u16();
        let body_text = response
            .text()
            .await
            .map_err(|e| from_reqwest_error(&e, self.name()))?;

        if status != 200 {
            return Err(parse_http_error(status, &body_text, self.name()));
        }

        parse_completion(&body_text, self.name())
    }

    async fn health_check(&self) -> BackendResult<()> {
        let url = format!("{}/models", self.base_url());
        let response = self
            .authorize(self.client.get(&url))?
            .send()
            .await
            .map_err(|e| from_reqwest_error(&e, self.name()))?;

        let status = response.status().as_u16();
        if status == 200 {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(parse_http_error(status, &body, self.name()))
        }
    }
}

/// Pull `choices[0].message.content` out of a completion body.
fn parse_completion(body: &str, backend: &str) -> BackendResult<String> {
    let parsed: CompletionResponse = serde_json::from_str(body).map_err(|e| {
        BackendError::malformed(format!("{}: unparseable completion: {}", backend, e))
    })?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
        .unwrap_or_default();

    if content.is_empty() {
        return Err(BackendError::malformed(format!(
            "{}: completion had no message content",
            backend
        )));
    }
    Ok(content)
}

// OpenAI API response types

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
