//! Screen Insight LLM
//!
//! Text-generation backends behind a single narrow trait:
//! - Ollama (local inference, native `/api/generate`)
//! - OpenAI-compatible servers (`/chat/completions`)
//!
//! Also includes the retrying `BackendClient`, the backend factory and the
//! HTTP client factory.

pub mod client;
pub mod factory;
pub mod http_client;
pub mod ollama;
pub mod openai;
pub mod provider;
pub mod types;

// Re-export main types
pub use client::{BackendClient, RetryPolicy};
pub use factory::{create_backend, create_client};
pub use http_client::build_http_client;
pub use ollama::OllamaBackend;
pub use openai::OpenAiCompatBackend;
pub use provider::TextBackend;
pub use types::*;
