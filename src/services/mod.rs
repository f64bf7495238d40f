//! Services
//!
//! The analysis engine. `Orchestrator` owns one instance of every other
//! service and is the only entry point callers need.

pub mod cache;
pub mod classifier;
pub mod fallback;
pub mod orchestrator;
pub mod prompt;
pub mod session;

pub use cache::{cache_key, CacheStats, ResponseCache};
pub use classifier::{extract_keywords, infer_intent, ActivityClassifier};
pub use fallback::{FallbackContent, FallbackEngine};
pub use orchestrator::{AnalysisHandle, Orchestrator, Stage};
pub use prompt::{render, ContextBuilder, PromptContext, TemplateLibrary};
pub use session::SessionStore;
