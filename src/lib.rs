//! Screen Insight - Context-Aware Prompt Orchestration Engine
//!
//! Turns raw on-screen text into contextual insights:
//! - keyword classification into an activity category
//! - template selection and rendering with recent session history
//! - generation through a configurable backend, with retries, caching and
//!   an always-available fallback path
//! - a bounded session history for analytics and export

pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use models::{
    AnalysisResult, ClassificationResult, EngineConfig, FallbackReason, ResultSource,
    SessionRecord, SessionSnapshot, SessionSummary,
};
pub use services::{AnalysisHandle, Orchestrator};
pub use storage::{ConfigService, ExportFormat};
pub use utils::error::{AppError, AppResult};

pub use screen_insight_core::{ActivityCategory, Clock, Intent, ManualClock, SystemClock};
pub use screen_insight_llm::{BackendClient, BackendConfig, BackendKind, RetryPolicy, TextBackend};
