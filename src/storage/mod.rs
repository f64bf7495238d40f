//! Storage Layer
//!
//! JSON configuration and session export.

pub mod config;
pub mod export;

pub use config::ConfigService;
pub use export::{render_snapshot, suggested_filename, write_snapshot, ExportFormat};
