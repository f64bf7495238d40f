//! Data Models
//!
//! Contains all data structures used throughout the engine.

pub mod analysis;
pub mod prompt;
pub mod settings;

pub use analysis::*;
pub use prompt::*;
pub use settings::*;
