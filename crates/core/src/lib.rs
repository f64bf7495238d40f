//! Screen Insight Core
//!
//! Foundational types for the Screen Insight workspace. This crate has zero
//! dependencies on the engine, the backends, or any I/O.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `activity` - Activity categories, analysis intents and time-of-day buckets
//! - `clock` - Injectable time source (`Clock`, `SystemClock`, `ManualClock`)
//!
//! ## Design Principles
//!
//! 1. **Zero external dependencies beyond serde/thiserror/chrono**
//! 2. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod activity;
pub mod clock;
pub mod error;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Activity Model ─────────────────────────────────────────────────────
pub use activity::{ActivityCategory, Intent, TimeBucket};

// ── Time Source ────────────────────────────────────────────────────────
pub use clock::{Clock, ManualClock, SystemClock};
