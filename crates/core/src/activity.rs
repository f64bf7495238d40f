//! Activity Model
//!
//! The fixed set of activity categories the classifier can produce, the
//! analysis intents a template can serve, and the coarse time-of-day bucket
//! used as prompt context.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Coarse classification of what the on-screen content is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Coding,
    Terminal,
    Research,
    Documentation,
    Presentation,
    Communication,
    General,
}

impl ActivityCategory {
    /// All categories in tie-break priority order (highest first).
    pub const PRIORITY: [ActivityCategory; 7] = [
        ActivityCategory::Coding,
        ActivityCategory::Terminal,
        ActivityCategory::Research,
        ActivityCategory::Documentation,
        ActivityCategory::Presentation,
        ActivityCategory::Communication,
        ActivityCategory::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Coding => "coding",
            ActivityCategory::Terminal => "terminal",
            ActivityCategory::Research => "research",
            ActivityCategory::Documentation => "documentation",
            ActivityCategory::Presentation => "presentation",
            ActivityCategory::Communication => "communication",
            ActivityCategory::General => "general",
        }
    }

    /// Intent used when the caller does not ask for a specific one.
    pub fn default_intent(&self) -> Intent {
        match self {
            ActivityCategory::Coding => Intent::Analysis,
            ActivityCategory::Terminal => Intent::Analysis,
            ActivityCategory::Research => Intent::Analysis,
            ActivityCategory::Documentation => Intent::Analysis,
            ActivityCategory::Presentation => Intent::Engagement,
            ActivityCategory::Communication => Intent::Summarize,
            ActivityCategory::General => Intent::Analysis,
        }
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        ActivityCategory::PRIORITY
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| CoreError::parse(format!("unknown activity category: {}", s)))
    }
}

/// The kind of analysis requested within a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Analysis,
    Debug,
    Review,
    Summarize,
    Critique,
    Engagement,
    Explain,
    Demo,
    Productivity,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Analysis => "analysis",
            Intent::Debug => "debug",
            Intent::Review => "review",
            Intent::Summarize => "summarize",
            Intent::Critique => "critique",
            Intent::Engagement => "engagement",
            Intent::Explain => "explain",
            Intent::Demo => "demo",
            Intent::Productivity => "productivity",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable part of the day, substituted into prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeBucket {
    /// Map a 0-23 local hour onto a bucket.
    ///
    /// 06-11 morning, 12-17 afternoon, 18-21 evening, otherwise night.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimeBucket::Morning,
            12..=17 => TimeBucket::Afternoon,
            18..=21 => TimeBucket::Evening,
            _ => TimeBucket::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBucket::Morning => "morning",
            TimeBucket::Afternoon => "afternoon",
            TimeBucket::Evening => "evening",
            TimeBucket::Night => "night",
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
