//! Prompt Template Models
//!
//! A parameterized prompt for one (activity category, intent) pair.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

use screen_insight_core::{ActivityCategory, Intent};

/// A prompt template in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub category: ActivityCategory,
    pub intent: Intent,
    /// Template body with `{{field}}` placeholders
    pub text: String,
    /// Extracted `{{field}}` names from `text`
    pub required_fields: BTreeSet<String>,
    /// Whether this template ships with the engine
    pub is_builtin: bool,
}

impl PromptTemplate {
    pub fn new(category: ActivityCategory, intent: Intent, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            category,
            intent,
            required_fields: extract_placeholders(&text),
            text,
            is_builtin: false,
        }
    }

    pub fn builtin(category: ActivityCategory, intent: Intent, text: impl Into<String>) -> Self {
        Self {
            is_builtin: true,
            ..Self::new(category, intent, text)
        }
    }

    /// Stable identifier, e.g. `coding/debug`.
    pub fn id(&self) -> String {
        format!("{}/{}", self.category, self.intent)
    }
}

/// Regex matching a `{{field}}` placeholder (compiled once).
pub(crate) fn placeholder_regex() -> Option<&'static Regex> {
    static PLACEHOLDER: OnceLock<Option<Regex>> = OnceLock::new();
    PLACEHOLDER
        .get_or_init(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").ok())
        .as_ref()
}

/// Collect the distinct placeholder names used in a template body.
pub fn extract_placeholders(text: &str) -> BTreeSet<String> {
    placeholder_regex()
        .map(|re| {
            re.captures_iter(text)
                .map(|c| c[1].to_string())
                .collect()
        })
        .unwrap_or_default()
}
