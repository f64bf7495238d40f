//! Context Builder
//!
//! Merges the current text, recent session history and time/activity
//! metadata into the substitution values for a template.

use chrono::{Local, Timelike};
use std::collections::BTreeMap;
use std::sync::Arc;

use screen_insight_core::{Clock, Intent, TimeBucket};

use crate::models::{ClassificationResult, SessionRecord};

/// Every field `ContextBuilder::build` populates.
pub const CONTEXT_FIELDS: &[&str] = &[
    "current_text",
    "recent_activity",
    "activity",
    "intent",
    "time_of_day",
    "confidence",
    "keywords",
];

/// Fields that change between otherwise identical requests. Blanked out
/// when computing cache fingerprints.
pub const VOLATILE_FIELDS: &[&str] = &["recent_activity", "time_of_day"];

/// Substituted for `recent_activity` when the session is empty.
pub const NO_RECENT_ACTIVITY: &str = "No recent activity";

/// Characters of generated text kept per history summary.
const SUMMARY_CHARS: usize = 80;

/// Keywords substituted into `{{keywords}}`.
const PROMPT_KEYWORDS: usize = 5;

/// Field values for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptContext {
    fields: BTreeMap<String, String>,
}

impl PromptContext {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Copy with volatile fields emptied.
    pub fn stable(&self) -> Self {
        let mut stable = self.clone();
        for field in VOLATILE_FIELDS {
            if let Some(value) = stable.fields.get_mut(*field) {
                value.clear();
            }
        }
        stable
    }
}

/// Builds `PromptContext`s.
pub struct ContextBuilder {
    clock: Arc<dyn Clock>,
    /// `K`: session records folded into `recent_activity`
    window: usize,
}

impl ContextBuilder {
    pub fn new(clock: Arc<dyn Clock>, window: usize) -> Self {
        Self { clock, window }
    }

    /// Build the substitution values for one request.
    ///
    /// `history` is in chronological order; the last `K` records are
    /// summarized most recent first.
    pub fn build(
        &self,
        text: &str,
        classification: &ClassificationResult,
        intent: Intent,
        keywords: &[String],
        history: &[SessionRecord],
    ) -> PromptContext {
        let mut context = PromptContext::default();
        context.insert("current_text", text.trim());
        context.insert("recent_activity", self.recent_activity(history));
        context.insert("activity", classification.category.as_str());
        context.insert("intent", intent.as_str());
        context.insert("time_of_day", self.time_bucket().as_str());
        context.insert(
            "confidence",
            format!("{:.0}%", classification.confidence * 100.0),
        );
        context.insert("keywords", format_keywords(keywords));
        context
    }

    fn time_bucket(&self) -> TimeBucket {
        let local = self.clock.now().with_timezone(&Local);
        TimeBucket::from_hour(local.hour())
    }

    fn recent_activity(&self, history: &[SessionRecord]) -> String {
        let summaries: Vec<String> = history
            .iter()
            .rev()
            .take(self.window)
            .map(summarize_record)
            .collect();

        if summaries.is_empty() {
            NO_RECENT_ACTIVITY.to_string()
        } else {
            summaries.join(" | ")
        }
    }
}

/// One-line summary of a session record: `[category] first words...`.
pub fn summarize_record(record: &SessionRecord) -> String {
    let flat = record
        .result
        .generated_text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let mut summary: String = flat.chars().take(SUMMARY_CHARS).collect();
    if flat.chars().count() > SUMMARY_CHARS {
        summary.push_str("...");
    }
    format!("[{}] {}", record.result.category(), summary)
}

fn format_keywords(keywords: &[String]) -> String {
    if keywords.is_empty() {
        "none".to_string()
    } else {
        keywords
            .iter()
            .take(PROMPT_KEYWORDS)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}
