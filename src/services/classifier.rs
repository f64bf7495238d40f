//! Activity Classifier
//!
//! Maps raw screen text onto an activity category using weighted keyword
//! tables, extracts prompt keywords, and infers which intent within a
//! category the text calls for.
//!
//! Classification is a pure function of the text: no model calls, no state,
//! so results are deterministic and auditable.

use regex::Regex;
use std::collections::HashSet;

use screen_insight_core::{ActivityCategory, Intent};

use crate::models::ClassificationResult;

/// Added to the denominator so confidence stays finite.
const EPSILON: f64 = 1e-9;

/// Keywords kept for prompts and question ranking.
const MAX_KEYWORDS: usize = 10;

/// Short, high-frequency words that never count as keywords.
const STOP_WORDS: &[&str] = &[
    "this", "that", "with", "from", "they", "have", "will", "been", "were", "what", "when",
    "your", "there", "their", "then", "than", "into", "about", "which", "would", "could",
];

/// Keyword table: (keyword, weight) per category.
fn keyword_table(category: ActivityCategory) -> &'static [(&'static str, f64)] {
    match category {
        ActivityCategory::Coding => &[
            ("def", 2.0),
            ("fn", 2.0),
            ("class", 1.5),
            ("function", 1.5),
            ("import", 1.5),
            ("return", 1.0),
            ("const", 1.0),
            ("struct", 1.5),
            ("impl", 1.5),
            ("async", 1.0),
            ("await", 1.0),
            ("traceback", 2.0),
            ("exception", 1.0),
            ("git", 1.0),
            ("commit", 1.0),
            ("python", 1.0),
            ("javascript", 1.0),
            ("rust", 1.0),
            ("html", 1.0),
        ],
        ActivityCategory::Terminal => &[
            ("terminal", 1.5),
            ("command", 1.0),
            ("bash", 1.5),
            ("zsh", 1.5),
            ("shell", 1.0),
            ("sudo", 2.0),
            ("apt", 1.5),
            ("chmod", 1.5),
            ("grep", 1.0),
            ("install", 1.0),
            ("permission denied", 2.0),
            ("command not found", 2.0),
        ],
        ActivityCategory::Research => &[
            ("research", 1.5),
            ("study", 1.0),
            ("analysis", 1.0),
            ("paper", 1.0),
            ("journal", 1.5),
            ("article", 1.0),
            ("citation", 1.5),
            ("reference", 1.0),
            ("methodology", 2.0),
            ("hypothesis", 2.0),
            ("abstract", 1.0),
            ("dataset", 1.0),
            ("findings", 1.0),
        ],
        ActivityCategory::Documentation => &[
            ("readme", 2.0),
            ("docs", 1.5),
            ("documentation", 2.0),
            ("guide", 1.0),
            ("tutorial", 1.5),
            ("manual", 1.0),
            ("wiki", 1.5),
            ("getting started", 1.5),
        ],
        ActivityCategory::Presentation => &[
            ("slide", 2.0),
            ("slides", 2.0),
            ("presentation", 2.0),
            ("demo", 1.0),
            ("showcase", 1.0),
            ("audience", 1.5),
            ("screen share", 1.5),
            ("agenda", 1.0),
        ],
        ActivityCategory::Communication => &[
            ("email", 1.5),
            ("chat", 1.0),
            ("message", 1.0),
            ("discord", 1.0),
            ("slack", 1.5),
            ("teams", 1.0),
            ("meeting", 1.0),
            ("inbox", 1.5),
            ("reply", 1.0),
        ],
        ActivityCategory::General => &[],
    }
}

/// Compiled keyword with its weight.
struct KeywordEntry {
    keyword: &'static str,
    regex: Regex,
    weight: f64,
}

/// Per-category score accumulated during classification.
struct CategoryScore {
    category: ActivityCategory,
    score: f64,
    /// (first match offset, keyword)
    hits: Vec<(usize, &'static str)>,
}

/// Keyword-table activity classifier.
pub struct ActivityClassifier {
    tables: Vec<(ActivityCategory, Vec<KeywordEntry>)>,
}

impl Default for ActivityClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityClassifier {
    /// Create a new classifier with compiled keyword patterns.
    pub fn new() -> Self {
        let tables = ActivityCategory::PRIORITY
            .into_iter()
            .map(|category| (category, Self::compile_table(keyword_table(category))))
            .collect();
        Self { tables }
    }

    /// Classify a piece of text.
    ///
    /// Counts case-insensitive whole-word occurrences of every category's
    /// keywords; the highest weighted count wins and ties go to the
    /// category listed first in `ActivityCategory::PRIORITY`.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        if text.trim().is_empty() {
            return ClassificationResult::degenerate();
        }

        let mut scores: Vec<CategoryScore> = self
            .tables
            .iter()
            .map(|(category, entries)| Self::score(*category, entries, text))
            .collect();

        // Stable sort keeps priority order among equal scores.
        scores.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut ranked = scores.into_iter();
        let winner = match ranked.next() {
            Some(w) if w.score > 0.0 => w,
            _ => return ClassificationResult::degenerate(),
        };
        let runner_up = ranked.next().map(|r| r.score).unwrap_or(0.0);

        let confidence = (winner.score / (winner.score + runner_up + EPSILON)).clamp(0.0, 1.0);

        ClassificationResult {
            category: winner.category,
            confidence,
            matched_keywords: Self::ordered_keywords(winner.hits),
        }
    }

    /// Classification forced by a caller hint.
    ///
    /// The hinted category is taken as certain; matched keywords still report
    /// which of that category's keywords appear in the text.
    pub fn classify_with_hint(&self, text: &str, hint: ActivityCategory) -> ClassificationResult {
        let hits = self
            .tables
            .iter()
            .find(|(category, _)| *category == hint)
            .map(|(category, entries)| Self::score(*category, entries, text).hits)
            .unwrap_or_default();

        ClassificationResult {
            category: hint,
            confidence: 1.0,
            matched_keywords: Self::ordered_keywords(hits),
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn compile_table(raw: &[(&'static str, f64)]) -> Vec<KeywordEntry> {
        raw.iter()
            .filter_map(|&(keyword, weight)| {
                Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword)))
                    .ok()
                    .map(|regex| KeywordEntry {
                        keyword,
                        regex,
                        weight,
                    })
            })
            .collect()
    }

    fn score(category: ActivityCategory, entries: &[KeywordEntry], text: &str) -> CategoryScore {
        let mut score = 0.0;
        let mut hits = Vec::new();
        for entry in entries {
            let mut matches = entry.regex.find_iter(text).peekable();
            if let Some(first) = matches.peek() {
                hits.push((first.start(), entry.keyword));
            }
            let count = matches.count();
            score += count as f64 * entry.weight;
        }
        CategoryScore {
            category,
            score,
            hits,
        }
    }

    fn ordered_keywords(mut hits: Vec<(usize, &'static str)>) -> Vec<String> {
        hits.sort_by_key(|(offset, _)| *offset);
        hits.into_iter().map(|(_, kw)| kw.to_string()).collect()
    }
}

// ============================================================================
// Keyword extraction
// ============================================================================

/// Extract prompt keywords from text.
///
/// Lowercased words longer than three characters, minus stop words, first
/// ten unique in order of appearance.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| word.chars().count() > 3)
        .map(|word| word.to_lowercase())
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
        .filter(|word| seen.insert(word.clone()))
        .take(MAX_KEYWORDS)
        .collect()
}

// ============================================================================
// Intent inference
// ============================================================================

/// Trigger words that select a non-default intent within a category.
fn intent_rules(category: ActivityCategory) -> &'static [(Intent, &'static [&'static str])] {
    match category {
        ActivityCategory::Coding => &[
            (
                Intent::Debug,
                &["error", "bug", "debug", "exception", "traceback", "panic"],
            ),
            (Intent::Review, &["review", "pull", "merge", "diff"]),
        ],
        ActivityCategory::Research => &[
            (Intent::Summarize, &["summary", "conclusion", "abstract"]),
            (Intent::Critique, &["critique", "evaluation", "assessment"]),
        ],
        ActivityCategory::Presentation => &[
            (Intent::Demo, &["demo", "demonstration", "live"]),
            (Intent::Explain, &["technical", "complex", "explain"]),
        ],
        ActivityCategory::Documentation => &[(Intent::Summarize, &["summary", "overview", "tl;dr"])],
        ActivityCategory::Terminal => &[(
            Intent::Debug,
            &["error", "failed", "denied", "not found"],
        )],
        ActivityCategory::General => &[(
            Intent::Productivity,
            &["productivity", "productive", "focus", "workflow"],
        )],
        ActivityCategory::Communication => &[],
    }
}

/// Pick the intent a piece of text calls for within its category.
///
/// Rules are checked in order; the first whose trigger appears as a whole
/// word wins. Otherwise the category's default intent applies.
pub fn infer_intent(category: ActivityCategory, text: &str) -> Intent {
    let lower = text.to_lowercase();
    intent_rules(category)
        .iter()
        .find(|(_, triggers)| triggers.iter().any(|t| contains_word(&lower, t)))
        .map(|(intent, _)| *intent)
        .unwrap_or_else(|| category.default_intent())
}

/// Whole-word containment on already-lowercased text.
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
