//! Suggestion Extraction
//!
//! Pulls actionable follow-up suggestions out of generated text.

use regex::Regex;
use std::sync::OnceLock;

const MIN_SUGGESTION_CHARS: usize = 10;
const MAX_SUGGESTION_CHARS: usize = 200;

fn numbered_prefix() -> Option<&'static Regex> {
    static NUMBERED: OnceLock<Option<Regex>> = OnceLock::new();
    NUMBERED
        .get_or_init(|| Regex::new(r"^\d+[.)]\s*").ok())
        .as_ref()
}

const BULLETS: &[&str] = &["- ", "• ", "* "];
const CUES: &[&str] = &["suggest", "recommend", "consider"];

/// Extract up to `max` suggestions from generated text.
///
/// A line qualifies when it is numbered, bulleted, or mentions
/// suggest/recommend/consider. Markers are stripped and only cleaned lines
/// of 10 to 200 characters (exclusive) are kept.
pub fn extract_suggestions(text: &str, max: usize) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| is_suggestion_line(line))
        .map(clean_line)
        .filter(|s| {
            let len = s.chars().count();
            len > MIN_SUGGESTION_CHARS && len < MAX_SUGGESTION_CHARS
        })
        .take(max)
        .collect()
}

fn is_suggestion_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    numbered_prefix().is_some_and(|re| re.is_match(line))
        || BULLETS.iter().any(|b| line.starts_with(b))
        || CUES.iter().any(|cue| lower.contains(cue))
}

fn clean_line(line: &str) -> String {
    let without_number = match numbered_prefix() {
        Some(re) => re.replace(line, "").into_owned(),
        None => line.to_string(),
    };
    let without_bullet = BULLETS
        .iter()
        .find_map(|b| without_number.strip_prefix(b))
        .unwrap_or(&without_number);
    without_bullet.trim().trim_matches('*').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_and_bulleted_lines() {
        let text = "Here is what I see.\n\
                    1. Add input validation for negative numbers\n\
                    2) Write a unit test for overflow\n\
                    - Rename the function to something clearer\n\
                    • Short\n\
                    Plain prose line without markers.";
        let suggestions = extract_suggestions(text, 5);
        assert_eq!(
            suggestions,
            vec![
                "Add input validation for negative numbers",
                "Write a unit test for overflow",
                "Rename the function to something clearer",
            ]
        );
    }

    #[test]
    fn test_cue_words_and_cap() {
        let text = "Consider edge cases for negative numbers.\n\
                    I recommend adding type hints to the signature.\n\
                    You might suggest a docstring as well, perhaps.";
        let suggestions = extract_suggestions(text, 2);
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0], "Consider edge cases for negative numbers.");
    }

    #[test]
    fn test_length_bounds() {
        let long = format!("- {}", "a".repeat(250));
        let text = format!("- tiny\n{}\n- exactly long enough", long);
        assert_eq!(extract_suggestions(&text, 3), vec!["exactly long enough"]);
    }

    #[test]
    fn test_no_suggestions_in_plain_text() {
        assert!(extract_suggestions("The function adds two numbers.", 3).is_empty());
    }
}
