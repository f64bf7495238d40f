//! Fallback Engine
//!
//! Canned responses, guided questions and follow-up prompts per activity
//! category, used when the backend fails or classification confidence is
//! too low to trust the backend text alone.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use screen_insight_core::{ActivityCategory, Intent};

/// Follow-up slots filled on backend and cache results.
pub const FOLLOW_UP_SLOTS: usize = 3;

// ============================================================================
// Static tables
// ============================================================================

fn canned_responses(category: ActivityCategory, intent: Intent) -> &'static [&'static str] {
    match (category, intent) {
        (ActivityCategory::Coding, Intent::Debug) | (ActivityCategory::Terminal, Intent::Debug) => &[
            "Try logging variable values at the points where behaviour diverges from what you expect.",
            "Check for off-by-one errors in loop conditions and indexing.",
            "Verify input validation and edge case handling.",
            "Step through the failing section with a debugger, one line at a time.",
            "Explain the code out loud line by line; the mismatch often shows up quickly.",
        ],
        (ActivityCategory::Coding, _) => &[
            "Good progress on the code structure. The modular approach looks solid.",
            "Nice implementation. Consider adding error handling for robustness.",
            "The code organization is clean. Documentation would help maintainability.",
            "Unit tests would make this easier to change with confidence.",
            "The logic flow is easy to follow. Keep functions this small.",
        ],
        (ActivityCategory::Terminal, _) => &[
            "Shell history search (Ctrl+R) saves retyping long commands.",
            "Consider wrapping repeated command sequences in a small script.",
            "Double-check commands run with elevated privileges before pressing enter.",
        ],
        (ActivityCategory::Research, _) => &[
            "This methodology aligns well with established research practice.",
            "Consider expanding the literature review to include recent studies.",
            "Statistical significance testing would strengthen these findings.",
            "Cross-validation with an additional dataset could improve reliability.",
        ],
        (ActivityCategory::Documentation, _) => &[
            "A short example near the top helps readers more than another paragraph.",
            "Check that every step lists its prerequisites.",
            "Consider a troubleshooting section for the most common failure.",
        ],
        (ActivityCategory::Presentation, _) => &[
            "Clear layout. More white space would make the key point stand out.",
            "The flow is logical. A summary slide would help retention.",
            "An interactive moment here could lift audience participation.",
            "A concrete example would make this explanation more relatable.",
        ],
        (ActivityCategory::Communication, _) => &[
            "Summarize the thread's open questions before replying.",
            "A short reply with a clear next step usually moves things forward.",
            "Consider moving long discussions into a meeting or a document.",
        ],
        (ActivityCategory::General, _) => &[
            "Breaking this into smaller subtasks might improve focus.",
            "A quick break could help maintain concentration.",
            "Writing down the next step now makes it easier to resume later.",
            "Consider committing or saving progress at this logical point.",
        ],
    }
}

fn guided_questions(category: ActivityCategory) -> &'static [&'static str] {
    match category {
        ActivityCategory::Coding => &[
            "What edge cases should this code handle?",
            "How would you test this function?",
            "Are there any performance bottlenecks here?",
            "What happens if the input is malformed?",
            "How could this code be made more maintainable?",
            "What security considerations apply here?",
            "How would you document this for other developers?",
        ],
        ActivityCategory::Terminal => &[
            "What did you expect this command to output?",
            "Does this command need elevated permissions?",
            "Is the tool installed and on your PATH?",
            "Could this sequence of commands become a script?",
        ],
        ActivityCategory::Research => &[
            "What are the limitations of this methodology?",
            "How does this relate to existing literature?",
            "What additional data would strengthen this analysis?",
            "Are there alternative explanations for these results?",
            "How generalizable are these findings?",
            "What would be the next logical research step?",
        ],
        ActivityCategory::Documentation => &[
            "Who is the intended reader of this documentation?",
            "What would a newcomer get stuck on first?",
            "Is there a working example for each step?",
            "What is missing from the setup instructions?",
        ],
        ActivityCategory::Presentation => &[
            "What questions might the audience ask about this?",
            "How can you make this more engaging?",
            "What's the key takeaway for your audience?",
            "Are there any confusing technical terms to explain?",
            "What examples would clarify this concept?",
            "How will you handle challenging questions?",
        ],
        ActivityCategory::Communication => &[
            "What decision does this conversation need?",
            "Who else should be included in this thread?",
            "What is the next action and who owns it?",
        ],
        ActivityCategory::General => &[
            "What's the most important aspect of what you're working on?",
            "What challenges are you facing with this task?",
            "How does this fit into your bigger goals?",
            "What would success look like here?",
            "What's your next step after this?",
        ],
    }
}

fn follow_up_prompts(category: ActivityCategory) -> &'static [&'static str] {
    match category {
        ActivityCategory::Coding => &[
            "How would you improve the code structure?",
            "What testing strategy would you recommend?",
            "Are there any security considerations?",
        ],
        ActivityCategory::Terminal => &[
            "Want an explanation of each flag used?",
            "Should this be automated with a script?",
            "Is there a safer variant of this command?",
        ],
        ActivityCategory::Research => &[
            "What are the key limitations of this approach?",
            "How does this compare to alternative methods?",
            "What additional data would be valuable?",
        ],
        ActivityCategory::Documentation => &[
            "Which section needs an example most?",
            "Is the intended audience clear?",
            "What should the quick-start cover?",
        ],
        ActivityCategory::Presentation => &[
            "How can we make this more engaging for the audience?",
            "What questions should we prepare for?",
            "Are there better ways to visualize this?",
        ],
        ActivityCategory::Communication => &[
            "Should I draft a reply?",
            "What are the action items here?",
            "Does this need a follow-up meeting?",
        ],
        ActivityCategory::General => &[
            "Can you provide more details about what you're working on?",
            "What would you like help with next?",
            "Would a productivity tip help right now?",
        ],
    }
}

// ============================================================================
// FallbackEngine
// ============================================================================

/// Text produced by the fallback path.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackContent {
    pub text: String,
    pub questions: Vec<String>,
}

/// Selects canned responses and guided questions.
///
/// Canned responses rotate deterministically so repeated failures in the
/// same category do not return the same sentence every time.
pub struct FallbackEngine {
    max_questions: usize,
    rotation: AtomicUsize,
}

impl FallbackEngine {
    pub fn new(max_questions: usize) -> Self {
        Self {
            max_questions: max_questions.clamp(2, 3),
            rotation: AtomicUsize::new(0),
        }
    }

    /// Canned response plus guided questions for a failed request.
    pub fn fallback(
        &self,
        category: ActivityCategory,
        intent: Intent,
        keywords: &[String],
    ) -> FallbackContent {
        FallbackContent {
            text: self.canned_response(category, intent),
            questions: self.guided_questions(category, keywords),
        }
    }

    /// Backend text merged with the top guided question.
    pub fn merge(
        &self,
        backend_text: &str,
        category: ActivityCategory,
        keywords: &[String],
    ) -> FallbackContent {
        let questions = self.guided_questions(category, keywords);
        let text = match questions.first() {
            Some(question) => format!("{}\n\n{}", backend_text.trim_end(), question),
            None => backend_text.to_string(),
        };
        FallbackContent { text, questions }
    }

    /// Next canned response for a category, rotating through its table.
    pub fn canned_response(&self, category: ActivityCategory, intent: Intent) -> String {
        let pool = canned_responses(category, intent);
        let index = self.rotation.fetch_add(1, Ordering::Relaxed) % pool.len();
        pool[index].to_string()
    }

    /// Top guided questions, ranked by word overlap with `keywords`.
    ///
    /// Ties keep table order, so the result is stable for the same input.
    pub fn guided_questions(&self, category: ActivityCategory, keywords: &[String]) -> Vec<String> {
        let keywords: HashSet<&str> = keywords.iter().map(String::as_str).collect();

        let mut ranked: Vec<(usize, &str)> = guided_questions(category)
            .iter()
            .map(|q| (relevance(q, &keywords), *q))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0));

        ranked
            .into_iter()
            .take(self.max_questions)
            .map(|(_, q)| q.to_string())
            .collect()
    }

    /// Pad `suggestions` with the category's follow-up prompts up to three.
    pub fn fill_follow_ups(&self, category: ActivityCategory, mut suggestions: Vec<String>) -> Vec<String> {
        for prompt in follow_up_prompts(category) {
            if suggestions.len() >= FOLLOW_UP_SLOTS {
                break;
            }
            if !suggestions.iter().any(|s| s == prompt) {
                suggestions.push(prompt.to_string());
            }
        }
        suggestions
    }

    pub fn max_questions(&self) -> usize {
        self.max_questions
    }
}

impl Default for FallbackEngine {
    fn default() -> Self {
        Self::new(2)
    }
}

fn relevance(question: &str, keywords: &HashSet<&str>) -> usize {
    question
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .filter(|w| keywords.contains(w.as_str()))
        .count()
}

/// Whether a question comes from the category's guided-question table.
pub fn is_guided_question(category: ActivityCategory, text: &str) -> bool {
    guided_questions(category).contains(&text)
}
