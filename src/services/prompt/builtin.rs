//! Built-in Templates
//!
//! The versioned template set shipped with the engine. Every placeholder
//! used here is produced by `ContextBuilder`.

use screen_insight_core::{ActivityCategory, Intent};

use crate::models::PromptTemplate;

/// Bumped whenever template wording changes; part of every cache key.
pub const TEMPLATE_SET_VERSION: u32 = 1;

/// All built-in templates.
pub fn builtin_templates() -> Vec<PromptTemplate> {
    use ActivityCategory::*;

    let raw: Vec<(ActivityCategory, Intent, &str)> = vec![
        (
            Coding,
            Intent::Analysis,
            "You are analyzing a developer's screen during a coding session.\n\
             Current screen content: \"{{current_text}}\"\n\
             Recent activity: {{recent_activity}}\n\
             Detected keywords: {{keywords}}\n\n\
             Analyze the code and provide:\n\
             1. What programming task is being worked on\n\
             2. Code quality observations\n\
             3. Potential improvements or suggestions\n\
             4. Next logical steps\n\n\
             Be concise and focus on actionable insights.",
        ),
        (
            Coding,
            Intent::Debug,
            "You are helping debug code shown on screen.\n\
             Code content: \"{{current_text}}\"\n\
             Recent activity: {{recent_activity}}\n\n\
             Help identify:\n\
             1. Potential bugs or issues\n\
             2. Debugging approaches\n\
             3. Best practices being followed or missed\n\
             4. Testing suggestions\n\n\
             Provide specific, actionable debugging advice.",
        ),
        (
            Coding,
            Intent::Review,
            "Perform a code review of the displayed code:\n\
             Code: \"{{current_text}}\"\n\
             Session context: {{activity}} in the {{time_of_day}}, keywords: {{keywords}}\n\n\
             Review for:\n\
             1. Code structure and organization\n\
             2. Performance considerations\n\
             3. Security implications\n\
             4. Maintainability\n\n\
             Give constructive feedback with specific examples.",
        ),
        (
            Terminal,
            Intent::Analysis,
            "You are watching a terminal session.\n\
             Terminal output: \"{{current_text}}\"\n\
             Recent activity: {{recent_activity}}\n\n\
             Explain:\n\
             1. What the commands are doing\n\
             2. Anything risky or surprising in the output\n\
             3. A more efficient way to achieve the same result\n\n\
             Keep it short and practical.",
        ),
        (
            Terminal,
            Intent::Debug,
            "A terminal command appears to have failed.\n\
             Terminal output: \"{{current_text}}\"\n\
             Recent activity: {{recent_activity}}\n\n\
             Provide:\n\
             1. The most likely cause of the failure\n\
             2. The exact command to diagnose it\n\
             3. The fix\n\n\
             Be specific to the shell and tools shown.",
        ),
        (
            Research,
            Intent::Analysis,
            "You are analyzing research content displayed on screen.\n\
             Content: \"{{current_text}}\"\n\
             Research context: {{keywords}} ({{confidence}} confidence)\n\n\
             Analyze:\n\
             1. Research methodology being used\n\
             2. Key findings or insights\n\
             3. Potential gaps or areas to explore\n\
             4. Suggestions for further investigation\n\n\
             Focus on academic rigor and research quality.",
        ),
        (
            Research,
            Intent::Summarize,
            "Summarize the research content shown:\n\
             Content: \"{{current_text}}\"\n\
             Previous context: {{recent_activity}}\n\n\
             Provide:\n\
             1. Main research themes\n\
             2. Key methodologies mentioned\n\
             3. Important findings or conclusions\n\
             4. Research gaps identified\n\n\
             Keep the summary academic and precise.",
        ),
        (
            Research,
            Intent::Critique,
            "Critically analyze the research displayed:\n\
             Research content: \"{{current_text}}\"\n\
             Keywords: {{keywords}}\n\n\
             Evaluate:\n\
             1. Methodology strengths and weaknesses\n\
             2. Evidence quality and sources\n\
             3. Logical consistency\n\
             4. Potential biases or limitations\n\n\
             Provide balanced, scholarly critique.",
        ),
        (
            Documentation,
            Intent::Analysis,
            "Review the documentation shown on screen:\n\
             Content: \"{{current_text}}\"\n\
             Recent activity: {{recent_activity}}\n\n\
             Assess:\n\
             1. Clarity for a first-time reader\n\
             2. Missing steps or prerequisites\n\
             3. Examples that would help\n\n\
             Suggest concrete edits.",
        ),
        (
            Documentation,
            Intent::Summarize,
            "Summarize the documentation shown:\n\
             Content: \"{{current_text}}\"\n\n\
             Provide a short overview, the key steps, and any warnings a reader must not miss.",
        ),
        (
            Presentation,
            Intent::Engagement,
            "You're helping improve a presentation being shared.\n\
             Current slide or content: \"{{current_text}}\"\n\
             Presentation context: {{recent_activity}}\n\n\
             Suggest improvements for:\n\
             1. Audience engagement\n\
             2. Content clarity\n\
             3. Visual presentation\n\
             4. Flow and structure\n\n\
             Focus on making content more compelling.",
        ),
        (
            Presentation,
            Intent::Explain,
            "Help explain technical content to an audience:\n\
             Technical content: \"{{current_text}}\"\n\
             Keywords: {{keywords}}\n\n\
             Provide:\n\
             1. Simplified explanations for complex concepts\n\
             2. Analogies or examples\n\
             3. Key takeaways for the audience\n\
             4. Q&A preparation suggestions\n\n\
             Make technical content accessible.",
        ),
        (
            Presentation,
            Intent::Demo,
            "Provide guidance for a live demonstration:\n\
             Demo content: \"{{current_text}}\"\n\
             Session info: {{activity}} in the {{time_of_day}}\n\n\
             Suggest:\n\
             1. Key points to highlight\n\
             2. Potential audience questions\n\
             3. Common demo pitfalls to avoid\n\
             4. Ways to keep the audience engaged\n\n\
             Focus on smooth demo execution.",
        ),
        (
            Communication,
            Intent::Summarize,
            "Summarize the conversation shown on screen:\n\
             Messages: \"{{current_text}}\"\n\
             Recent activity: {{recent_activity}}\n\n\
             Provide:\n\
             1. The main topic\n\
             2. Open questions or action items\n\
             3. A suggested reply, if one is expected\n\n\
             Keep it brief.",
        ),
        (
            General,
            Intent::Analysis,
            "Analyze the current screen content and provide insights:\n\
             Content: \"{{current_text}}\"\n\
             Recent activity: {{recent_activity}}\n\
             Session context: {{activity}}, {{time_of_day}}, keywords: {{keywords}}\n\n\
             Provide:\n\
             1. Activity identification\n\
             2. Progress assessment\n\
             3. Helpful suggestions\n\
             4. Relevant questions\n\n\
             Be helpful and context-aware.",
        ),
        (
            General,
            Intent::Productivity,
            "Help improve productivity based on screen activity:\n\
             Current activity: \"{{current_text}}\"\n\
             Recent activity: {{recent_activity}}\n\n\
             Suggest:\n\
             1. Productivity improvements\n\
             2. Workflow optimizations\n\
             3. Tools or techniques\n\
             4. Time management tips for the {{time_of_day}}\n\n\
             Focus on actionable productivity advice.",
        ),
    ];

    raw.into_iter()
        .map(|(category, intent, text)| PromptTemplate::builtin(category, intent, text))
        .collect()
}
