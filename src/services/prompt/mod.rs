//! Prompt Service
//!
//! Template library, context building, rendering and suggestion extraction.

pub mod builtin;
pub mod context;
pub mod extract;

pub use builtin::{builtin_templates, TEMPLATE_SET_VERSION};
pub use context::{ContextBuilder, PromptContext, CONTEXT_FIELDS, NO_RECENT_ACTIVITY};
pub use extract::extract_suggestions;

use std::collections::HashMap;

use screen_insight_core::{ActivityCategory, Intent};

use crate::models::prompt::placeholder_regex;
use crate::models::{PromptTemplate, TemplateOverride};
use crate::utils::error::{AppError, AppResult};

/// Read-only set of templates, keyed by (category, intent).
///
/// Built once at construction from the built-in set plus any overrides.
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    templates: HashMap<(ActivityCategory, Intent), PromptTemplate>,
    /// Used when neither the requested nor the category default exists
    last_resort: PromptTemplate,
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl TemplateLibrary {
    /// Load the built-in templates and apply overrides on top.
    pub fn new(overrides: &[TemplateOverride]) -> Self {
        let mut templates: HashMap<(ActivityCategory, Intent), PromptTemplate> =
            builtin_templates()
                .into_iter()
                .map(|t| ((t.category, t.intent), t))
                .collect();

        for o in overrides {
            let template = PromptTemplate::new(o.category, o.intent, o.text.clone());
            tracing::debug!(template = %template.id(), "registering custom template");
            templates.insert((o.category, o.intent), template);
        }

        let last_resort = templates
            .get(&(ActivityCategory::General, Intent::Analysis))
            .cloned()
            .unwrap_or_else(|| {
                PromptTemplate::builtin(
                    ActivityCategory::General,
                    Intent::Analysis,
                    "Analyze the following screen content:\n\"{{current_text}}\"",
                )
            });

        Self {
            templates,
            last_resort,
        }
    }

    /// Select the template for a category and optional intent.
    ///
    /// Falls back to the category's default intent, then to general analysis.
    pub fn select_template(
        &self,
        category: ActivityCategory,
        intent: Option<Intent>,
    ) -> &PromptTemplate {
        let default_intent = category.default_intent();
        intent
            .and_then(|i| self.templates.get(&(category, i)))
            .or_else(|| self.templates.get(&(category, default_intent)))
            .unwrap_or(&self.last_resort)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// All templates, sorted by id.
    pub fn list(&self) -> Vec<&PromptTemplate> {
        let mut all: Vec<&PromptTemplate> = self.templates.values().collect();
        all.sort_by_key(|t| t.id());
        all
    }
}

/// Substitute context values into a template.
///
/// Fails with `TemplateFieldMissing` when the template needs a field the
/// context does not carry; nothing is rendered in that case.
pub fn render(template: &PromptTemplate, context: &PromptContext) -> AppResult<String> {
    let missing: Vec<String> = template
        .required_fields
        .iter()
        .filter(|field| !context.contains(field))
        .cloned()
        .collect();

    if !missing.is_empty() {
        return Err(AppError::template_field_missing(template.id(), missing));
    }

    let rendered = match placeholder_regex() {
        Some(re) => re
            .replace_all(&template.text, |caps: &regex::Captures| {
                context.get(&caps[1]).unwrap_or_default().to_string()
            })
            .into_owned(),
        None => template.text.clone(),
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> PromptContext {
        let mut ctx = PromptContext::default();
        for field in CONTEXT_FIELDS {
            ctx.insert(*field, format!("<{}>", field));
        }
        ctx
    }

    #[test]
    fn test_select_template_defaults() {
        let library = TemplateLibrary::default();

        let t = library.select_template(ActivityCategory::Coding, None);
        assert_eq!(t.id(), "coding/analysis");

        let t = library.select_template(ActivityCategory::Coding, Some(Intent::Debug));
        assert_eq!(t.id(), "coding/debug");

        // No communication/demo template: category default applies.
        let t = library.select_template(ActivityCategory::Communication, Some(Intent::Demo));
        assert_eq!(t.id(), "communication/summarize");

        let t = library.select_template(ActivityCategory::Presentation, None);
        assert_eq!(t.id(), "presentation/engagement");
    }

    #[test]
    fn test_render_substitutes_every_placeholder() {
        let library = TemplateLibrary::default();
        for template in library.list() {
            let rendered = render(template, &context()).unwrap();
            assert!(!rendered.contains("{{"), "{} left a placeholder", template.id());
            assert!(rendered.contains("<current_text>"));
        }
    }

    #[test]
    fn test_override_replaces_builtin() {
        let overrides = vec![TemplateOverride {
            category: ActivityCategory::Coding,
            intent: Intent::Analysis,
            text: "Short: {{current_text}} ({{activity}})".to_string(),
        }];
        let library = TemplateLibrary::new(&overrides);
        let template = library.select_template(ActivityCategory::Coding, None);
        assert!(!template.is_builtin);
        assert_eq!(
            render(template, &context()).unwrap(),
            "Short: <current_text> (<activity>)"
        );
    }

    #[test]
    fn test_unknown_field_is_template_field_missing() {
        let overrides = vec![TemplateOverride {
            category: ActivityCategory::Terminal,
            intent: Intent::Debug,
            text: "{{current_text}} on {{hostname}} as {{user}}".to_string(),
        }];
        let library = TemplateLibrary::new(&overrides);
        let template = library.select_template(ActivityCategory::Terminal, Some(Intent::Debug));
        let err = render(template, &context()).unwrap_err();
        match err {
            AppError::TemplateFieldMissing { template, missing } => {
                assert_eq!(template, "terminal/debug");
                assert_eq!(missing, vec!["hostname".to_string(), "user".to_string()]);
            }
            other => panic!("expected TemplateFieldMissing, got {:?}", other),
        }
    }
}
