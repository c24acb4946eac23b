// copyguard-core/src/infrastructure/prompt/jinja.rs

// Rendu des prompts (minijinja). Le contexte est du JSON construit par
// l'application : faits, limites, métriques faibles...

use crate::application::ports::TemplateEngine;
use crate::error::CopyGuardError;
use crate::infrastructure::error::InfrastructureError;
use minijinja::{Environment, UndefinedBehavior};

pub struct JinjaRenderer<'a> {
    env: Environment<'a>,
}

impl<'a> JinjaRenderer<'a> {
    pub fn new() -> Self {
        let mut env = Environment::new();
        // Une variable mal orthographiée dans un prompt doit échouer, pas disparaître.
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);

        env.add_filter("upper", |value: &str| value.to_uppercase());
        env.add_filter("lower", |value: &str| value.to_lowercase());
        env.add_filter("bullet_list", |items: Vec<String>| {
            items
                .iter()
                .map(|i| format!("- {}", i))
                .collect::<Vec<_>>()
                .join("\n")
        });

        Self { env }
    }

    pub fn render_str(
        &self,
        template_str: &str,
        context: &serde_json::Value,
    ) -> Result<String, InfrastructureError> {
        self.env
            .render_str(template_str, context)
            .map_err(InfrastructureError::TemplateError)
    }
}

impl<'a> Default for JinjaRenderer<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> TemplateEngine for JinjaRenderer<'a> {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, CopyGuardError> {
        self.render_str(template, context).map_err(CopyGuardError::Infrastructure)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn test_render_with_context() -> Result<()> {
        let renderer = JinjaRenderer::new();
        let result = renderer.render_str("Write about {{ name }} in {{ language | upper }}.", &json!({
            "name": "Socket set",
            "language": "en",
        }))?;
        assert_eq!(result, "Write about Socket set in EN.");
        Ok(())
    }

    #[test]
    fn test_bullet_list_filter() -> Result<()> {
        let renderer = JinjaRenderer::new();
        let result = renderer.render_str("{{ items | bullet_list }}", &json!({ "items": ["a", "b"] }))?;
        assert_eq!(result, "- a\n- b");
        Ok(())
    }

    #[test]
    fn test_undefined_variable_is_an_error() {
        let renderer = JinjaRenderer::new();
        let err = renderer.render_str("{{ missing }}", &json!({})).unwrap_err();
        assert!(matches!(err, InfrastructureError::TemplateError(_)));
    }
}
