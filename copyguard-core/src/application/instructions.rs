// copyguard-core/src/application/instructions.rs

// Construit le prompt de chaque tentative. Au premier essai : faits + limites.
// Aux essais suivants : on ajoute le bloc de relance, qui ne nomme QUE les
// métriques faibles de la tentative précédente.

use crate::application::ports::TemplateEngine;
use crate::domain::content::ContentField;
use crate::domain::product::ProductFacts;
use crate::domain::project::GenerationConfig;
use crate::domain::quality::Metric;
use crate::domain::rules::RuleSet;
use crate::error::CopyGuardError;
use crate::ports::generator::GenerationRequest;
use serde_json::{Value, json};
use std::sync::Arc;

pub struct InstructionBuilder {
    engine: Arc<dyn TemplateEngine>,
    generation: GenerationConfig,
    rules: RuleSet,
}

impl InstructionBuilder {
    pub fn new(engine: Arc<dyn TemplateEngine>, generation: GenerationConfig, rules: RuleSet) -> Self {
        Self {
            engine,
            generation,
            rules,
        }
    }

    pub fn request(
        &self,
        facts: &ProductFacts,
        attempt: u32,
        focus: &[Metric],
    ) -> Result<GenerationRequest, CopyGuardError> {
        Ok(GenerationRequest {
            prompt: self.prompt(facts, attempt, focus)?,
            language: self.generation.language.clone(),
            style: self.generation.style.clone(),
            attempt,
            focus_metrics: focus.to_vec(),
            facts: facts.clone(),
        })
    }

    pub fn prompt(&self, facts: &ProductFacts, attempt: u32, focus: &[Metric]) -> Result<String, CopyGuardError> {
        let mut prompt = self
            .engine
            .render(&self.generation.prompt_template, &self.context(facts))?;

        if attempt > 1 && !focus.is_empty() && !self.generation.retry_template.trim().is_empty() {
            let items: Vec<Value> = focus
                .iter()
                .map(|m| {
                    json!({
                        "metric": m.as_str(),
                        "booster": self.generation.boosters.get(m).cloned().unwrap_or_default(),
                    })
                })
                .collect();
            let retry = self.engine.render(
                &self.generation.retry_template,
                &json!({ "attempt": attempt, "focus": items }),
            )?;
            prompt.push_str(&retry);
        }
        Ok(prompt)
    }

    fn context(&self, facts: &ProductFacts) -> Value {
        let limits = &self.rules.limits;
        let limit = |field: ContentField| match limits.for_field(field, facts.length_profile) {
            Some(l) => json!({ "min": l.min, "max": l.max }),
            None => Value::Null,
        };

        json!({
            "language": self.generation.language,
            "style": self.generation.style,
            "name": facts.display_name(),
            "facts": fact_lines(facts),
            "limits": {
                "meta_title": limit(ContentField::MetaTitle),
                "meta_description": limit(ContentField::MetaDescription),
                "body": limit(ContentField::Body),
                "why_worth_it": limit(ContentField::WhyWorthIt),
                "tags_min": limits.tags_min,
                "tags_max": limits.tags_max,
            },
            "bullet_count": self.rules.structure.bullet_count,
            "cta": self.rules.structure.cta_text,
        })
    }
}

/// Populated facts only, as label/value pairs.
fn fact_lines(facts: &ProductFacts) -> Vec<Value> {
    let join = |items: &[String]| (!items.is_empty()).then(|| items.join(", "));
    let lines: Vec<(&str, Option<String>)> = vec![
        ("Category", facts.category.clone()),
        ("SKU", facts.sku.clone()),
        ("EAN", facts.ean.clone()),
        ("Description", facts.description.clone()),
        ("Additional description", facts.additional_description.clone()),
        ("Material", facts.material.clone()),
        ("Color", facts.color.clone()),
        ("Dimensions", facts.dimensions.as_ref().map(|d| d.display())),
        ("Warranty", facts.warranty.as_ref().map(|w| w.display())),
        ("Certificates", join(&facts.certificates)),
        ("Quantity", facts.quantity.map(|q| q.to_string())),
        ("Drive sizes", join(&facts.drive_sizes)),
        ("Keywords", join(&facts.keywords)),
    ];
    lines
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| json!({ "label": label, "value": v })))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::prompt::JinjaRenderer;
    use anyhow::Result;

    fn builder() -> InstructionBuilder {
        InstructionBuilder::new(
            Arc::new(JinjaRenderer::new()),
            GenerationConfig::default(),
            RuleSet::default(),
        )
    }

    fn facts() -> ProductFacts {
        ProductFacts {
            name: Some("Socket set".into()),
            material: Some("CrV".into()),
            quantity: Some(3),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_prompt_lists_only_known_facts() -> Result<()> {
        let prompt = builder().prompt(&facts(), 1, &[])?;
        assert!(prompt.contains("Product: Socket set"));
        assert!(prompt.contains("- Material: CrV"));
        assert!(prompt.contains("- Quantity: 3"));
        assert!(!prompt.contains("Warranty"));
        assert!(prompt.contains("45-60 characters"));
        assert!(!prompt.contains("attempt"));
        Ok(())
    }

    #[test]
    fn test_retry_names_only_weak_metrics() -> Result<()> {
        let request = builder().request(&facts(), 2, &[Metric::Readability])?;
        assert!(request.prompt.contains("This is attempt 2"));
        assert!(request.prompt.contains("- readability: Use sentences"));
        assert!(!request.prompt.contains("engagement"));
        assert_eq!(request.focus_metrics, vec![Metric::Readability]);
        Ok(())
    }
}
