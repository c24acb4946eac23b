// copyguard-core/src/infrastructure/adapters/offline.rs

// Dernier recours de la chaîne : un texte sobre construit UNIQUEMENT à partir
// des faits. Aucun appel réseau, aucune donnée inventée.

use crate::domain::content::GeneratedContent;
use crate::domain::content::text::{char_len, strip_markup, terminate};
use crate::domain::correction::bullets;
use crate::domain::correction::truncate::{truncate_sentence, truncate_words};
use crate::domain::product::ProductFacts;
use crate::domain::rules::RuleSet;
use crate::ports::generator::{ContentGenerator, GenerationError, GenerationRequest};
use async_trait::async_trait;
use tracing::debug;

pub struct OfflineGenerator {
    rules: RuleSet,
}

impl OfflineGenerator {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn compose(&self, facts: &ProductFacts) -> GeneratedContent {
        let limits = &self.rules.limits;
        let tolerance = self.rules.truncation_tolerance;
        let name = match facts.display_name().trim() {
            "" => "Product",
            n => n,
        };

        let mut title = name.to_string();
        for extra in [&facts.material, &facts.category].into_iter().flatten() {
            let candidate = format!("{} – {}", title, extra);
            if char_len(&candidate) <= limits.meta_title.max {
                title = candidate;
            }
        }

        let summary = self.summary(facts, name);
        let meta_description = truncate_sentence(&summary.join(" "), limits.meta_description.max, tolerance);

        let bullet_points: Vec<String> = bullets::candidates(facts, &self.rules.bullet_templates)
            .into_iter()
            .map(|b| truncate_words(&b.text, limits.bullet.max))
            .take(self.rules.structure.bullet_count)
            .collect();

        GeneratedContent {
            meta_title: truncate_words(&title, limits.meta_title.max),
            meta_description,
            long_description: self.body(facts, name, &summary),
            why_worth_it: self.highlight(facts, name),
            seo_tags: self.tags(facts, name),
            bullet_points,
        }
    }

    fn summary(&self, facts: &ProductFacts, name: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        match (&facts.category, &facts.material) {
            (Some(c), Some(m)) => sentences.push(format!("{} from the {} range, made of {}.", name, c, m)),
            (Some(c), None) => sentences.push(format!("{} from the {} range.", name, c)),
            (None, Some(m)) => sentences.push(format!("{} made of {}.", name, m)),
            (None, None) => sentences.push(format!("{}.", name)),
        }
        if let Some(q) = facts.quantity {
            sentences.push(format!("The set contains {} elements.", q));
        }
        if let Some(d) = &facts.dimensions {
            sentences.push(format!("Dimensions: {}.", d.display()));
        }
        sentences
    }

    fn body(&self, facts: &ProductFacts, name: &str, summary: &[String]) -> String {
        let mut html = format!("<h2>{}</h2>", escape(name));
        html.push_str(&format!("<p>{}</p>", escape(&summary.join(" "))));
        for text in [&facts.description, &facts.additional_description].into_iter().flatten() {
            let plain = strip_markup(text);
            if !plain.trim().is_empty() {
                html.push_str(&format!("<p>{}</p>", escape(&terminate(plain.trim()))));
            }
        }

        let mut specs: Vec<String> = Vec::new();
        let mut spec = |label: &str, value: Option<String>| {
            if let Some(v) = value {
                specs.push(format!("<li>{}: {}</li>", label, escape(&v)));
            }
        };
        spec("Material", facts.material.clone());
        spec("Color", facts.color.clone());
        spec("Dimensions", facts.dimensions.as_ref().map(|d| d.display()));
        spec("Quantity", facts.quantity.map(|q| q.to_string()));
        spec("Drive sizes", (!facts.drive_sizes.is_empty()).then(|| facts.drive_sizes.join(", ")));
        spec("Certificates", (!facts.certificates.is_empty()).then(|| facts.certificates.join(", ")));
        spec("Warranty", facts.warranty.as_ref().map(|w| w.display()));
        if !specs.is_empty() {
            html.push_str("<h3>Specification</h3><ul>");
            html.push_str(&specs.concat());
            html.push_str("</ul>");
        }
        html
    }

    fn highlight(&self, facts: &ProductFacts, name: &str) -> String {
        let lead = match &facts.material {
            Some(m) => format!("{} made of {} for everyday work.", name, m),
            None => format!("{} for everyday work.", name),
        };
        format!("{} {}", lead, self.rules.structure.cta_text)
    }

    fn tags(&self, facts: &ProductFacts, name: &str) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        let candidates = facts
            .keywords
            .iter()
            .map(String::as_str)
            .chain([name])
            .chain(facts.category.as_deref())
            .chain(facts.material.as_deref())
            .chain(facts.color.as_deref());
        for tag in candidates {
            let tag = tag.trim().to_lowercase();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags.truncate(self.rules.limits.tags_max);
        tags
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[async_trait]
impl ContentGenerator for OfflineGenerator {
    fn name(&self) -> &str {
        "offline"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent, GenerationError> {
        debug!(product = %request.facts.id(), "Composing offline content");
        Ok(self.compose(&request.facts))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::product::{Dimensions, LengthUnit};

    fn facts() -> ProductFacts {
        ProductFacts {
            name: Some("Socket set".into()),
            category: Some("Hand tools".into()),
            material: Some("CrV".into()),
            quantity: Some(24),
            dimensions: Some(Dimensions {
                length: 24.0,
                width: 10.0,
                height: 11.0,
                unit: LengthUnit::Centimeters,
                rescaled: false,
            }),
            description: Some("<b>Sockets</b> in a case".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_content_uses_only_facts() {
        let content = OfflineGenerator::new(RuleSet::default()).compose(&facts());

        assert_eq!(content.meta_title, "Socket set – CrV – Hand tools");
        assert_eq!(content.bullet_points.len(), 3);
        assert_eq!(content.bullet_points[0], "24 elements made of CrV");
        assert!(content.long_description.contains("<li>Dimensions: 24 × 10 × 11 cm</li>"));
        assert!(content.long_description.contains("<p>Sockets in a case.</p>"));
        assert!(!content.long_description.contains("Warranty"));
        assert!(content.why_worth_it.ends_with("Check the details!"));
        assert_eq!(content.seo_tags, vec!["socket set", "hand tools", "crv"]);
    }

    #[test]
    fn test_empty_facts_still_give_content() {
        let content = OfflineGenerator::new(RuleSet::default()).compose(&ProductFacts::default());
        assert_eq!(content.meta_title, "Product");
        assert!(content.bullet_points.is_empty());
        assert!(!content.is_empty());
    }
}
