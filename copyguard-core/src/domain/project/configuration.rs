// copyguard-core/src/domain/project/configuration.rs

use crate::domain::export::SeoNameConfig;
use crate::domain::product::ExtractorConfig;
use crate::domain::quality::{Metric, QualityConfig};
use crate::domain::rules::RuleSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

/// Contenu de copyguard.yaml. Chaque section a des valeurs par défaut complètes :
/// un fichier vide (ou absent) donne une configuration utilisable.
#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ProjectConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(rename = "output-path", default = "default_output_path")]
    pub output_path: String,

    #[validate(nested)]
    #[serde(default)]
    pub rules: RuleSet,

    #[validate(nested)]
    #[serde(default)]
    pub quality: QualityConfig,

    #[validate(nested)]
    #[serde(default)]
    pub regeneration: RegenerationConfig,

    #[validate(nested)]
    #[serde(default)]
    pub batch: BatchConfig,

    #[validate(nested)]
    #[serde(default)]
    pub generation: GenerationConfig,

    #[validate(nested)]
    #[serde(default)]
    pub extraction: ExtractorConfig,

    #[validate(nested)]
    #[serde(default)]
    pub seo_name: SeoNameConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            output_path: default_output_path(),
            rules: RuleSet::default(),
            quality: QualityConfig::default(),
            regeneration: RegenerationConfig::default(),
            batch: BatchConfig::default(),
            generation: GenerationConfig::default(),
            extraction: ExtractorConfig::default(),
            seo_name: SeoNameConfig::default(),
        }
    }
}

fn default_name() -> String {
    "copyguard".to_string()
}
fn default_output_path() -> String {
    "results.json".to_string()
}

// --- REGENERATION ---

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
#[serde(default)]
pub struct RegenerationConfig {
    /// Generator calls per product, first attempt included.
    #[validate(range(min = 1, max = 10))]
    pub max_attempts: u32,
    /// Overall quality needed to accept an attempt.
    #[validate(range(min = 0.0, max = 100.0))]
    pub publish_threshold: f64,
    /// Metrics below this value are named in the retry instructions.
    #[validate(range(min = 0.0, max = 100.0))]
    pub weak_metric_target: f64,
}

impl Default for RegenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            publish_threshold: 60.0,
            weak_metric_target: 70.0,
        }
    }
}

// --- BATCH ---

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
#[serde(default)]
pub struct BatchConfig {
    #[validate(range(min = 1, max = 64))]
    pub parallelism: usize,
    /// Pause between two batches.
    pub pause_ms: u64,
    /// Attempts per item for recoverable provider errors.
    #[validate(range(min = 1, max = 10))]
    pub max_attempts: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallelism: 5,
            pause_ms: 2000,
            max_attempts: 3,
        }
    }
}

// --- GENERATION ---

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderKind {
    /// Answers recorded in a JSON file, keyed by SKU.
    Replay { path: String },
    /// Deterministic copy built from the facts alone.
    Offline,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ProviderConfig {
    #[validate(length(min = 1, message = "Provider name cannot be empty"))]
    pub name: String,
    #[serde(flatten)]
    pub kind: ProviderKind,
    #[validate(range(max = 10))]
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    2
}
fn default_retry_delay_ms() -> u64 {
    1000
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
#[serde(default)]
pub struct GenerationConfig {
    #[validate(length(min = 1))]
    pub language: String,
    pub style: String,
    /// minijinja template of the first prompt.
    #[validate(length(min = 1, message = "Prompt template cannot be empty"))]
    pub prompt_template: String,
    /// Appended to the prompt on retries; `focus` lists the weak metrics.
    pub retry_template: String,
    /// Instruction added for each weak metric.
    pub boosters: BTreeMap<Metric, String>,
    /// Tried in order; the offline generator closes the chain when enabled.
    #[validate(nested)]
    pub providers: Vec<ProviderConfig>,
    pub offline_fallback: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            style: "professional".to_string(),
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            retry_template: DEFAULT_RETRY_TEMPLATE.to_string(),
            boosters: default_boosters(),
            providers: vec![],
            offline_fallback: true,
        }
    }
}

fn default_boosters() -> BTreeMap<Metric, String> {
    BTreeMap::from([
        (
            Metric::Readability,
            "Use sentences of at most 20 words and split the description into several short paragraphs.".to_string(),
        ),
        (
            Metric::SemanticCoherence,
            "Name the product, its category and its material in the description and do not repeat phrases.".to_string(),
        ),
        (
            Metric::TechnicalAccuracy,
            "Quote every figure exactly as given in the facts and use a single unit for all dimensions.".to_string(),
        ),
        (
            Metric::SearchOptimization,
            "Put the main keyword in the title and the meta description, use H2 subheadings and one list.".to_string(),
        ),
        (
            Metric::Engagement,
            "Write in the active voice, give exactly the required bullets and end with the single call-to-action.".to_string(),
        ),
    ])
}

pub const DEFAULT_PROMPT_TEMPLATE: &str = r#"You write e-commerce product copy in {{ language }}, in a {{ style }} tone.
Use ONLY the facts below. Never invent certificates, warranty terms, dimensions or figures.

Product: {{ name }}
{% for fact in facts %}- {{ fact.label }}: {{ fact.value }}
{% endfor %}
Answer with one JSON object with these keys:
- metaTitle: {{ limits.meta_title.min }}-{{ limits.meta_title.max }} characters
- metaDescription: {{ limits.meta_description.min }}-{{ limits.meta_description.max }} characters
- bulletPoints: exactly {{ bullet_count }} items
- longDescription: HTML, {{ limits.body.min }}-{{ limits.body.max }} characters of text
- whyWorthIt: {{ limits.why_worth_it.min }}-{{ limits.why_worth_it.max }} characters, ending with "{{ cta }}"
- seoTags: {{ limits.tags_min }} to {{ limits.tags_max }} tags
"#;

pub const DEFAULT_RETRY_TEMPLATE: &str = r#"
This is attempt {{ attempt }}. The previous version was weak on:
{% for item in focus %}- {{ item.metric }}: {{ item.booster }}
{% endfor %}"#;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_empty_file_gives_defaults() -> Result<()> {
        let config: ProjectConfig = serde_yaml::from_str("{}")?;
        assert_eq!(config.batch.parallelism, 5);
        assert_eq!(config.regeneration.max_attempts, 3);
        assert_eq!(config.output_path, "results.json");
        assert!(config.validate().is_ok());
        Ok(())
    }

    #[test]
    fn test_providers_and_boosters_from_yaml() -> Result<()> {
        let yaml = r#"
generation:
  providers:
    - name: recorded
      type: replay
      path: responses.json
      max_retries: 1
  boosters:
    readability: "Short sentences."
batch:
  parallelism: 2
"#;
        let config: ProjectConfig = serde_yaml::from_str(yaml)?;
        let provider = &config.generation.providers[0];
        assert_eq!(
            provider.kind,
            ProviderKind::Replay {
                path: "responses.json".into()
            }
        );
        assert_eq!(provider.retry_delay_ms, 1000);
        assert_eq!(
            config.generation.boosters.get(&Metric::Readability).map(String::as_str),
            Some("Short sentences.")
        );
        assert_eq!(config.batch.parallelism, 2);
        Ok(())
    }

    #[test]
    fn test_out_of_range_settings_are_rejected() -> Result<()> {
        let config: ProjectConfig = serde_yaml::from_str("batch: { parallelism: 0 }")?;
        assert!(config.validate().is_err());
        Ok(())
    }
}
