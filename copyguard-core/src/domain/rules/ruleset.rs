// copyguard-core/src/domain/rules/ruleset.rs

// Le jeu de règles est de la DONNÉE : lexique, poids, seuils, gabarits.
// Tout se surcharge depuis copyguard.yaml (section `rules`) ou
// config/lexicon.yml. Aucune règle codée en dur dans le flux de contrôle.

use crate::domain::content::ContentField;
use crate::domain::product::LengthProfile;
use crate::domain::rules::violation::Severity;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

// --- CONFIGURATION STRUCTS ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RuleSet {
    #[validate(nested)]
    #[serde(default)]
    pub placeholders: PlaceholderRules,

    #[validate(nested)]
    #[validate(custom(function = "validate_unique_group_names"))]
    #[serde(default = "default_lexicon")]
    pub lexicon: Vec<LexiconGroup>,

    #[validate(nested)]
    #[serde(default)]
    pub limits: LengthLimits,

    #[validate(nested)]
    #[serde(default)]
    pub structure: StructureRules,

    #[validate(nested)]
    #[serde(default)]
    pub numeric: NumericRules,

    #[serde(default)]
    pub penalties: Penalties,

    #[serde(default)]
    pub bullet_templates: BulletTemplates,

    /// Minimum validation score for `publishable`.
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(default = "default_publish_threshold")]
    pub publish_threshold: f64,

    /// A sentence boundary is only used for truncation past `tolerance × max`.
    #[validate(range(min = 0.1, max = 1.0))]
    #[serde(default = "default_truncation_tolerance")]
    pub truncation_tolerance: f64,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            placeholders: PlaceholderRules::default(),
            lexicon: default_lexicon(),
            limits: LengthLimits::default(),
            structure: StructureRules::default(),
            numeric: NumericRules::default(),
            penalties: Penalties::default(),
            bullet_templates: BulletTemplates::default(),
            publish_threshold: default_publish_threshold(),
            truncation_tolerance: default_truncation_tolerance(),
        }
    }
}

fn default_publish_threshold() -> f64 {
    70.0
}
fn default_truncation_tolerance() -> f64 {
    0.8
}

fn validate_unique_group_names(groups: &[LexiconGroup]) -> Result<(), ValidationError> {
    let mut names = std::collections::HashSet::new();
    for group in groups {
        if !names.insert(group.name.as_str()) {
            let mut err = ValidationError::new("duplicate_lexicon_group");
            err.message = Some(format!("Lexicon group '{}' is defined twice", group.name).into());
            return Err(err);
        }
    }
    Ok(())
}

// --- PLACEHOLDERS ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlaceholderRules {
    /// Literal tokens, matched case-insensitively on word boundaries.
    #[serde(default = "default_placeholder_tokens")]
    pub tokens: Vec<String>,
    /// Extra regular expressions.
    #[serde(default = "default_placeholder_patterns")]
    pub patterns: Vec<String>,
    #[serde(default = "default_true")]
    pub detect_ellipsis: bool,
    /// Prose fields must end with `.`, `!` or `?`.
    #[serde(default = "default_true")]
    pub require_terminal_punctuation: bool,
}

impl Default for PlaceholderRules {
    fn default() -> Self {
        Self {
            tokens: default_placeholder_tokens(),
            patterns: default_placeholder_patterns(),
            detect_ellipsis: true,
            require_terminal_punctuation: true,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_placeholder_tokens() -> Vec<String> {
    ["xx", "xxx", "tbd", "todo", "fixme", "lorem ipsum", "[placeholder]"]
        .map(String::from)
        .to_vec()
}
fn default_placeholder_patterns() -> Vec<String> {
    vec![
        r"\{\{[^}]*\}\}".to_string(),
        r"_{2,}".to_string(),
        r"(?i)\[(?:insert|wstaw|product|produkt)[^\]]*\]".to_string(),
    ]
}

// --- LEXICON ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhraseCategory {
    Fluff,
    QualityClaim,
    Certification,
    Warranty,
    Offer,
}

/// Fact a claim needs to be legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactRequirement {
    Certificates,
    Warranty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LexiconEntry {
    pub phrase: String,
    pub replacement: Option<String>,
}

// Accepte "phrase" ou {phrase, replacement} dans le YAML.
impl<'de> Deserialize<'de> for LexiconEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Plain(String),
            Full {
                phrase: String,
                #[serde(default)]
                replacement: Option<String>,
            },
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Plain(phrase) => LexiconEntry {
                phrase,
                replacement: None,
            },
            Raw::Full {
                phrase,
                replacement,
            } => LexiconEntry {
                phrase,
                replacement,
            },
        })
    }
}

impl LexiconEntry {
    fn plain(phrase: &str) -> Self {
        Self {
            phrase: phrase.to_string(),
            replacement: None,
        }
    }

    fn replaced(phrase: &str, replacement: &str) -> Self {
        Self {
            phrase: phrase.to_string(),
            replacement: Some(replacement.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LexiconGroup {
    #[validate(length(min = 1, message = "Lexicon group name cannot be empty"))]
    pub name: String,
    pub category: PhraseCategory,
    /// Penalty per occurrence.
    #[validate(range(min = 0.0))]
    pub weight: f64,
    pub severity: Severity,
    #[serde(default)]
    pub requires: Option<FactRequirement>,
    #[serde(default)]
    pub phrases: Vec<LexiconEntry>,
    #[serde(default)]
    pub patterns: Vec<String>,
}

pub fn default_lexicon() -> Vec<LexiconGroup> {
    vec![
        LexiconGroup {
            name: "fluff".into(),
            category: PhraseCategory::Fluff,
            weight: 1.0,
            severity: Severity::Low,
            requires: None,
            phrases: vec![
                LexiconEntry::replaced("highest quality", "high quality"),
                LexiconEntry::replaced("top quality", "good quality"),
                LexiconEntry::replaced("najwyższej klasy", "wysokiej jakości"),
                LexiconEntry::replaced("rewolucyjny", "nowoczesny"),
                LexiconEntry::plain("revolutionary"),
                LexiconEntry::plain("world-class"),
                LexiconEntry::plain("second to none"),
                LexiconEntry::plain("niezrównany"),
            ],
            patterns: vec![],
        },
        LexiconGroup {
            name: "quality_claims".into(),
            category: PhraseCategory::QualityClaim,
            weight: 5.0,
            severity: Severity::Medium,
            requires: None,
            phrases: [
                "indestructible",
                "lasts forever",
                "never breaks",
                "best on the market",
                "100% guaranteed",
                "niezniszczalny",
                "najlepszy na rynku",
            ]
            .map(LexiconEntry::plain)
            .to_vec(),
            patterns: vec![],
        },
        LexiconGroup {
            name: "certification".into(),
            category: PhraseCategory::Certification,
            weight: 5.0,
            severity: Severity::High,
            requires: Some(FactRequirement::Certificates),
            phrases: ["certified", "CE marked", "TÜV", "ISO 9001", "GS approved"]
                .map(LexiconEntry::plain)
                .to_vec(),
            patterns: vec![r"(?i)\bcertyfik\w*".into(), r"(?i)\bcertificat\w*".into()],
        },
        LexiconGroup {
            name: "warranty_claims".into(),
            category: PhraseCategory::Warranty,
            weight: 5.0,
            severity: Severity::High,
            requires: Some(FactRequirement::Warranty),
            phrases: vec![],
            patterns: vec![r"(?i)\bwarrant(?:y|ies)\b".into(), r"(?i)\bgwarancj\w*".into()],
        },
        LexiconGroup {
            name: "offer".into(),
            category: PhraseCategory::Offer,
            weight: 3.0,
            severity: Severity::Medium,
            requires: None,
            phrases: [
                "free shipping",
                "free delivery",
                "fast delivery",
                "in stock",
                "ships in 24h",
                "best price",
                "on sale",
                "discount",
                "darmowa dostawa",
                "wysyłka 24h",
                "najniższa cena",
                "promocja",
                "rabat",
            ]
            .map(LexiconEntry::plain)
            .to_vec(),
            patterns: vec![],
        },
    ]
}

// --- LENGTH LIMITS (table canonique unique) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_field_limit"))]
pub struct FieldLimit {
    pub min: usize,
    pub max: usize,
}

fn validate_field_limit(limit: &FieldLimit) -> Result<(), ValidationError> {
    if limit.min > limit.max || limit.max == 0 {
        let mut err = ValidationError::new("field_limit");
        err.message = Some(format!("min {} must be <= max {}", limit.min, limit.max).into());
        return Err(err);
    }
    Ok(())
}

impl FieldLimit {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, len: usize) -> bool {
        (self.min..=self.max).contains(&len)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BodyLimits {
    #[validate(nested)]
    pub standard: FieldLimit,
    #[validate(nested)]
    pub technical: FieldLimit,
    #[validate(nested)]
    pub complex: FieldLimit,
}

impl Default for BodyLimits {
    fn default() -> Self {
        Self {
            standard: FieldLimit::new(1200, 2500),
            technical: FieldLimit::new(2200, 3800),
            complex: FieldLimit::new(3500, 5300),
        }
    }
}

/// Char-count bounds shared by the validator, the corrector and the scorer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LengthLimits {
    #[validate(nested)]
    pub meta_title: FieldLimit,
    #[validate(nested)]
    pub meta_description: FieldLimit,
    /// Per bullet.
    #[validate(nested)]
    pub bullet: FieldLimit,
    #[validate(nested)]
    pub why_worth_it: FieldLimit,
    /// Plain-text length of the body, per length profile.
    #[validate(nested)]
    pub body: BodyLimits,
    pub tags_min: usize,
    pub tags_max: usize,
}

impl Default for LengthLimits {
    fn default() -> Self {
        Self {
            meta_title: FieldLimit::new(45, 60),
            meta_description: FieldLimit::new(140, 160),
            bullet: FieldLimit::new(10, 150),
            why_worth_it: FieldLimit::new(80, 400),
            body: BodyLimits::default(),
            tags_min: 3,
            tags_max: 15,
        }
    }
}

impl LengthLimits {
    pub fn for_field(&self, field: ContentField, profile: LengthProfile) -> Option<FieldLimit> {
        match field {
            ContentField::MetaTitle => Some(self.meta_title),
            ContentField::MetaDescription => Some(self.meta_description),
            ContentField::Bullets => Some(self.bullet),
            ContentField::WhyWorthIt => Some(self.why_worth_it),
            ContentField::Body => Some(match profile {
                LengthProfile::Standard => self.body.standard,
                LengthProfile::Technical => self.body.technical,
                LengthProfile::Complex => self.body.complex,
            }),
            ContentField::Tags => None,
        }
    }
}

// --- STRUCTURE ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StructureRules {
    #[validate(range(min = 1, max = 20))]
    pub bullet_count: usize,
    /// Phrases counted as a call-to-action.
    pub cta_phrases: Vec<String>,
    /// The single call-to-action the corrector keeps.
    #[validate(length(min = 1, message = "cta_text cannot be empty"))]
    pub cta_text: String,
    /// Field that ends with the call-to-action.
    pub cta_field: ContentField,
    /// Fields scanned when counting calls-to-action.
    pub cta_fields: Vec<ContentField>,
}

impl Default for StructureRules {
    fn default() -> Self {
        Self {
            bullet_count: 3,
            cta_phrases: [
                "check the details",
                "order now",
                "buy now",
                "add to cart",
                "sprawdź szczegóły",
                "zamów teraz",
                "kup teraz",
            ]
            .map(String::from)
            .to_vec(),
            cta_text: "Check the details!".to_string(),
            cta_field: ContentField::WhyWorthIt,
            cta_fields: vec![
                ContentField::Bullets,
                ContentField::Body,
                ContentField::WhyWorthIt,
            ],
        }
    }
}

// --- NUMERIC ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct NumericRules {
    /// Inclusive range of integers checked across fields.
    pub min: u32,
    #[validate(range(min = 2))]
    pub max: u32,
    #[validate(length(min = 2, message = "At least two fields are needed to compare figures"))]
    pub fields: Vec<ContentField>,
}

impl Default for NumericRules {
    fn default() -> Self {
        Self {
            min: 2,
            max: 999,
            fields: vec![ContentField::Bullets, ContentField::Body],
        }
    }
}

// --- PENALTIES ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Penalties {
    pub placeholder: f64,
    pub missing_field: f64,
    pub too_long: f64,
    pub too_short: f64,
    pub bullet_count: f64,
    pub tag_count: f64,
    pub call_to_action: f64,
    pub numeric: f64,
    pub dimension: f64,
    pub markup: f64,
}

impl Default for Penalties {
    fn default() -> Self {
        Self {
            placeholder: 10.0,
            missing_field: 20.0,
            too_long: 10.0,
            too_short: 3.0,
            bullet_count: 10.0,
            tag_count: 2.0,
            call_to_action: 5.0,
            numeric: 5.0,
            dimension: 10.0,
            markup: 5.0,
        }
    }
}

// --- BULLET TEMPLATES ---

/// Templates used to synthesize bullets from facts. `{placeholder}` names
/// must match fact names; a template is only used when all of its facts exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletTemplates {
    pub quantity_material: String,
    pub dimensions: String,
    pub certificates: String,
    pub warranty: String,
    pub color: String,
    pub material: String,
    pub quantity: String,
    pub drive_sizes: String,
    pub category: String,
}

impl Default for BulletTemplates {
    fn default() -> Self {
        Self {
            quantity_material: "{quantity} elements made of {material}".into(),
            dimensions: "Dimensions: {dimensions}".into(),
            certificates: "Certificates: {certificates}".into(),
            warranty: "Warranty: {warranty}".into(),
            color: "Color: {color}".into(),
            material: "Made of {material}".into(),
            quantity: "Set of {quantity} elements".into(),
            drive_sizes: "Drive sizes: {drive_sizes}".into(),
            category: "Category: {category}".into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_default_ruleset_is_valid() {
        assert!(RuleSet::default().validate().is_ok());
    }

    #[test]
    fn test_lexicon_entry_accepts_both_shapes() -> Result<()> {
        let yaml = r#"
name: fluff
category: fluff
weight: 1
severity: low
phrases:
  - "amazing"
  - phrase: "top notch"
    replacement: "solid"
"#;
        let group: LexiconGroup = serde_yaml::from_str(yaml)?;
        assert_eq!(group.phrases[0].replacement, None);
        assert_eq!(group.phrases[1].replacement.as_deref(), Some("solid"));
        Ok(())
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() -> Result<()> {
        let rules: RuleSet = serde_yaml::from_str("publish_threshold: 80\nstructure:\n  bullet_count: 5\n")?;
        assert_eq!(rules.publish_threshold, 80.0);
        assert_eq!(rules.structure.bullet_count, 5);
        assert_eq!(rules.structure.cta_text, "Check the details!");
        assert_eq!(rules.limits.meta_title, FieldLimit::new(45, 60));
        assert!(!rules.lexicon.is_empty());
        Ok(())
    }

    #[test]
    fn test_inverted_limit_is_rejected() {
        let mut rules = RuleSet::default();
        rules.limits.meta_title = FieldLimit::new(80, 60);
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_duplicate_group_is_rejected() {
        let mut rules = RuleSet::default();
        let first = rules.lexicon[0].clone();
        rules.lexicon.push(first);
        assert!(rules.validate().is_err());
    }
}
