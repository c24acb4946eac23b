// copyguard-core/src/domain/rules/compiled.rs

// Version "runtime" du RuleSet : toutes les regex sont compilées UNE fois ici
// puis partagées (Arc) entre validateur, correcteur et scorer.

use crate::domain::content::text::strip_markup;
use crate::domain::content::{ContentField, GeneratedContent};
use crate::domain::error::DomainError;
use crate::domain::product::{LengthUnit, ProductFacts};
use crate::domain::rules::ruleset::{FactRequirement, LexiconGroup, PhraseCategory, RuleSet};
use crate::domain::rules::violation::{Severity, ViolationCategory};
use regex::Regex;
use validator::Validate;

pub struct CompiledEntry {
    pub label: String,
    pub regex: Regex,
    pub replacement: Option<String>,
}

pub struct CompiledGroup {
    pub name: String,
    pub category: PhraseCategory,
    pub weight: f64,
    pub severity: Severity,
    pub requires: Option<FactRequirement>,
    pub entries: Vec<CompiledEntry>,
}

impl CompiledGroup {
    pub fn is_claim(&self) -> bool {
        self.requires.is_some()
    }

    pub fn violation_category(&self) -> ViolationCategory {
        match (self.requires, self.category) {
            (Some(_), _) => ViolationCategory::UnsupportedClaim,
            (None, PhraseCategory::Offer) => ViolationCategory::OfferFeatureLeak,
            (None, _) => ViolationCategory::BannedPhrase,
        }
    }

    /// A claim group is legal when its supporting fact is populated.
    pub fn is_supported_by(&self, facts: &ProductFacts) -> bool {
        match self.requires {
            None => false,
            Some(FactRequirement::Certificates) => !facts.certificates.is_empty(),
            Some(FactRequirement::Warranty) => facts.warranty.is_some(),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.entries.iter().any(|e| e.regex.is_match(text))
    }
}

/// A `L × W × H unit` mention found in generated text.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionMention {
    pub text: String,
    pub values: [f64; 3],
    pub unit: Option<LengthUnit>,
}

pub struct CompiledRules {
    pub rules: RuleSet,
    pub placeholder: Option<Regex>,
    /// Group 1 holds the letters glued to the ellipsis (truncated word).
    pub ellipsis: Regex,
    pub groups: Vec<CompiledGroup>,
    pub dimension: Regex,
    pub cta: Option<Regex>,
    pub integer: Regex,
    pub unit_word: Regex,
}

impl CompiledRules {
    pub fn new(rules: RuleSet) -> Result<Self, DomainError> {
        rules
            .validate()
            .map_err(|e| DomainError::RuleSetError(e.to_string()))?;

        let mut placeholder_parts: Vec<String> = rules
            .placeholders
            .tokens
            .iter()
            .filter(|t| !t.trim().is_empty())
            .map(|t| phrase_pattern(t))
            .collect();
        for pattern in &rules.placeholders.patterns {
            compile("placeholders", pattern)?;
            placeholder_parts.push(format!("(?:{})", pattern));
        }
        let placeholder = if placeholder_parts.is_empty() {
            None
        } else {
            Some(compile(
                "placeholders",
                &format!("(?i){}", placeholder_parts.join("|")),
            )?)
        };

        let mut groups = Vec::with_capacity(rules.lexicon.len());
        for group in &rules.lexicon {
            groups.push(compile_group(group)?);
        }

        let cta = if rules.structure.cta_phrases.is_empty() {
            None
        } else {
            let parts: Vec<String> = rules
                .structure
                .cta_phrases
                .iter()
                .map(|p| phrase_pattern(p))
                .collect();
            Some(compile("cta", &format!("(?i){}", parts.join("|")))?)
        };

        Ok(Self {
            placeholder,
            ellipsis: compile("ellipsis", r"(\p{L}*)(?:\.{3,}|…)")?,
            groups,
            dimension: compile(
                "dimensions",
                r"(?i)(\d+(?:[.,]\d+)?)\s*(?:mm|cm)?\s*[x×*]\s*(\d+(?:[.,]\d+)?)\s*(?:mm|cm)?\s*[x×*]\s*(\d+(?:[.,]\d+)?)(?:\s*(mm|cm|m)\b)?",
            )?,
            cta,
            integer: compile("integer", r"\d+(?:[.,]\d+)?")?,
            unit_word: compile("units", r"(?i)\d\s*(mm|cm)\b")?,
            rules,
        })
    }

    /// Texts checked for phrases and placeholders: one entry per bullet,
    /// markup stripped, tags excluded.
    pub fn scan_targets(&self, content: &GeneratedContent) -> Vec<(ContentField, String)> {
        let mut targets = vec![
            (ContentField::MetaTitle, content.meta_title.clone()),
            (ContentField::MetaDescription, content.meta_description.clone()),
        ];
        targets.extend(
            content
                .bullet_points
                .iter()
                .map(|b| (ContentField::Bullets, b.clone())),
        );
        targets.push((ContentField::Body, strip_markup(&content.long_description)));
        targets.push((ContentField::WhyWorthIt, strip_markup(&content.why_worth_it)));
        targets
    }

    pub fn dimension_mentions(&self, text: &str) -> Vec<DimensionMention> {
        self.dimension
            .captures_iter(text)
            .filter_map(|caps| {
                let num = |i: usize| -> Option<f64> {
                    caps.get(i)?.as_str().replace(',', ".").parse().ok()
                };
                Some(DimensionMention {
                    text: caps.get(0)?.as_str().to_string(),
                    values: [num(1)?, num(2)?, num(3)?],
                    unit: caps.get(4).and_then(|m| LengthUnit::parse(m.as_str())),
                })
            })
            .collect()
    }

    /// Integers of the configured range; decimals are skipped.
    pub fn integers_in_range(&self, text: &str) -> Vec<u32> {
        let range = self.rules.numeric.min..=self.rules.numeric.max;
        self.integer
            .find_iter(text)
            .filter(|m| !m.as_str().contains(['.', ',']))
            .filter_map(|m| m.as_str().parse::<u32>().ok())
            .filter(|n| range.contains(n))
            .collect()
    }

    pub fn cta_count(&self, text: &str) -> usize {
        self.cta.as_ref().map_or(0, |re| re.find_iter(text).count())
    }

    pub fn has_placeholder(&self, text: &str) -> bool {
        self.placeholder.as_ref().is_some_and(|re| re.is_match(text))
            || (self.rules.placeholders.detect_ellipsis && self.ellipsis.is_match(text))
    }
}

fn compile(group: &str, pattern: &str) -> Result<Regex, DomainError> {
    Regex::new(pattern).map_err(|e| DomainError::InvalidPattern {
        group: group.to_string(),
        reason: e.to_string(),
    })
}

fn compile_group(group: &LexiconGroup) -> Result<CompiledGroup, DomainError> {
    let mut entries = Vec::with_capacity(group.phrases.len() + group.patterns.len());
    for entry in &group.phrases {
        if entry.phrase.trim().is_empty() {
            continue;
        }
        entries.push(CompiledEntry {
            label: entry.phrase.clone(),
            regex: compile(&group.name, &format!("(?i){}", phrase_pattern(&entry.phrase)))?,
            replacement: entry.replacement.clone(),
        });
    }
    for pattern in &group.patterns {
        entries.push(CompiledEntry {
            label: pattern.clone(),
            regex: compile(&group.name, pattern)?,
            replacement: None,
        });
    }
    Ok(CompiledGroup {
        name: group.name.clone(),
        category: group.category,
        weight: group.weight,
        severity: group.severity,
        requires: group.requires,
        entries,
    })
}

/// Literal phrase as a pattern: word boundaries only where the phrase
/// starts or ends with a word char, any whitespace between words.
fn phrase_pattern(phrase: &str) -> String {
    let phrase = phrase.trim();
    let escaped = phrase
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let word_start = phrase.chars().next().is_some_and(char::is_alphanumeric);
    let word_end = phrase.chars().last().is_some_and(char::is_alphanumeric);
    format!(
        "(?:{}{}{})",
        if word_start { r"\b" } else { "" },
        escaped,
        if word_end { r"\b" } else { "" }
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_placeholder_tokens_respect_word_boundaries() -> Result<()> {
        let compiled = CompiledRules::new(RuleSet::default())?;
        assert!(compiled.has_placeholder("Price: TBD"));
        assert!(compiled.has_placeholder("Size [PLACEHOLDER] here"));
        assert!(compiled.has_placeholder("Hello {{name}}"));
        assert!(compiled.has_placeholder("Spra..."));
        assert!(!compiled.has_placeholder("Boxxer todolist")); // pas de faux positifs
        Ok(())
    }

    #[test]
    fn test_invalid_pattern_is_a_configuration_error() {
        let mut rules = RuleSet::default();
        rules.lexicon[0].patterns.push("(unclosed".into());
        assert!(matches!(
            CompiledRules::new(rules),
            Err(DomainError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_integers_skip_decimals_and_out_of_range() -> Result<()> {
        let compiled = CompiledRules::new(RuleSet::default())?;
        assert_eq!(
            compiled.integers_in_range("25 pcs, 1,5 kg, year 2024, size 1 and 999"),
            vec![25, 999]
        );
        Ok(())
    }

    #[test]
    fn test_dimension_mentions() -> Result<()> {
        let compiled = CompiledRules::new(RuleSet::default())?;
        let mentions = compiled.dimension_mentions("Case: 24x10x11 cm, or 240 × 100 × 110 mm.");
        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[0].values, [24.0, 10.0, 11.0]);
        assert_eq!(mentions[0].unit, Some(LengthUnit::Centimeters));
        assert_eq!(mentions[1].unit, Some(LengthUnit::Millimeters));
        Ok(())
    }
}
