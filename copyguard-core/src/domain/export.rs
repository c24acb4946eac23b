// copyguard-core/src/domain/export.rs

// Forme de sortie par produit (une ligne du futur tableur) et nom SEO dérivé.

use crate::domain::content::GeneratedContent;
use crate::domain::content::text::{char_len, collapse_whitespace, strip_markup};
use crate::domain::correction::truncate::truncate_words;
use crate::domain::product::ProductFacts;
use crate::domain::quality::{QualityScore, Rating};
use crate::domain::rules::ValidationReport;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

const BLOCK_SEPARATOR: &str = " – ";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SeoNameConfig {
    /// Prepended to the name when it does not already start with it.
    pub brand: Option<String>,
    pub banned_words: Vec<String>,
    /// Tokens kept verbatim by title casing (acronyms, norms, steel grades).
    pub keep_tokens: Vec<String>,
    #[validate(range(min = 20, max = 255))]
    pub max_length: usize,
}

impl Default for SeoNameConfig {
    fn default() -> Self {
        Self {
            brand: None,
            banned_words: [
                "profesjonalny",
                "profesjonalna",
                "profesjonalne",
                "premium",
                "najlepszy",
                "najlepsza",
                "najlepsze",
                "hit",
                "bestseller",
                "professional",
                "best",
            ]
            .map(String::from)
            .to_vec(),
            keep_tokens: [
                "VDE", "EN", "FFP1", "FFP2", "FFP3", "SNR", "COB", "LED", "USB", "CrV", "S2", "IP54",
                "IP65",
            ]
            .map(String::from)
            .to_vec(),
            max_length: 110,
        }
    }
}

/// Shop name built from facts only: name, then material and drive size,
/// then variant (color, quantity), then certificates. Blocks are dropped
/// from the end until the name fits.
pub fn derive_seo_name(facts: &ProductFacts, config: &SeoNameConfig) -> String {
    let clean = |s: &str| sanitize(s, &config.banned_words);
    let name = clean(facts.display_name());
    let head = match &config.brand {
        Some(brand) if !name.to_lowercase().starts_with(&brand.to_lowercase()) => {
            collapse_whitespace(&format!("{} {}", brand, name))
        }
        _ => name,
    };

    let common: Vec<String> = facts
        .material
        .iter()
        .chain(facts.drive_sizes.first())
        .map(|s| clean(s))
        .collect();
    let variant: Vec<String> = facts
        .color
        .iter()
        .map(|s| clean(s))
        .chain(facts.quantity.map(|q| format!("{}-piece", q)))
        .collect();
    let certificates: Vec<String> = facts.certificates.iter().map(|s| clean(s)).collect();

    let mut blocks: Vec<Vec<String>> = vec![vec![head], common, variant, certificates];
    for block in blocks.iter_mut() {
        block.retain(|s| !s.is_empty());
    }
    blocks.retain(|b| !b.is_empty());

    let render = |blocks: &[Vec<String>]| {
        blocks
            .iter()
            .map(|b| b.join(", "))
            .collect::<Vec<_>>()
            .join(BLOCK_SEPARATOR)
    };

    // Raccourcir : d'abord les certificats, puis une seule valeur par bloc.
    while blocks.len() > 1 && char_len(&render(&blocks)) > config.max_length {
        let last = blocks.len() - 1;
        if blocks[last].len() > 1 {
            blocks[last].truncate(1);
        } else {
            blocks.pop();
        }
    }

    truncate_words(&title_case(&render(&blocks), &config.keep_tokens), config.max_length)
}

fn sanitize(text: &str, banned: &[String]) -> String {
    let mut out = text.to_string();
    for word in banned.iter().filter(|w| !w.trim().is_empty()) {
        if let Ok(re) = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word.trim()))) {
            out = re.replace_all(&out, " ").into_owned();
        }
    }
    let mut words: Vec<&str> = Vec::new();
    for w in out.split_whitespace() {
        if words.last().is_some_and(|prev| prev.eq_ignore_ascii_case(w)) {
            continue;
        }
        words.push(w);
    }
    // Séparateur orphelin après suppression d'un mot banni.
    words
        .join(" ")
        .replace(" ,", ",")
        .trim_matches(|c: char| c == '–' || c == '-' || c == ',' || c.is_whitespace())
        .to_string()
}

fn title_case(text: &str, keep: &[String]) -> String {
    text.split(' ')
        .map(|w| {
            let bare = w.trim_matches(|c: char| c == '(' || c == ')' || c == ',');
            let all_caps = bare.chars().count() > 1
                && bare.chars().all(|c| !c.is_alphabetic() || c.is_uppercase());
            if all_caps || keep.iter().any(|k| k == bare) || bare.chars().any(|c| c.is_ascii_digit()) {
                return w.to_string();
            }
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One output row per product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub seo_name: String,
    pub ean: Option<String>,
    pub category: Option<String>,
    pub bullet_points: Vec<String>,
    pub long_description_text: String,
    pub long_description_html: String,
    pub why_worth_it: String,
    pub meta_title: String,
    pub meta_description: String,
    pub seo_tags: Vec<String>,
    pub overall_score: f64,
    pub rating: Rating,
    pub metrics: BTreeMap<String, f64>,
    pub attempts: u32,
    pub reached_threshold: bool,
    pub publishable: bool,
    /// Rule ids still violated by the exported content.
    pub open_violations: Vec<String>,
}

impl ExportRecord {
    pub fn new(
        facts: &ProductFacts,
        content: &GeneratedContent,
        score: &QualityScore,
        report: &ValidationReport,
        attempts: u32,
        reached_threshold: bool,
        seo: &SeoNameConfig,
    ) -> Self {
        let mut open: Vec<String> = report.violations.iter().map(|v| v.rule_id.clone()).collect();
        open.sort();
        open.dedup();

        Self {
            sku: facts.sku.clone(),
            name: facts.name.clone(),
            seo_name: derive_seo_name(facts, seo),
            ean: facts.ean.clone(),
            category: facts.category.clone(),
            bullet_points: content.bullet_points.clone(),
            long_description_text: strip_markup(&content.long_description),
            long_description_html: content.long_description.clone(),
            why_worth_it: content.why_worth_it.clone(),
            meta_title: content.meta_title.clone(),
            meta_description: content.meta_description.clone(),
            seo_tags: content.seo_tags.clone(),
            overall_score: score.overall,
            rating: score.rating,
            metrics: score.breakdown(),
            attempts,
            reached_threshold,
            publishable: report.publishable,
            open_violations: open,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn facts() -> ProductFacts {
        ProductFacts {
            name: Some("zestaw kluczy nasadowych premium".into()),
            material: Some("CrV".into()),
            drive_sizes: vec!["1/2\"".into(), "1/4\"".into()],
            quantity: Some(25),
            color: Some("czarny".into()),
            certificates: vec!["TÜV GS".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_seo_name_from_facts() {
        let name = derive_seo_name(&facts(), &SeoNameConfig::default());
        assert_eq!(
            name,
            "Zestaw Kluczy Nasadowych – CrV, 1/2\" – Czarny, 25-piece – TÜV GS"
        );
    }

    #[test]
    fn test_brand_and_length_bound() {
        let config = SeoNameConfig {
            brand: Some("Högert".into()),
            max_length: 40,
            ..Default::default()
        };
        let name = derive_seo_name(&facts(), &config);
        assert!(name.starts_with("Högert Zestaw"));
        assert!(char_len(&name) <= 40, "{}", name);
    }

    #[test]
    fn test_repeated_words_collapse() {
        assert_eq!(sanitize("Set set of tools", &[]), "Set of tools");
        assert_eq!(sanitize("Premium – hammer", &["premium".into()]), "hammer");
    }
}
