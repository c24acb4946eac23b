// copyguard-core/src/domain/correction/corrector.rs

// Corrections déterministes, dans un ordre FIXE. Chaque étape est un no-op sur
// un contenu déjà propre, ce qui rend correct(correct(x)) == correct(x).
// Aucune étape n'ajoute d'information absente des faits produit.

use crate::domain::content::markup::{balance, drop_empty_elements};
use crate::domain::content::text::{
    capitalize_first, char_len, collapse_whitespace, contains_ci, map_text, rewrite_sentences,
    strip_markup, terminate, words,
};
use crate::domain::content::{ContentField, GeneratedContent};
use crate::domain::correction::bullets;
use crate::domain::correction::truncate::{
    terminate_html, truncate_html, truncate_sentence, truncate_words,
};
use crate::domain::product::{Dimensions, ProductFacts};
use crate::domain::rules::compiled::{CompiledGroup, CompiledRules};
use crate::domain::rules::violation::ValidationReport;
use regex::{Captures, NoExpand, Regex};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

// Un fragment de phrase coupé sur un mot tronqué n'est gardé qu'à partir de 3 mots.
const MIN_KEPT_WORDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixStep {
    PlaceholderStrip,
    ClaimStrip,
    PhraseStrip,
    UnitRewrite,
    BulletRepair,
    Truncation,
    MarkupBalance,
    CtaDedup,
}

impl fmt::Display for FixStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PlaceholderStrip => "placeholder strip",
            Self::ClaimStrip => "claim strip",
            Self::PhraseStrip => "phrase strip",
            Self::UnitRewrite => "unit rewrite",
            Self::BulletRepair => "bullet repair",
            Self::Truncation => "truncation",
            Self::MarkupBalance => "markup balance",
            Self::CtaDedup => "call-to-action dedup",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFix {
    pub step: FixStep,
    pub field: Option<ContentField>,
    pub detail: String,
}

#[derive(Debug, Clone)]
pub struct Correction {
    pub content: GeneratedContent,
    pub fixes: Vec<AppliedFix>,
}

impl Correction {
    pub fn changed(&self) -> bool {
        !self.fixes.is_empty()
    }
}

pub struct Corrector {
    rules: Arc<CompiledRules>,
}

impl Corrector {
    pub fn new(rules: Arc<CompiledRules>) -> Self {
        Self { rules }
    }

    /// Applies every deterministic fix in order. The report only tells what
    /// is left for regeneration; the steps themselves are unconditional.
    #[instrument(skip_all, fields(product = %facts.id()))]
    pub fn correct(
        &self,
        content: &GeneratedContent,
        report: &ValidationReport,
        facts: &ProductFacts,
    ) -> Correction {
        for v in report.violations.iter().filter(|v| v.suggested_fix.is_none()) {
            debug!(rule = %v.rule_id, evidence = %v.evidence, "No deterministic fix, left to regeneration");
        }

        let mut log = FixLog::new(content);
        log.apply(FixStep::PlaceholderStrip, |c| self.strip_placeholders(c));
        log.apply(FixStep::ClaimStrip, |c| self.strip_claims(c, facts));
        log.apply(FixStep::PhraseStrip, |c| self.strip_phrases(c));
        log.apply(FixStep::UnitRewrite, |c| self.rewrite_units(c, facts));
        log.apply(FixStep::BulletRepair, |c| self.repair_bullets(c, facts));
        log.apply(FixStep::Truncation, |c| self.truncate(c, facts));
        log.apply(FixStep::MarkupBalance, |c| self.balance_markup(c));
        log.apply(FixStep::CtaDedup, |c| self.deduplicate_cta(c, facts));

        debug!(fixes = log.fixes.len(), "Correction done");
        Correction {
            content: log.current,
            fixes: log.fixes,
        }
    }

    // --- 1. PLACEHOLDERS ---

    fn strip_placeholders(&self, content: &GeneratedContent) -> GeneratedContent {
        let rules = self.rules.as_ref();
        let mut spans: Vec<&Regex> = rules.placeholder.iter().collect();
        if rules.rules.placeholders.detect_ellipsis {
            spans.push(&rules.ellipsis);
        }

        let mut out = content.map_strings(|field, text| match field {
            ContentField::MetaTitle => remove_spans(text, &spans),
            ContentField::Bullets if rules.has_placeholder(text) => String::new(),
            ContentField::Bullets => text.to_string(),
            _ => edit_prose(field, text, |s| self.clean_placeholder_sentence(s)),
        });
        out.seo_tags.retain(|t| !rules.has_placeholder(t));
        out
    }

    fn clean_placeholder_sentence(&self, sentence: &str) -> Option<String> {
        let rules = self.rules.as_ref();
        if rules.placeholder.as_ref().is_some_and(|re| re.is_match(sentence)) {
            return None;
        }
        if !rules.rules.placeholders.detect_ellipsis {
            return Some(sentence.to_string());
        }
        let Some(m) = rules.ellipsis.find(sentence) else {
            return Some(sentence.to_string());
        };
        // Mot tronqué : on garde ce qui précède s'il reste une vraie phrase.
        let prefix = sentence[..m.start()].trim_end();
        (words(prefix).len() >= MIN_KEPT_WORDS).then(|| terminate(prefix))
    }

    // --- 2. CLAIMS ---

    fn strip_claims(&self, content: &GeneratedContent, facts: &ProductFacts) -> GeneratedContent {
        let unsupported: Vec<&CompiledGroup> = self
            .rules
            .groups
            .iter()
            .filter(|g| g.is_claim() && !g.is_supported_by(facts))
            .collect();
        if unsupported.is_empty() {
            return content.clone();
        }
        let spans: Vec<&Regex> = unsupported
            .iter()
            .flat_map(|g| g.entries.iter().map(|e| &e.regex))
            .collect();
        let hits = |s: &str| unsupported.iter().any(|g| g.matches(s));

        content.map_strings(|field, text| match field {
            ContentField::MetaTitle => remove_spans(text, &spans),
            ContentField::Bullets if hits(text) => String::new(),
            ContentField::Bullets => text.to_string(),
            _ => edit_prose(field, text, |s| (!hits(s)).then(|| s.to_string())),
        })
    }

    // --- 3. BANNED PHRASES ---

    fn strip_phrases(&self, content: &GeneratedContent) -> GeneratedContent {
        content.map_strings(|field, text| match field {
            ContentField::MetaTitle | ContentField::Bullets => self.replace_phrases(text),
            _ => edit_prose(field, text, |s| Some(self.replace_phrases(s))),
        })
    }

    fn replace_phrases(&self, text: &str) -> String {
        let mut out = text.to_string();
        for group in self.rules.groups.iter().filter(|g| !g.is_claim()) {
            for entry in &group.entries {
                let replacement = entry.replacement.as_deref().unwrap_or("");
                out = entry
                    .regex
                    .replace_all(&out, NoExpand(replacement))
                    .into_owned();
            }
        }
        if out == text {
            return out;
        }
        capitalize_first(&collapse_whitespace(&out))
    }

    // --- 4. DIMENSIONS ---

    fn rewrite_units(&self, content: &GeneratedContent, facts: &ProductFacts) -> GeneratedContent {
        match &facts.dimensions {
            Some(dims) => {
                let canonical = dims.display();
                content.map_strings(|field, text| match field {
                    ContentField::Body | ContentField::WhyWorthIt => {
                        map_text(text, |run| self.rewrite_mentions(run, dims, &canonical))
                    }
                    _ => self.rewrite_mentions(text, dims, &canonical),
                })
            }
            // Pas de dimensions connues : toute mention est une invention.
            None => {
                let dimension = &self.rules.dimension;
                content.map_strings(|field, text| match field {
                    ContentField::MetaTitle => remove_spans(text, &[dimension]),
                    ContentField::Bullets if dimension.is_match(text) => String::new(),
                    ContentField::Bullets => text.to_string(),
                    _ => edit_prose(field, text, |s| {
                        (!dimension.is_match(s)).then(|| s.to_string())
                    }),
                })
            }
        }
    }

    fn rewrite_mentions(&self, text: &str, dims: &Dimensions, canonical: &str) -> String {
        self.rules
            .dimension
            .replace_all(text, |caps: &Captures| {
                let whole = caps.get(0).map_or("", |m| m.as_str());
                let consistent = self
                    .rules
                    .dimension_mentions(whole)
                    .first()
                    .is_some_and(|m| m.unit.is_some_and(|unit| dims.matches(m.values, unit)));
                if consistent {
                    whole.to_string()
                } else {
                    canonical.to_string()
                }
            })
            .into_owned()
    }

    // --- 5. BULLETS ---

    fn repair_bullets(&self, content: &GeneratedContent, facts: &ProductFacts) -> GeneratedContent {
        let rules = &self.rules.rules;
        let required = rules.structure.bullet_count;
        let bullet_max = rules
            .limits
            .for_field(ContentField::Bullets, facts.length_profile)
            .map(|l| l.max);

        let mut current = content.bullet_points.clone();
        if rules.structure.cta_fields.contains(&ContentField::Bullets) {
            current.retain(|b| self.rules.cta_count(b) == 0);
        }

        let candidates: Vec<bullets::SynthesizedBullet> =
            bullets::candidates(facts, &rules.bullet_templates)
                .into_iter()
                .map(|mut c| {
                    if let Some(max) = bullet_max {
                        c.text = truncate_words(&c.text, max);
                    }
                    c
                })
                .filter(|c| !self.rules.has_placeholder(&c.text) && self.rules.cta_count(&c.text) == 0)
                .collect();

        let repaired = bullets::repair(&current, required, &candidates);
        if repaired.len() < required {
            debug!(
                have = repaired.len(),
                required, "Not enough facts to complete the bullet list"
            );
        }
        GeneratedContent {
            bullet_points: repaired,
            ..content.clone()
        }
    }

    // --- 6. LENGTHS (+ ponctuation finale) ---

    fn truncate(&self, content: &GeneratedContent, facts: &ProductFacts) -> GeneratedContent {
        let rules = &self.rules.rules;
        let tolerance = rules.truncation_tolerance;
        let limit = |field| rules.limits.for_field(field, facts.length_profile);

        let mut out = content.map_strings(|field, text| {
            let Some(max) = limit(field).map(|l| l.max) else {
                return text.to_string();
            };
            match field {
                ContentField::MetaTitle | ContentField::Bullets => truncate_words(text, max),
                ContentField::MetaDescription => {
                    let terminated = terminate(text);
                    if char_len(&terminated) > max {
                        truncate_sentence(&terminated, max, tolerance)
                    } else {
                        terminated
                    }
                }
                _ => fit_html(&terminate_html(text), max, tolerance),
            }
        });
        out.seo_tags.truncate(rules.limits.tags_max);
        out
    }

    // --- 7. MARKUP ---

    fn balance_markup(&self, content: &GeneratedContent) -> GeneratedContent {
        GeneratedContent {
            long_description: drop_empty_elements(&balance(&content.long_description)),
            why_worth_it: drop_empty_elements(&balance(&content.why_worth_it)),
            ..content.clone()
        }
    }

    // --- 8. CALL-TO-ACTION ---

    fn deduplicate_cta(&self, content: &GeneratedContent, facts: &ProductFacts) -> GeneratedContent {
        let Some(cta) = &self.rules.cta else {
            return content.clone();
        };
        let structure = &self.rules.rules.structure;
        let target = structure.cta_field;

        let mut out = content.map_strings(|field, text| {
            let scanned = field == target || structure.cta_fields.contains(&field);
            if !scanned || !field.is_prose() {
                return text.to_string();
            }
            let stripped = edit_prose(field, text, |s| (!cta.is_match(s)).then(|| s.to_string()));
            if stripped == text {
                stripped
            } else if field == ContentField::MetaDescription {
                terminate(&stripped)
            } else {
                terminate_html(&stripped)
            }
        });

        if !target.is_prose() {
            debug!(field = %target, "Call-to-action field is not prose, nothing appended");
            return out;
        }
        if contains_ci(&out.plain_text(target), &structure.cta_text) {
            return out;
        }
        let max = self
            .rules
            .rules
            .limits
            .for_field(target, facts.length_profile)
            .map(|l| l.max);
        if let Some(text) = prose_mut(&mut out, target) {
            *text = self.append_cta(text, target, max);
        }
        out
    }

    fn append_cta(&self, text: &str, field: ContentField, max: Option<usize>) -> String {
        let rules = &self.rules.rules;
        let cta = rules.structure.cta_text.trim();
        let html = field != ContentField::MetaDescription;
        let mut base = text.to_string();

        if let Some(max) = max {
            // Place pour " " + CTA.
            let budget = max.saturating_sub(char_len(cta) + 1);
            if char_len(&plain(field, &base)) > budget {
                base = if html {
                    fit_html(&base, budget, rules.truncation_tolerance)
                } else {
                    truncate_sentence(&base, budget, rules.truncation_tolerance)
                };
            }
        }

        if plain(field, &base).trim().is_empty() {
            return cta.to_string();
        }
        let trimmed = base.trim_end();
        match trimmed.strip_suffix("</p>") {
            Some(inner) if html => format!("{} {}</p>", inner.trim_end(), cta),
            _ => format!("{} {}", trimmed, cta),
        }
    }
}

struct FixLog {
    current: GeneratedContent,
    fixes: Vec<AppliedFix>,
}

impl FixLog {
    fn new(content: &GeneratedContent) -> Self {
        Self {
            current: content.clone(),
            fixes: Vec::new(),
        }
    }

    fn apply(&mut self, step: FixStep, f: impl FnOnce(&GeneratedContent) -> GeneratedContent) {
        let next = f(&self.current);
        for field in changed_fields(&self.current, &next) {
            self.fixes.push(AppliedFix {
                step,
                field: Some(field),
                detail: describe(field, &self.current, &next),
            });
        }
        self.current = next;
    }
}

/// Sentence-level edit of a prose field; rich text is edited run by run.
fn edit_prose(field: ContentField, text: &str, mut f: impl FnMut(&str) -> Option<String>) -> String {
    match field {
        ContentField::Body | ContentField::WhyWorthIt => {
            let edited = map_text(text, |run| rewrite_sentences(run, &mut f));
            if edited == text {
                edited
            } else {
                drop_empty_elements(&edited)
            }
        }
        _ => rewrite_sentences(text, f),
    }
}

fn remove_spans(text: &str, spans: &[&Regex]) -> String {
    let mut out = text.to_string();
    for re in spans {
        out = re.replace_all(&out, "").into_owned();
    }
    if out == text {
        return out;
    }
    capitalize_first(&collapse_whitespace(&out))
}

// Budget max - 1 : terminate_html peut encore ajouter un point.
fn fit_html(html: &str, max: usize, tolerance: f64) -> String {
    if char_len(&strip_markup(html)) <= max {
        return html.to_string();
    }
    terminate_html(&truncate_html(html, max.saturating_sub(1), tolerance))
}

fn plain(field: ContentField, text: &str) -> String {
    match field {
        ContentField::Body | ContentField::WhyWorthIt => strip_markup(text),
        _ => text.to_string(),
    }
}

fn prose_mut(content: &mut GeneratedContent, field: ContentField) -> Option<&mut String> {
    match field {
        ContentField::MetaDescription => Some(&mut content.meta_description),
        ContentField::Body => Some(&mut content.long_description),
        ContentField::WhyWorthIt => Some(&mut content.why_worth_it),
        _ => None,
    }
}

fn changed_fields(before: &GeneratedContent, after: &GeneratedContent) -> Vec<ContentField> {
    ContentField::ALL
        .into_iter()
        .filter(|f| match f {
            ContentField::MetaTitle => before.meta_title != after.meta_title,
            ContentField::MetaDescription => before.meta_description != after.meta_description,
            ContentField::Bullets => before.bullet_points != after.bullet_points,
            ContentField::Body => before.long_description != after.long_description,
            ContentField::WhyWorthIt => before.why_worth_it != after.why_worth_it,
            ContentField::Tags => before.seo_tags != after.seo_tags,
        })
        .collect()
}

fn describe(field: ContentField, before: &GeneratedContent, after: &GeneratedContent) -> String {
    match field {
        ContentField::Bullets => format!(
            "{} -> {} bullets",
            before.bullet_points.len(),
            after.bullet_points.len()
        ),
        ContentField::Tags => format!("{} -> {} tags", before.seo_tags.len(), after.seo_tags.len()),
        _ => format!(
            "{} -> {} chars",
            char_len(&before.plain_text(field)),
            char_len(&after.plain_text(field))
        ),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::content::markup::scan;
    use crate::domain::product::LengthUnit;
    use crate::domain::rules::violation::ViolationCategory;
    use crate::domain::rules::{RuleSet, RuleValidator};
    use anyhow::Result;

    fn setup() -> Result<(RuleValidator, Corrector)> {
        let validator = RuleValidator::new(RuleSet::default())?;
        let corrector = Corrector::new(validator.compiled());
        Ok((validator, corrector))
    }

    fn facts() -> ProductFacts {
        ProductFacts {
            name: Some("Socket set".into()),
            material: Some("CrV".into()),
            quantity: Some(3),
            dimensions: Some(Dimensions {
                length: 24.0,
                width: 10.0,
                height: 11.0,
                unit: LengthUnit::Centimeters,
                rescaled: false,
            }),
            ..Default::default()
        }
    }

    fn messy() -> GeneratedContent {
        GeneratedContent {
            meta_title: "Socket set TBD CrV steel".into(),
            meta_description: "Socket set made of CrV steel in a compact case. Spra...".into(),
            bullet_points: vec!["Three sockets made of CrV steel".into(), "...".into()],
            long_description: "<h2>Socket set</h2><p>The case measures 240 x 100 x 110 mm. Free shipping today.<p>Order now!</p>".into(),
            why_worth_it: "A revolutionary compact set for every workshop".into(),
            seo_tags: vec!["socket set".into(), "crv".into(), "tools".into()],
        }
    }

    fn run(
        validator: &RuleValidator,
        corrector: &Corrector,
        content: &GeneratedContent,
    ) -> Correction {
        let report = validator.validate(content, &facts());
        corrector.correct(content, &report, &facts())
    }

    fn shapes() -> Vec<(&'static str, GeneratedContent)> {
        let base = GeneratedContent {
            meta_title: "Socket set CrV with 3 elements".into(),
            meta_description: "Socket set made of CrV steel with 3 elements in a compact case.".into(),
            bullet_points: vec![
                "3 elements made of CrV".into(),
                "Dimensions: 24 × 10 × 11 cm".into(),
                "Compact case for the workshop".into(),
            ],
            long_description: "<h2>Socket set</h2><p>The socket set holds 3 elements made of CrV steel.</p>".into(),
            why_worth_it: "A compact socket set for every workshop and for daily repairs at home. Check the details!".into(),
            seo_tags: vec!["socket set".into(), "crv".into(), "tools".into()],
        };
        let long_body = format!(
            "<h2>Socket set<p>{}",
            "The socket set holds 3 elements made of CrV steel and fits every workshop. ".repeat(60)
        );

        vec![
            ("messy", messy()),
            (
                "duplicate calls to action",
                GeneratedContent {
                    long_description: "<p>The socket set holds 3 elements made of CrV. Add to cart!</p>".into(),
                    why_worth_it: "Great for the workshop and for quick repairs. Order now! Check the details! Buy now!".into(),
                    ..base.clone()
                },
            ),
            (
                "long body without closers",
                GeneratedContent {
                    long_description: long_body,
                    ..base.clone()
                },
            ),
            (
                "surplus bullets",
                GeneratedContent {
                    bullet_points: vec![
                        "3 elements made of CrV".into(),
                        "Dimensions: 24 × 10 × 11 cm".into(),
                        "Compact case for the workshop".into(),
                        "Easy to carry around".into(),
                        "Fits every toolbox".into(),
                        "Made of CrV".into(),
                    ],
                    ..base.clone()
                },
            ),
            (
                "truncated word in highlight",
                GeneratedContent {
                    why_worth_it: "A compact socket set for every workshop and daily repairs in the gar...".into(),
                    ..base
                },
            ),
        ]
    }

    #[test]
    fn test_correction_is_idempotent() -> Result<()> {
        let (validator, corrector) = setup()?;
        for (label, content) in shapes() {
            let once = run(&validator, &corrector, &content);
            let twice = run(&validator, &corrector, &once.content);
            assert_eq!(once.content, twice.content, "{}", label);
            assert!(once.changed(), "{}: nothing to correct", label);
            assert!(!twice.changed(), "{}: {:#?}", label, twice.fixes);
        }
        Ok(())
    }

    #[test]
    fn test_correction_clears_deterministic_violations() -> Result<()> {
        let (validator, corrector) = setup()?;
        let corrected = run(&validator, &corrector, &messy()).content;
        let report = validator.validate(&corrected, &facts());

        assert!(!report.has_critical(), "{:#?}", report.violations);
        assert_eq!(report.count(ViolationCategory::Placeholder), 0);
        assert_eq!(report.count(ViolationCategory::MarkupImbalance), 0);
        assert_eq!(report.count(ViolationCategory::OfferFeatureLeak), 0);
        assert_eq!(report.count(ViolationCategory::BannedPhrase), 0);
        assert!(!report.violations.iter().any(|v| v.rule_id.starts_with("dimension.")));
        assert!(!report.violations.iter().any(|v| v.rule_id.starts_with("structure.cta")));

        assert_eq!(corrected.meta_title, "Socket set CrV steel");
        assert_eq!(
            corrected.meta_description,
            "Socket set made of CrV steel in a compact case."
        );
        assert!(corrected.long_description.contains("24 × 10 × 11 cm"));
        assert!(!corrected.long_description.contains("Order now"));
        assert!(scan(&corrected.long_description).is_balanced());
        assert_eq!(
            corrected.why_worth_it,
            "A compact set for every workshop. Check the details!"
        );
        Ok(())
    }

    #[test]
    fn test_bullets_are_repaired_from_facts_only() -> Result<()> {
        let (_, corrector) = setup()?;
        let content = GeneratedContent {
            bullet_points: vec!["Sturdy case".into()],
            ..Default::default()
        };
        let report = ValidationReport::from_violations(vec![], 70.0);
        let corrected = corrector.correct(&content, &report, &facts());

        assert_eq!(
            corrected.content.bullet_points,
            vec!["Sturdy case", "3 elements made of CrV", "Dimensions: 24 × 10 × 11 cm"]
        );
        assert!(corrected
            .fixes
            .iter()
            .any(|f| f.step == FixStep::BulletRepair && f.detail == "1 -> 3 bullets"));
        Ok(())
    }

    #[test]
    fn test_unsupported_claims_are_removed() -> Result<()> {
        let (validator, corrector) = setup()?;
        let mut content = messy();
        content.long_description =
            "<p>The set holds 3 elements. Certified by TÜV. Covered by a 5 year warranty.</p>".into();
        let corrected = run(&validator, &corrector, &content).content;
        assert_eq!(corrected.long_description, "<p>The set holds 3 elements.</p>");
        Ok(())
    }

    #[test]
    fn test_long_meta_description_is_cut_on_a_sentence() -> Result<()> {
        let (validator, corrector) = setup()?;
        let mut content = messy();
        let first = format!("{}.", "a".repeat(139));
        content.meta_description = format!("{} {}", first, "b".repeat(59));
        let corrected = run(&validator, &corrector, &content).content;
        assert_eq!(corrected.meta_description, first);
        Ok(())
    }

    #[test]
    fn test_cta_fits_inside_why_worth_it_limit() -> Result<()> {
        let (validator, corrector) = setup()?;
        let mut content = messy();
        content.why_worth_it = format!("<p>{}</p>", "A solid set for daily work. ".repeat(20));
        let corrected = run(&validator, &corrector, &content).content;
        let plain = strip_markup(&corrected.why_worth_it);
        assert!(char_len(&plain) <= 400, "{}", plain.len());
        assert!(plain.ends_with("Check the details!"));
        assert!(corrected.why_worth_it.ends_with("</p>"));
        Ok(())
    }
}
