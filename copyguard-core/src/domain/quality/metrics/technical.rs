// copyguard-core/src/domain/quality/metrics/technical.rs

use crate::domain::content::text::contains_ci;
use crate::domain::quality::config::TechnicalConfig;
use crate::domain::quality::metrics::ScoringInput;
use crate::domain::quality::score::MetricScore;
use crate::domain::rules::violation::ViolationCategory;

/// 100 minus one penalty per violation category still present, minus mixed
/// units, plus credit for the populated facts the text references.
pub fn score(input: &ScoringInput<'_>) -> MetricScore {
    let cfg = &input.config.technical;
    let text = input.content.all_text();

    let penalties: f64 = input
        .report
        .categories()
        .into_iter()
        .map(|c| penalty_for(c, cfg))
        .sum();

    let mut units = input
        .rules
        .unit_word
        .captures_iter(&text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_lowercase()));
    let first = units.next();
    let mixed = first.is_some_and(|f| units.any(|u| u != f));
    let mixed_penalty = if mixed { cfg.mixed_units } else { 0.0 };

    let referenceable = input.facts.referenceable();
    let referenced = referenceable
        .iter()
        .filter(|(_, forms)| forms.iter().any(|f| contains_ci(&text, f)))
        .count();
    let fraction = if referenceable.is_empty() {
        1.0
    } else {
        referenced as f64 / referenceable.len() as f64
    };

    MetricScore::new(100.0 - penalties - mixed_penalty + cfg.reference_credit * fraction)
        .with("penalties", penalties)
        .with("mixedUnits", if mixed { 1.0 } else { 0.0 })
        .with("referencedFacts", fraction)
}

fn penalty_for(category: ViolationCategory, cfg: &TechnicalConfig) -> f64 {
    match category {
        ViolationCategory::Placeholder => cfg.placeholder,
        ViolationCategory::UnsupportedClaim => cfg.unsupported_claim,
        ViolationCategory::NumericInconsistency => cfg.numeric,
        ViolationCategory::LengthViolation => cfg.length,
        ViolationCategory::MarkupImbalance => cfg.markup,
        ViolationCategory::BannedPhrase => cfg.banned_phrase,
        ViolationCategory::OfferFeatureLeak => cfg.offer_leak,
    }
}
