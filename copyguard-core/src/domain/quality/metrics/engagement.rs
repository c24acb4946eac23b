// copyguard-core/src/domain/quality/metrics/engagement.rs

use crate::domain::content::ContentField;
use crate::domain::content::text::{contains_ci, sentences, strip_markup};
use crate::domain::quality::metrics::{ScoringInput, count_tags, points};
use crate::domain::quality::score::MetricScore;

/// Bullets (30), call-to-action (25), active voice (20), emotional terms (15),
/// emphasis markup (10).
pub fn score(input: &ScoringInput<'_>) -> MetricScore {
    let content = input.content;
    let structure = &input.rules.rules.structure;

    let required = structure.bullet_count;
    let max = input.config.engagement.max_bullets.max(required);
    let count = content.bullet_points.len();
    let bullets = if count < required {
        count as f64 / required as f64 * 30.0
    } else if count <= max {
        30.0
    } else {
        20.0
    };

    let mut cta_fields = structure.cta_fields.clone();
    if !cta_fields.contains(&structure.cta_field) {
        cta_fields.push(structure.cta_field);
    }
    let has_cta = cta_fields
        .iter()
        .any(|f| input.rules.cta_count(&content.plain_text(*f)) > 0);
    let cta = points(has_cta, 25.0);

    let prose = format!(
        "{} {}",
        strip_markup(&content.long_description),
        content.plain_text(ContentField::WhyWorthIt)
    );
    let sentence_list = sentences(&prose);
    let passive = sentence_list
        .iter()
        .filter(|s| input.passive.iter().any(|re| re.is_match(s)))
        .count();
    let active_rate = if sentence_list.is_empty() {
        1.0
    } else {
        1.0 - passive as f64 / sentence_list.len() as f64
    };
    let voice = active_rate * 20.0;

    let all = content.all_text();
    let emotional_found = input
        .config
        .engagement
        .emotional_terms
        .iter()
        .filter(|t| contains_ci(&all, t))
        .count();
    let emotional = (emotional_found as f64 * 3.0).min(15.0);

    let rich = format!("{}{}", content.long_description, content.why_worth_it);
    let emphasis = points(count_tags(&rich, &["img"]) > 0, 5.0)
        + points(count_tags(&rich, &["strong", "b"]) > 0, 3.0)
        + points(count_tags(&rich, &["em", "i"]) > 0, 2.0);

    MetricScore::new(bullets + cta + voice + emotional + emphasis)
        .with("bullets", bullets)
        .with("callToAction", cta)
        .with("activeVoiceRate", active_rate)
        .with("emotionalTerms", emotional_found as f64)
        .with("emphasis", emphasis)
}
