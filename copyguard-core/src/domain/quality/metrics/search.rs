// copyguard-core/src/domain/quality/metrics/search.rs

// Barème /100 : titre 20, description 15, densité 20, titres 20, structure 15,
// mots-clés associés 10. Les bornes de longueur viennent de la table unique
// des règles (LengthLimits), pas d'une copie locale.

use crate::domain::content::ContentField;
use crate::domain::content::text::{char_len, contains_ci, strip_markup, words};
use crate::domain::quality::metrics::{ScoringInput, count_tags, points};
use crate::domain::quality::score::MetricScore;

pub fn score(input: &ScoringInput<'_>) -> MetricScore {
    let content = input.content;
    let limits = &input.rules.rules.limits;
    let profile = input.facts.length_profile;
    let keyword = input.facts.primary_keyword();

    let in_band = |field: ContentField, text: &str| {
        limits
            .for_field(field, profile)
            .is_some_and(|l| l.contains(char_len(text.trim())))
    };
    let has_keyword = |text: &str| keyword.is_some_and(|k| contains_ci(text, k));

    let title = points(in_band(ContentField::MetaTitle, &content.meta_title), 10.0)
        + points(has_keyword(&content.meta_title), 10.0);
    let description = points(in_band(ContentField::MetaDescription, &content.meta_description), 7.5)
        + points(has_keyword(&content.meta_description), 7.5);

    let body_plain = strip_markup(&content.long_description);
    let density = keyword.map(|k| keyword_density(&body_plain, k));
    let density_score = match density {
        None => 20.0,
        Some(d) => density_points(d, input),
    };

    let body = &content.long_description;
    let h1 = count_tags(body, &["h1"]);
    let subheadings = count_tags(body, &["h2", "h3"]);
    // Le meta title tient lieu de H1 quand le corps n'en a pas.
    let headings = match h1 {
        0 if !content.meta_title.trim().is_empty() => 10.0,
        1 => 10.0,
        0 => 0.0,
        _ => 5.0,
    } + match subheadings {
        0 => 0.0,
        1 => 5.0,
        _ => 10.0,
    };

    let structure = if count_tags(body, &["ul", "ol"]) > 0 { 10.0 } else { 5.0 };
    let structure = structure + points(count_tags(body, &["p"]) >= 3, 5.0);

    let related: Vec<&String> = input
        .facts
        .keywords
        .iter()
        .skip(1)
        .take(input.config.search.related_keywords)
        .collect();
    let related_score = if related.is_empty() {
        10.0
    } else {
        let all = content.all_text();
        related.iter().filter(|k| contains_ci(&all, k)).count() as f64 / related.len() as f64 * 10.0
    };

    MetricScore::new(title + description + density_score + headings + structure + related_score)
        .with("title", title)
        .with("description", description)
        .with("keywordDensityPct", density.unwrap_or(0.0) * 100.0)
        .with("headings", headings)
        .with("structure", structure)
        .with("relatedKeywords", related_score)
}

/// Share of body words belonging to occurrences of `keyword`.
pub(crate) fn keyword_density(text: &str, keyword: &str) -> f64 {
    let total = words(text).len();
    let keyword_words = words(keyword).len();
    if total == 0 || keyword_words == 0 {
        return 0.0;
    }
    let occurrences = text.to_lowercase().matches(&keyword.trim().to_lowercase()).count();
    (occurrences * keyword_words) as f64 / total as f64
}

fn density_points(density: f64, input: &ScoringInput<'_>) -> f64 {
    let cfg = &input.config.search;
    if density < cfg.min_keyword_density {
        density / cfg.min_keyword_density * 20.0
    } else if density <= cfg.max_keyword_density {
        20.0
    } else {
        // Sur-optimisation.
        (20.0 - (density - cfg.max_keyword_density) * 500.0).max(0.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_density_counts_phrase_words() {
        let text = "The socket set is a socket set for work and home use today";
        // 2 occurrences x 2 words / 13 words
        assert!((keyword_density(text, "socket set") - 4.0 / 13.0).abs() < 1e-9);
        assert_eq!(keyword_density("", "socket"), 0.0);
    }
}
