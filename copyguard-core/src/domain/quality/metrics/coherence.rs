// copyguard-core/src/domain/quality/metrics/coherence.rs

use crate::domain::content::text::{contains_ci, strip_markup, words};
use crate::domain::quality::metrics::ScoringInput;
use crate::domain::quality::score::MetricScore;
use std::collections::HashSet;

/// Core facts present in the body (40), low bigram repetition (30),
/// vocabulary size (20), external signal (10).
pub fn score(input: &ScoringInput<'_>) -> MetricScore {
    let cfg = &input.config.coherence;
    let facts = input.facts;
    let plain = strip_markup(&input.content.long_description);
    let tokens: Vec<String> = words(&plain).into_iter().map(str::to_lowercase).collect();

    let core: Vec<&str> = [&facts.name, &facts.category, &facts.material]
        .into_iter()
        .filter_map(|f| f.as_deref())
        .filter(|f| !f.trim().is_empty())
        .collect();
    let topic = if core.is_empty() {
        1.0
    } else {
        core.iter().filter(|f| contains_ci(&plain, f)).count() as f64 / core.len() as f64
    };

    let repetition = bigram_repetition(&tokens);
    let repetition_score = (1.0 - repetition / cfg.max_bigram_repetition).max(0.0);

    let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
    let vocabulary = (unique.len() as f64 / cfg.target_unique_words as f64).min(1.0);

    // Signal absent : crédit plein.
    let signal = input.signal.map_or(10.0, |s| s.clamp(0.0, 100.0) * 0.1);

    MetricScore::new(topic * 40.0 + repetition_score * 30.0 + vocabulary * 20.0 + signal)
        .with("topicCoverage", topic)
        .with("bigramRepetition", repetition)
        .with("uniqueWords", unique.len() as f64)
        .with("signal", signal)
}

/// Share of repeated bigrams, 0 when there are none.
pub(crate) fn bigram_repetition(tokens: &[String]) -> f64 {
    if tokens.len() < 2 {
        return 0.0;
    }
    let bigrams: Vec<(&str, &str)> = tokens
        .windows(2)
        .map(|w| (w[0].as_str(), w[1].as_str()))
        .collect();
    let unique: HashSet<&(&str, &str)> = bigrams.iter().collect();
    1.0 - unique.len() as f64 / bigrams.len() as f64
}
