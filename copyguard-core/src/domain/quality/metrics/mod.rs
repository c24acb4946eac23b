// Les cinq sous-scores. Chacun est une fonction pure de ScoringInput -> 0..=100.

pub mod coherence;
pub mod engagement;
pub mod readability;
pub mod search;
pub mod technical;

use crate::domain::content::GeneratedContent;
use crate::domain::content::text::{Token, is_closing_tag, tag_name, tokenize};
use crate::domain::product::ProductFacts;
use crate::domain::quality::config::QualityConfig;
use crate::domain::rules::compiled::CompiledRules;
use crate::domain::rules::violation::ValidationReport;
use regex::Regex;

pub struct ScoringInput<'a> {
    pub content: &'a GeneratedContent,
    pub facts: &'a ProductFacts,
    /// Report of the content being scored (after correction).
    pub report: &'a ValidationReport,
    pub rules: &'a CompiledRules,
    pub config: &'a QualityConfig,
    pub passive: &'a [Regex],
    /// External semantic signal in 0..=100, when a provider gives one.
    pub signal: Option<f64>,
}

/// Opening tags of the given element names.
pub(crate) fn count_tags(html: &str, names: &[&str]) -> usize {
    tokenize(html)
        .into_iter()
        .filter(|t| match t {
            Token::Tag(tag) => !is_closing_tag(tag) && names.contains(&tag_name(tag).as_str()),
            Token::Text(_) => false,
        })
        .count()
}

pub(crate) fn points(condition: bool, value: f64) -> f64 {
    if condition { value } else { 0.0 }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tags_ignores_closers() {
        let html = "<h2>A</h2><ul><li>x</li><li>y</li></ul><P>z</P>";
        assert_eq!(count_tags(html, &["li"]), 2);
        assert_eq!(count_tags(html, &["ul", "ol"]), 1);
        assert_eq!(count_tags(html, &["p"]), 1);
    }
}
