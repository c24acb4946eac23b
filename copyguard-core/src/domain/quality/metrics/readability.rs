// copyguard-core/src/domain/quality/metrics/readability.rs

use crate::domain::content::text::{
    Token, collapse_whitespace, sentences, strip_markup, syllables, tag_name, tokenize, words,
};
use crate::domain::quality::metrics::ScoringInput;
use crate::domain::quality::score::MetricScore;

const PARAGRAPH_TAGS: &[&str] = &["p", "li", "h1", "h2", "h3", "h4", "h5", "h6", "div", "br", "ul", "ol"];

/// Flesch reading ease on the body, adjusted for long sentences, long
/// paragraphs and paragraph count.
pub fn score(input: &ScoringInput<'_>) -> MetricScore {
    let cfg = &input.config.readability;
    let body = &input.content.long_description;
    let plain = strip_markup(body);
    let sentence_list = sentences(&plain);
    let word_list = words(&plain);
    let paragraph_list = paragraphs(body);

    if sentence_list.is_empty() || word_list.is_empty() {
        return MetricScore::new(cfg.empty_score).with("paragraphs", paragraph_list.len() as f64);
    }

    let sentence_count = sentence_list.len() as f64;
    let word_count = word_list.len() as f64;
    let syllable_count: usize = word_list.iter().map(|w| syllables(w)).sum();

    let words_per_sentence = word_count / sentence_count;
    let syllables_per_word = syllable_count as f64 / word_count;
    let flesch = (206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word).clamp(0.0, 100.0);

    let long_sentences = sentence_list
        .iter()
        .filter(|s| words(s).len() > cfg.max_sentence_words)
        .count();
    let long_paragraphs = paragraph_list
        .iter()
        .filter(|p| words(p).len() > cfg.max_paragraph_words)
        .count();

    let sentence_penalty = long_sentences as f64 / sentence_count * 20.0;
    let paragraph_penalty = if paragraph_list.is_empty() {
        0.0
    } else {
        long_paragraphs as f64 / paragraph_list.len() as f64 * 15.0
    };
    let bonus = if paragraph_list.len() >= cfg.min_paragraphs { 5.0 } else { 0.0 };

    MetricScore::new(flesch - sentence_penalty - paragraph_penalty + bonus)
        .with("flesch", flesch)
        .with("wordsPerSentence", words_per_sentence)
        .with("longSentences", long_sentences as f64)
        .with("paragraphs", paragraph_list.len() as f64)
        .with("longParagraphs", long_paragraphs as f64)
}

/// Paragraph texts: block elements split rich text, blank lines split plain text.
pub(crate) fn paragraphs(body: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut has_tags = false;

    for token in tokenize(body) {
        match token {
            Token::Tag(tag) => {
                has_tags = true;
                if PARAGRAPH_TAGS.contains(&tag_name(tag).as_str()) {
                    flush(&mut current, &mut result);
                }
            }
            Token::Text(text) => current.push_str(text),
        }
    }
    flush(&mut current, &mut result);

    if has_tags {
        return result;
    }
    body.split("\n\n")
        .map(collapse_whitespace)
        .filter(|p| !p.is_empty())
        .collect()
}

fn flush(current: &mut String, into: &mut Vec<String>) {
    let text = collapse_whitespace(current);
    if !text.is_empty() {
        into.push(text);
    }
    current.clear();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs_from_markup_and_plain_text() {
        assert_eq!(
            paragraphs("<h2>Set</h2><p>One two.</p><ul><li>a</li><li>b</li></ul>"),
            vec!["Set", "One two.", "a", "b"]
        );
        assert_eq!(paragraphs("First.\n\nSecond.\n\n  "), vec!["First.", "Second."]);
    }
}
