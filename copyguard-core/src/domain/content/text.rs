// copyguard-core/src/domain/content/text.rs

// Petits outils texte partagés par le validateur, le correcteur et le scorer.
// Tout est char-based (pas byte-based) : les descriptions sont en polonais,
// "ą" ou "ł" comptent pour 1.

/// A lexical piece of rich text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Tag(&'a str),
    Text(&'a str),
}

const BLOCK_TAGS: &[&str] = &[
    "p", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "br", "div", "hr", "tr", "td",
];

const TERMINAL: &[char] = &['.', '!', '?'];
const CLOSING_QUOTES: &[char] = &['"', '\'', '”', '’', ')', '»'];

/// Splits markup into tags and text runs. A `<` that does not open a tag
/// (e.g. "< 5 mm") stays text.
pub fn tokenize(html: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let bytes = html.as_bytes();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'<' {
            let opens_tag = bytes
                .get(i + 1)
                .is_some_and(|b| b.is_ascii_alphabetic() || *b == b'/' || *b == b'!');
            if opens_tag && let Some(rel_end) = html[i..].find('>') {
                if text_start < i {
                    tokens.push(Token::Text(&html[text_start..i]));
                }
                let end = i + rel_end + 1;
                tokens.push(Token::Tag(&html[i..end]));
                i = end;
                text_start = end;
                continue;
            }
        }
        i += 1;
    }
    if text_start < html.len() {
        tokens.push(Token::Text(&html[text_start..]));
    }
    tokens
}

/// Lowercase tag name of a tag token (`<h2 class="x">` -> `h2`).
pub fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

pub fn is_closing_tag(tag: &str) -> bool {
    tag.starts_with("</")
}

pub fn is_self_closing(tag: &str) -> bool {
    tag.trim_end_matches('>').trim_end().ends_with('/')
}

/// Plain text of a rich-text value. Block boundaries become spaces.
pub fn strip_markup(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    for token in tokenize(html) {
        match token {
            Token::Tag(tag) => {
                if BLOCK_TAGS.contains(&tag_name(tag).as_str()) {
                    out.push(' ');
                }
            }
            Token::Text(text) => out.push_str(&decode_entities(text)),
        }
    }
    collapse_whitespace(&out)
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Applies `f` to every text run, leaving tags untouched.
pub fn map_text(html: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(html.len());
    for token in tokenize(html) {
        match token {
            Token::Tag(tag) => out.push_str(tag),
            Token::Text(text) => out.push_str(&f(text)),
        }
    }
    out
}

/// Sentences of a plain-text value, trimmed, terminal punctuation kept.
pub fn sentences(text: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        let is_boundary = (TERMINAL.contains(&c) || c == '…')
            && chars.peek().is_none_or(|(_, next)| next.is_whitespace());
        if is_boundary {
            let end = idx + c.len_utf8();
            let piece = text[start..end].trim();
            if !piece.is_empty() {
                result.push(piece);
            }
            start = end;
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        result.push(tail);
    }
    result
}

/// Rebuilds `text` keeping only the sentences accepted by `keep`.
/// Untouched text is returned byte-for-byte.
pub fn retain_sentences(text: &str, mut keep: impl FnMut(&str) -> bool) -> String {
    let all = sentences(text);
    let kept: Vec<&str> = all.iter().copied().filter(|s| keep(s)).collect();
    if kept.len() == all.len() {
        return text.to_string();
    }
    rejoin(text, &kept.join(" "))
}

/// Rewrites every sentence through `f`; `None` drops the sentence.
pub fn rewrite_sentences(text: &str, mut f: impl FnMut(&str) -> Option<String>) -> String {
    let all = sentences(text);
    let mut changed = false;
    let mut kept = Vec::with_capacity(all.len());
    for sentence in all {
        match f(sentence) {
            Some(new) if new == sentence => kept.push(new),
            Some(new) => {
                changed = true;
                if !is_blank_sentence(&new) {
                    kept.push(new);
                }
            }
            None => changed = true,
        }
    }
    if !changed {
        return text.to_string();
    }
    rejoin(text, &kept.join(" "))
}

// Conserve l'espacement de bord du segment (utile entre deux balises).
fn rejoin(original: &str, body: &str) -> String {
    if body.is_empty() {
        return String::new();
    }
    let lead_len = original.len() - original.trim_start().len();
    let trail_start = original.trim_end().len();
    format!("{}{}{}", &original[..lead_len], body, &original[trail_start..])
}

fn is_blank_sentence(s: &str) -> bool {
    !s.chars().any(char::is_alphanumeric)
}

/// Word tokens (letters, digits, inner hyphens and apostrophes).
pub fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '\''))
        .map(|w| w.trim_matches(|c: char| c == '-' || c == '\''))
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .collect()
}

/// Vowel-group syllable estimate, at least 1.
pub fn syllables(word: &str) -> usize {
    let mut count = 0;
    let mut in_vowel = false;
    for c in word.chars().flat_map(char::to_lowercase) {
        let vowel = "aeiouyąęó".contains(c);
        if vowel && !in_vowel {
            count += 1;
        }
        in_vowel = vowel;
    }
    count.max(1)
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Prefix of at most `n` chars.
pub fn prefix_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Single spaces, no space before punctuation, no dangling separators.
pub fn collapse_whitespace(s: &str) -> String {
    let mut out = s.split_whitespace().collect::<Vec<_>>().join(" ");
    for p in [" ,", " .", " !", " ?", " ;", " :"] {
        while out.contains(p) {
            out = out.replace(p, &p[1..]);
        }
    }
    for (from, to) in [(",.", "."), (",!", "!"), (",?", "?"), (",,", ","), (";.", ".")] {
        while out.contains(from) {
            out = out.replace(from, to);
        }
    }
    out.trim_start_matches([',', ';', ':', ' ']).to_string()
}

pub fn ends_with_terminal(text: &str) -> bool {
    let plain = strip_markup(text);
    let trimmed = plain.trim_end().trim_end_matches(CLOSING_QUOTES);
    trimmed.ends_with(TERMINAL)
}

/// Appends a period to prose that stops mid-sentence.
pub fn terminate(text: &str) -> String {
    let trimmed = text.trim_end();
    if trimmed.is_empty() || ends_with_terminal(trimmed) {
        return text.to_string();
    }
    let cut = trimmed.trim_end_matches([',', ';', ':', '-', '–', '—', ' ']);
    if cut.is_empty() {
        return String::new();
    }
    format!("{}.", cut)
}

pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    !needle.trim().is_empty() && haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

/// `24.0` -> `24`, `2.5` -> `2.5`.
pub fn format_number(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.2}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markup_separates_blocks() {
        let html = "<h2>Zestaw</h2><p>Klucze &amp; nasadki.</p><ul><li>25 elementów</li></ul>";
        assert_eq!(strip_markup(html), "Zestaw Klucze & nasadki. 25 elementów");
    }

    #[test]
    fn test_tokenize_keeps_comparison_as_text() {
        let tokens = tokenize("a < 5 mm <b>x</b>");
        assert_eq!(tokens[0], Token::Text("a < 5 mm "));
        assert_eq!(tokens[1], Token::Tag("<b>"));
    }

    #[test]
    fn test_sentences_ignore_decimals() {
        let s = sentences("Waga 1.5 kg. Solidny! Czy warto? Tak");
        assert_eq!(s, vec!["Waga 1.5 kg.", "Solidny!", "Czy warto?", "Tak"]);
    }

    #[test]
    fn test_retain_sentences_untouched_is_identity() {
        let text = "  One.  Two.\n";
        assert_eq!(retain_sentences(text, |_| true), text);
        assert_eq!(retain_sentences(text, |s| s != "Two."), "  One.\n");
    }

    #[test]
    fn test_terminate_and_collapse() {
        assert_eq!(terminate("Solid build,"), "Solid build.");
        assert_eq!(terminate("Done!"), "Done!");
        assert_eq!(collapse_whitespace("  a ,  b .  "), "a, b.");
    }

    #[test]
    fn test_syllables_and_format() {
        assert_eq!(syllables("nasadki"), 3);
        assert_eq!(syllables("x"), 1);
        assert_eq!(format_number(24.0), "24");
        assert_eq!(format_number(2.5), "2.5");
    }
}
