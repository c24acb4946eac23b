// copyguard-core/src/domain/correction/truncate.rs

use crate::domain::content::markup::{balance, drop_empty_elements};
use crate::domain::content::text::{
    Token, char_len, ends_with_terminal, prefix_chars, strip_markup, terminate, tokenize,
};

// En dessous, un bout de phrase n'apporte rien : on préfère l'abandonner.
const MIN_PARTIAL_CHARS: usize = 20;

/// Cuts prose to `max` chars. Uses the last `.!?` if it lies past
/// `tolerance × max`, otherwise the last word boundary plus a period.
/// The result always ends with terminal punctuation.
pub fn truncate_sentence(text: &str, max: usize, tolerance: f64) -> String {
    let text = text.trim();
    if char_len(text) <= max {
        return text.to_string();
    }
    if max < 2 {
        return String::new();
    }
    let prefix = prefix_chars(text, max);

    let boundary = prefix
        .char_indices()
        .filter(|&(i, c)| {
            matches!(c, '.' | '!' | '?')
                && prefix[i + c.len_utf8()..]
                    .chars()
                    .next()
                    .is_none_or(char::is_whitespace)
        })
        .map(|(i, c)| i + c.len_utf8())
        .next_back();

    if let Some(end) = boundary {
        let position = char_len(&prefix[..end]);
        if position as f64 > tolerance * max as f64 {
            return prefix[..end].trim_end().to_string();
        }
    }

    // Coupe au dernier mot complet, en gardant une place pour le point.
    let room = prefix_chars(text, max - 1);
    let cut = match room.rfind(char::is_whitespace) {
        Some(idx) => &room[..idx],
        None => room,
    };
    terminate(cut.trim_end())
}

/// Word-boundary cut without punctuation (titles, bullets).
pub fn truncate_words(text: &str, max: usize) -> String {
    let text = text.trim();
    if char_len(text) <= max {
        return text.to_string();
    }
    let prefix = prefix_chars(text, max);
    let cut = match text[prefix.len()..].chars().next() {
        Some(next) if !next.is_whitespace() => match prefix.rfind(char::is_whitespace) {
            Some(idx) => &prefix[..idx],
            None => prefix,
        },
        _ => prefix,
    };
    cut.trim_end()
        .trim_end_matches([',', ';', ':', '-', '–', '—', '|', '/'])
        .trim_end()
        .to_string()
}

/// Truncates rich text so that its plain text fits in `max` chars.
/// Tags after the cut are dropped and open elements closed.
pub fn truncate_html(html: &str, max: usize, tolerance: f64) -> String {
    if char_len(&strip_markup(html)) <= max {
        return html.to_string();
    }
    let mut out = String::with_capacity(html.len());
    for token in tokenize(html) {
        match token {
            Token::Tag(tag) => out.push_str(tag),
            Token::Text(text) => {
                let candidate = format!("{}{}", out, text);
                if char_len(&strip_markup(&candidate)) <= max {
                    out = candidate;
                    continue;
                }
                let used = char_len(&strip_markup(&out));
                let remaining = max.saturating_sub(used + 2);
                if remaining >= MIN_PARTIAL_CHARS {
                    let cut = truncate_sentence(text, remaining, tolerance);
                    if !cut.is_empty() {
                        let lead = &text[..text.len() - text.trim_start().len()];
                        out.push_str(lead);
                        out.push_str(&cut);
                    }
                }
                break;
            }
        }
    }
    drop_empty_elements(&balance(&out))
}

/// Terminates the last text run of rich text.
pub fn terminate_html(html: &str) -> String {
    if html.trim().is_empty() || ends_with_terminal(html) {
        return html.to_string();
    }
    let tokens = tokenize(html);
    let Some(last) = tokens
        .iter()
        .rposition(|t| matches!(t, Token::Text(s) if !s.trim().is_empty()))
    else {
        return html.to_string();
    };
    let mut out = String::with_capacity(html.len() + 1);
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Tag(t) => out.push_str(t),
            Token::Text(t) if i == last => {
                let trail = &t[t.trim_end().len()..];
                out.push_str(&terminate(t.trim_end()));
                out.push_str(trail);
            }
            Token::Text(t) => out.push_str(t),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_boundary_inside_tolerance() {
        // 139 chars + '.' => boundary at 140, then 59 more chars.
        let first = format!("{}.", "a".repeat(139));
        let text = format!("{} {}", first, "b".repeat(59));
        assert_eq!(char_len(&text), 200);
        let cut = truncate_sentence(&text, 160, 0.8);
        assert!(char_len(&cut) <= 160);
        assert!(cut.ends_with(['.', '!', '?']));
        assert_eq!(cut, first);
    }

    #[test]
    fn test_word_boundary_when_sentence_too_early() {
        let text = "Short. then a very long tail of words without any stop that keeps going and going";
        let cut = truncate_sentence(text, 40, 0.8);
        assert!(char_len(&cut) <= 40);
        assert!(cut.ends_with('.'));
        assert!(!cut.contains("goin."));
    }

    #[test]
    fn test_truncate_words_never_splits_a_word() {
        assert_eq!(truncate_words("Socket set CrV - professional", 18), "Socket set CrV");
        assert_eq!(truncate_words("Short title", 60), "Short title");
    }

    #[test]
    fn test_truncate_html_keeps_markup_valid() {
        let html = format!(
            "<h2>Set</h2><p>{}.</p><p>{}</p>",
            "a".repeat(50),
            "Second paragraph goes on. And on and on with more words here."
        );
        let cut = truncate_html(&html, 80, 0.8);
        assert!(char_len(&strip_markup(&cut)) <= 80);
        assert!(crate::domain::content::markup::scan(&cut).is_balanced());
        assert_eq!(truncate_html(&cut, 80, 0.8), cut);
    }

    #[test]
    fn test_terminate_html() {
        assert_eq!(terminate_html("<p>One</p><p>Two</p>"), "<p>One</p><p>Two.</p>");
        assert_eq!(terminate_html("<p>Done.</p>"), "<p>Done.</p>");
    }
}
