// copyguard-core/src/domain/content/markup.rs

use crate::domain::content::text::{Token, is_closing_tag, is_self_closing, tag_name, tokenize};

const VOID_ELEMENTS: &[&str] = &[
    "br", "img", "hr", "input", "meta", "link", "wbr", "source", "area", "col", "embed",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupIssues {
    /// Openers never closed, in document order.
    pub unclosed: Vec<String>,
    /// Closers without a matching opener.
    pub stray: Vec<String>,
}

impl MarkupIssues {
    pub fn is_balanced(&self) -> bool {
        self.unclosed.is_empty() && self.stray.is_empty()
    }

    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        parts.extend(self.unclosed.iter().map(|t| format!("unclosed <{}>", t)));
        parts.extend(self.stray.iter().map(|t| format!("stray </{}>", t)));
        parts.join(", ")
    }
}

fn element_tag(tag: &str) -> Option<String> {
    if tag.starts_with("<!") || is_self_closing(tag) {
        return None;
    }
    let name = tag_name(tag);
    (!name.is_empty() && !VOID_ELEMENTS.contains(&name.as_str())).then_some(name)
}

pub fn scan(html: &str) -> MarkupIssues {
    let mut issues = MarkupIssues::default();
    let mut stack: Vec<String> = Vec::new();

    for token in tokenize(html) {
        let Token::Tag(tag) = token else { continue };
        let Some(name) = element_tag(tag) else { continue };

        if is_closing_tag(tag) {
            match stack.iter().rposition(|open| *open == name) {
                Some(pos) => {
                    issues.unclosed.extend(stack.drain(pos..).skip(1));
                }
                None => issues.stray.push(name),
            }
        } else {
            stack.push(name);
        }
    }
    issues.unclosed.extend(stack);
    issues
}

/// Drops stray closers and closes everything left open. Balanced input is
/// returned unchanged.
pub fn balance(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + 16);
    let mut stack: Vec<String> = Vec::new();

    for token in tokenize(html) {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Tag(tag) => {
                let Some(name) = element_tag(tag) else {
                    out.push_str(tag);
                    continue;
                };
                if is_closing_tag(tag) {
                    let Some(pos) = stack.iter().rposition(|open| *open == name) else {
                        continue;
                    };
                    for inner in stack.drain(pos + 1..).rev() {
                        out.push_str(&format!("</{}>", inner));
                    }
                    stack.pop();
                    out.push_str(tag);
                } else {
                    stack.push(name);
                    out.push_str(tag);
                }
            }
        }
    }
    for open in stack.into_iter().rev() {
        out.push_str(&format!("</{}>", open));
    }
    out
}

/// Removes elements left without text (`<p> </p>`, `<li></li>`), repeatedly.
pub fn drop_empty_elements(html: &str) -> String {
    let mut current = html.to_string();
    loop {
        let tokens = tokenize(&current);
        let mut out = String::with_capacity(current.len());
        let mut removed = false;
        let mut i = 0;
        while i < tokens.len() {
            if let Token::Tag(open) = tokens[i]
                && !is_closing_tag(open)
                && let Some(name) = element_tag(open)
            {
                let next = match tokens.get(i + 1) {
                    Some(Token::Text(t)) if t.trim().is_empty() => i + 2,
                    _ => i + 1,
                };
                if let Some(Token::Tag(close)) = tokens.get(next)
                    && is_closing_tag(close)
                    && tag_name(close) == name
                {
                    removed = true;
                    i = next + 1;
                    continue;
                }
            }
            match tokens[i] {
                Token::Tag(t) | Token::Text(t) => out.push_str(t),
            }
            i += 1;
        }
        if !removed {
            return out;
        }
        current = out;
    }
}
