// copyguard-core/src/domain/rules/checks/placeholder.rs

use crate::domain::content::text::{ends_with_terminal, strip_markup};
use crate::domain::content::{ContentField, GeneratedContent};
use crate::domain::rules::compiled::CompiledRules;
use crate::domain::rules::violation::{FixAction, Severity, Violation, ViolationCategory};

/// Placeholder tokens, ellipses, truncated words and unfinished prose.
/// Always critical.
pub fn check(rules: &CompiledRules, content: &GeneratedContent) -> Vec<Violation> {
    let penalty = rules.rules.penalties.placeholder;
    let mut violations = Vec::new();

    for (field, text) in rules.scan_targets(content) {
        if let Some(re) = &rules.placeholder {
            for m in re.find_iter(&text) {
                violations.push(placeholder(
                    "placeholder.token",
                    field,
                    m.as_str(),
                    format!("Placeholder token '{}' left in {}", m.as_str(), field),
                    FixAction::StripPlaceholder,
                    penalty,
                ));
            }
        }
        if rules.rules.placeholders.detect_ellipsis {
            for caps in rules.ellipsis.captures_iter(&text) {
                let whole = caps.get(0).map_or("", |m| m.as_str());
                let truncated = caps.get(1).is_some_and(|w| !w.as_str().is_empty());
                let (rule_id, message) = if truncated {
                    ("placeholder.truncated_word", format!("Truncated word '{}' in {}", whole, field))
                } else {
                    ("placeholder.ellipsis", format!("Ellipsis in {}", field))
                };
                violations.push(placeholder(
                    rule_id,
                    field,
                    whole,
                    message,
                    FixAction::StripPlaceholder,
                    penalty,
                ));
            }
        }
    }

    if rules.rules.placeholders.require_terminal_punctuation {
        let prose = [
            (ContentField::MetaDescription, content.meta_description.as_str()),
            (ContentField::Body, content.long_description.as_str()),
            (ContentField::WhyWorthIt, content.why_worth_it.as_str()),
        ];
        for (field, text) in prose {
            let plain = strip_markup(text);
            if plain.is_empty() || ends_with_terminal(&plain) {
                continue;
            }
            let tail: String = {
                let chars: Vec<char> = plain.chars().collect();
                chars[chars.len().saturating_sub(30)..].iter().collect()
            };
            violations.push(placeholder(
                "placeholder.incomplete_sentence",
                field,
                &tail,
                format!("{} does not end with a complete sentence", field),
                FixAction::TerminateSentence,
                penalty,
            ));
        }
    }
    violations
}

fn placeholder(
    rule_id: &str,
    field: ContentField,
    evidence: &str,
    message: String,
    fix: FixAction,
    penalty: f64,
) -> Violation {
    Violation {
        rule_id: rule_id.to_string(),
        category: ViolationCategory::Placeholder,
        severity: Severity::Critical,
        field: Some(field),
        evidence: evidence.to_string(),
        message,
        suggested_fix: Some(fix),
        penalty,
    }
}
