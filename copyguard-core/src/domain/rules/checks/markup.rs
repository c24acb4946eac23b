// copyguard-core/src/domain/rules/checks/markup.rs

use crate::domain::content::markup::scan;
use crate::domain::content::{ContentField, GeneratedContent};
use crate::domain::rules::compiled::CompiledRules;
use crate::domain::rules::violation::{FixAction, Severity, Violation, ViolationCategory};

pub fn check(rules: &CompiledRules, content: &GeneratedContent) -> Vec<Violation> {
    [
        (ContentField::Body, content.long_description.as_str()),
        (ContentField::WhyWorthIt, content.why_worth_it.as_str()),
    ]
    .into_iter()
    .filter_map(|(field, html)| {
        let issues = scan(html);
        (!issues.is_balanced()).then(|| Violation {
            rule_id: "markup.imbalance".to_string(),
            category: ViolationCategory::MarkupImbalance,
            severity: Severity::Medium,
            field: Some(field),
            evidence: issues.describe(),
            message: format!("Unbalanced markup in {}", field),
            suggested_fix: Some(FixAction::BalanceMarkup),
            penalty: rules.rules.penalties.markup,
        })
    })
    .collect()
}
