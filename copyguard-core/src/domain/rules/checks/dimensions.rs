// copyguard-core/src/domain/rules/checks/dimensions.rs

use crate::domain::content::GeneratedContent;
use crate::domain::product::ProductFacts;
use crate::domain::rules::compiled::CompiledRules;
use crate::domain::rules::violation::{FixAction, Severity, Violation, ViolationCategory};

/// `L × W × H` mentions must match the canonical dimensions and unit.
pub fn check(rules: &CompiledRules, content: &GeneratedContent, facts: &ProductFacts) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (field, text) in rules.scan_targets(content) {
        for mention in rules.dimension_mentions(&text) {
            let (rule_id, message) = match &facts.dimensions {
                None => (
                    "dimension.unsupported",
                    format!("Dimensions '{}' in {} but the product has none", mention.text, field),
                ),
                Some(dims) => {
                    let consistent = mention
                        .unit
                        .is_some_and(|unit| dims.matches(mention.values, unit));
                    if consistent {
                        continue;
                    }
                    (
                        "dimension.mismatch",
                        format!("'{}' in {} disagrees with {}", mention.text, field, dims.display()),
                    )
                }
            };
            violations.push(Violation {
                rule_id: rule_id.to_string(),
                category: ViolationCategory::NumericInconsistency,
                severity: Severity::High,
                field: Some(field),
                evidence: mention.text,
                message,
                suggested_fix: Some(FixAction::RewriteUnits),
                penalty: rules.rules.penalties.dimension,
            });
        }
    }
    violations
}
