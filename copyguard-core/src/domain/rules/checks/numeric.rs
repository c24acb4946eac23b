// copyguard-core/src/domain/rules/checks/numeric.rs

// Une seule source de vérité pour les chiffres : un nombre cité dans les puces
// doit aussi figurer dans le corps (et inversement). Signalé, jamais bloquant.

use crate::domain::content::{ContentField, GeneratedContent};
use crate::domain::rules::compiled::CompiledRules;
use crate::domain::rules::violation::{Severity, Violation, ViolationCategory};
use std::collections::{BTreeMap, BTreeSet};

pub fn check(rules: &CompiledRules, content: &GeneratedContent) -> Vec<Violation> {
    let per_field: Vec<(ContentField, BTreeSet<u32>)> = rules
        .rules
        .numeric
        .fields
        .iter()
        .map(|f| (*f, content.plain_text(*f)))
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(f, text)| (f, rules.integers_in_range(&text).into_iter().collect()))
        .collect();

    if per_field.len() < 2 {
        return vec![];
    }

    let mut missing: BTreeMap<u32, Vec<ContentField>> = BTreeMap::new();
    let all: BTreeSet<u32> = per_field.iter().flat_map(|(_, n)| n.iter().copied()).collect();
    for n in all {
        for (field, numbers) in &per_field {
            if !numbers.contains(&n) {
                missing.entry(n).or_default().push(*field);
            }
        }
    }

    missing
        .into_iter()
        .map(|(n, fields)| {
            let names: Vec<&str> = fields.iter().map(ContentField::as_str).collect();
            Violation {
                rule_id: "numeric.single_source".to_string(),
                category: ViolationCategory::NumericInconsistency,
                severity: Severity::High,
                field: fields.first().copied(),
                evidence: n.to_string(),
                message: format!("{} is missing in: {}", n, names.join(", ")),
                suggested_fix: None,
                penalty: rules.rules.penalties.numeric,
            }
        })
        .collect()
}
