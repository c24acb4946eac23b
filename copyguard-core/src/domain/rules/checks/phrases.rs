// copyguard-core/src/domain/rules/checks/phrases.rs

use crate::domain::content::{ContentField, GeneratedContent};
use crate::domain::product::ProductFacts;
use crate::domain::rules::compiled::{CompiledGroup, CompiledRules};
use crate::domain::rules::violation::{FixAction, Violation};
use std::collections::BTreeMap;

/// Banned phrases and offer leaks: one violation per (group, phrase, field),
/// penalty = occurrences × group weight.
pub fn check_banned(rules: &CompiledRules, content: &GeneratedContent) -> Vec<Violation> {
    let targets = rules.scan_targets(content);
    rules
        .groups
        .iter()
        .filter(|g| !g.is_claim())
        .flat_map(|group| scan_group(group, &targets, "lexicon"))
        .collect()
}

/// Claims that need a supporting fact (certificates, warranty).
pub fn check_claims(
    rules: &CompiledRules,
    content: &GeneratedContent,
    facts: &ProductFacts,
) -> Vec<Violation> {
    let targets = rules.scan_targets(content);
    rules
        .groups
        .iter()
        .filter(|g| g.is_claim() && !g.is_supported_by(facts))
        .flat_map(|group| scan_group(group, &targets, "claim"))
        .collect()
}

fn scan_group(
    group: &CompiledGroup,
    targets: &[(ContentField, String)],
    prefix: &str,
) -> Vec<Violation> {
    // (entry index, field) -> (occurrences, first evidence)
    let mut hits: BTreeMap<(usize, ContentField), (usize, String)> = BTreeMap::new();
    for (field, text) in targets {
        for (idx, entry) in group.entries.iter().enumerate() {
            for m in entry.regex.find_iter(text) {
                hits.entry((idx, *field))
                    .or_insert_with(|| (0, m.as_str().to_string()))
                    .0 += 1;
            }
        }
    }

    hits.into_iter()
        .map(|((idx, field), (count, evidence))| {
            let entry = &group.entries[idx];
            let suggested_fix = if group.is_claim() {
                FixAction::StripSentence
            } else {
                match &entry.replacement {
                    Some(r) => FixAction::ReplacePhrase {
                        replacement: r.clone(),
                    },
                    None => FixAction::StripPhrase,
                }
            };
            let message = if group.is_claim() {
                format!("Unsupported claim '{}' in {} ({})", evidence, field, group.name)
            } else {
                format!("'{}' in {} ({} × {})", evidence, field, group.name, count)
            };
            Violation {
                rule_id: format!("{}.{}", prefix, group.name),
                category: group.violation_category(),
                severity: group.severity,
                field: Some(field),
                evidence,
                message,
                suggested_fix: Some(suggested_fix),
                penalty: count as f64 * group.weight,
            }
        })
        .collect()
}
