// copyguard-core/src/domain/rules/checks/structure.rs

use crate::domain::content::text::char_len;
use crate::domain::content::{ContentField, GeneratedContent};
use crate::domain::product::ProductFacts;
use crate::domain::rules::compiled::CompiledRules;
use crate::domain::rules::violation::{FixAction, Severity, Violation, ViolationCategory};

/// Field lengths, bullet and tag counts, call-to-action count.
pub fn check(rules: &CompiledRules, content: &GeneratedContent, facts: &ProductFacts) -> Vec<Violation> {
    let mut violations = Vec::new();
    let limits = &rules.rules.limits;
    let penalties = &rules.rules.penalties;

    let mut texts: Vec<(ContentField, String)> = [
        ContentField::MetaTitle,
        ContentField::MetaDescription,
        ContentField::Body,
        ContentField::WhyWorthIt,
    ]
    .into_iter()
    .map(|f| (f, content.plain_text(f)))
    .collect();
    texts.extend(
        content
            .bullet_points
            .iter()
            .map(|b| (ContentField::Bullets, b.clone())),
    );

    for (field, text) in &texts {
        let Some(limit) = limits.for_field(*field, facts.length_profile) else {
            continue;
        };
        let len = char_len(text.trim());

        if len == 0 && *field != ContentField::WhyWorthIt {
            violations.push(length(
                "structure.missing_field",
                *field,
                Severity::High,
                String::new(),
                format!("{} is empty", field),
                None,
                penalties.missing_field,
            ));
        } else if len > limit.max {
            violations.push(length(
                "length.too_long",
                *field,
                Severity::High,
                len.to_string(),
                format!("{} has {} chars (max {})", field, len, limit.max),
                Some(FixAction::Truncate { max: limit.max }),
                penalties.too_long,
            ));
        } else if len < limit.min {
            violations.push(length(
                "length.too_short",
                *field,
                Severity::Low,
                len.to_string(),
                format!("{} has {} chars (min {})", field, len, limit.min),
                None,
                penalties.too_short,
            ));
        }
    }

    let required = rules.rules.structure.bullet_count;
    let count = content.bullet_points.len();
    if count != required {
        violations.push(length(
            "structure.bullet_count",
            ContentField::Bullets,
            Severity::High,
            count.to_string(),
            format!("{} bullets, exactly {} required", count, required),
            Some(FixAction::RepairBulletCount { required }),
            penalties.bullet_count,
        ));
    }

    let tags = content.seo_tags.len();
    if tags < limits.tags_min || tags > limits.tags_max {
        violations.push(length(
            "structure.tag_count",
            ContentField::Tags,
            Severity::Low,
            tags.to_string(),
            format!("{} tags, expected {}..={}", tags, limits.tags_min, limits.tags_max),
            None,
            penalties.tag_count,
        ));
    }

    let cta_count: usize = rules
        .rules
        .structure
        .cta_fields
        .iter()
        .map(|f| rules.cta_count(&content.plain_text(*f)))
        .sum();
    if cta_count == 0 {
        violations.push(length(
            "structure.cta_missing",
            rules.rules.structure.cta_field,
            Severity::Low,
            "0".to_string(),
            "No call-to-action".to_string(),
            Some(FixAction::DeduplicateCta),
            penalties.call_to_action,
        ));
    } else if cta_count > 1 {
        violations.push(length(
            "structure.cta_duplicate",
            rules.rules.structure.cta_field,
            Severity::Medium,
            cta_count.to_string(),
            format!("{} calls-to-action, exactly one expected", cta_count),
            Some(FixAction::DeduplicateCta),
            penalties.call_to_action,
        ));
    }

    violations
}

fn length(
    rule_id: &str,
    field: ContentField,
    severity: Severity,
    evidence: String,
    message: String,
    fix: Option<FixAction>,
    penalty: f64,
) -> Violation {
    Violation {
        rule_id: rule_id.to_string(),
        category: ViolationCategory::LengthViolation,
        severity,
        field: Some(field),
        evidence,
        message,
        suggested_fix: fix,
        penalty,
    }
}
