// copyguard-core/src/domain/correction/bullets.rs

// Puces synthétisées UNIQUEMENT à partir des faits. Si un fait manque, la puce
// correspondante n'existe pas : on préfère une liste incomplète à une invention.

use crate::domain::product::ProductFacts;
use crate::domain::rules::ruleset::BulletTemplates;

/// A bullet built from facts, with the facts it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedBullet {
    pub text: String,
    pub sources: Vec<&'static str>,
}

/// Candidates in fixed priority: quantity+material, dimensions,
/// certificates, warranty, color, then single facts.
pub fn candidates(facts: &ProductFacts, templates: &BulletTemplates) -> Vec<SynthesizedBullet> {
    let quantity = facts.quantity.map(|q| q.to_string());
    let material = facts.material.clone();
    let dimensions = facts.dimensions.as_ref().map(|d| d.display());
    let certificates = (!facts.certificates.is_empty()).then(|| facts.certificates.join(", "));
    let warranty = facts.warranty.as_ref().map(|w| w.display());
    let drive_sizes = (!facts.drive_sizes.is_empty()).then(|| facts.drive_sizes.join(", "));

    let slots: Vec<(&str, Vec<(&'static str, Option<String>)>)> = vec![
        (
            &templates.quantity_material,
            vec![("quantity", quantity.clone()), ("material", material.clone())],
        ),
        (&templates.dimensions, vec![("dimensions", dimensions)]),
        (&templates.certificates, vec![("certificates", certificates)]),
        (&templates.warranty, vec![("warranty", warranty)]),
        (&templates.color, vec![("color", facts.color.clone())]),
        (&templates.material, vec![("material", material)]),
        (&templates.quantity, vec![("quantity", quantity)]),
        (&templates.drive_sizes, vec![("drive_sizes", drive_sizes)]),
        (&templates.category, vec![("category", facts.category.clone())]),
    ];

    slots
        .into_iter()
        .filter_map(|(template, values)| render(template, &values))
        .collect()
}

fn render(template: &str, values: &[(&'static str, Option<String>)]) -> Option<SynthesizedBullet> {
    if template.trim().is_empty() {
        return None;
    }
    let mut text = template.to_string();
    let mut sources = Vec::with_capacity(values.len());
    for (name, value) in values {
        let value = value.as_deref().filter(|v| !v.trim().is_empty())?;
        text = text.replace(&format!("{{{}}}", name), value.trim());
        sources.push(*name);
    }
    Some(SynthesizedBullet { text, sources })
}

/// Brings the list to exactly `required` items when facts allow it:
/// surplus is cut, missing items come from `candidates`, skipping duplicates.
pub fn repair(bullets: &[String], required: usize, candidates: &[SynthesizedBullet]) -> Vec<String> {
    let mut result: Vec<String> = bullets.iter().take(required).cloned().collect();
    let normalize = |s: &str| s.trim().to_lowercase();

    for candidate in candidates {
        if result.len() >= required {
            break;
        }
        let key = normalize(&candidate.text);
        if !result.iter().any(|b| normalize(b) == key) {
            result.push(candidate.text.clone());
        }
    }
    result
}
