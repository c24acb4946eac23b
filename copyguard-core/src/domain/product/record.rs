// copyguard-core/src/domain/product/record.rs

// Table d'alias : les exports clients ont des en-têtes hétérogènes
// ("Nazwa", "product_name", "Długość (mm)"...). On résout UNE fois, ensuite
// tout le pipeline ne voit que des champs canoniques.

use crate::domain::product::facts::LengthUnit;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Raw key-value record as read from the source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub Map<String, Value>);

impl RawRecord {
    pub fn from_pairs<K: Into<String>, V: Into<Value>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Sku,
    Name,
    Category,
    Ean,
    Description,
    AdditionalDescription,
    Material,
    Length,
    Width,
    Height,
    Dimensions,
    Color,
    Warranty,
    Certificates,
    Quantity,
    DriveSizes,
    Keywords,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 17] = [
        Self::Sku,
        Self::Name,
        Self::Category,
        Self::Ean,
        Self::Description,
        Self::AdditionalDescription,
        Self::Material,
        Self::Length,
        Self::Width,
        Self::Height,
        Self::Dimensions,
        Self::Color,
        Self::Warranty,
        Self::Certificates,
        Self::Quantity,
        Self::DriveSizes,
        Self::Keywords,
    ];

    /// Accepted headers, most specific first. Compared after normalization.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Sku => &["indeks", "index", "sku", "kod", "product_id", "id"],
            Self::Name => &["nazwa", "name", "product_name", "produkt", "title"],
            Self::Category => &["kategoria", "category", "cat"],
            Self::Ean => &["ean", "barcode", "gtin"],
            Self::Description => &["opis", "description", "desc"],
            Self::AdditionalDescription => &[
                "dodatkowy opis",
                "additional_description",
                "additional description",
                "details",
            ],
            Self::Material => &["materiał", "material", "mat"],
            Self::Length => &["długość", "dlugosc", "length"],
            Self::Width => &["szerokość", "szerokosc", "width"],
            Self::Height => &["wysokość", "wysokosc", "height"],
            Self::Dimensions => &["wymiary", "dimensions", "size"],
            Self::Color => &["kolor", "color", "colour"],
            Self::Warranty => &["gwarancja", "warranty", "guarantee"],
            Self::Certificates => &["certyfikaty", "certyfikat", "certificates", "certifications"],
            Self::Quantity => &[
                "ilość elementów",
                "ilosc elementow",
                "liczba elementów",
                "quantity",
                "element_count",
                "pieces",
                "qty",
            ],
            Self::DriveSizes => &["rozmiary", "drive_sizes", "drive sizes", "sizes"],
            Self::Keywords => &["słowa kluczowe", "keywords", "tags"],
        }
    }
}

/// A value picked for a canonical field, with the unit hint from its header.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedValue {
    pub value: Value,
    pub header_unit: Option<LengthUnit>,
}

/// Lowercased, trimmed header, with a trailing `(mm)`-style unit split off.
pub fn normalize_header(key: &str) -> (String, Option<LengthUnit>) {
    let key = key.trim().to_lowercase();
    let key = key.split_whitespace().collect::<Vec<_>>().join(" ");
    if let Some(open) = key.rfind('(')
        && key.ends_with(')')
    {
        let unit = LengthUnit::parse(&key[open + 1..key.len() - 1]);
        if unit.is_some() {
            return (key[..open].trim().to_string(), unit);
        }
    }
    (key, None)
}

/// Resolves every canonical field present in the record.
/// Alias order decides; null and blank values are skipped.
pub fn resolve(record: &RawRecord) -> HashMap<CanonicalField, ResolvedValue> {
    let normalized: Vec<(String, Option<LengthUnit>, &Value)> = record
        .0
        .iter()
        .map(|(k, v)| {
            let (key, unit) = normalize_header(k);
            (key, unit, v)
        })
        .collect();

    let mut resolved = HashMap::new();
    for field in CanonicalField::ALL {
        let hit = field.aliases().iter().find_map(|alias| {
            normalized
                .iter()
                .find(|(key, _, value)| key == alias && !is_blank(value))
        });
        if let Some((_, unit, value)) = hit {
            resolved.insert(
                field,
                ResolvedValue {
                    value: (*value).clone(),
                    header_unit: *unit,
                },
            );
        }
    }
    resolved
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_header_extracts_unit() {
        assert_eq!(
            normalize_header("  Długość (MM) "),
            ("długość".to_string(), Some(LengthUnit::Millimeters))
        );
        assert_eq!(normalize_header("Nazwa"), ("nazwa".to_string(), None));
    }

    #[test]
    fn test_resolve_prefers_alias_order_and_skips_blanks() {
        let record = RawRecord::from_pairs([
            ("title", json!("Fallback title")),
            ("Nazwa", json!("  ")),
            ("Product_Name", json!("Socket set")),
            ("SKU", json!(1234)),
        ]);
        let resolved = resolve(&record);
        assert_eq!(resolved[&CanonicalField::Name].value, json!("Socket set"));
        assert_eq!(resolved[&CanonicalField::Sku].value, json!(1234));
        assert!(!resolved.contains_key(&CanonicalField::Color));
    }
}
