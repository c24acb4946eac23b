// copyguard-core/src/domain/product/extractor.rs

use crate::domain::error::DomainError;
use crate::domain::product::facts::{Dimensions, LengthProfile, LengthUnit, ProductFacts, Warranty};
use crate::domain::product::record::{CanonicalField, RawRecord, ResolvedValue, resolve};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExtractorConfig {
    /// Unit assumed when neither the value nor its header carries one.
    #[serde(default)]
    pub default_unit: LengthUnit,
    /// Largest plausible value in `default_unit`; above it, values are rescaled.
    #[validate(range(min = 1.0, message = "Plausibility threshold must be >= 1"))]
    #[serde(default = "default_plausibility_threshold")]
    pub plausibility_threshold: f64,
    #[serde(default = "default_complex_keywords")]
    pub complex_keywords: Vec<String>,
    #[serde(default = "default_technical_keywords")]
    pub technical_keywords: Vec<String>,
}

fn default_plausibility_threshold() -> f64 {
    50.0
}
fn default_complex_keywords() -> Vec<String> {
    ["zestaw", "komplet", "kit", "set"].map(String::from).to_vec()
}
fn default_technical_keywords() -> Vec<String> {
    ["narzędzi", "pomiar", "profesjonaln", "tool", "measuring", "dynamometr", "torque"]
        .map(String::from)
        .to_vec()
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            default_unit: LengthUnit::default(),
            plausibility_threshold: default_plausibility_threshold(),
            complex_keywords: default_complex_keywords(),
            technical_keywords: default_technical_keywords(),
        }
    }
}

/// Normalizes raw records into `ProductFacts`. Never guesses: whatever
/// cannot be parsed is left absent.
pub struct FactExtractor {
    config: ExtractorConfig,
    number: Regex,
    unit_suffix: Regex,
    triple: Regex,
    years: Regex,
    months: Regex,
}

impl FactExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self, DomainError> {
        let compile = |name: &str, pattern: &str| {
            Regex::new(pattern).map_err(|e| DomainError::InvalidPattern {
                group: format!("extractor.{}", name),
                reason: e.to_string(),
            })
        };
        Ok(Self {
            number: compile("number", r"-?\d+(?:[.,]\d+)?")?,
            unit_suffix: compile("unit", r"(?i)\d\s*(mm|cm|m)\b")?,
            triple: compile(
                "dimensions",
                r"(?i)(\d+(?:[.,]\d+)?)\s*[x×*]\s*(\d+(?:[.,]\d+)?)\s*[x×*]\s*(\d+(?:[.,]\d+)?)\s*(mm|cm|m)?\b",
            )?,
            years: compile("years", r"(?i)(\d+)\s*(?:lat|lata|rok|roku|years?|yrs?)\b")?,
            months: compile("months", r"(?i)(\d+)\s*(?:miesi\w*|mies\.?|m-cy|months?|mo)\b")?,
            config,
        })
    }

    pub fn extract(&self, record: &RawRecord) -> ProductFacts {
        let fields = resolve(record);
        let text = |f: CanonicalField| fields.get(&f).and_then(|v| value_as_text(&v.value));

        let name = text(CanonicalField::Name);
        let category = text(CanonicalField::Category);
        let length_profile = self.detect_profile(name.as_deref(), category.as_deref());

        let facts = ProductFacts {
            sku: text(CanonicalField::Sku),
            ean: text(CanonicalField::Ean),
            description: text(CanonicalField::Description),
            additional_description: text(CanonicalField::AdditionalDescription),
            material: text(CanonicalField::Material),
            color: text(CanonicalField::Color),
            dimensions: self.dimensions(&fields),
            warranty: text(CanonicalField::Warranty).map(|raw| self.warranty(raw)),
            certificates: text(CanonicalField::Certificates)
                .map(|s| split_list(&s, &[',', ';']))
                .unwrap_or_default(),
            quantity: fields
                .get(&CanonicalField::Quantity)
                .and_then(|v| self.number_of(&v.value))
                .filter(|q| *q >= 1.0 && q.fract() == 0.0 && *q <= u32::MAX as f64)
                .map(|q| q as u32),
            drive_sizes: text(CanonicalField::DriveSizes)
                .map(|s| split_list(&s, &[',', ';', '/']))
                .unwrap_or_default(),
            keywords: text(CanonicalField::Keywords)
                .map(|s| split_list(&s, &[',', ';']))
                .unwrap_or_default(),
            name,
            category,
            length_profile,
        };
        debug!(product = %facts.id(), profile = ?facts.length_profile, "Facts extracted");
        facts
    }

    /// First number in a value, tolerant of `12,5` and surrounding unit text.
    pub fn number_of(&self, value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => self.parse_number(s),
            _ => None,
        }
    }

    pub fn parse_number(&self, s: &str) -> Option<f64> {
        let m = self.number.find(s)?;
        m.as_str().replace(',', ".").parse().ok()
    }

    /// Unit written in the value itself (`"240 mm"`).
    fn written_unit(&self, resolved: &ResolvedValue) -> Option<LengthUnit> {
        let Value::String(s) = &resolved.value else {
            return None;
        };
        let caps = self.unit_suffix.captures(s)?;
        caps.get(1).and_then(|m| LengthUnit::parse(m.as_str()))
    }

    fn dimensions(&self, fields: &HashMap<CanonicalField, ResolvedValue>) -> Option<Dimensions> {
        let separate = [CanonicalField::Length, CanonicalField::Width, CanonicalField::Height]
            .map(|f| fields.get(&f));

        let (values, written, header) = if let [Some(l), Some(w), Some(h)] = separate {
            let values = [
                self.number_of(&l.value)?,
                self.number_of(&w.value)?,
                self.number_of(&h.value)?,
            ];
            let written = [l, w, h].iter().find_map(|r| self.written_unit(r));
            let header = [l, w, h].iter().find_map(|r| r.header_unit);
            (values, written, header)
        } else {
            let combined = fields.get(&CanonicalField::Dimensions)?;
            let raw = value_as_text(&combined.value)?;
            let caps = self.triple.captures(&raw)?;
            let num = |i: usize| -> Option<f64> {
                caps.get(i)?.as_str().replace(',', ".").parse().ok()
            };
            let written = caps.get(4).and_then(|m| LengthUnit::parse(m.as_str()));
            ([num(1)?, num(2)?, num(3)?], written, combined.header_unit)
        };

        if values.iter().any(|v| *v <= 0.0) {
            return None;
        }
        Some(self.resolve_unit(values, written, header))
    }

    /// A unit written in the value is trusted as is. Otherwise the values are
    /// in the header unit (or `default_unit`), and when that is the default
    /// unit the plausibility threshold may push them one unit up.
    fn resolve_unit(&self, values: [f64; 3], written: Option<LengthUnit>, header: Option<LengthUnit>) -> Dimensions {
        let [length, width, height] = values;
        if let Some(unit) = written {
            return Dimensions {
                length,
                width,
                height,
                unit,
                rescaled: false,
            };
        }

        let base = header.unwrap_or(self.config.default_unit);
        let largest = values.iter().copied().fold(f64::MIN, f64::max);
        if base == self.config.default_unit && largest > self.config.plausibility_threshold {
            let round = |v: f64| (v / 10.0 * 100.0).round() / 100.0;
            Dimensions {
                length: round(length),
                width: round(width),
                height: round(height),
                unit: base.coarser(),
                rescaled: true,
            }
        } else {
            Dimensions {
                length,
                width,
                height,
                unit: base,
                rescaled: false,
            }
        }
    }

    fn warranty(&self, raw: String) -> Warranty {
        let digits = |re: &Regex| -> Option<u32> { re.captures(&raw)?.get(1)?.as_str().parse().ok() };
        let months = digits(&self.years)
            .and_then(|y| y.checked_mul(12))
            .or_else(|| digits(&self.months))
            .or_else(|| raw.trim().parse::<u32>().ok());
        Warranty { raw, months }
    }

    fn detect_profile(&self, name: Option<&str>, category: Option<&str>) -> LengthProfile {
        let haystack = format!("{} {}", name.unwrap_or(""), category.unwrap_or("")).to_lowercase();
        let words: Vec<&str> = crate::domain::content::text::words(&haystack);
        let hits = |keywords: &[String]| {
            words
                .iter()
                .any(|w| keywords.iter().any(|k| w.starts_with(k.as_str())))
        };
        if hits(&self.config.complex_keywords) {
            LengthProfile::Complex
        } else if hits(&self.config.technical_keywords) {
            LengthProfile::Technical
        } else {
            LengthProfile::Standard
        }
    }
}

/// Scalar values as trimmed text. Booleans and objects are not text.
fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_as_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}

fn split_list(s: &str, separators: &[char]) -> Vec<String> {
    s.split(separators)
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    fn extractor() -> FactExtractor {
        FactExtractor::new(ExtractorConfig::default()).unwrap()
    }

    #[test]
    fn test_combined_dimensions_with_explicit_unit() -> Result<()> {
        let record = RawRecord::from_pairs([
            ("name", json!("Socket set")),
            ("dimensions", json!("24x10x11 cm")),
        ]);
        let facts = extractor().extract(&record);
        let dims = facts.dimensions.ok_or_else(|| anyhow::anyhow!("no dimensions"))?;
        assert_eq!(dims.values(), [24.0, 10.0, 11.0]);
        assert_eq!(dims.unit, LengthUnit::Centimeters);
        assert!(!dims.rescaled);
        Ok(())
    }

    #[test]
    fn test_implausible_millimeters_are_rescaled() -> Result<()> {
        let record = RawRecord::from_pairs([
            ("Długość", json!("240")),
            ("Szerokość", json!("100,5")),
            ("Wysokość", json!(110)),
        ]);
        let dims = extractor()
            .extract(&record)
            .dimensions
            .ok_or_else(|| anyhow::anyhow!("no dimensions"))?;
        assert_eq!(dims.values(), [24.0, 10.05, 11.0]);
        assert_eq!(dims.unit, LengthUnit::Centimeters);
        assert!(dims.rescaled);
        Ok(())
    }

    #[test]
    fn test_small_values_stay_in_default_unit() -> Result<()> {
        let record = RawRecord::from_pairs([("wymiary", json!("20 x 8 x 5"))]);
        let dims = extractor()
            .extract(&record)
            .dimensions
            .ok_or_else(|| anyhow::anyhow!("no dimensions"))?;
        assert_eq!(dims.unit, LengthUnit::Millimeters);
        assert!(!dims.rescaled);
        Ok(())
    }

    #[test]
    fn test_header_unit_is_respected() -> Result<()> {
        let record = RawRecord::from_pairs([
            ("length (cm)", json!(240)),
            ("width (cm)", json!(100)),
            ("height (cm)", json!(110)),
        ]);
        let dims = extractor()
            .extract(&record)
            .dimensions
            .ok_or_else(|| anyhow::anyhow!("no dimensions"))?;
        assert_eq!(dims.unit, LengthUnit::Centimeters);
        assert!(!dims.rescaled);
        Ok(())
    }

    #[test]
    fn test_millimeter_headers_still_get_rescaled() -> Result<()> {
        let record = RawRecord::from_pairs([
            ("Długość (mm)", json!(240)),
            ("Szerokość (mm)", json!(100)),
            ("Wysokość (mm)", json!(110)),
        ]);
        let dims = extractor()
            .extract(&record)
            .dimensions
            .ok_or_else(|| anyhow::anyhow!("no dimensions"))?;
        assert_eq!(dims.values(), [24.0, 10.0, 11.0]);
        assert_eq!(dims.unit, LengthUnit::Centimeters);
        assert!(dims.rescaled);
        Ok(())
    }

    #[test]
    fn test_unit_in_value_beats_header() -> Result<()> {
        let record = RawRecord::from_pairs([
            ("Długość (mm)", json!("240 mm")),
            ("Szerokość (mm)", json!(100)),
            ("Wysokość (mm)", json!(110)),
        ]);
        let dims = extractor()
            .extract(&record)
            .dimensions
            .ok_or_else(|| anyhow::anyhow!("no dimensions"))?;
        assert_eq!(dims.values(), [240.0, 100.0, 110.0]);
        assert_eq!(dims.unit, LengthUnit::Millimeters);
        assert!(!dims.rescaled);
        Ok(())
    }

    #[test]
    fn test_unparseable_fields_become_absent() {
        let record = RawRecord::from_pairs([
            ("quantity", json!("many")),
            ("length", json!("n/a")),
            ("width", json!(10)),
            ("height", json!(10)),
            ("color", json!(true)),
        ]);
        let facts = extractor().extract(&record);
        assert_eq!(facts.quantity, None);
        assert_eq!(facts.dimensions, None);
        assert_eq!(facts.color, None);
        assert!(facts.certificates.is_empty());
        assert!(facts.warranty.is_none());
    }

    #[test]
    fn test_warranty_and_certificates() {
        let record = RawRecord::from_pairs([
            ("gwarancja", json!("2 lata")),
            ("certyfikaty", json!("CE; TÜV GS, ")),
            ("ilość elementów", json!("25 szt.")),
        ]);
        let facts = extractor().extract(&record);
        let warranty = facts.warranty.unwrap();
        assert_eq!(warranty.raw, "2 lata");
        assert_eq!(warranty.months, Some(24));
        assert_eq!(facts.certificates, vec!["CE", "TÜV GS"]);
        assert_eq!(facts.quantity, Some(25));
    }

    #[test]
    fn test_warranty_months_variants() {
        let ex = extractor();
        assert_eq!(ex.warranty("24".into()).months, Some(24));
        assert_eq!(ex.warranty("24 months".into()).months, Some(24));
        assert_eq!(ex.warranty("24 miesiące".into()).months, Some(24));
        assert_eq!(ex.warranty("lifetime".into()).months, None);
        // Débordement : le champ reste sans durée, pas de panique
        assert_eq!(ex.warranty("400000000 lat".into()).months, None);
        let record = RawRecord::from_pairs([("name", json!("X")), ("gwarancja", json!("400000000 lat"))]);
        let warranty = ex.extract(&record).warranty.unwrap();
        assert_eq!(warranty.raw, "400000000 lat");
        assert_eq!(warranty.months, None);
    }

    #[test]
    fn test_length_profile_detection() {
        let ex = extractor();
        assert_eq!(ex.detect_profile(Some("Socket set"), None), LengthProfile::Complex);
        assert_eq!(
            ex.detect_profile(Some("Klucz"), Some("Narzędzia pomiarowe")),
            LengthProfile::Technical
        );
        assert_eq!(ex.detect_profile(Some("Mug"), Some("Tableware")), LengthProfile::Standard);
    }
}
