// copyguard-core/src/domain/product/facts.rs

use crate::domain::content::text::format_number;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LengthUnit {
    #[default]
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "cm")]
    Centimeters,
    #[serde(rename = "m")]
    Meters,
}

impl LengthUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Millimeters => "mm",
            Self::Centimeters => "cm",
            Self::Meters => "m",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mm" => Some(Self::Millimeters),
            "cm" => Some(Self::Centimeters),
            "m" => Some(Self::Meters),
            _ => None,
        }
    }

    /// One order of magnitude up (mm -> cm).
    pub fn coarser(&self) -> Self {
        match self {
            Self::Millimeters => Self::Centimeters,
            Self::Centimeters | Self::Meters => Self::Meters,
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Length × width × height in one resolved unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub unit: LengthUnit,
    /// True when the plausibility heuristic reinterpreted the source unit.
    pub rescaled: bool,
}

impl Dimensions {
    pub fn values(&self) -> [f64; 3] {
        [self.length, self.width, self.height]
    }

    /// Canonical mention used everywhere in generated copy: `24 × 10 × 11 cm`.
    pub fn display(&self) -> String {
        format!(
            "{} × {} × {} {}",
            format_number(self.length),
            format_number(self.width),
            format_number(self.height),
            self.unit
        )
    }

    /// Same figures and unit, order-insensitive.
    pub fn matches(&self, values: [f64; 3], unit: LengthUnit) -> bool {
        if unit != self.unit {
            return false;
        }
        let mut a = self.values();
        let mut b = values;
        a.sort_by(f64::total_cmp);
        b.sort_by(f64::total_cmp);
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 0.01)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warranty {
    /// Verbatim source text.
    pub raw: String,
    pub months: Option<u32>,
}

impl Warranty {
    pub fn display(&self) -> String {
        match self.months {
            Some(m) if m % 12 == 0 && m >= 12 => {
                let years = m / 12;
                if years == 1 {
                    "1 year".to_string()
                } else {
                    format!("{} years", years)
                }
            }
            Some(m) => format!("{} months", m),
            None => self.raw.clone(),
        }
    }
}

/// Body length class of a product, picked from name and category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LengthProfile {
    #[default]
    Standard,
    Technical,
    Complex,
}

/// Canonical, never-fabricated representation of one product.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductFacts {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub ean: Option<String>,
    pub description: Option<String>,
    pub additional_description: Option<String>,
    pub material: Option<String>,
    pub color: Option<String>,
    pub dimensions: Option<Dimensions>,
    pub warranty: Option<Warranty>,
    #[serde(default)]
    pub certificates: Vec<String>,
    pub quantity: Option<u32>,
    #[serde(default)]
    pub drive_sizes: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub length_profile: LengthProfile,
}

impl ProductFacts {
    /// Identifier used in logs and batch reports.
    pub fn id(&self) -> String {
        self.sku
            .clone()
            .or_else(|| self.ean.clone())
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| "<unnamed>".to_string())
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Primary search keyword: first user keyword, else the product name.
    pub fn primary_keyword(&self) -> Option<&str> {
        self.keywords
            .first()
            .map(String::as_str)
            .or(self.name.as_deref())
            .filter(|k| !k.trim().is_empty())
    }

    /// Populated facts a good text should mention, with the literal
    /// forms that count as a mention.
    pub fn referenceable(&self) -> Vec<(&'static str, Vec<String>)> {
        let mut facts = Vec::new();
        if let Some(m) = &self.material {
            facts.push(("material", vec![m.clone()]));
        }
        if let Some(c) = &self.color {
            facts.push(("color", vec![c.clone()]));
        }
        if let Some(q) = self.quantity {
            facts.push(("quantity", vec![q.to_string()]));
        }
        if let Some(d) = &self.dimensions {
            facts.push((
                "dimensions",
                d.values().iter().map(|v| format_number(*v)).collect(),
            ));
        }
        if let Some(w) = &self.warranty {
            let mut forms = vec![w.raw.clone()];
            if let Some(m) = w.months {
                forms.push(m.to_string());
                if m % 12 == 0 {
                    forms.push(format!("{} year", m / 12));
                }
            }
            facts.push(("warranty", forms));
        }
        if !self.certificates.is_empty() {
            facts.push(("certificates", self.certificates.clone()));
        }
        if !self.drive_sizes.is_empty() {
            facts.push(("drive_sizes", self.drive_sizes.clone()));
        }
        facts
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_display_and_match() {
        let d = Dimensions {
            length: 24.0,
            width: 10.0,
            height: 11.0,
            unit: LengthUnit::Centimeters,
            rescaled: false,
        };
        assert_eq!(d.display(), "24 × 10 × 11 cm");
        assert!(d.matches([11.0, 24.0, 10.0], LengthUnit::Centimeters));
        assert!(!d.matches([24.0, 10.0, 11.0], LengthUnit::Millimeters));
    }

    #[test]
    fn test_warranty_display() {
        let w = Warranty {
            raw: "2 lata".into(),
            months: Some(24),
        };
        assert_eq!(w.display(), "2 years");
    }

    #[test]
    fn test_primary_keyword_falls_back_to_name() {
        let facts = ProductFacts {
            name: Some("Socket set".into()),
            ..Default::default()
        };
        assert_eq!(facts.primary_keyword(), Some("Socket set"));
    }
}
