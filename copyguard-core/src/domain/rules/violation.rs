// copyguard-core/src/domain/rules/violation.rs

use crate::domain::content::ContentField;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationCategory {
    Placeholder,
    BannedPhrase,
    UnsupportedClaim,
    OfferFeatureLeak,
    LengthViolation,
    NumericInconsistency,
    MarkupImbalance,
}

impl ViolationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Placeholder => "placeholder",
            Self::BannedPhrase => "bannedPhrase",
            Self::UnsupportedClaim => "unsupportedClaim",
            Self::OfferFeatureLeak => "offerFeatureLeak",
            Self::LengthViolation => "lengthViolation",
            Self::NumericInconsistency => "numericInconsistency",
            Self::MarkupImbalance => "markupImbalance",
        }
    }
}

impl fmt::Display for ViolationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        f.write_str(s)
    }
}

/// Deterministic repair the Corrector knows how to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FixAction {
    StripPlaceholder,
    StripSentence,
    StripPhrase,
    ReplacePhrase { replacement: String },
    RewriteUnits,
    RepairBulletCount { required: usize },
    Truncate { max: usize },
    TerminateSentence,
    BalanceMarkup,
    DeduplicateCta,
}

impl fmt::Display for FixAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StripPlaceholder => write!(f, "strip placeholder"),
            Self::StripSentence => write!(f, "strip sentence"),
            Self::StripPhrase => write!(f, "strip phrase"),
            Self::ReplacePhrase { replacement } => write!(f, "replace with '{}'", replacement),
            Self::RewriteUnits => write!(f, "rewrite units"),
            Self::RepairBulletCount { required } => write!(f, "repair bullet count to {}", required),
            Self::Truncate { max } => write!(f, "truncate to {} chars", max),
            Self::TerminateSentence => write!(f, "terminate sentence"),
            Self::BalanceMarkup => write!(f, "balance markup"),
            Self::DeduplicateCta => write!(f, "deduplicate call-to-action"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub rule_id: String,
    pub category: ViolationCategory,
    pub severity: Severity,
    pub field: Option<ContentField>,
    /// The offending text (or number) as found.
    pub evidence: String,
    pub message: String,
    pub suggested_fix: Option<FixAction>,
    pub penalty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
    pub score: f64,
    pub publishable: bool,
}

impl ValidationReport {
    /// `publishable` can never be true while a critical violation exists.
    pub fn from_violations(violations: Vec<Violation>, publish_threshold: f64) -> Self {
        let penalties: f64 = violations.iter().map(|v| v.penalty).sum();
        let score = (100.0 - penalties).clamp(0.0, 100.0);
        let has_critical = violations.iter().any(|v| v.severity == Severity::Critical);
        Self {
            publishable: score >= publish_threshold && !has_critical,
            score,
            violations,
        }
    }

    pub fn has_critical(&self) -> bool {
        self.violations.iter().any(|v| v.severity == Severity::Critical)
    }

    pub fn count(&self, category: ViolationCategory) -> usize {
        self.violations.iter().filter(|v| v.category == category).count()
    }

    pub fn categories(&self) -> Vec<ViolationCategory> {
        let mut cats: Vec<_> = self.violations.iter().map(|v| v.category).collect();
        cats.sort();
        cats.dedup();
        cats
    }

    /// Rule ids present here but absent from `before`.
    pub fn introduced_since(&self, before: &ValidationReport) -> Vec<String> {
        self.violations
            .iter()
            .filter(|v| {
                !before
                    .violations
                    .iter()
                    .any(|b| b.rule_id == v.rule_id && b.field == v.field)
            })
            .map(|v| v.rule_id.clone())
            .collect()
    }
}
