// copyguard-core/src/domain/quality/score.rs

use crate::domain::quality::config::RatingThresholds;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Readability,
    SemanticCoherence,
    TechnicalAccuracy,
    SearchOptimization,
    Engagement,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Readability,
        Metric::SemanticCoherence,
        Metric::TechnicalAccuracy,
        Metric::SearchOptimization,
        Metric::Engagement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Readability => "readability",
            Self::SemanticCoherence => "semanticCoherence",
            Self::TechnicalAccuracy => "technicalAccuracy",
            Self::SearchOptimization => "searchOptimization",
            Self::Engagement => "engagement",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sub-score in 0..=100 with the figures it was computed from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricScore {
    pub value: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, f64>,
}

impl MetricScore {
    pub fn new(value: f64) -> Self {
        Self {
            value: round1(value.clamp(0.0, 100.0)),
            details: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.details.insert(key.to_string(), round1(value));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Excellent,
    Good,
    Acceptable,
    Poor,
    Critical,
}

impl Rating {
    pub fn from_score(score: f64, thresholds: &RatingThresholds) -> Self {
        if score >= thresholds.excellent {
            Self::Excellent
        } else if score >= thresholds.good {
            Self::Good
        } else if score >= thresholds.acceptable {
            Self::Acceptable
        } else if score >= thresholds.poor {
            Self::Poor
        } else {
            Self::Critical
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Acceptable => "acceptable",
            Self::Poor => "poor",
            Self::Critical => "critical",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityScore {
    pub readability: MetricScore,
    pub semantic_coherence: MetricScore,
    pub technical_accuracy: MetricScore,
    pub search_optimization: MetricScore,
    pub engagement: MetricScore,
    pub overall: f64,
    pub rating: Rating,
}

impl QualityScore {
    pub fn metric(&self, metric: Metric) -> &MetricScore {
        match metric {
            Metric::Readability => &self.readability,
            Metric::SemanticCoherence => &self.semantic_coherence,
            Metric::TechnicalAccuracy => &self.technical_accuracy,
            Metric::SearchOptimization => &self.search_optimization,
            Metric::Engagement => &self.engagement,
        }
    }

    /// Metrics scoring below `target`, weakest first.
    pub fn weak_metrics(&self, target: f64) -> Vec<Metric> {
        let mut weak: Vec<Metric> = Metric::ALL
            .into_iter()
            .filter(|m| self.metric(*m).value < target)
            .collect();
        weak.sort_by(|a, b| self.metric(*a).value.total_cmp(&self.metric(*b).value));
        weak
    }

    /// Per-metric values, for reports.
    pub fn breakdown(&self) -> BTreeMap<String, f64> {
        Metric::ALL
            .into_iter()
            .map(|m| (m.as_str().to_string(), self.metric(m).value))
            .collect()
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
