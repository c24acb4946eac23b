// copyguard-core/src/domain/quality/config.rs

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

// --- CONFIGURATION STRUCTS ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct QualityConfig {
    #[validate(nested)]
    pub weights: MetricWeights,
    #[validate(nested)]
    pub thresholds: RatingThresholds,
    #[validate(nested)]
    pub readability: ReadabilityConfig,
    #[validate(nested)]
    pub coherence: CoherenceConfig,
    #[validate(nested)]
    pub technical: TechnicalConfig,
    #[validate(nested)]
    pub search: SearchConfig,
    #[validate(nested)]
    pub engagement: EngagementConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_weights_sum"))]
pub struct MetricWeights {
    #[validate(range(min = 0.0, max = 1.0))]
    pub readability: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub semantic_coherence: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub technical_accuracy: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub search_optimization: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub engagement: f64,
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            readability: 0.20,
            semantic_coherence: 0.25,
            technical_accuracy: 0.20,
            search_optimization: 0.20,
            engagement: 0.15,
        }
    }
}

impl MetricWeights {
    pub fn sum(&self) -> f64 {
        self.readability
            + self.semantic_coherence
            + self.technical_accuracy
            + self.search_optimization
            + self.engagement
    }
}

fn validate_weights_sum(weights: &MetricWeights) -> Result<(), ValidationError> {
    if (weights.sum() - 1.0).abs() > 1e-6 {
        let mut err = ValidationError::new("weights_sum");
        err.message = Some(format!("Metric weights sum to {:.3}, expected 1.0", weights.sum()).into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_descending"))]
pub struct RatingThresholds {
    pub excellent: f64,
    pub good: f64,
    pub acceptable: f64,
    pub poor: f64,
}

impl Default for RatingThresholds {
    fn default() -> Self {
        Self {
            excellent: 85.0,
            good: 70.0,
            acceptable: 55.0,
            poor: 35.0,
        }
    }
}

fn validate_descending(t: &RatingThresholds) -> Result<(), ValidationError> {
    let ordered = t.excellent <= 100.0 && t.excellent > t.good && t.good > t.acceptable && t.acceptable > t.poor && t.poor >= 0.0;
    if !ordered {
        let mut err = ValidationError::new("thresholds_order");
        err.message = Some("Rating thresholds must be strictly descending within 0..=100".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ReadabilityConfig {
    #[validate(range(min = 1))]
    pub max_sentence_words: usize,
    #[validate(range(min = 1))]
    pub max_paragraph_words: usize,
    pub min_paragraphs: usize,
    /// Score returned when the body has no sentence at all.
    #[validate(range(min = 0.0, max = 100.0))]
    pub empty_score: f64,
}

impl Default for ReadabilityConfig {
    fn default() -> Self {
        Self {
            max_sentence_words: 25,
            max_paragraph_words: 200,
            min_paragraphs: 2,
            empty_score: 70.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CoherenceConfig {
    #[validate(range(min = 0.01, max = 1.0))]
    pub max_bigram_repetition: f64,
    #[validate(range(min = 1))]
    pub target_unique_words: usize,
}

impl Default for CoherenceConfig {
    fn default() -> Self {
        Self {
            max_bigram_repetition: 0.20,
            target_unique_words: 80,
        }
    }
}

/// Points removed once per violation category still present after correction.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TechnicalConfig {
    pub placeholder: f64,
    pub unsupported_claim: f64,
    pub numeric: f64,
    pub length: f64,
    pub markup: f64,
    pub banned_phrase: f64,
    pub offer_leak: f64,
    /// Both `mm` and `cm` mentioned in the same content.
    pub mixed_units: f64,
    /// Credit × fraction of populated facts the text references.
    #[validate(range(min = 0.0, max = 100.0))]
    pub reference_credit: f64,
}

impl Default for TechnicalConfig {
    fn default() -> Self {
        Self {
            placeholder: 50.0,
            unsupported_claim: 20.0,
            numeric: 10.0,
            length: 5.0,
            markup: 10.0,
            banned_phrase: 5.0,
            offer_leak: 10.0,
            mixed_units: 10.0,
            reference_credit: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_density_band"))]
pub struct SearchConfig {
    pub min_keyword_density: f64,
    pub max_keyword_density: f64,
    /// Related keywords (after the primary one) checked for coverage.
    #[validate(range(min = 1))]
    pub related_keywords: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_keyword_density: 0.005,
            max_keyword_density: 0.04,
            related_keywords: 5,
        }
    }
}

fn validate_density_band(search: &SearchConfig) -> Result<(), ValidationError> {
    if search.min_keyword_density <= 0.0 || search.min_keyword_density >= search.max_keyword_density {
        let mut err = ValidationError::new("density_band");
        err.message = Some("Keyword density band must satisfy 0 < min < max".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EngagementConfig {
    /// Above this many bullets the list scores partially.
    #[validate(range(min = 1))]
    pub max_bullets: usize,
    pub emotional_terms: Vec<String>,
    /// Regular expressions flagging a passive sentence.
    pub passive_patterns: Vec<String>,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            max_bullets: 7,
            emotional_terms: [
                "reliable",
                "durable",
                "professional",
                "premium",
                "comfortable",
                "safe",
                "easy",
                "solid",
                "niezawodny",
                "profesjonalny",
                "wytrzymały",
                "komfortowy",
                "bezpieczny",
                "łatwy",
                "solidny",
            ]
            .map(String::from)
            .to_vec(),
            passive_patterns: vec![
                r"(?i)\b(?:is|are|was|were|been|being)\s+\w+ed\b".to_string(),
                r"(?i)\b(?:został|została|zostało|zostali|zostały|jest|są)\s+\w+(?:any|ana|ane|ani)\b".to_string(),
            ],
        }
    }
}
