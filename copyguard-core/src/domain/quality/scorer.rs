// copyguard-core/src/domain/quality/scorer.rs

use crate::domain::content::GeneratedContent;
use crate::domain::error::DomainError;
use crate::domain::product::ProductFacts;
use crate::domain::quality::config::QualityConfig;
use crate::domain::quality::metrics::{
    ScoringInput, coherence, engagement, readability, search, technical,
};
use crate::domain::quality::score::{QualityScore, Rating, round1};
use crate::domain::rules::compiled::CompiledRules;
use crate::domain::rules::violation::ValidationReport;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, instrument};
use validator::Validate;

pub struct QualityScorer {
    config: QualityConfig,
    rules: Arc<CompiledRules>,
    passive: Vec<Regex>,
}

impl QualityScorer {
    pub fn new(config: QualityConfig, rules: Arc<CompiledRules>) -> Result<Self, DomainError> {
        config
            .validate()
            .map_err(|e| DomainError::QualityConfigError(e.to_string()))?;

        let passive = config
            .engagement
            .passive_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| DomainError::InvalidPattern {
                    group: "passive_patterns".to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            rules,
            passive,
        })
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Scores corrected content. Never fails; `report` must be the report of
    /// this exact content.
    #[instrument(skip_all, fields(product = %facts.id()))]
    pub fn score(
        &self,
        content: &GeneratedContent,
        facts: &ProductFacts,
        report: &ValidationReport,
        signal: Option<f64>,
    ) -> QualityScore {
        let input = ScoringInput {
            content,
            facts,
            report,
            rules: self.rules.as_ref(),
            config: &self.config,
            passive: &self.passive,
            signal,
        };

        let readability = readability::score(&input);
        let semantic_coherence = coherence::score(&input);
        let technical_accuracy = technical::score(&input);
        let search_optimization = search::score(&input);
        let engagement = engagement::score(&input);

        let w = &self.config.weights;
        let overall = round1(
            readability.value * w.readability
                + semantic_coherence.value * w.semantic_coherence
                + technical_accuracy.value * w.technical_accuracy
                + search_optimization.value * w.search_optimization
                + engagement.value * w.engagement,
        );
        let rating = Rating::from_score(overall, &self.config.thresholds);

        debug!(overall, %rating, "Content scored");
        QualityScore {
            readability,
            semantic_coherence,
            technical_accuracy,
            search_optimization,
            engagement,
            overall,
            rating,
        }
    }
}
