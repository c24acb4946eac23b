// copyguard-core/src/application/regeneration.rs

// Boucle génération -> validation -> correction -> re-validation -> scoring.
// Bornée par max_attempts ; on garde toujours la meilleure tentative.

use crate::application::instructions::InstructionBuilder;
use crate::domain::content::GeneratedContent;
use crate::domain::correction::{AppliedFix, Corrector};
use crate::domain::error::DomainError;
use crate::domain::export::{ExportRecord, SeoNameConfig};
use crate::domain::product::ProductFacts;
use crate::domain::project::{ProjectConfig, RegenerationConfig};
use crate::domain::quality::{Metric, QualityScore, QualityScorer, Rating};
use crate::domain::rules::{RuleValidator, ValidationReport};
use crate::error::CopyGuardError;
use crate::ports::generator::ContentGenerator;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Validate, correct, re-validate and score one piece of content.
/// Pure and synchronous: usable without any generator.
pub struct QualityGate {
    validator: RuleValidator,
    corrector: Corrector,
    scorer: QualityScorer,
}

impl QualityGate {
    pub fn new(config: &ProjectConfig) -> Result<Self, DomainError> {
        let validator = RuleValidator::new(config.rules.clone())?;
        let compiled = validator.compiled();
        Ok(Self {
            corrector: Corrector::new(compiled.clone()),
            scorer: QualityScorer::new(config.quality.clone(), compiled)?,
            validator,
        })
    }

    pub fn validator(&self) -> &RuleValidator {
        &self.validator
    }

    pub fn evaluate(&self, number: u32, content: GeneratedContent, facts: &ProductFacts) -> Attempt {
        let mut state = AttemptState::Draft;

        let initial_report = self.validator.validate(&content, facts);
        state.advance(AttemptState::Validated, number);

        let correction = self.corrector.correct(&content, &initial_report, facts);
        state.advance(AttemptState::Corrected, number);

        let report = if correction.changed() {
            self.validator.validate(&correction.content, facts)
        } else {
            initial_report.clone()
        };
        let introduced = report.introduced_since(&initial_report);
        if !introduced.is_empty() {
            warn!(attempt = number, rules = ?introduced, "Correction introduced new violations");
        }

        let score = self.scorer.score(&correction.content, facts, &report, None);
        state.advance(AttemptState::Scored, number);

        Attempt {
            number,
            content: correction.content,
            initial_report,
            report,
            fixes: correction.fixes,
            introduced,
            score,
        }
    }
}

/// States of one attempt; only used for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Draft,
    Validated,
    Corrected,
    Scored,
    Accepted,
    Retrying,
    Exhausted,
}

impl AttemptState {
    fn advance(&mut self, next: AttemptState, attempt: u32) {
        debug!(attempt, from = ?*self, to = ?next, "Attempt state");
        *self = next;
    }
}

/// One generate/validate/correct/score cycle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub number: u32,
    /// Corrected content.
    pub content: GeneratedContent,
    /// Report of the raw generator output.
    pub initial_report: ValidationReport,
    /// Report of the corrected content.
    pub report: ValidationReport,
    pub fixes: Vec<AppliedFix>,
    /// Rule ids that only appeared after correction.
    pub introduced: Vec<String>,
    pub score: QualityScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Accepted,
    Exhausted,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => f.write_str("accepted"),
            Self::Exhausted => f.write_str("exhausted"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSummary {
    pub number: u32,
    pub overall: f64,
    pub rating: Rating,
    pub publishable: bool,
    pub violations: usize,
    pub fixes: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateOutcome {
    pub best: Attempt,
    /// Generator calls that produced content.
    pub attempts: u32,
    pub status: OutcomeStatus,
    pub history: Vec<AttemptSummary>,
}

impl GateOutcome {
    pub fn reached_threshold(&self) -> bool {
        self.status == OutcomeStatus::Accepted
    }

    pub fn to_export(&self, facts: &ProductFacts, seo: &SeoNameConfig) -> ExportRecord {
        ExportRecord::new(
            facts,
            &self.best.content,
            &self.best.score,
            &self.best.report,
            self.attempts,
            self.reached_threshold(),
            seo,
        )
    }
}

pub struct RegenerationController {
    gate: Arc<QualityGate>,
    instructions: Arc<InstructionBuilder>,
    generator: Arc<dyn ContentGenerator>,
    config: RegenerationConfig,
}

impl RegenerationController {
    pub fn new(
        gate: Arc<QualityGate>,
        instructions: Arc<InstructionBuilder>,
        generator: Arc<dyn ContentGenerator>,
        config: RegenerationConfig,
    ) -> Self {
        Self {
            gate,
            instructions,
            generator,
            config,
        }
    }

    /// At most `max_attempts` generator calls. A provider error on the first
    /// call propagates; later ones end the run with the best attempt so far.
    #[instrument(skip_all, fields(product = %facts.id()))]
    pub async fn run(&self, facts: &ProductFacts) -> Result<GateOutcome, CopyGuardError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut history: Vec<Attempt> = Vec::new();
        let mut focus: Vec<Metric> = Vec::new();

        for number in 1..=max_attempts {
            let request = self.instructions.request(facts, number, &focus)?;
            let content = match self.generator.generate(&request).await {
                Ok(content) => content,
                Err(e) if history.is_empty() => return Err(e.into()),
                Err(e) => {
                    warn!(attempt = number, error = %e, "Provider failed, keeping best attempt");
                    break;
                }
            };

            let attempt = self.gate.evaluate(number, content, facts);
            let accepted = attempt.score.overall >= self.config.publish_threshold
                && attempt.report.publishable;

            if accepted {
                let mut state = AttemptState::Scored;
                state.advance(AttemptState::Accepted, number);
                info!(attempt = number, overall = attempt.score.overall, "Accepted");
                history.push(attempt);
                return self.outcome(history, OutcomeStatus::Accepted);
            }

            focus = attempt.score.weak_metrics(self.config.weak_metric_target);
            if focus.is_empty() && !attempt.report.publishable {
                // Bloqué par des violations et non par une métrique.
                focus.push(Metric::TechnicalAccuracy);
            }
            debug!(
                attempt = number,
                overall = attempt.score.overall,
                weak = ?focus,
                "Below threshold"
            );
            history.push(attempt);

            if number < max_attempts {
                let mut state = AttemptState::Scored;
                state.advance(AttemptState::Retrying, number);
            }
        }

        let last = history.len() as u32;
        let mut state = AttemptState::Scored;
        state.advance(AttemptState::Exhausted, last);
        self.outcome(history, OutcomeStatus::Exhausted)
    }

    fn outcome(&self, history: Vec<Attempt>, status: OutcomeStatus) -> Result<GateOutcome, CopyGuardError> {
        let summaries = history
            .iter()
            .map(|a| AttemptSummary {
                number: a.number,
                overall: a.score.overall,
                rating: a.score.rating,
                publishable: a.report.publishable,
                violations: a.report.violations.len(),
                fixes: a.fixes.len(),
            })
            .collect();
        let attempts = history.len() as u32;

        // Meilleur score global ; à égalité, la tentative la plus ancienne.
        let best = history
            .into_iter()
            .reduce(|best, a| if a.score.overall > best.score.overall { a } else { best })
            .ok_or_else(|| CopyGuardError::InternalError("no scored attempt".to_string()))?;

        Ok(GateOutcome {
            best,
            attempts,
            status,
            history: summaries,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::prompt::JinjaRenderer;
    use crate::ports::generator::{GenerationError, GenerationRequest};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers from a script, one per call; records the requests.
    struct Scripted {
        answers: Mutex<Vec<Result<GeneratedContent, GenerationError>>>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl Scripted {
        fn new(answers: Vec<Result<GeneratedContent, GenerationError>>) -> Self {
            Self {
                answers: Mutex::new(answers.into_iter().rev().collect()),
                requests: Mutex::new(vec![]),
            }
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ContentGenerator for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent, GenerationError> {
            self.requests.lock().unwrap().push(request.clone());
            self.answers.lock().unwrap().pop().unwrap_or_else(|| {
                Err(GenerationError::Unavailable {
                    provider: "scripted".into(),
                    reason: "script exhausted".into(),
                })
            })
        }
    }

    fn facts() -> ProductFacts {
        ProductFacts {
            sku: Some("KS-1".into()),
            name: Some("Socket set".into()),
            category: Some("Hand tools".into()),
            material: Some("CrV".into()),
            quantity: Some(3),
            keywords: vec!["socket set".into()],
            ..Default::default()
        }
    }

    fn weak() -> GeneratedContent {
        GeneratedContent {
            meta_title: "Socket set TODO".into(),
            bullet_points: vec!["...".into()],
            long_description: "<p>Nice".into(),
            ..Default::default()
        }
    }

    fn better() -> GeneratedContent {
        GeneratedContent {
            meta_title: "Socket set CrV with 3 elements for every workshop".into(),
            meta_description: "Socket set made of CrV steel with 3 elements in a compact case. The socket set fits every workshop and stays easy to carry around all day.".into(),
            bullet_points: vec!["3 elements made of CrV".into()],
            long_description: "<h2>Socket set</h2><p>The socket set holds 3 elements made of CrV steel.</p>".into(),
            why_worth_it: "A compact socket set for every workshop.".into(),
            seo_tags: vec!["socket set".into(), "crv".into(), "hand tools".into()],
        }
    }

    fn controller(generator: Arc<Scripted>, config: RegenerationConfig) -> Result<RegenerationController> {
        let project = ProjectConfig::default();
        let gate = Arc::new(QualityGate::new(&project)?);
        let instructions = Arc::new(InstructionBuilder::new(
            Arc::new(JinjaRenderer::new()),
            project.generation.clone(),
            project.rules.clone(),
        ));
        Ok(RegenerationController::new(gate, instructions, generator, config))
    }

    #[tokio::test]
    async fn test_never_exceeds_max_attempts_and_keeps_best() -> Result<()> {
        let generator = Arc::new(Scripted::new(vec![Ok(weak()), Ok(better()), Ok(weak()), Ok(better())]));
        let config = RegenerationConfig {
            max_attempts: 3,
            publish_threshold: 100.0,
            ..Default::default()
        };
        let outcome = controller(generator.clone(), config)?.run(&facts()).await?;

        assert_eq!(generator.calls(), 3);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.status, OutcomeStatus::Exhausted);
        assert!(!outcome.reached_threshold());
        let max = outcome
            .history
            .iter()
            .map(|h| h.overall)
            .fold(f64::MIN, f64::max);
        assert_eq!(outcome.best.score.overall, max);
        Ok(())
    }

    #[tokio::test]
    async fn test_accepts_first_good_enough_attempt() -> Result<()> {
        let generator = Arc::new(Scripted::new(vec![Ok(better()), Ok(weak())]));
        let config = RegenerationConfig {
            publish_threshold: 0.0,
            ..Default::default()
        };
        let outcome = controller(generator.clone(), config)?.run(&facts()).await?;

        assert_eq!(generator.calls(), 1);
        assert_eq!(outcome.status, OutcomeStatus::Accepted);
        assert!(outcome.best.report.publishable);
        Ok(())
    }

    #[tokio::test]
    async fn test_retry_prompt_targets_weak_metrics() -> Result<()> {
        let generator = Arc::new(Scripted::new(vec![Ok(weak()), Ok(weak())]));
        let config = RegenerationConfig {
            max_attempts: 2,
            publish_threshold: 100.0,
            ..Default::default()
        };
        controller(generator.clone(), config)?.run(&facts()).await?;

        let requests = generator.requests.lock().unwrap();
        assert!(requests[0].focus_metrics.is_empty());
        assert_eq!(requests[1].attempt, 2);
        assert!(!requests[1].focus_metrics.is_empty());
        assert!(requests[1].prompt.contains("This is attempt 2"));
        Ok(())
    }

    #[tokio::test]
    async fn test_first_call_failure_propagates() -> Result<()> {
        let generator = Arc::new(Scripted::new(vec![Err(GenerationError::Timeout {
            provider: "scripted".into(),
        })]));
        let result = controller(generator, RegenerationConfig::default())?
            .run(&facts())
            .await;
        let err = result.unwrap_err();
        assert!(err.is_recoverable());
        Ok(())
    }

    #[tokio::test]
    async fn test_later_failure_keeps_scored_attempt() -> Result<()> {
        let generator = Arc::new(Scripted::new(vec![
            Ok(weak()),
            Err(GenerationError::RateLimited {
                provider: "scripted".into(),
            }),
        ]));
        let config = RegenerationConfig {
            publish_threshold: 100.0,
            ..Default::default()
        };
        let outcome = controller(generator.clone(), config)?.run(&facts()).await?;

        assert_eq!(generator.calls(), 2);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.status, OutcomeStatus::Exhausted);
        Ok(())
    }

    #[test]
    fn test_gate_corrects_before_scoring() -> Result<()> {
        let gate = QualityGate::new(&ProjectConfig::default())?;
        let attempt = gate.evaluate(1, weak(), &facts());
        assert!(attempt.initial_report.has_critical());
        assert!(!attempt.fixes.is_empty());
        assert!(!attempt.content.meta_title.contains("TODO"));
        assert_eq!(attempt.content.bullet_points.len(), 3);
        Ok(())
    }
}
