// copyguard-core/src/application/batch.rs

// File d'attente traitée par lots de taille fixe. Tout le lot tourne en
// parallèle, on attend le lot entier, on fait le point, puis on marque une pause.
// La file et les compteurs ne sont touchés que par cette tâche, entre deux lots.

use crate::application::regeneration::{GateOutcome, RegenerationController};
use crate::domain::product::ProductFacts;
use crate::domain::project::BatchConfig;
use futures::StreamExt;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Cooperative stop flag, checked between batches.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgress {
    pub processed: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub remaining: usize,
    pub percentage: f64,
    /// Running average time per finished item × remaining items.
    #[serde(skip)]
    pub eta: Option<Duration>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSuccess {
    pub facts: ProductFacts,
    pub outcome: GateOutcome,
    /// Times the item was handed to the regeneration controller.
    pub tries: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFailure {
    pub id: String,
    pub error: String,
    pub tries: u32,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub succeeded: Vec<ItemSuccess>,
    pub failed: Vec<ItemFailure>,
    /// Ids of items never started because of cancellation.
    pub cancelled: Vec<String>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.cancelled.is_empty()
    }
}

struct QueuedItem {
    facts: ProductFacts,
    tries: u32,
}

pub struct BatchController {
    controller: Arc<RegenerationController>,
    config: BatchConfig,
}

impl BatchController {
    pub fn new(controller: Arc<RegenerationController>, config: BatchConfig) -> Self {
        Self { controller, config }
    }

    pub async fn run(
        &self,
        items: Vec<ProductFacts>,
        cancel: &CancellationToken,
        mut on_progress: impl FnMut(&BatchProgress),
    ) -> BatchReport {
        let parallelism = self.config.parallelism.max(1);
        let max_tries = self.config.max_attempts.max(1);
        let pause = Duration::from_millis(self.config.pause_ms);

        let total = items.len();
        let mut queue: VecDeque<QueuedItem> = items
            .into_iter()
            .map(|facts| QueuedItem { facts, tries: 0 })
            .collect();
        let mut report = BatchReport::default();
        let started = Instant::now();

        info!(total, parallelism, "Starting batch run");

        while !queue.is_empty() {
            if cancel.is_cancelled() {
                warn!(pending = queue.len(), "Cancelled, remaining items not started");
                report.cancelled = queue.drain(..).map(|item| item.facts.id()).collect();
                break;
            }

            let take = parallelism.min(queue.len());
            let batch: Vec<QueuedItem> = queue.drain(..take).collect();

            let results: Vec<_> = futures::stream::iter(batch.into_iter().map(|item| {
                let controller = self.controller.clone();
                async move {
                    let result = controller.run(&item.facts).await;
                    (item.facts, item.tries + 1, result)
                }
            }))
            .buffer_unordered(parallelism)
            .collect()
            .await;

            for (facts, tries, result) in results {
                match result {
                    Ok(outcome) => report.succeeded.push(ItemSuccess {
                        facts,
                        outcome,
                        tries,
                    }),
                    Err(e) if e.is_recoverable() && tries < max_tries => {
                        warn!(product = %facts.id(), tries, error = %e, "Recoverable failure, re-enqueued");
                        queue.push_back(QueuedItem { facts, tries });
                    }
                    Err(e) => {
                        warn!(product = %facts.id(), tries, error = %e, "Item failed");
                        report.failed.push(ItemFailure {
                            id: facts.id(),
                            error: e.to_string(),
                            tries,
                        });
                    }
                }
            }

            let progress = progress(&report, total, queue.len(), started.elapsed());
            info!(
                processed = progress.processed,
                total,
                percentage = progress.percentage,
                "Batch done"
            );
            on_progress(&progress);

            if !queue.is_empty() && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }

        report
    }
}

fn progress(report: &BatchReport, total: usize, remaining: usize, elapsed: Duration) -> BatchProgress {
    let succeeded = report.succeeded.len();
    let failed = report.failed.len();
    let processed = succeeded + failed;
    let percentage = if total == 0 {
        100.0
    } else {
        ((processed as f64 / total as f64) * 1000.0).round() / 10.0
    };
    let eta = (processed > 0).then(|| elapsed.mul_f64(remaining as f64 / processed as f64));

    BatchProgress {
        processed,
        total,
        succeeded,
        failed,
        remaining,
        percentage,
        eta,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::instructions::InstructionBuilder;
    use crate::application::regeneration::QualityGate;
    use crate::domain::content::GeneratedContent;
    use crate::domain::project::{ProjectConfig, RegenerationConfig};
    use crate::infrastructure::prompt::JinjaRenderer;
    use crate::ports::generator::{ContentGenerator, GenerationError, GenerationRequest};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    /// Fails the first `failures[sku]` calls for a SKU, then answers.
    #[derive(Default)]
    struct Flaky {
        failures: Mutex<HashMap<String, (u32, bool)>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        delay_ms: u64,
    }

    impl Flaky {
        fn failing(mut self, sku: &str, times: u32, recoverable: bool) -> Self {
            self.failures
                .get_mut()
                .unwrap()
                .insert(sku.to_string(), (times, recoverable));
            self
        }
    }

    #[async_trait]
    impl ContentGenerator for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent, GenerationError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let sku = request.facts.id();
            let mut failures = self.failures.lock().unwrap();
            if let Some((left, recoverable)) = failures.get_mut(&sku)
                && *left > 0
            {
                *left -= 1;
                return Err(if *recoverable {
                    GenerationError::Timeout {
                        provider: "flaky".into(),
                    }
                } else {
                    GenerationError::Malformed {
                        provider: "flaky".into(),
                        reason: "not JSON".into(),
                    }
                });
            }
            Ok(GeneratedContent {
                meta_title: format!("{} for the workshop", request.facts.display_name()),
                long_description: "<p>A sturdy tool.</p>".into(),
                ..Default::default()
            })
        }
    }

    fn items(n: usize) -> Vec<ProductFacts> {
        (0..n)
            .map(|i| ProductFacts {
                sku: Some(format!("SKU-{}", i)),
                name: Some(format!("Tool {}", i)),
                ..Default::default()
            })
            .collect()
    }

    fn batch(generator: Arc<Flaky>, config: BatchConfig) -> Result<BatchController> {
        let project = ProjectConfig::default();
        let controller = RegenerationController::new(
            Arc::new(QualityGate::new(&project)?),
            Arc::new(InstructionBuilder::new(
                Arc::new(JinjaRenderer::new()),
                project.generation.clone(),
                project.rules.clone(),
            )),
            generator,
            RegenerationConfig {
                max_attempts: 1,
                ..Default::default()
            },
        );
        Ok(BatchController::new(Arc::new(controller), config))
    }

    fn config(parallelism: usize) -> BatchConfig {
        BatchConfig {
            parallelism,
            pause_ms: 0,
            max_attempts: 3,
        }
    }

    #[tokio::test]
    async fn test_all_items_processed_with_progress() -> Result<()> {
        let generator = Arc::new(Flaky::default());
        let mut seen = vec![];
        let report = batch(generator, config(2))?
            .run(items(5), &CancellationToken::new(), |p| seen.push(p.clone()))
            .await;

        assert_eq!(report.succeeded.len(), 5);
        assert!(report.is_clean());
        assert_eq!(seen.len(), 3);
        let last = seen.last().unwrap();
        assert_eq!(last.processed, 5);
        assert_eq!(last.remaining, 0);
        assert_eq!(last.percentage, 100.0);
        assert_eq!(seen[0].processed, 2);
        assert_eq!(seen[0].percentage, 40.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_recoverable_errors_are_retried_up_to_cap() -> Result<()> {
        let generator = Arc::new(
            Flaky::default()
                .failing("SKU-0", 2, true)
                .failing("SKU-1", 5, true),
        );
        let report = batch(generator, config(5))?
            .run(items(3), &CancellationToken::new(), |_| {})
            .await;

        assert_eq!(report.succeeded.len(), 2);
        let recovered = report
            .succeeded
            .iter()
            .find(|s| s.facts.id() == "SKU-0")
            .unwrap();
        assert_eq!(recovered.tries, 3);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id, "SKU-1");
        assert_eq!(report.failed[0].tries, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_unrecoverable_error_fails_immediately() -> Result<()> {
        let generator = Arc::new(Flaky::default().failing("SKU-0", 1, false));
        let report = batch(generator, config(5))?
            .run(items(2), &CancellationToken::new(), |_| {})
            .await;

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].tries, 1);
        assert_eq!(report.succeeded.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_cancellation_between_batches() -> Result<()> {
        let generator = Arc::new(Flaky::default());
        let cancel = CancellationToken::new();
        let stopper = cancel.clone();
        let report = batch(generator, config(2))?
            .run(items(5), &cancel, move |_| stopper.cancel())
            .await;

        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.cancelled, vec!["SKU-2", "SKU-3", "SKU-4"]);
        assert!(!report.is_clean());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_batches_run_concurrently_and_pause_between() -> Result<()> {
        let generator = Arc::new(Flaky {
            delay_ms: 1_000,
            ..Default::default()
        });
        let controller = batch(
            generator.clone(),
            BatchConfig {
                parallelism: 3,
                pause_ms: 2_000,
                max_attempts: 3,
            },
        )?;

        let start = Instant::now();
        let mut etas = vec![];
        let report = controller
            .run(items(6), &CancellationToken::new(), |p| etas.push(p.eta))
            .await;

        assert_eq!(report.succeeded.len(), 6);
        assert_eq!(generator.peak.load(Ordering::SeqCst), 3);
        // Deux lots d'une seconde et une seule pause entre eux.
        assert_eq!(start.elapsed(), Duration::from_millis(4_000));
        assert_eq!(etas[0], Some(Duration::from_millis(1_000)));
        assert_eq!(etas[1], Some(Duration::ZERO));
        Ok(())
    }
}
