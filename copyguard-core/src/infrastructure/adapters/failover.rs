// copyguard-core/src/infrastructure/adapters/failover.rs

// Chaîne ordonnée de fournisseurs. Chacun est relancé sur erreur récupérable
// (délai fixe, plafond par fournisseur), puis on passe au suivant. Le
// générateur hors-ligne ferme la chaîne quand il est activé.

use crate::domain::content::GeneratedContent;
use crate::domain::project::{GenerationConfig, ProviderConfig, ProviderKind};
use crate::domain::rules::RuleSet;
use crate::infrastructure::adapters::offline::OfflineGenerator;
use crate::infrastructure::adapters::replay::ReplayGenerator;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::generator::{ContentGenerator, GenerationError, GenerationRequest};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct ChainLink {
    pub generator: Arc<dyn ContentGenerator>,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

pub struct FailoverGenerator {
    chain: Vec<ChainLink>,
    offline: Option<OfflineGenerator>,
}

impl FailoverGenerator {
    pub fn new(chain: Vec<ChainLink>, offline: Option<OfflineGenerator>) -> Self {
        Self { chain, offline }
    }

    /// Builds the chain declared in the configuration. Relative replay paths
    /// are resolved against `project_dir`.
    pub fn from_config(
        generation: &GenerationConfig,
        rules: &RuleSet,
        project_dir: &Path,
    ) -> Result<Self, InfrastructureError> {
        let chain = generation
            .providers
            .iter()
            .map(|p| link(p, rules, project_dir))
            .collect::<Result<Vec<_>, _>>()?;
        let offline = generation
            .offline_fallback
            .then(|| OfflineGenerator::new(rules.clone()));

        if chain.is_empty() && offline.is_none() {
            return Err(InfrastructureError::ConfigError(
                "No provider configured and offline fallback disabled".to_string(),
            ));
        }
        info!(providers = chain.len(), offline = offline.is_some(), "Generator chain ready");
        Ok(Self::new(chain, offline))
    }
}

fn link(provider: &ProviderConfig, rules: &RuleSet, project_dir: &Path) -> Result<ChainLink, InfrastructureError> {
    let generator: Arc<dyn ContentGenerator> = match &provider.kind {
        ProviderKind::Replay { path } => {
            let path = project_dir.join(path);
            Arc::new(ReplayGenerator::from_file(provider.name.clone(), &path)?)
        }
        ProviderKind::Offline => Arc::new(OfflineGenerator::new(rules.clone())),
    };
    Ok(ChainLink {
        generator,
        max_retries: provider.max_retries,
        retry_delay: Duration::from_millis(provider.retry_delay_ms),
    })
}

#[async_trait]
impl ContentGenerator for FailoverGenerator {
    fn name(&self) -> &str {
        "failover"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent, GenerationError> {
        let mut last_error: Option<GenerationError> = None;

        for link in &self.chain {
            let mut retries = 0;
            loop {
                match link.generator.generate(request).await {
                    Ok(content) => return Ok(content),
                    Err(e) if e.is_recoverable() && retries < link.max_retries => {
                        retries += 1;
                        warn!(provider = link.generator.name(), retries, error = %e, "Retrying provider");
                        tokio::time::sleep(link.retry_delay).await;
                    }
                    Err(e) => {
                        warn!(provider = link.generator.name(), error = %e, "Provider gave up, trying next");
                        last_error = Some(e);
                        break;
                    }
                }
            }
        }

        if let Some(offline) = &self.offline {
            info!(product = %request.facts.id(), "Falling back to offline content");
            return offline.generate(request).await;
        }

        Err(last_error.unwrap_or_else(|| GenerationError::Unavailable {
            provider: "failover".to_string(),
            reason: "empty provider chain".to_string(),
        }))
    }
}
