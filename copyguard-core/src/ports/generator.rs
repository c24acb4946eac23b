// copyguard-core/src/ports/generator.rs

// Le contrat du fournisseur de texte. Le cœur ne sait pas si la réponse vient
// d'une API distante, d'un fichier rejoué ou du générateur hors-ligne.

use crate::domain::content::GeneratedContent;
use crate::domain::product::ProductFacts;
use crate::domain::quality::Metric;
use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

/// Everything a provider receives for one attempt.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub language: String,
    pub style: String,
    /// 1-based.
    pub attempt: u32,
    /// Metrics the previous attempt was weak on; empty on the first attempt.
    pub focus_metrics: Vec<Metric>,
    pub facts: ProductFacts,
}

#[derive(Error, Debug, Diagnostic)]
pub enum GenerationError {
    #[error("Provider '{provider}' timed out")]
    #[diagnostic(code(copyguard::generation::timeout))]
    Timeout { provider: String },

    #[error("Provider '{provider}' is rate limited")]
    #[diagnostic(
        code(copyguard::generation::rate_limited),
        help("Lower batch.parallelism or raise batch.pause_ms.")
    )]
    RateLimited { provider: String },

    #[error("Provider '{provider}' is unavailable: {reason}")]
    #[diagnostic(code(copyguard::generation::unavailable))]
    Unavailable { provider: String, reason: String },

    #[error("Provider '{provider}' returned an unusable answer: {reason}")]
    #[diagnostic(code(copyguard::generation::malformed))]
    Malformed { provider: String, reason: String },

    #[error("Provider '{provider}' failed: {reason}")]
    #[diagnostic(code(copyguard::generation::provider))]
    Provider { provider: String, reason: String },
}

impl GenerationError {
    /// Timeouts, rate limits and transient outages are worth another try.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::RateLimited { .. } | Self::Unavailable { .. }
        )
    }
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent, GenerationError>;
}
