// copyguard-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::generator::GenerationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CopyGuardError {
    // --- ERREURS DU DOMAINE (Règles, configuration qualité) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- ERREURS D'INFRASTRUCTURE (IO, Parsing) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- ERREURS DU FOURNISSEUR (Timeout, quota, réponse illisible) ---
    #[error(transparent)]
    Generation(#[from] GenerationError),

    // --- ERREURS GÉNÉRIQUES / APPLICATIVES ---
    #[error("Internal Error: {0}")]
    InternalError(String),
}

impl CopyGuardError {
    /// Only provider hiccups are worth re-enqueueing.
    pub fn is_recoverable(&self) -> bool {
        match self {
            CopyGuardError::Generation(e) => e.is_recoverable(),
            _ => false,
        }
    }
}

// Manual implementation to avoid duplicate enum variant but keep ergonomics
impl From<std::io::Error> for CopyGuardError {
    fn from(err: std::io::Error) -> Self {
        CopyGuardError::Infrastructure(InfrastructureError::Io(err))
    }
}
