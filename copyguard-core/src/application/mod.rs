// copyguard-core/src/application/mod.rs

pub mod batch;
pub mod instructions;
pub mod ports;
pub mod regeneration;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Cela permet au CLI de faire :
// `use copyguard_core::application::{BatchController, QualityGate};`
// sans avoir à connaître la structure interne des fichiers.

pub use batch::{BatchController, BatchProgress, BatchReport, CancellationToken};
pub use instructions::InstructionBuilder;
pub use regeneration::{Attempt, GateOutcome, OutcomeStatus, QualityGate, RegenerationController};
