// copyguard-core/src/domain/project/mod.rs

pub mod configuration;
pub use configuration::{
    BatchConfig, GenerationConfig, ProjectConfig, ProviderConfig, ProviderKind, RegenerationConfig,
};
