pub mod content;
pub mod correction;
pub mod error;
pub mod export;
pub mod product;
pub mod project;
pub mod quality;
pub mod rules;

// Re-exports pratiques pour simplifier les imports ailleurs
pub use error::DomainError;
