// copyguard-core/src/infrastructure/prompt/mod.rs

pub mod jinja;

pub use jinja::JinjaRenderer;
