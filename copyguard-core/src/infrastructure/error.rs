// copyguard-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(copyguard::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(copyguard::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON Parsing Error: {0}")]
    #[diagnostic(code(copyguard::infra::json))]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(copyguard::infra::config))]
    ConfigError(String),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(
        code(copyguard::infra::config_missing),
        help("Create a copyguard.yaml in the project directory, or run without one to use defaults.")
    )]
    ConfigNotFound(String),

    #[error("{0:#}")]
    #[diagnostic(code(copyguard::infra::context))]
    Context(#[from] anyhow::Error),

    // --- RECORDS ---
    #[error("Invalid input records in '{path}': {reason}")]
    #[diagnostic(
        code(copyguard::infra::records),
        help("Input files must contain an array of objects (JSON or YAML).")
    )]
    InvalidRecords { path: String, reason: String },

    // --- TEMPLATING ---
    #[error("Template Rendering Error: {0}")]
    #[diagnostic(
        code(copyguard::infra::template),
        help("Check your Jinja syntax ({{ ... }}) inside the prompt template.")
    )]
    TemplateError(#[from] minijinja::Error),
}
