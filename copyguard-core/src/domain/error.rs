// copyguard-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Invalid rule pattern in '{group}': {reason}")]
    #[diagnostic(
        code(copyguard::domain::rule_pattern),
        help("Lexicon and placeholder patterns must be valid regular expressions.")
    )]
    InvalidPattern { group: String, reason: String },

    #[error("Rule set Error: {0}")]
    #[diagnostic(code(copyguard::domain::ruleset))]
    RuleSetError(String),

    #[error("Quality configuration Error: {0}")]
    #[diagnostic(
        code(copyguard::domain::quality),
        help("Metric weights must sum to 1 and rating thresholds must be descending.")
    )]
    QualityConfigError(String),

    #[error("Malformed generated content: {0}")]
    #[diagnostic(
        code(copyguard::domain::malformed_content),
        help("The generator must answer with a JSON object containing metaTitle, metaDescription, bulletPoints, longDescription, whyWorthIt and seoTags.")
    )]
    MalformedContent(String),
}
