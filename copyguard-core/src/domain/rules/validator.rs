// copyguard-core/src/domain/rules/validator.rs

use crate::domain::content::GeneratedContent;
use crate::domain::error::DomainError;
use crate::domain::product::ProductFacts;
use crate::domain::rules::checks::{dimensions, markup, numeric, phrases, placeholder, structure};
use crate::domain::rules::compiled::CompiledRules;
use crate::domain::rules::ruleset::RuleSet;
use crate::domain::rules::violation::ValidationReport;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Runs every rule independently and unions the results. Never fails:
/// violations are data.
pub struct RuleValidator {
    compiled: Arc<CompiledRules>,
}

impl RuleValidator {
    /// Validates and compiles the rule set. A malformed pattern is a
    /// configuration error, not a runtime surprise.
    pub fn new(rules: RuleSet) -> Result<Self, DomainError> {
        Ok(Self {
            compiled: Arc::new(CompiledRules::new(rules)?),
        })
    }

    pub fn from_compiled(compiled: Arc<CompiledRules>) -> Self {
        Self { compiled }
    }

    pub fn compiled(&self) -> Arc<CompiledRules> {
        Arc::clone(&self.compiled)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.compiled.rules
    }

    #[instrument(skip_all, fields(product = %facts.id()))]
    pub fn validate(&self, content: &GeneratedContent, facts: &ProductFacts) -> ValidationReport {
        let rules = self.compiled.as_ref();

        let mut violations = placeholder::check(rules, content);
        violations.extend(phrases::check_banned(rules, content));
        violations.extend(phrases::check_claims(rules, content, facts));
        violations.extend(numeric::check(rules, content));
        violations.extend(dimensions::check(rules, content, facts));
        violations.extend(structure::check(rules, content, facts));
        violations.extend(markup::check(rules, content));

        let report = ValidationReport::from_violations(violations, rules.rules.publish_threshold);
        debug!(
            violations = report.violations.len(),
            score = report.score,
            publishable = report.publishable,
            "Content validated"
        );
        report
    }
}
