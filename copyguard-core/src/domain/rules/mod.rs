pub mod checks;
pub mod compiled;
pub mod ruleset;
pub mod validator;
pub mod violation;

pub use compiled::CompiledRules;
pub use ruleset::{FieldLimit, LengthLimits, RuleSet};
pub use validator::RuleValidator;
pub use violation::{FixAction, Severity, ValidationReport, Violation, ViolationCategory};
