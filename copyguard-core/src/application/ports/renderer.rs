// copyguard-core/src/application/ports/renderer.rs

use crate::error::CopyGuardError;

pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, CopyGuardError>;
}
