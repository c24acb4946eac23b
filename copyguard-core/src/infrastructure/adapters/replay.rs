// copyguard-core/src/infrastructure/adapters/replay.rs

// Rejoue des réponses enregistrées, indexées par SKU (ou EAN, ou nom).
// Une entrée est soit une réponse, soit une liste : une réponse par tentative,
// la dernière étant réutilisée au-delà.

use crate::domain::content::GeneratedContent;
use crate::domain::content::parse::{from_value, parse_response};
use crate::infrastructure::error::InfrastructureError;
use crate::ports::generator::{ContentGenerator, GenerationError, GenerationRequest};
use anyhow::Context;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub struct ReplayGenerator {
    name: String,
    responses: Map<String, Value>,
}

impl ReplayGenerator {
    pub fn new(name: impl Into<String>, responses: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            responses,
        }
    }

    pub fn from_file(name: impl Into<String>, path: &Path) -> Result<Self, InfrastructureError> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read recorded responses at {:?}", path))?;
        let value: Value = serde_json::from_str(&content)?;
        let Value::Object(responses) = value else {
            return Err(InfrastructureError::InvalidRecords {
                path: path.display().to_string(),
                reason: "recorded responses must be an object keyed by SKU".to_string(),
            });
        };
        info!(path = ?path, products = responses.len(), "Recorded responses loaded");
        Ok(Self::new(name, responses))
    }

    fn lookup(&self, request: &GenerationRequest) -> Option<&Value> {
        let facts = &request.facts;
        [&facts.sku, &facts.ean, &facts.name]
            .into_iter()
            .flatten()
            .find_map(|key| self.responses.get(key))
    }

    fn malformed(&self, reason: impl Into<String>) -> GenerationError {
        GenerationError::Malformed {
            provider: self.name.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ContentGenerator for ReplayGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent, GenerationError> {
        let recorded = self.lookup(request).ok_or_else(|| GenerationError::Provider {
            provider: self.name.clone(),
            reason: format!("no recorded response for '{}'", request.facts.id()),
        })?;

        let answer = match recorded {
            Value::Array(items) => {
                let idx = (request.attempt.max(1) as usize - 1).min(items.len().saturating_sub(1));
                items.get(idx).ok_or_else(|| self.malformed("empty response list"))?
            }
            other => other,
        };
        debug!(product = %request.facts.id(), attempt = request.attempt, "Replaying recorded response");

        match answer {
            Value::String(raw) => parse_response(raw),
            other => from_value(other),
        }
        .map_err(|e| self.malformed(e.to_string()))
    }
}
