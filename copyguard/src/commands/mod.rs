// copyguard/src/commands/mod.rs

pub mod facts;
pub mod run;
pub mod score;
pub mod validate;

use anyhow::{Context, bail};
use copyguard_core::domain::content::{GeneratedContent, parse_response};
use copyguard_core::domain::product::{FactExtractor, ProductFacts};
use copyguard_core::domain::project::ProjectConfig;
use copyguard_core::infrastructure::config::load_project_config;
use copyguard_core::infrastructure::records::load_records;
use std::fs;
use std::path::{Path, PathBuf};

pub(crate) fn load_config(project_dir: &Path) -> anyhow::Result<ProjectConfig> {
    load_project_config(project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })
}

/// Relative paths are taken from the project directory.
pub(crate) fn in_project(project_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        project_dir.join(path)
    }
}

pub(crate) fn extract_all(config: &ProjectConfig, path: &Path) -> anyhow::Result<Vec<ProductFacts>> {
    let records = load_records(path).with_context(|| format!("Failed to load product records from {:?}", path))?;
    let extractor = FactExtractor::new(config.extraction.clone())?;
    Ok(records.iter().map(|r| extractor.extract(r)).collect())
}

/// First record of the file: `validate` and `score` work on a single product.
pub(crate) fn single_facts(config: &ProjectConfig, path: &Path) -> anyhow::Result<ProductFacts> {
    match extract_all(config, path)?.into_iter().next() {
        Some(facts) => Ok(facts),
        None => bail!("No product record found in {:?}", path),
    }
}

pub(crate) fn read_content(path: &Path) -> anyhow::Result<GeneratedContent> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read generated copy at {:?}", path))?;
    parse_response(&raw).with_context(|| format!("Unreadable generated copy in {:?}", path))
}
