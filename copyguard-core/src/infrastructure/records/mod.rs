// copyguard-core/src/infrastructure/records/mod.rs

// Lecture des enregistrements produit : un fichier JSON/YAML, ou un dossier
// parcouru récursivement. Chaque fichier contient un tableau d'objets (un objet
// seul est accepté).

use crate::domain::product::RawRecord;
use crate::infrastructure::error::InfrastructureError;
use anyhow::Context;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

const EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

#[instrument]
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>, InfrastructureError> {
    let files = discover(path)?;
    let mut records = Vec::new();
    for file in &files {
        let loaded = load_file(file)?;
        debug!(file = ?file, count = loaded.len(), "Records loaded");
        records.extend(loaded);
    }
    info!(files = files.len(), records = records.len(), "Input records loaded");
    Ok(records)
}

fn discover(path: &Path) -> Result<Vec<PathBuf>, InfrastructureError> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(InfrastructureError::InvalidRecords {
            path: path.display().to_string(),
            reason: "no such file or directory".to_string(),
        });
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        })
        .collect();
    // Ordre stable d'une exécution à l'autre.
    files.sort();
    Ok(files)
}

fn load_file(path: &Path) -> Result<Vec<RawRecord>, InfrastructureError> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read records at {:?}", path))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let value: Value = if is_json {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    let invalid = |reason: &str| InfrastructureError::InvalidRecords {
        path: path.display().to_string(),
        reason: reason.to_string(),
    };

    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(map) => Ok(RawRecord(map)),
                _ => Err(invalid(&format!("item {} is not an object", i))),
            })
            .collect(),
        Value::Object(map) => Ok(vec![RawRecord(map)]),
        Value::Null => Ok(vec![]),
        _ => Err(invalid("expected an array of objects")),
    }
}
