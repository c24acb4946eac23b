// copyguard/src/commands/facts.rs

use std::path::PathBuf;

use super::{extract_all, in_project, load_config};

/// Prints the normalized facts as JSON, one array for all records.
pub fn execute(project_dir: PathBuf, records: PathBuf) -> anyhow::Result<()> {
    let config = load_config(&project_dir)?;
    let facts = extract_all(&config, &in_project(&project_dir, records))?;
    println!("{}", serde_json::to_string_pretty(&facts)?);
    Ok(())
}
