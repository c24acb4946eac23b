// copyguard-core/src/infrastructure/config/project.rs

use anyhow::Context;
use serde::{Deserialize, de::DeserializeOwned};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::project::configuration::ProjectConfig;
use crate::domain::rules::ruleset::LexiconGroup;
use crate::infrastructure::error::InfrastructureError;

const CONFIG_CANDIDATES: [&str; 2] = ["copyguard.yaml", "copyguard.yml"];
const SATELLITE_DIR: &str = "config";

// --- LOADER ---

/// Loads `copyguard.yaml` from the project directory. Without one, the
/// defaults are used; satellites and environment overrides apply either way.
#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    // 1. Découverte du fichier principal
    let mut config = match find_main_config(project_dir) {
        Some(path) => read_config(&path)?,
        None => {
            info!(dir = ?project_dir, "No copyguard.yaml found, using defaults");
            ProjectConfig::default()
        }
    };

    // 2. Hydratation des satellites
    let config_dir = project_dir.join(SATELLITE_DIR);
    if config_dir.exists() {
        load_satellite_configs(&mut config, &config_dir)?;
    }

    // 3. Override via variables d'environnement
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    check(config)
}

/// Loads an explicit configuration file; a missing file is an error here.
#[instrument]
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, InfrastructureError> {
    if !path.exists() {
        return Err(InfrastructureError::ConfigNotFound(path.display().to_string()));
    }
    let mut config = read_config(path)?;
    if let Some(dir) = path.parent() {
        let config_dir = dir.join(SATELLITE_DIR);
        if config_dir.exists() {
            load_satellite_configs(&mut config, &config_dir)?;
        }
    }
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    check(config)
}

fn find_main_config(root: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.exists())
}

fn read_config(path: &Path) -> Result<ProjectConfig, InfrastructureError> {
    info!(path = ?path, "Loading project configuration");
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read project config at {:?}", path))?;
    // Un fichier vide vaut la configuration par défaut.
    if content.trim().is_empty() {
        return Ok(ProjectConfig::default());
    }
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse project config YAML at {:?}", path))
        .map_err(Into::into)
}

fn check(config: ProjectConfig) -> Result<ProjectConfig, InfrastructureError> {
    config
        .validate()
        .map_err(|e| InfrastructureError::ConfigError(e.to_string()))?;
    Ok(config)
}

// --- LOGIQUE GÉNÉRIQUE ---

/// Charge un fragment de configuration typé depuis un fichier.
/// T est le type de la struct Wrapper attendue dans le fichier.
fn load_fragment<T: DeserializeOwned>(path: &Path) -> Result<T, InfrastructureError> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config fragment at {:?}", path))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse YAML fragment at {:?}", path))
        .map_err(Into::into)
}

fn load_satellite_configs(config: &mut ProjectConfig, config_dir: &Path) -> Result<(), InfrastructureError> {
    let lexicon_path = ["lexicon.yml", "lexicon.yaml"]
        .iter()
        .map(|name| config_dir.join(name))
        .find(|p| p.exists());

    if let Some(path) = lexicon_path {
        #[derive(Deserialize)]
        struct LexiconWrapper {
            lexicon: Vec<LexiconGroup>,
        }

        // Fichier corrompu : on arrête tout plutôt que de valider sans lexique.
        let wrapper: LexiconWrapper = load_fragment(&path)?;
        info!(groups = wrapper.lexicon.len(), "Lexicon loaded from satellite file");
        config.rules.lexicon = wrapper.lexicon;
    }

    Ok(())
}

/// `COPYGUARD_*` overrides. `lookup` is `std::env::var` outside of tests.
pub(crate) fn apply_env_overrides(
    config: &mut ProjectConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), InfrastructureError> {
    fn parse<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, InfrastructureError> {
        raw.trim()
            .parse()
            .map_err(|_| InfrastructureError::ConfigError(format!("{} has an invalid value '{}'", key, raw)))
    }

    if let Some(val) = lookup("COPYGUARD_PARALLELISM") {
        config.batch.parallelism = parse("COPYGUARD_PARALLELISM", &val)?;
        info!(value = config.batch.parallelism, "Overriding parallelism via ENV");
    }
    if let Some(val) = lookup("COPYGUARD_MAX_ATTEMPTS") {
        config.regeneration.max_attempts = parse("COPYGUARD_MAX_ATTEMPTS", &val)?;
        info!(value = config.regeneration.max_attempts, "Overriding max attempts via ENV");
    }
    if let Some(val) = lookup("COPYGUARD_PUBLISH_THRESHOLD") {
        config.regeneration.publish_threshold = parse("COPYGUARD_PUBLISH_THRESHOLD", &val)?;
        info!(value = config.regeneration.publish_threshold, "Overriding publish threshold via ENV");
    }
    if let Some(val) = lookup("COPYGUARD_OUTPUT") {
        info!(old = ?config.output_path, new = ?val, "Overriding output path via ENV");
        config.output_path = val;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = load_project_config(dir.path())?;
        assert_eq!(config.name, "copyguard");
        Ok(())
    }

    #[test]
    fn test_yml_candidate_and_lexicon_satellite() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("copyguard.yml"), "name: shop\nbatch:\n  parallelism: 2\n")?;
        fs::create_dir(dir.path().join("config"))?;
        fs::write(
            dir.path().join("config/lexicon.yml"),
            r#"
lexicon:
  - name: house_style
    category: fluff
    weight: 2
    severity: low
    phrases:
      - phrase: "super"
        replacement: "very"
"#,
        )?;

        let config = load_project_config(dir.path())?;
        assert_eq!(config.name, "shop");
        assert_eq!(config.batch.parallelism, 2);
        assert_eq!(config.rules.lexicon.len(), 1);
        assert_eq!(config.rules.lexicon[0].name, "house_style");
        Ok(())
    }

    #[test]
    fn test_invalid_settings_are_rejected() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("copyguard.yaml"),
            "quality:\n  weights:\n    readability: 0.9\n",
        )?;
        let err = load_project_config(dir.path()).unwrap_err();
        assert!(matches!(err, InfrastructureError::ConfigError(_)));
        Ok(())
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let err = load_config_file(Path::new("/nonexistent/copyguard.yaml")).unwrap_err();
        assert!(matches!(err, InfrastructureError::ConfigNotFound(_)));
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let env: HashMap<&str, &str> = HashMap::from([
            ("COPYGUARD_PARALLELISM", "8"),
            ("COPYGUARD_MAX_ATTEMPTS", "2"),
            ("COPYGUARD_PUBLISH_THRESHOLD", "75.5"),
            ("COPYGUARD_OUTPUT", "out/results.json"),
        ]);
        let mut config = ProjectConfig::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()))?;

        assert_eq!(config.batch.parallelism, 8);
        assert_eq!(config.regeneration.max_attempts, 2);
        assert_eq!(config.regeneration.publish_threshold, 75.5);
        assert_eq!(config.output_path, "out/results.json");

        let bad = apply_env_overrides(&mut config, |k| {
            (k == "COPYGUARD_PARALLELISM").then(|| "many".to_string())
        });
        assert!(bad.is_err());
        Ok(())
    }
}
