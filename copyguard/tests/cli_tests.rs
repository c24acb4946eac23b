use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

const RECORDS: &str = r#"[
  {
    "Indeks": "KS-24",
    "Nazwa": "Zestaw kluczy",
    "Materiał": "CrV",
    "Wymiary (cm)": "24 x 10 x 11",
    "Gwarancja": "2 lata",
    "Ilość elementów": "24"
  },
  {
    "sku": "HM-1",
    "name": "Claw hammer",
    "category": "Hand tools",
    "material": "Steel",
    "color": "Black"
  }
]"#;

const FAST_BATCH: &str = "batch:\n  pause_ms: 0\n  parallelism: 2\n";

/// Abstraction for managing a throwaway CopyGuard project.
struct CopyGuardTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl CopyGuardTestEnv {
    fn new(config: &str) -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().join("catalogue");
        fs::create_dir_all(root.join("products"))?;
        fs::write(root.join("copyguard.yaml"), config)?;
        fs::write(root.join("products/tools.json"), RECORDS)?;
        Ok(Self { _tmp: tmp, root })
    }

    fn write(&self, name: &str, content: &str) -> Result<()> {
        fs::write(self.root.join(name), content).with_context(|| format!("writing {}", name))
    }

    fn read_json(&self, name: &str) -> Result<Value> {
        let raw = fs::read_to_string(self.root.join(name)).with_context(|| format!("{} not generated", name))?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn copyguard(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("copyguard"));
        cmd.current_dir(&self.root);
        cmd.env_remove("COPYGUARD_PARALLELISM")
            .env_remove("COPYGUARD_MAX_ATTEMPTS")
            .env_remove("COPYGUARD_PUBLISH_THRESHOLD")
            .env_remove("COPYGUARD_OUTPUT");
        cmd
    }
}

#[test]
fn test_run_offline_exports_every_product() -> Result<()> {
    let env = CopyGuardTestEnv::new(FAST_BATCH)?;

    env.copyguard()
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("SUCCESS"))
        .stdout(predicate::str::contains("KS-24"));

    let output = env.read_json("results.json")?;
    let results = output["results"].as_array().context("results array")?;
    assert_eq!(results.len(), 2);
    // Trié par identifiant
    assert_eq!(results[0]["sku"], "HM-1");
    assert_eq!(results[1]["sku"], "KS-24");
    for r in results {
        assert!(!r["metaTitle"].as_str().unwrap_or("").is_empty());
        assert!(!r["seoName"].as_str().unwrap_or("").is_empty());
        assert!(r["attempts"].as_u64().unwrap_or(0) >= 1);
    }
    assert!(output["failed"].as_array().is_some_and(|f| f.is_empty()));
    Ok(())
}

#[test]
fn test_run_custom_output_path() -> Result<()> {
    let env = CopyGuardTestEnv::new(FAST_BATCH)?;

    env.copyguard()
        .args(["run", "--output", "out/copy.json"])
        .assert()
        .success();

    assert!(env.root.join("out/copy.json").exists());
    assert!(!env.root.join("results.json").exists());
    Ok(())
}

#[test]
fn test_run_fails_when_a_product_cannot_be_generated() -> Result<()> {
    let config = format!(
        "{}generation:\n  offline_fallback: false\n  providers:\n    - name: recorded\n      type: replay\n      path: responses.json\n      max_retries: 0\n",
        FAST_BATCH
    );
    let env = CopyGuardTestEnv::new(&config)?;
    env.write(
        "responses.json",
        r#"{ "HM-1": { "metaTitle": "Claw hammer – Steel", "metaDescription": "Claw hammer made of steel.", "bulletPoints": ["Steel head", "Black finish"] } }"#,
    )?;

    env.copyguard()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("FAILURE"))
        .stderr(predicate::str::contains("KS-24"));

    // Les produits réussis sont quand même exportés
    let output = env.read_json("results.json")?;
    assert_eq!(output["results"].as_array().map(Vec::len), Some(1));
    assert_eq!(output["failed"][0]["id"], "KS-24");
    Ok(())
}

#[test]
fn test_invalid_config_is_reported() -> Result<()> {
    let env = CopyGuardTestEnv::new("regeneration:\n  max_attempts: 0\n")?;

    env.copyguard()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load project configuration"));
    Ok(())
}

#[test]
fn test_validate_flags_placeholder() -> Result<()> {
    let env = CopyGuardTestEnv::new(FAST_BATCH)?;
    env.write(
        "draft.json",
        "```json\n{\"metaTitle\": \"Zestaw kluczy CrV\", \"metaDescription\": \"Socket set TODO.\"}\n```",
    )?;

    env.copyguard()
        .args(["validate", "--record", "products/tools.json", "--content", "draft.json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("placeholder.token"))
        .stdout(predicate::str::contains("NOT publishable"));
    Ok(())
}

#[test]
fn test_validate_fix_strips_placeholder() -> Result<()> {
    let env = CopyGuardTestEnv::new(FAST_BATCH)?;
    env.write(
        "draft.json",
        r#"{"metaTitle": "Zestaw kluczy CrV", "metaDescription": "Socket set TODO."}"#,
    )?;

    let output = env
        .copyguard()
        .args([
            "validate",
            "--record",
            "products/tools.json",
            "--content",
            "draft.json",
            "--fix",
            "--format",
            "json",
        ])
        .output()?;
    let report: Value = serde_json::from_slice(&output.stdout)?;

    let rules = |key: &str| -> Vec<String> {
        report[key]["violations"]
            .as_array()
            .map(|v| v.iter().filter_map(|x| x["ruleId"].as_str().map(String::from)).collect())
            .unwrap_or_default()
    };
    assert!(rules("initialReport").contains(&"placeholder.token".to_string()));
    assert!(!rules("report").contains(&"placeholder.token".to_string()));
    assert!(report["fixes"].as_array().is_some_and(|f| !f.is_empty()));
    Ok(())
}

#[test]
fn test_score_json_breakdown() -> Result<()> {
    let env = CopyGuardTestEnv::new(FAST_BATCH)?;
    env.write(
        "draft.json",
        r#"{"metaTitle": "Zestaw kluczy CrV", "metaDescription": "Zestaw kluczy z CrV. 24 elementy w walizce.", "longDescription": "<p>Zestaw kluczy z CrV.</p>"}"#,
    )?;

    let output = env
        .copyguard()
        .args(["score", "--record", "products/tools.json", "--content", "draft.json", "--format", "json"])
        .output()?;
    assert!(output.status.success());

    let score: Value = serde_json::from_slice(&output.stdout)?;
    let overall = score["overall"].as_f64().context("overall")?;
    assert!((0.0..=100.0).contains(&overall));
    for metric in ["readability", "semanticCoherence", "technicalAccuracy", "searchOptimization", "engagement"] {
        assert!(score[metric]["value"].is_number(), "missing {}", metric);
    }
    assert!(score["rating"].is_string());
    Ok(())
}

#[test]
fn test_missing_record_file() -> Result<()> {
    let env = CopyGuardTestEnv::new(FAST_BATCH)?;
    env.write("draft.json", "{}")?;

    env.copyguard()
        .args(["score", "--record", "nope.json", "--content", "draft.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load product records"));
    Ok(())
}

#[test]
fn test_facts_snapshot() -> Result<()> {
    let env = CopyGuardTestEnv::new(FAST_BATCH)?;
    env.write("single.json", &first_record()?)?;

    let output = env
        .copyguard()
        .args(["facts", "--records", "single.json"])
        .output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    insta::assert_snapshot!("facts_polish_headers", stdout.trim_end());
    Ok(())
}

fn first_record() -> Result<String> {
    let records: Value = serde_json::from_str(RECORDS)?;
    Ok(serde_json::to_string(&records[0])?)
}
