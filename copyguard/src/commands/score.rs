// copyguard/src/commands/score.rs
//
// USE CASE: quality breakdown of one generated copy.

use std::path::PathBuf;

use comfy_table::{Table, presets::UTF8_FULL};
use copyguard_core::application::QualityGate;
use copyguard_core::domain::quality::Metric;

use super::{in_project, load_config, read_content, single_facts};
use crate::cli::OutputFormat;

pub fn execute(project_dir: PathBuf, record: PathBuf, content: PathBuf, format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config(&project_dir)?;
    let facts = single_facts(&config, &in_project(&project_dir, record))?;
    let content = read_content(&in_project(&project_dir, content))?;

    // Le score porte sur le texte corrigé, comme dans `run`.
    let gate = QualityGate::new(&config)?;
    let attempt = gate.evaluate(1, content, &facts);
    let score = &attempt.score;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(score)?),
        OutputFormat::Text => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Metric", "Score", "Details"]);
            for metric in Metric::ALL {
                let m = score.metric(metric);
                let details = m
                    .details
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join(", ");
                table.add_row(vec![metric.to_string(), format!("{:.1}", m.value), details]);
            }
            println!("{table}");
            println!("📊 Overall: {:.1} / 100 ({})", score.overall, score.rating);
            if !attempt.fixes.is_empty() {
                println!("   {} correction(s) applied before scoring", attempt.fixes.len());
            }
            if !attempt.report.publishable {
                println!("⚠️  Not publishable: {} open violation(s)", attempt.report.violations.len());
            }
        }
    }
    Ok(())
}
