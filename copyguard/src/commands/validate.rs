// copyguard/src/commands/validate.rs
//
// USE CASE: check one generated copy against the rules (and optionally repair it).

use std::path::PathBuf;

use comfy_table::{Cell, Color, Table, presets::UTF8_FULL};
use copyguard_core::application::QualityGate;
use copyguard_core::domain::rules::{Severity, ValidationReport};
use serde_json::json;

use super::{in_project, load_config, read_content, single_facts};
use crate::cli::OutputFormat;

pub fn execute(
    project_dir: PathBuf,
    record: PathBuf,
    content: PathBuf,
    fix: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let config = load_config(&project_dir)?;
    let facts = single_facts(&config, &in_project(&project_dir, record))?;
    let content = read_content(&in_project(&project_dir, content))?;

    let gate = QualityGate::new(&config)?;
    let publishable = if fix {
        let attempt = gate.evaluate(1, content, &facts);
        let publishable = attempt.report.publishable;
        match format {
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "initialReport": &attempt.initial_report,
                    "fixes": &attempt.fixes,
                    "report": &attempt.report,
                    "introduced": &attempt.introduced,
                    "content": &attempt.content,
                }))?
            ),
            OutputFormat::Text => {
                println!("🔎 Raw copy");
                print_report(&attempt.initial_report);
                if attempt.fixes.is_empty() {
                    println!("\n🔧 No correction needed");
                } else {
                    println!("\n🔧 {} correction(s) applied", attempt.fixes.len());
                    for f in &attempt.fixes {
                        let field = f.field.map(|x| x.to_string()).unwrap_or_else(|| "-".to_string());
                        println!("   • [{}] {}: {}", f.step, field, f.detail);
                    }
                }
                println!("\n🔎 Corrected copy");
                print_report(&attempt.report);
                if !attempt.introduced.is_empty() {
                    println!("⚠️  Introduced by correction: {}", attempt.introduced.join(", "));
                }
            }
        }
        publishable
    } else {
        let report = gate.validator().validate(&content, &facts);
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Text => print_report(&report),
        }
        report.publishable
    };

    if !publishable {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(report: &ValidationReport) {
    if report.violations.is_empty() {
        println!("✅ No violation");
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["Rule", "Severity", "Field", "Evidence", "Message"]);
        for v in &report.violations {
            let severity = match v.severity {
                Severity::Critical => Cell::new(v.severity).fg(Color::Red),
                Severity::High => Cell::new(v.severity).fg(Color::Yellow),
                _ => Cell::new(v.severity),
            };
            table.add_row(vec![
                Cell::new(&v.rule_id),
                severity,
                Cell::new(v.field.map(|f| f.to_string()).unwrap_or_else(|| "-".to_string())),
                Cell::new(&v.evidence),
                Cell::new(&v.message),
            ]);
        }
        println!("{table}");
    }
    let verdict = if report.publishable { "publishable" } else { "NOT publishable" };
    println!("   Score: {:.1} / 100 ({})", report.score, verdict);
}
