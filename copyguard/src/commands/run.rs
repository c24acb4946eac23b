// copyguard/src/commands/run.rs
//
// USE CASE: generate, gate and export copy for a whole catalogue.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use comfy_table::{Cell, Color, Table, presets::UTF8_FULL};
use copyguard_core::application::batch::{BatchProgress, ItemFailure};
use copyguard_core::application::{
    BatchController, CancellationToken, InstructionBuilder, OutcomeStatus, QualityGate, RegenerationController,
};
use copyguard_core::domain::export::ExportRecord;
use copyguard_core::infrastructure::adapters::FailoverGenerator;
use copyguard_core::infrastructure::fs::write_json;
use copyguard_core::infrastructure::prompt::JinjaRenderer;
use serde::Serialize;
use tracing::warn;

use super::{extract_all, in_project, load_config};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunOutput<'a> {
    project: &'a str,
    results: Vec<ExportRecord>,
    failed: &'a [ItemFailure],
    cancelled: &'a [String],
}

pub async fn execute(project_dir: PathBuf, records: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Config + faits
    println!("⚙️  Loading configuration...");
    let config = load_config(&project_dir)?;
    println!("   Project: {}", config.name);

    let records_path = in_project(&project_dir, records);
    let facts = extract_all(&config, &records_path)?;
    println!("📦 {} product(s) loaded from {}", facts.len(), records_path.display());

    // B. Câblage (injection des adapters)
    let gate = Arc::new(QualityGate::new(&config)?);
    let instructions = Arc::new(InstructionBuilder::new(
        Arc::new(JinjaRenderer::new()),
        config.generation.clone(),
        config.rules.clone(),
    ));
    let generator = Arc::new(
        FailoverGenerator::from_config(&config.generation, &config.rules, &project_dir)
            .context("Failed to build the generator chain")?,
    );
    let controller = Arc::new(RegenerationController::new(
        gate,
        instructions,
        generator,
        config.regeneration.clone(),
    ));
    let batch = BatchController::new(controller, config.batch.clone());

    // C. Ctrl-C : on termine les items en vol, on ne démarre plus rien
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n🛑 Cancellation requested, finishing in-flight items...");
            on_signal.cancel();
        }
    });

    let report = batch.run(facts, &cancel, print_progress).await;

    // D. Export
    let mut succeeded: Vec<_> = report.succeeded.iter().collect();
    succeeded.sort_by_key(|s| s.facts.id());
    let results: Vec<ExportRecord> = succeeded
        .iter()
        .map(|s| s.outcome.to_export(&s.facts, &config.seo_name))
        .collect();

    let output_path = match output {
        Some(path) => in_project(&project_dir, path),
        None => project_dir.join(&config.output_path),
    };
    write_json(
        &output_path,
        &RunOutput {
            project: &config.name,
            results,
            failed: &report.failed,
            cancelled: &report.cancelled,
        },
    )
    .with_context(|| format!("Failed to write results to {:?}", output_path))?;

    // E. Résumé
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Product", "Score", "Rating", "Attempts", "Status", "Fixes"]);
    for item in &succeeded {
        let best = &item.outcome.best;
        let status = match item.outcome.status {
            OutcomeStatus::Accepted => Cell::new("accepted").fg(Color::Green),
            OutcomeStatus::Exhausted => Cell::new("exhausted").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(item.facts.id()),
            Cell::new(format!("{:.1}", best.score.overall)),
            Cell::new(best.score.rating),
            Cell::new(item.outcome.attempts),
            status,
            Cell::new(best.fixes.len()),
        ]);
    }
    for failure in &report.failed {
        table.add_row(vec![
            Cell::new(&failure.id),
            Cell::new("-"),
            Cell::new("-"),
            Cell::new(failure.tries),
            Cell::new("failed").fg(Color::Red),
            Cell::new("-"),
        ]);
    }
    println!("{table}");
    println!("📝 Results written to {}", output_path.display());

    if !report.cancelled.is_empty() {
        warn!(count = report.cancelled.len(), "Items skipped after cancellation");
        println!("🛑 {} product(s) not processed (cancelled)", report.cancelled.len());
    }

    if report.failed.is_empty() {
        println!("\n✨ SUCCESS! {} product(s) in {:.2?}", succeeded.len(), start.elapsed());
    } else {
        eprintln!("\n❌ FAILURE. {} product(s) failed.", report.failed.len());
        for failure in &report.failed {
            eprintln!("   • {}: {}", failure.id, failure.error);
        }
        std::process::exit(1);
    }

    Ok(())
}

fn print_progress(p: &BatchProgress) {
    let eta = p
        .eta
        .map(|d| format!("{:.1?}", d))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "   [{}/{}] {:.0}% ✅ {} ❌ {} ⏳ ETA {}",
        p.processed, p.total, p.percentage, p.succeeded, p.failed, eta
    );
}
