//! Project every saved project in the store and write a metrics summary
//!
//! Usage: run_batch [OUTPUT_CSV]   (default: batch_summary.csv)
//! The store location follows DCF_STORE_PATH like the main CLI.

use anyhow::{Context, Result};
use dcf_model::{ProjectStore, ProjectionConfig, ScenarioRunner};
use std::time::Instant;

const DEFAULT_OUTPUT_PATH: &str = "batch_summary.csv";

#[derive(Debug, serde::Serialize)]
struct SummaryRow {
    name: String,
    years: usize,
    npv: f64,
    /// Empty when no IRR exists
    irr: Option<f64>,
    roc: f64,
}

fn main() -> Result<()> {
    env_logger::init();

    let output_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());
    let store = ProjectStore::from_env();

    let start = Instant::now();
    println!("Loading projects from {}...", store.path().display());
    let projects = store
        .load_all()
        .with_context(|| format!("Failed to read project store {}", store.path().display()))?;
    println!("Loaded {} projects in {:?}", projects.len(), start.elapsed());

    // Trace is not needed for a summary
    let runner = ScenarioRunner::with_config(ProjectionConfig { record_trace: false });

    println!("Running projections...");
    let proj_start = Instant::now();
    let results = runner.run_projects(&projects);
    println!("Projections completed in {:?}", proj_start.elapsed());

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("Unable to create {output_path}"))?;
    for (name, result) in &results {
        let row = SummaryRow {
            name: name.clone(),
            years: result.year_count(),
            npv: result.metrics.npv,
            irr: result.metrics.irr,
            roc: result.metrics.roc,
        };
        println!(
            "  {:<30} NPV {:>16.2}  IRR {:>8}  ROC {:>7.2}%",
            row.name,
            row.npv,
            row.irr.map_or_else(|| "N/A".to_string(), |irr| format!("{irr:.2}%")),
            row.roc
        );
        writer.serialize(&row)?;
    }
    writer.flush()?;

    println!("\nSummary written to: {output_path}");
    println!("Total time: {:?}", start.elapsed());
    Ok(())
}
