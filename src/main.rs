//! DCF Model CLI
//!
//! Runs investment projections from a JSON input file, the bundled sample or a
//! saved project, and prints the schedule grid and metrics.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use dcf_model::inputs::{load_inputs, load_items_csv, InvestmentSummary};
use dcf_model::projection::{fmt_amount, fmt_factor, GridRow, RowFormat};
use dcf_model::{
    arrc1_sample, ItemKind, ModelInputs, ProjectStore, ProjectionConfig, ProjectionResult,
    ScenarioRunner,
};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "dcf_model")]
#[command(version, about = "Discounted cash flow investment model", long_about = None)]
struct Cli {
    /// Project store file (overrides DCF_STORE_PATH)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Project a model and print the schedule and metrics
    Run {
        #[command(flatten)]
        source: Source,

        /// Print the full result as JSON instead of the grid
        #[arg(long)]
        json: bool,

        /// Also write the schedule grid as CSV
        #[arg(long, value_name = "OUT")]
        csv: Option<PathBuf>,

        /// Skip recording the per-cell trace
        #[arg(long)]
        no_trace: bool,
    },

    /// Show how one cell was calculated
    Explain {
        #[command(flatten)]
        source: Source,

        /// Row label, e.g. "EBIT" or "+ Gate Fee"
        row: String,

        year: u32,
    },

    /// Save a model under a name in the project store
    Save {
        #[command(flatten)]
        source: Source,

        name: String,
    },

    /// List saved projects
    #[command(alias = "ls")]
    List,

    /// Print the bundled ARRC1 sample as JSON
    Sample,
}

/// Where the model inputs come from
#[derive(Args, Debug)]
struct Source {
    /// JSON inputs file
    #[arg(short, long, conflicts_with_all = ["sample", "project"])]
    input: Option<PathBuf>,

    /// Use the bundled ARRC1 sample
    #[arg(long, conflicts_with = "project")]
    sample: bool,

    /// Load a saved project by name
    #[arg(short, long)]
    project: Option<String>,

    /// Replace revenue items with a CSV (label,value,growth_rate)
    #[arg(long, value_name = "CSV")]
    revenue: Option<PathBuf>,

    /// Replace expense items with a CSV (label,value,growth_rate)
    #[arg(long, value_name = "CSV")]
    expenses: Option<PathBuf>,
}

impl Source {
    fn load(&self, store: &ProjectStore) -> Result<ModelInputs> {
        let mut inputs = if let Some(path) = &self.input {
            load_inputs(path).with_context(|| format!("Failed to load inputs from {}", path.display()))?
        } else if let Some(name) = &self.project {
            store
                .load(name)
                .with_context(|| format!("Failed to load project from {}", store.path().display()))?
                .data
        } else if self.sample {
            arrc1_sample()
        } else {
            bail!("No inputs given: use --input, --sample or --project");
        };

        if let Some(path) = &self.revenue {
            replace_items(&mut inputs, ItemKind::Revenue, path)?;
        }
        if let Some(path) = &self.expenses {
            replace_items(&mut inputs, ItemKind::Expense, path)?;
        }

        inputs.discount_rate.refresh();
        Ok(inputs)
    }
}

fn replace_items(inputs: &mut ModelInputs, kind: ItemKind, path: &Path) -> Result<()> {
    let items = load_items_csv(path).with_context(|| format!("Failed to load {kind} items from {}", path.display()))?;
    match kind {
        ItemKind::Revenue => inputs.revenue_items.clear(),
        ItemKind::Expense => inputs.expense_items.clear(),
    }
    for item in items {
        inputs.add_item(kind, item);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let store = match &cli.store {
        Some(path) => ProjectStore::open(path),
        None => ProjectStore::from_env(),
    };

    match cli.command {
        Commands::Run { source, json, csv, no_trace } => {
            let inputs = source.load(&store)?;
            let runner = ScenarioRunner::with_config(ProjectionConfig { record_trace: !no_trace });
            let result = runner.run(&inputs);

            if json {
                let stdout = io::stdout();
                serde_json::to_writer_pretty(stdout.lock(), &result)?;
                println!();
            } else {
                print_summary(&inputs.investment_summary(), inputs.discount_rate.calculated_rate);
                print_grid(&result);
                print_metrics(&result);
            }

            if let Some(path) = csv {
                let file = File::create(&path).with_context(|| format!("Unable to create {}", path.display()))?;
                result.write_csv(BufWriter::new(file))?;
                eprintln!("Schedule written to: {}", path.display());
            }
        }

        Commands::Explain { source, row, year } => {
            let inputs = source.load(&store)?;
            let result = ScenarioRunner::new().run(&inputs);
            let Some(entry) = result.trace.get(&row, year) else {
                bail!("No trace recorded for '{row}' in year {year}");
            };

            println!("{row} (year {year})");
            println!("  Formula:     {}", entry.formula);
            println!("  Values:      {}", entry.substituted);
            if !entry.deps.is_empty() {
                let deps: Vec<String> = entry.deps.iter().map(|d| d.key()).collect();
                println!("  Depends on:  {}", deps.join(", "));
            }
        }

        Commands::Save { source, name } => {
            let inputs = source.load(&store)?;
            let saved = store.save(&name, &inputs)?;
            println!("Saved '{}' at {} to {}", saved.name, saved.timestamp.to_rfc3339(), store.path().display());
        }

        Commands::List => {
            let names = store.list()?;
            if names.is_empty() {
                println!("No saved projects in {}", store.path().display());
            }
            for name in names {
                println!("{name}");
            }
        }

        Commands::Sample => {
            let stdout = io::stdout();
            serde_json::to_writer_pretty(stdout.lock(), &arrc1_sample())?;
            println!();
        }
    }

    Ok(())
}

fn print_summary(summary: &InvestmentSummary, discount_rate: f64) {
    println!("Investment Summary");
    println!("==================");
    println!("  Investment:           {:>15}", fmt_amount(summary.investment));
    println!("  - Tax Credit:         {:>15}", fmt_amount(summary.tax_credit));
    println!("  Net Investment:       {:>15}", fmt_amount(summary.net_investment));
    println!("  + Working Capital:    {:>15}", fmt_amount(summary.working_capital));
    println!("  + Opportunity Cost:   {:>15}", fmt_amount(summary.opportunity_cost));
    println!("  + Other Investments:  {:>15}", fmt_amount(summary.other_investments));
    println!("  Total Initial Outlay: {:>15}", fmt_amount(summary.total_initial_outlay));
    println!("  Discount Rate:        {:>14.2}%", discount_rate);
    println!();
}

fn format_cell(row: &GridRow, value: f64) -> String {
    match row.format {
        RowFormat::Amount => fmt_amount(value),
        RowFormat::Factor => fmt_factor(value),
        RowFormat::Rate => format!("{:.2}%", value * 100.0),
        RowFormat::Index => format!("{value:.0}"),
    }
}

fn print_grid(result: &ProjectionResult) {
    let label_width = 42;
    let cell_width = 13;

    let mut header = format!("{:<label_width$}", "Year");
    for year in &result.years {
        header.push_str(&format!("{year:>cell_width$}"));
    }
    println!("{header}");
    println!("{}", "-".repeat(label_width + cell_width * result.years.len()));

    let mut section = "";
    for row in result.grid() {
        if row.section != section {
            section = row.section;
            println!("{section}");
        }
        let mut line = format!("{:<label_width$}", format!("  {}", row.label));
        for &value in &row.values {
            line.push_str(&format!("{:>cell_width$}", format_cell(&row, value)));
        }
        println!("{line}");
    }
    println!();
}

fn print_metrics(result: &ProjectionResult) {
    let metrics = &result.metrics;
    println!("Metrics");
    println!("=======");
    println!("  NPV: {}", fmt_amount(metrics.npv));
    match metrics.irr {
        Some(irr) => println!("  IRR: {irr:.2}%"),
        None => println!("  IRR: N/A"),
    }
    println!("  ROC: {:.2}%", metrics.roc);
}
