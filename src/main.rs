use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use portfolio_sunburst::{format_thousands, load_tables, PortfolioReport, Settings};

#[derive(Parser)]
#[command(name = "portfolio-sunburst", about = "Asset-class sunburst data from portfolio tables")]
struct Cli {
    /// Tables exported from the portfolio page (.json or .csv)
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the Plotly chart document as JSON
    Report {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List every holding with its classified genre
    Holdings,
    /// Show the aggregated category tree
    Tree,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings")?;

    let input = cli
        .input
        .or_else(|| settings.input.clone())
        .context("No input file: pass --input or set PORTFOLIO_INPUT")?;

    let tables = load_tables(&input)
        .with_context(|| format!("Failed to load tables from {}", input.display()))?;
    info!(tables = tables.len(), input = %input.display(), "loaded tables");

    let report = PortfolioReport::build(&tables).context("Failed to build portfolio report")?;

    match cli.command {
        Commands::Report { output } => {
            run_report(&report, &settings, output.or_else(|| settings.output.clone()))
        }
        Commands::Holdings => {
            print_holdings(&report);
            Ok(())
        }
        Commands::Tree => {
            print_tree(&report);
            Ok(())
        }
    }
}

fn run_report(report: &PortfolioReport, settings: &Settings, output: Option<PathBuf>) -> Result<()> {
    let json = report
        .chart(settings.layout())
        .to_json_pretty()
        .context("Failed to serialize chart document")?;

    match output {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("✓ {}", report.summary());
            eprintln!("✓ Chart written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn print_holdings(report: &PortfolioReport) {
    println!("{:<40} {:<20} {:>14} {:>12}  {}", "Name", "Account", "Amount", "Profit", "Genre");
    println!("{}", "━".repeat(110));

    for h in &report.holdings {
        println!(
            "{:<40} {:<20} {:>14} {:>12}  {}",
            h.name,
            h.account,
            format_thousands(h.amount),
            format_thousands(h.profit),
            h.genre
        );
    }

    println!("\n{}", report.summary());
}

fn print_tree(report: &PortfolioReport) {
    println!(
        "{:<40} {:<20} {:>14} {:>8} {:>8} {:>9}",
        "Category", "Parent", "Amount", "%Parent", "%Total", "Return"
    );
    println!("{}", "━".repeat(104));

    let percent = |v: Option<f64>| v.map(|p| format!("{:.1}%", p)).unwrap_or_else(|| "n/a".into());

    for node in &report.nodes {
        println!(
            "{:<40} {:<20} {:>14} {:>8} {:>8} {:>9}",
            node.name,
            node.parent,
            format_thousands(node.amount),
            percent(node.percent_of_parent),
            percent(node.percent_of_total),
            node.profit_rate.to_string()
        );
    }
}
