use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use estimating_tools::estimating::tools::pipeline;
use estimating_tools::estimating::tools::populate::{PopulateReport, RuleSet};
use estimating_tools::{Result, ToolError};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Normalize(args) => {
            require_input(&args.input)?;
            require_input(&args.template)?;
            let summary = pipeline::normalize(&args.input, &args.template, &args.output)?;
            info!(?summary, "normalisation finished");
            Ok(())
        }
        Command::Aggregate(args) => {
            require_input(&args.workbook)?;
            let summary = pipeline::aggregate(&args.workbook)?;
            info!(?summary, "aggregation finished");
            Ok(())
        }
        Command::Map(args) => {
            require_input(&args.workbook)?;
            let rules = load_rules(args.rules.as_deref())?;
            let report = pipeline::map_breakdown(&args.workbook, &rules)?;
            log_report(&report);
            Ok(())
        }
        Command::Run(args) => {
            require_input(&args.input)?;
            require_input(&args.template)?;
            let rules = load_rules(args.rules.as_deref())?;
            let report = pipeline::run(&args.input, &args.template, &args.output, &rules)?;
            log_report(&report);
            Ok(())
        }
    }
}

fn require_input(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ToolError::MissingInput(path.to_path_buf()))
    }
}

fn load_rules(path: Option<&Path>) -> Result<RuleSet> {
    match path {
        Some(path) => {
            require_input(path)?;
            RuleSet::from_json_file(path)
        }
        None => Ok(RuleSet::default()),
    }
}

fn log_report(report: &PopulateReport) {
    info!(
        writes = report.writes.len(),
        unresolved = report.unresolved.len(),
        "breakdown populated"
    );
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Normalise estimating exports and populate the mechanical breakdown workbook."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Copy the template and write the normalised "raw input" sheet.
    Normalize(NormalizeArgs),
    /// Sum "raw input" per (Name, Units) into "Refined values".
    Aggregate(WorkbookArgs),
    /// Transfer refined totals into the "Mechanical Breakdown" sheet.
    Map(MapArgs),
    /// Run normalize, aggregate and map in order.
    Run(RunArgs),
}

#[derive(clap::Args)]
struct NormalizeArgs {
    /// Delimited estimating export.
    #[arg(long)]
    input: PathBuf,

    /// Workbook holding the "Mechanical Breakdown" template.
    #[arg(long)]
    template: PathBuf,

    /// Output workbook path.
    #[arg(long)]
    output: PathBuf,
}

#[derive(clap::Args)]
struct WorkbookArgs {
    /// Workbook produced by the previous stage.
    #[arg(long)]
    workbook: PathBuf,
}

#[derive(clap::Args)]
struct MapArgs {
    /// Workbook produced by the previous stage.
    #[arg(long)]
    workbook: PathBuf,

    /// Optional JSON rule table replacing the built-in one.
    #[arg(long)]
    rules: Option<PathBuf>,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Delimited estimating export.
    #[arg(long)]
    input: PathBuf,

    /// Workbook holding the "Mechanical Breakdown" template.
    #[arg(long)]
    template: PathBuf,

    /// Output workbook path.
    #[arg(long)]
    output: PathBuf,

    /// Optional JSON rule table replacing the built-in one.
    #[arg(long)]
    rules: Option<PathBuf>,
}
