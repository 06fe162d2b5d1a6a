//! crunchtime CLI - deadline-aware task sequencing
//!
//! Loads goals, projects, milestones and tasks from JSON or TOML, picks the
//! best execution order and reports it.
//!
//! ## Exit Codes
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Success (repair warnings allowed) |
//! | 1 | Failure: input or configuration could not be used |

mod settings;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crunchtime_core::{OptimizationResult, Renderer, Workspace};
use crunchtime_ingest::normalize::parse_deadline;
use crunchtime_render::{MermaidRenderer, TextRenderer};
use crunchtime_solver::{
    run_optimization_with, FirstRemaining, GroupingStrategy, OptimizerConfig, RandomTieBreaker,
    TaskSimulator,
};

use settings::Settings;

#[derive(Parser)]
#[command(name = "crunchtime")]
#[command(author, version, about = "Deadline-aware task sequencing", long_about = None)]
struct Cli {
    /// Verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file [default: ./crunchtime.toml if present]
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate an input file
    Check {
        /// Input file (.json or .toml)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Compute the recommended task order
    Optimize {
        /// Input file (.json or .toml)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Simulated start date [default: now]
        #[arg(long, value_name = "DATE", value_parser = parse_start)]
        start: Option<DateTime<Utc>>,

        /// Seed for random tie-breaking within groups
        #[arg(long, value_name = "N")]
        seed: Option<u64>,

        /// Only try these grouping strategies (comma separated)
        #[arg(long, value_delimiter = ',', value_name = "STRATEGY")]
        strategies: Vec<GroupingStrategy>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Mermaid,
}

fn parse_start(input: &str) -> std::result::Result<DateTime<Utc>, String> {
    parse_deadline(input).ok_or_else(|| format!("invalid date '{}' (expected YYYY-MM-DD or RFC 3339)", input))
}

fn init_tracing(settings: &Settings, verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.directive(verbosity)));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> process::ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {:#}", err);
            return process::ExitCode::FAILURE;
        }
    };
    init_tracing(&settings, cli.verbose);

    let outcome = match cli.command {
        Commands::Check { file } => cmd_check(&file),
        Commands::Optimize {
            file,
            format,
            output,
            start,
            seed,
            strategies,
        } => {
            let options = OptimizeOptions {
                format,
                output,
                start: start.unwrap_or_else(Utc::now),
                seed: seed.or(settings.seed),
                strategies,
            };
            cmd_optimize(&file, &options)
        }
    };

    match outcome {
        Ok(()) => process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            process::ExitCode::FAILURE
        }
    }
}

fn load(file: &Path) -> Result<crunchtime_ingest::Ingested> {
    let ingested = crunchtime_ingest::load_file(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    for warning in &ingested.warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(ingested)
}

fn cmd_check(file: &Path) -> Result<()> {
    let ingested = load(file)?;
    let ws = &ingested.workspace;

    println!(
        "{}: {} goals, {} projects, {} milestones, {} tasks ({} schedulable)",
        file.display(),
        ws.goals().len(),
        ws.projects().len(),
        ws.milestones().len(),
        ws.tasks().len(),
        ws.schedulable_tasks().len()
    );
    if ingested.warnings.is_empty() {
        println!("OK");
    } else {
        println!("OK with {} warning(s)", ingested.warnings.len());
    }
    Ok(())
}

struct OptimizeOptions {
    format: OutputFormat,
    output: Option<PathBuf>,
    start: DateTime<Utc>,
    seed: Option<u64>,
    strategies: Vec<GroupingStrategy>,
}

fn cmd_optimize(file: &Path, options: &OptimizeOptions) -> Result<()> {
    let ingested = load(file)?;
    let workspace = ingested.workspace;

    let mut config = OptimizerConfig::starting_at(options.start);
    if !options.strategies.is_empty() {
        config = config.strategies(options.strategies.iter().copied());
    }

    let result = match options.seed {
        Some(seed) => {
            tracing::debug!(seed, "random tie-breaking");
            run_optimization_with(&workspace, config, TaskSimulator::new(), RandomTieBreaker::seeded(seed))
        }
        None => run_optimization_with(&workspace, config, TaskSimulator::new(), FirstRemaining),
    };

    let rendered = render(options.format, &workspace, &result)?;
    match &options.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn render(format: OutputFormat, workspace: &Workspace, result: &OptimizationResult) -> Result<String> {
    let rendered = match format {
        OutputFormat::Text => TextRenderer::new().render(workspace, result)?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(result)?;
            json.push('\n');
            json
        }
        OutputFormat::Mermaid => MermaidRenderer::new().render(workspace, result)?,
    };
    Ok(rendered)
}
