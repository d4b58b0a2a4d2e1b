//! Launchpad CLI - expands pretraining sweeps into Slurm job arrays
//!
//! This CLI provides an `lp` command that validates a launch document against
//! the training framework's arguments, writes the sweep manifest and the
//! submission script, and submits the job array.

mod commands;
mod config;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{expand, launch, names};

/// Launchpad CLI - pretraining sweep launcher
#[derive(Parser, Debug)]
#[command(
    name = "lp",
    author,
    version,
    about = "Launchpad - pretraining sweeps as Slurm job arrays",
    long_about = "Launchpad (lp) expands a declarative training description into one job per sweep point,\nwrites the sweep manifest and submission script, and submits them as a Slurm job array."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the sweep and submit it as a job array
    ///
    /// Validates and expands the launch document, writes sweep.json and the
    /// submission script under the run's out_dir, then submits the array.
    Launch {
        /// Launch document (YAML)
        config: PathBuf,

        /// Megatron-LM checkout (overrides MEGATRON_PATH)
        #[arg(long)]
        megatron_path: Option<PathBuf>,

        /// Submission script template (defaults to the built-in array template)
        #[arg(long)]
        template: Option<PathBuf>,

        /// Script sourced by every array task before training
        #[arg(long)]
        setup_script: Option<PathBuf>,

        /// Submission program (defaults to sbatch)
        #[arg(long)]
        submit_program: Option<String>,

        /// Write artifacts but do not submit
        #[arg(long)]
        dry_run: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the jobs a launch document expands to
    ///
    /// Runs validation, derivation and expansion without writing anything.
    Expand {
        /// Launch document (YAML)
        config: PathBuf,

        /// Megatron-LM checkout (overrides MEGATRON_PATH)
        #[arg(long)]
        megatron_path: Option<PathBuf>,

        /// Print the manifest as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the training arguments Megatron-LM accepts
    Names {
        /// Megatron-LM checkout (overrides MEGATRON_PATH)
        #[arg(long)]
        megatron_path: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let cli_config = config::CliConfig::discover_and_load()?;

    // Initialize tracing
    let level = match args.log_level.as_deref().or(cli_config.log_level.as_deref()).unwrap_or("info") {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // If no command provided, show help
    let command = if let Some(cmd) = args.command {
        cmd
    } else {
        Args::command().print_help()?;
        return Ok(());
    };

    // Execute command
    match command {
        Command::Launch { config, megatron_path, template, setup_script, submit_program, dry_run, json } => {
            let args = launch::LaunchArgs { config, megatron_path, template, setup_script, submit_program, dry_run, json };
            launch::execute(args, &cli_config).await?;
        }
        Command::Expand { config, megatron_path, json } => {
            expand::execute(&config, megatron_path, json, &cli_config)?;
        }
        Command::Names { megatron_path, json } => {
            names::execute(megatron_path, json, &cli_config)?;
        }
    }

    Ok(())
}
