//! `lp launch`: write the sweep artifacts and submit the job array.

use crate::config::CliConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use launchpad_core::{prepare_launch, DryRunSubmitter, LaunchOptions, SbatchSubmitter, ScriptTemplate};
use serde_json::json;
use std::path::PathBuf;

#[derive(Debug)]
pub struct LaunchArgs {
    pub config: PathBuf,
    pub megatron_path: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub setup_script: Option<PathBuf>,
    pub submit_program: Option<String>,
    pub dry_run: bool,
    pub json: bool,
}

pub async fn execute(args: LaunchArgs, config: &CliConfig) -> Result<()> {
    let document = super::load_document(&args.config)?;
    let names = super::megatron_arguments(args.megatron_path, config)?;

    let template = match args.template.or_else(|| config.template.clone()) {
        Some(path) => ScriptTemplate::load(&path)?,
        None => ScriptTemplate::builtin(),
    };
    let options = LaunchOptions {
        template,
        cluster_setup_script: args.setup_script.or_else(|| config.cluster_setup_script.clone()),
    };

    let prepared = prepare_launch(&document, &names, &options).context("Failed to prepare launch")?;

    let program = config.submit_program(args.submit_program);
    let receipt = if args.dry_run {
        prepared.submit(&DryRunSubmitter::new(program)).await?
    } else {
        prepared.submit(&SbatchSubmitter::new(program)).await.context("Failed to submit job array")?
    };

    if args.json {
        let out = json!({
            "manifest_path": prepared.layout.manifest_path(),
            "script_path": prepared.script_path,
            "jobs": prepared.manifest.len(),
            "array": prepared.submission.array_spec,
            "command": receipt.command,
            "submitted": receipt.executed,
            "job_id": receipt.job_id,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("{}", format!("Launch prepared ({} jobs)", prepared.manifest.len()).bold().cyan());
    println!("  Manifest: {}", prepared.layout.manifest_path().display().to_string().dimmed());
    println!("  Script:   {}", prepared.script_path.display().to_string().dimmed());
    println!("  Command:  {}", receipt.command.join(" "));
    println!();

    if !receipt.executed {
        println!("  {}", "Dry run: job array not submitted.".yellow());
    } else if let Some(job_id) = receipt.job_id {
        println!("  {} Submitted job array {}", "✓".green().bold(), job_id.cyan());
    } else {
        println!("  {} Submitted job array", "✓".green().bold());
        if !receipt.stdout.is_empty() {
            println!("    {}", receipt.stdout.dimmed());
        }
    }
    println!();
    Ok(())
}
