//! `lp expand`: preview the jobs a launch document produces.

use crate::config::CliConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

pub fn execute(config_path: &Path, megatron_path: Option<PathBuf>, json: bool, config: &CliConfig) -> Result<()> {
    let document = super::load_document(config_path)?;
    let names = super::megatron_arguments(megatron_path, config)?;
    let materialized = launchpad_core::launch::plan(&document, &names).context("Failed to expand sweep")?;
    let manifest = materialized.manifest;

    if json {
        println!("{}", manifest.to_json_pretty()?);
        return Ok(());
    }

    println!();
    println!("{}", format!("Sweep ({} jobs)", manifest.len()).bold().cyan());
    if !document.sweep_keys.is_empty() {
        println!("  Swept: {}", document.sweep_keys.as_slice().join(", ").dimmed());
    }
    println!();

    for (index, job) in manifest.jobs.iter().enumerate() {
        println!("  {:>4}  {}", index.to_string().dimmed(), job.job_name.cyan());
        for flag in &job.flags {
            println!("        {}", flag.dimmed());
        }
    }
    println!();
    Ok(())
}
