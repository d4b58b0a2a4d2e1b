//! `lp names`: list the argument names Megatron-LM accepts.

use crate::config::CliConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use launchpad_core::NameSource;
use std::path::PathBuf;

pub fn execute(megatron_path: Option<PathBuf>, json: bool, config: &CliConfig) -> Result<()> {
    let source = super::megatron_arguments(megatron_path, config)?;
    let names = source.allowed_names().context("Failed to discover Megatron-LM arguments")?;

    if json {
        let out: Vec<&str> = names.iter().collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("{}", format!("Megatron-LM arguments ({})", names.len()).bold().cyan());
    println!("  {}", source.path().display().to_string().dimmed());
    println!();
    for name in names.iter() {
        println!("  {name}");
    }
    println!();
    Ok(())
}
