//! Command implementations for the Launchpad CLI.

pub mod expand;
pub mod launch;
pub mod names;

use crate::config::CliConfig;
use anyhow::{Context, Result};
use launchpad_core::{ArgumentsFile, LaunchDocument};
use std::path::{Path, PathBuf};

/// Locate the Megatron-LM arguments file from flag, environment or config.
pub(crate) fn megatron_arguments(flag: Option<PathBuf>, config: &CliConfig) -> Result<ArgumentsFile> {
    let Some(root) = config.resolve_megatron_path(flag) else {
        anyhow::bail!(
            "Megatron-LM location unknown. Pass --megatron-path, set MEGATRON_PATH, or add `megatron_path` to .launchpadrc."
        );
    };
    Ok(ArgumentsFile::for_megatron_root(&root))
}

pub(crate) fn load_document(path: &Path) -> Result<LaunchDocument> {
    LaunchDocument::load(path).with_context(|| format!("Failed to load launch document: {}", path.display()))
}
