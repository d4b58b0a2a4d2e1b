//! CLI configuration loading and merging.
//!
//! Configuration precedence:
//! 1. CLI arguments (handled by clap)
//! 2. Environment variables (`MEGATRON_PATH`)
//! 3. Local config file (./.launchpadrc)
//! 4. Global config file (~/.launchpad/config.toml)
//! 5. Defaults

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Root of the Megatron-LM checkout whose arguments are accepted
    #[serde(default)]
    pub megatron_path: Option<PathBuf>,

    /// Submission script template
    #[serde(default)]
    pub template: Option<PathBuf>,

    /// Script sourced by every array task before training
    #[serde(default)]
    pub cluster_setup_script: Option<PathBuf>,

    /// Submission program (defaults to `sbatch`)
    #[serde(default)]
    pub submit_program: Option<String>,

    /// Log level
    #[serde(default)]
    pub log_level: Option<String>,
}

impl CliConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse configuration file: {}", path.display()))
    }

    /// Get default global configuration file path.
    pub fn default_global_path() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".launchpad").join("config.toml")
    }

    /// Get default local configuration file path.
    pub fn default_local_path() -> PathBuf {
        PathBuf::from(".launchpadrc")
    }

    /// Discover and load configuration files.
    ///
    /// Local config overrides global config. A file that exists but does not
    /// parse is an error; a missing file is skipped.
    pub fn discover_and_load() -> Result<Self> {
        let mut config = Self::default();

        for path in [Self::default_global_path(), Self::default_local_path()] {
            if path.exists() {
                config.merge(&Self::load_from_file(&path)?);
                tracing::debug!(path = %path.display(), "loaded configuration");
            }
        }

        Ok(config)
    }

    /// Merge another configuration into this one.
    ///
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &Self) {
        if let Some(ref path) = other.megatron_path {
            self.megatron_path = Some(path.clone());
        }
        if let Some(ref template) = other.template {
            self.template = Some(template.clone());
        }
        if let Some(ref script) = other.cluster_setup_script {
            self.cluster_setup_script = Some(script.clone());
        }
        if let Some(ref program) = other.submit_program {
            self.submit_program = Some(program.clone());
        }
        if let Some(ref log_level) = other.log_level {
            self.log_level = Some(log_level.clone());
        }
    }

    /// Resolve the Megatron-LM root: flag, then `MEGATRON_PATH`, then config.
    pub fn resolve_megatron_path(&self, flag: Option<PathBuf>) -> Option<PathBuf> {
        flag.or_else(|| std::env::var_os("MEGATRON_PATH").filter(|v| !v.is_empty()).map(PathBuf::from))
            .or_else(|| self.megatron_path.clone())
    }

    pub fn submit_program(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.submit_program.clone()).unwrap_or_else(|| "sbatch".to_string())
    }
}
