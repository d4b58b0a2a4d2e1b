//! The sweep manifest and the pipeline that materializes it.

use crate::derive::derive_canonical;
use crate::error::{SweepError, SweepResult};
use crate::expand::expand_sweep;
use crate::flags::to_flags;
use crate::names::{validate_names, AllowedNames};
use crate::naming::job_name;
use crate::params::ParamMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One array task: its name and the flags passed to the training process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub job_name: String,
    pub flags: Vec<String>,
}

/// Ordered jobs; a job's position is its scheduler array index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SweepManifest {
    pub jobs: Vec<Job>,
}

impl SweepManifest {
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Highest zero-based array index, `None` for an empty manifest.
    #[must_use]
    pub fn array_upper_bound(&self) -> Option<usize> {
        self.jobs.len().checked_sub(1)
    }

    pub fn to_json_pretty(&self) -> SweepResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: &Path) -> SweepResult<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> SweepResult<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Result of materializing a launch: the manifest plus the derived
/// (pre-expansion) training arguments it was built from.
#[derive(Debug, Clone)]
pub struct Materialized {
    pub manifest: SweepManifest,
    pub derived: ParamMap,
}

/// Validate, derive, expand, then name and flag every run.
///
/// Pure with respect to its inputs; nothing is written here.
pub fn materialize<S: AsRef<str>>(
    base_name: &str,
    raw: &ParamMap,
    sweep_keys: &[S],
    allowed: &AllowedNames,
) -> SweepResult<Materialized> {
    validate_names(raw, &allowed.with_convenience_keys())?;
    let derived = derive_canonical(raw)?;
    validate_names(&derived, allowed)?;

    let configs = expand_sweep(&derived, sweep_keys);
    if configs.is_empty() {
        return Err(SweepError::EmptySweep);
    }

    let jobs = configs
        .iter()
        .map(|config| {
            Ok(Job { job_name: job_name(base_name, config, sweep_keys), flags: to_flags(config)? })
        })
        .collect::<SweepResult<Vec<_>>>()?;

    tracing::info!(base_name, jobs = jobs.len(), "materialized sweep");
    Ok(Materialized { manifest: SweepManifest { jobs }, derived })
}
