//! The launch document: scheduler settings, training arguments and sweep keys.

use crate::error::{SweepError, SweepResult};
use crate::params::{ParamMap, ParamValue};
use std::path::{Path, PathBuf};

const SCHEDULER_SECTION: &str = "sbatch_args";
const TRAINING_SECTION: &str = "megatron_args";
const SWEEP_SECTION: &str = "sweep_args";

/// Ordered, duplicate-free list of swept argument names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepKeys(Vec<String>);

impl SweepKeys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for key in keys {
            let key = key.into();
            if out.contains(&key) {
                tracing::warn!(key = %key, "duplicate sweep key ignored");
            } else {
                out.push(key);
            }
        }
        Self(out)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Free-form scheduler settings; only the keys a launch needs are checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulerArgs(ParamMap);

impl SchedulerArgs {
    #[must_use]
    pub fn new(values: ParamMap) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Plain string form of a required, non-null setting.
    pub fn require(&self, key: &str) -> SweepResult<String> {
        match self.0.get(key) {
            Some(value) if !value.is_null() => Ok(value.to_string()),
            _ => Err(SweepError::Document(format!("`{SCHEDULER_SECTION}.{key}` is required"))),
        }
    }

    pub fn job_name(&self) -> SweepResult<String> {
        self.require("job_name")
    }

    pub fn out_dir(&self) -> SweepResult<PathBuf> {
        self.require("out_dir").map(PathBuf::from)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaunchDocument {
    pub scheduler: SchedulerArgs,
    pub training: ParamMap,
    pub sweep_keys: SweepKeys,
}

impl LaunchDocument {
    pub fn load(path: &Path) -> SweepResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            std::io::Error::new(e.kind(), format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> SweepResult<Self> {
        let root: serde_yaml::Value = serde_yaml::from_str(content)?;
        let root = match root {
            serde_yaml::Value::Mapping(mapping) => mapping,
            serde_yaml::Value::Null => serde_yaml::Mapping::new(),
            _ => return Err(SweepError::Document("top level must be a mapping".to_string())),
        };

        let section = |name: &str| {
            root.get(name)
                .cloned()
                .ok_or_else(|| SweepError::Document(format!("missing `{name}` section")))
        };

        let scheduler = SchedulerArgs::new(ParamMap::from_yaml(SCHEDULER_SECTION, section(SCHEDULER_SECTION)?)?);
        let training = ParamMap::from_yaml(TRAINING_SECTION, section(TRAINING_SECTION)?)?;
        let sweep_keys = match root.get(SWEEP_SECTION) {
            None | Some(serde_yaml::Value::Null) => SweepKeys::default(),
            Some(serde_yaml::Value::Sequence(items)) => {
                let keys = items
                    .iter()
                    .map(|item| {
                        item.as_str().map(str::to_string).ok_or_else(|| {
                            SweepError::Document(format!("`{SWEEP_SECTION}` entries must be strings"))
                        })
                    })
                    .collect::<SweepResult<Vec<_>>>()?;
                SweepKeys::new(keys)
            }
            Some(_) => return Err(SweepError::Document(format!("`{SWEEP_SECTION}` must be a list"))),
        };

        Ok(Self { scheduler, training, sweep_keys })
    }
}
