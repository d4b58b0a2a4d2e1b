//! Training argument name validation.
//!
//! The set of accepted names is owned by the training framework; it is
//! obtained through a [`NameSource`] and treated as an opaque set here.

use crate::derive::CONVENIENCE_KEYS;
use crate::error::{SweepError, SweepResult};
use crate::params::ParamMap;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Immutable set of argument names accepted by the training process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedNames(BTreeSet<String>);

impl AllowedNames {
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// The same set plus the convenience names the derivation step consumes.
    #[must_use]
    pub fn with_convenience_keys(&self) -> Self {
        let mut names = self.0.clone();
        names.extend(CONVENIENCE_KEYS.iter().map(|k| (*k).to_string()));
        Self(names)
    }
}

impl<S: Into<String>> FromIterator<S> for AllowedNames {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Provider of the accepted argument names.
pub trait NameSource {
    fn allowed_names(&self) -> SweepResult<AllowedNames>;
}

/// A fixed list of names.
#[derive(Debug, Clone, Default)]
pub struct StaticNames(pub Vec<String>);

impl NameSource for StaticNames {
    fn allowed_names(&self) -> SweepResult<AllowedNames> {
        Ok(self.0.iter().cloned().collect())
    }
}

/// Discovers names from an argparse-style argument definition file.
#[derive(Debug, Clone)]
pub struct ArgumentsFile {
    path: PathBuf,
}

impl ArgumentsFile {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Arguments file inside a Megatron-LM checkout.
    #[must_use]
    pub fn for_megatron_root(root: &Path) -> Self {
        Self::new(root.join("megatron").join("training").join("arguments.py"))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn add_argument_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s+group\.add_argument\(\s*['"]--([^'"]+)['"]"#).expect("static regex is valid")
    })
}

/// Extract `--flag-name` definitions as `flag_name`.
pub fn scan_argument_names(source: &str) -> AllowedNames {
    let re = add_argument_regex();
    source
        .lines()
        .filter_map(|line| re.captures(line))
        .map(|caps| caps[1].replace('-', "_"))
        .collect()
}

impl NameSource for ArgumentsFile {
    fn allowed_names(&self) -> SweepResult<AllowedNames> {
        let source = std::fs::read_to_string(&self.path).map_err(|e| {
            std::io::Error::new(e.kind(), format!("failed to read {}: {}", self.path.display(), e))
        })?;
        let names = scan_argument_names(&source);
        tracing::debug!(path = %self.path.display(), count = names.len(), "discovered training arguments");
        Ok(names)
    }
}

/// Fail with every key of `config` that `allowed` does not contain.
pub fn validate_names(config: &ParamMap, allowed: &AllowedNames) -> SweepResult<()> {
    let unknown: Vec<String> =
        config.keys().filter(|key| !allowed.contains(key)).map(str::to_string).collect();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(SweepError::Validation { unknown })
    }
}
