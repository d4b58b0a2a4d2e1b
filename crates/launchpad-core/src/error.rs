use std::fmt;
use thiserror::Error;

pub type SweepResult<T> = std::result::Result<T, SweepError>;

/// One malformed mutually exclusive parameter group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    /// Human name of the group (e.g. "training length").
    pub group: &'static str,
    /// Every member of the group, in canonical order.
    pub members: Vec<&'static str>,
    /// Members that were actually present.
    pub present: Vec<String>,
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let found = if self.present.is_empty() { "none".to_string() } else { self.present.join(", ") };
        write!(
            f,
            "{}: exactly one of [{}] must be set (found: {})",
            self.group,
            self.members.join(", "),
            found
        )
    }
}

fn join_violations(violations: &[ConstraintViolation]) -> String {
    violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("unknown training arguments: {}", .unknown.join(", "))]
    Validation { unknown: Vec<String> },

    #[error("conflicting training arguments: {}", join_violations(.violations))]
    Constraint { violations: Vec<ConstraintViolation> },

    #[error("missing value for {key}")]
    MissingValue { key: String },

    #[error("cannot parse {key}={value}: {reason}")]
    Parse { key: String, value: String, reason: String },

    #[error("sweep expanded to zero jobs (a swept argument has no values)")]
    EmptySweep,

    #[error("invalid launch document: {0}")]
    Document(String),

    #[error("template error: {0}")]
    Template(String),

    #[error("submission failed ({status}): {stderr}")]
    Submission { status: String, stderr: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SweepError {
    pub(crate) fn parse(key: &str, value: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::Parse { key: key.to_string(), value: value.to_string(), reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_key() {
        let err = SweepError::Validation { unknown: vec!["foo".to_string(), "bar_baz".to_string()] };
        assert_eq!(err.to_string(), "unknown training arguments: foo, bar_baz");
    }

    #[test]
    fn test_constraint_error_names_groups() {
        let err = SweepError::Constraint {
            violations: vec![
                ConstraintViolation {
                    group: "training length",
                    members: vec!["train_iters", "train_samples"],
                    present: vec![],
                },
                ConstraintViolation {
                    group: "decay length",
                    members: vec!["lr_decay_iters", "lr_decay_samples"],
                    present: vec!["lr_decay_iters".to_string(), "lr_decay_samples".to_string()],
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("training length: exactly one of [train_iters, train_samples] must be set (found: none)"));
        assert!(msg.contains("(found: lr_decay_iters, lr_decay_samples)"));
    }
}
