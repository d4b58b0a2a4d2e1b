//! Handing a rendered job array to the scheduler.

use crate::error::{SweepError, SweepResult};
use async_trait::async_trait;
use std::path::PathBuf;

/// A job array ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArraySubmission {
    /// Inclusive zero-based index range, e.g. `0-11`.
    pub array_spec: String,
    pub script_path: PathBuf,
}

impl ArraySubmission {
    #[must_use]
    pub fn new(upper_bound: usize, script_path: PathBuf) -> Self {
        Self { array_spec: format!("0-{upper_bound}"), script_path }
    }

    /// Arguments passed to the submission program.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        vec![format!("--array={}", self.array_spec), self.script_path.display().to_string()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// Full command line, program first.
    pub command: Vec<String>,
    /// Scheduler job id, when the scheduler reported one.
    pub job_id: Option<String>,
    pub stdout: String,
    pub executed: bool,
}

#[async_trait]
pub trait JobSubmitter: Send + Sync {
    fn id(&self) -> &'static str;

    async fn submit(&self, request: &ArraySubmission) -> SweepResult<SubmissionReceipt>;
}

/// Parse `Submitted batch job 12345`.
fn parse_job_id(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        line.trim().strip_prefix("Submitted batch job").map(str::trim).filter(|id| !id.is_empty()).map(str::to_string)
    })
}

/// Runs `sbatch` (or a compatible program) as a child process.
#[derive(Debug, Clone)]
pub struct SbatchSubmitter {
    program: String,
}

impl SbatchSubmitter {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }
}

impl Default for SbatchSubmitter {
    fn default() -> Self {
        Self::new("sbatch")
    }
}

#[async_trait]
impl JobSubmitter for SbatchSubmitter {
    fn id(&self) -> &'static str {
        "sbatch"
    }

    async fn submit(&self, request: &ArraySubmission) -> SweepResult<SubmissionReceipt> {
        let args = request.args();
        let mut command = vec![self.program.clone()];
        command.extend(args.iter().cloned());
        tracing::info!(command = %command.join(" "), "submitting job array");

        let output = tokio::process::Command::new(&self.program).args(&args).output().await.map_err(|e| {
            SweepError::Submission { status: "not started".to_string(), stderr: format!("{}: {}", self.program, e) }
        })?;

        if !output.status.success() {
            return Err(SweepError::Submission {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let job_id = parse_job_id(&stdout);
        if let Some(ref id) = job_id {
            tracing::info!(job_id = %id, "job array accepted");
        }
        Ok(SubmissionReceipt { command, job_id, stdout, executed: true })
    }
}

/// Reports the command it would run without running it.
#[derive(Debug, Clone)]
pub struct DryRunSubmitter {
    program: String,
}

impl DryRunSubmitter {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }
}

#[async_trait]
impl JobSubmitter for DryRunSubmitter {
    fn id(&self) -> &'static str {
        "dry-run"
    }

    async fn submit(&self, request: &ArraySubmission) -> SweepResult<SubmissionReceipt> {
        let mut command = vec![self.program.clone()];
        command.extend(request.args());
        tracing::info!(command = %command.join(" "), "dry run; not submitting");
        Ok(SubmissionReceipt { command, job_id: None, stdout: String::new(), executed: false })
    }
}
