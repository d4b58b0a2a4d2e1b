//! Launch orchestration: compute everything first, then write artifacts.
//!
//! Nothing touches the filesystem until the manifest and the script have been
//! fully computed, so a failing configuration never leaves a partial sweep
//! behind for the scheduler to pick up.

use crate::document::LaunchDocument;
use crate::error::{SweepError, SweepResult};
use crate::layout::SweepLayout;
use crate::manifest::{materialize, Materialized, SweepManifest};
use crate::names::NameSource;
use crate::params::ParamMap;
use crate::submit::{ArraySubmission, JobSubmitter, SubmissionReceipt};
use crate::template::{ScriptTemplate, TemplateContext};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub template: ScriptTemplate,
    /// Sourced by the script before training starts.
    pub cluster_setup_script: Option<PathBuf>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self { template: ScriptTemplate::builtin(), cluster_setup_script: None }
    }
}

/// Artifacts written for a launch, ready for submission.
#[derive(Debug, Clone)]
pub struct PreparedLaunch {
    pub layout: SweepLayout,
    pub manifest: SweepManifest,
    pub script_path: PathBuf,
    pub submission: ArraySubmission,
}

impl PreparedLaunch {
    pub async fn submit(&self, submitter: &dyn JobSubmitter) -> SweepResult<SubmissionReceipt> {
        tracing::debug!(submitter = submitter.id(), jobs = self.manifest.len(), "handing off job array");
        submitter.submit(&self.submission).await
    }
}

/// Materialize the document's sweep without writing anything.
pub fn plan(document: &LaunchDocument, names: &dyn NameSource) -> SweepResult<Materialized> {
    let base_name = document.scheduler.job_name()?;
    let allowed = names.allowed_names()?;
    materialize(&base_name, &document.training, document.sweep_keys.as_slice(), &allowed)
}

fn optional_arg(derived: &ParamMap, key: &str) -> String {
    derived.get(key).filter(|value| !value.is_null()).map(ToString::to_string).unwrap_or_default()
}

fn script_context(
    document: &LaunchDocument,
    derived: &ParamMap,
    layout: &SweepLayout,
    options: &LaunchOptions,
    num_jobs: usize,
) -> SweepResult<TemplateContext> {
    let scheduler = &document.scheduler;
    let mut context = TemplateContext::new();

    context.set("job_name", scheduler.job_name()?);
    context.set("slurm_time", scheduler.require("time")?);
    context.set("slurm_account", scheduler.require("account")?);
    context.set("slurm_nodes", scheduler.require("nodes")?);
    context.set("slurm_partition", scheduler.require("partition")?);
    context.set("out_dir", layout.root().display().to_string());
    context.set("sweep_path", layout.manifest_path().display().to_string());
    context.set("slurm_logs_dir", layout.logs_dir().display().to_string());
    context.set(
        "cluster_setup_script",
        options.cluster_setup_script.as_ref().map(|p| p.display().to_string()).unwrap_or_default(),
    );
    context.set("load", optional_arg(derived, "load"));
    context.set("save", optional_arg(derived, "save"));
    context.set("num_jobs", num_jobs.to_string());

    Ok(context)
}

/// Compute the sweep, then write `sweep.json` and the submission script.
pub fn prepare_launch(
    document: &LaunchDocument,
    names: &dyn NameSource,
    options: &LaunchOptions,
) -> SweepResult<PreparedLaunch> {
    let job_name = document.scheduler.job_name()?;
    let layout = SweepLayout::new(document.scheduler.out_dir()?);

    let Materialized { manifest, derived } = plan(document, names)?;
    let upper_bound = manifest.array_upper_bound().ok_or(SweepError::EmptySweep)?;
    let context = script_context(document, &derived, &layout, options, manifest.len())?;
    let script = options.template.render(&context);

    layout.ensure_dirs()?;
    let manifest_path = layout.manifest_path();
    manifest.write_to(&manifest_path)?;
    tracing::info!(path = %manifest_path.display(), jobs = manifest.len(), "saved sweep manifest");

    let script_path = layout.script_path(&job_name);
    std::fs::write(&script_path, script)?;
    tracing::info!(path = %script_path.display(), "wrote submission script");

    let submission = ArraySubmission::new(upper_bound, script_path.clone());
    Ok(PreparedLaunch { layout, manifest, script_path, submission })
}
