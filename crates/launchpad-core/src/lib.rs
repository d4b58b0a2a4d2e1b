//! Launchpad Core
//!
//! Turns a declarative pretraining description into a scheduler job array:
//! - Validating training parameter names (`names`)
//! - Deriving canonical parameters from convenience ones (`derive`)
//! - Expanding swept parameters into concrete runs (`expand`)
//! - Naming runs and rendering their flags (`naming`, `flags`)
//! - Writing the sweep manifest and submission script (`manifest`, `template`, `launch`)
//! - Handing the job array to the scheduler (`submit`)

pub mod derive;
pub mod document;
pub mod error;
pub mod expand;
pub mod flags;
pub mod launch;
pub mod layout;
pub mod manifest;
pub mod names;
pub mod naming;
pub mod params;
pub mod submit;
pub mod template;

pub use derive::derive_canonical;
pub use document::{LaunchDocument, SchedulerArgs, SweepKeys};
pub use error::{ConstraintViolation, SweepError, SweepResult};
pub use expand::expand_sweep;
pub use flags::{flag_name, to_flags};
pub use launch::{prepare_launch, LaunchOptions, PreparedLaunch};
pub use layout::SweepLayout;
pub use manifest::{materialize, Job, Materialized, SweepManifest};
pub use names::{validate_names, AllowedNames, ArgumentsFile, NameSource, StaticNames};
pub use naming::job_name;
pub use params::{ParamMap, ParamValue};
pub use submit::{ArraySubmission, DryRunSubmitter, JobSubmitter, SbatchSubmitter, SubmissionReceipt};
pub use template::{ScriptTemplate, TemplateContext};
