//! # branchjobs-jenkins
//!
//! Jenkins side of the reconciliation.
//!
//! - [`JenkinsCli`] implements [`JobSource`](branchjobs_core::JobSource) and
//!   [`JobWriter`](branchjobs_core::JobWriter) on top of `jenkins-cli.jar`.
//! - [`job_config`] reads the branch back out of a job's XML config and
//!   renders new configs from the template job.

pub mod cli;
pub mod job_config;

pub use cli::JenkinsCli;
pub use job_config::{parse_branch_name, read_branch_name, render_job_config, JobConfigAnomaly};
