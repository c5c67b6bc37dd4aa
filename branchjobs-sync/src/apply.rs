//! Executing a [`ReconciliationPlan`] against the CI server.
//!
//! Removals run before creations, each group in sorted order. Every branch
//! is its own unit of work: a failure is recorded in the returned
//! [`ItemResult`]s and the pass moves on to the next branch.

use std::fmt;

use serde::Serialize;

use branchjobs_core::{BranchName, JobLayout, JobName, JobSource, JobWriter, WriteError};
use branchjobs_jenkins::render_job_config;

use crate::plan::ReconciliationPlan;

// ---------------------------------------------------------------------------
// Item results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Remove,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
            Action::Remove => write!(f, "remove"),
        }
    }
}

/// Outcome of one create or remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ItemStatus {
    /// The write succeeded.
    Done,
    /// Dry run: the write *would* have been issued.
    Planned,
    /// The server was already in the desired state, most likely because
    /// another reconciler got there first.
    Warning { reason: String },
    /// The write failed.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResult {
    pub action: Action,
    pub branch: BranchName,
    pub job: JobName,
    #[serde(flatten)]
    pub status: ItemStatus,
}

// ---------------------------------------------------------------------------
// apply / preview
// ---------------------------------------------------------------------------

/// Issue every write in `plan`.
///
/// The template job's config is fetched from `source` once, and only if
/// there is something to create. If it cannot be fetched every creation
/// fails with that reason.
pub fn apply<S, W>(
    plan: &ReconciliationPlan,
    source: &S,
    writer: &W,
    layout: &JobLayout,
) -> Vec<ItemResult>
where
    S: JobSource,
    W: JobWriter,
{
    let mut results = Vec::with_capacity(plan.to_create.len() + plan.to_remove.len());

    for branch in &plan.to_remove {
        let job = layout.job_name(branch);
        tracing::info!("removing job '{job}' for branch '{}'", branch.short());
        let status = remove_one(writer, &job);
        results.push(record(Action::Remove, branch, job, status));
    }

    let mut template: Option<Result<String, String>> = None;
    for branch in &plan.to_create {
        let job = layout.job_name(branch);
        tracing::info!("creating and enabling job '{job}' for branch {}", branch.short());
        let cached = template.get_or_insert_with(|| {
            source.read_job(&layout.template_job).map_err(|e| {
                format!("cannot read template job '{}': {e}", layout.template_job)
            })
        });
        let status = match &*cached {
            Ok(config) => {
                let rendered =
                    render_job_config(config, &layout.branch_placeholder, branch.short());
                create_one(writer, &job, &rendered)
            }
            Err(error) => ItemStatus::Failed {
                error: error.clone(),
            },
        };
        results.push(record(Action::Create, branch, job, status));
    }

    results
}

/// What [`apply`] would do, without touching the server.
pub fn preview(plan: &ReconciliationPlan, layout: &JobLayout) -> Vec<ItemResult> {
    let removes = plan.to_remove.iter().map(|b| (Action::Remove, b));
    let creates = plan.to_create.iter().map(|b| (Action::Create, b));
    removes
        .chain(creates)
        .map(|(action, branch)| ItemResult {
            action,
            branch: branch.clone(),
            job: layout.job_name(branch),
            status: ItemStatus::Planned,
        })
        .collect()
}

fn remove_one<W: JobWriter>(writer: &W, job: &JobName) -> ItemStatus {
    match writer.delete_job(job) {
        Ok(()) => ItemStatus::Done,
        Err(e) => failure(e),
    }
}

fn create_one<W: JobWriter>(writer: &W, job: &JobName, config: &str) -> ItemStatus {
    if let Err(e) = writer.create_job(job, config) {
        return failure(e);
    }
    match writer.enable_job(job) {
        Ok(()) => ItemStatus::Done,
        Err(e) => ItemStatus::Failed {
            error: format!("created but not enabled: {e}"),
        },
    }
}

fn failure(e: WriteError) -> ItemStatus {
    if e.is_race() {
        ItemStatus::Warning {
            reason: e.to_string(),
        }
    } else {
        ItemStatus::Failed {
            error: e.to_string(),
        }
    }
}

fn record(action: Action, branch: &BranchName, job: JobName, status: ItemStatus) -> ItemResult {
    match &status {
        ItemStatus::Warning { reason } => {
            tracing::warn!("{action} '{job}': {reason}");
        }
        ItemStatus::Failed { error } => {
            tracing::error!("{action} '{job}' failed: {error}");
        }
        ItemStatus::Done | ItemStatus::Planned => {}
    }
    ItemResult {
        action,
        branch: branch.clone(),
        job,
        status,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
