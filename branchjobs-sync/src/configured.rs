//! Which branches already have a job.

use std::collections::BTreeSet;

use serde::Serialize;

use branchjobs_core::{BranchName, JobLayout, JobName, JobSource, SourceError};
use branchjobs_jenkins::parse_branch_name;

/// A branch job whose config could not be decoded into one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobAnomaly {
    pub job: JobName,
    pub reason: String,
}

/// Branch names decoded from existing branch jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfiguredBranches {
    pub branches: BTreeSet<BranchName>,
    /// Jobs skipped because their branch could not be determined.
    pub anomalies: Vec<JobAnomaly>,
}

/// List every job, keep the branch jobs, and decode the branch each one
/// builds.
///
/// Failing to list jobs is fatal. A job whose config cannot be fetched or
/// does not name exactly one branch is skipped and recorded as an anomaly.
pub fn collect_configured<S: JobSource>(
    source: &S,
    layout: &JobLayout,
) -> Result<ConfiguredBranches, SourceError> {
    let mut jobs = source.list_jobs()?;
    jobs.sort();

    let mut configured = ConfiguredBranches::default();
    for job in jobs.into_iter().filter(|j| layout.is_branch_job(j)) {
        let decoded = match source.read_job(&job) {
            Ok(config) => parse_branch_name(&config).map_err(|a| a.to_string()),
            Err(e) => Err(format!("cannot read config: {e}")),
        };
        match decoded {
            Ok(raw) => {
                let branch = BranchName::normalized(&raw);
                tracing::debug!("job '{job}' builds {branch}");
                configured.branches.insert(branch);
            }
            Err(reason) => {
                tracing::warn!("skipping job '{job}': {reason}");
                configured.anomalies.push(JobAnomaly { job, reason });
            }
        }
    }
    Ok(configured)
}
