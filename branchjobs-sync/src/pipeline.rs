//! One full reconciliation pass.

use chrono::{DateTime, Utc};

use branchjobs_core::{
    BranchFilter, BranchSource, JobLayout, JobSource, JobWriter, ValidatedConfig,
};

use crate::apply::{apply, preview};
use crate::configured::collect_configured;
use crate::error::SyncError;
use crate::plan::plan;
use crate::report::SyncReport;

/// Brings the CI server's branch jobs in line with the repository's
/// eligible branches.
///
/// `B` supplies remote branches. `J` is the CI server, used both to read
/// existing jobs and to write changes.
pub struct Reconciler<B, J> {
    branches: B,
    jobs: J,
    filter: BranchFilter,
    layout: JobLayout,
}

impl<B, J> Reconciler<B, J>
where
    B: BranchSource,
    J: JobSource + JobWriter,
{
    pub fn new(branches: B, jobs: J, filter: BranchFilter, layout: JobLayout) -> Self {
        Self {
            branches,
            jobs,
            filter,
            layout,
        }
    }

    pub fn from_config(config: &ValidatedConfig, branches: B, jobs: J) -> Self {
        Self::new(branches, jobs, config.filter.clone(), config.layout.clone())
    }

    /// Run a pass against the current time.
    pub fn run(&self, dry_run: bool) -> Result<SyncReport, SyncError> {
        self.run_at(Utc::now(), dry_run)
    }

    /// Run a pass with an explicit clock.
    ///
    /// Only snapshot failures abort. Individual write failures end up in
    /// [`SyncReport::items`].
    pub fn run_at(&self, now: DateTime<Utc>, dry_run: bool) -> Result<SyncReport, SyncError> {
        let refs = self
            .branches
            .list_remote_branches()
            .map_err(SyncError::Branches)?;
        let eligible = self.filter.filter_at(&refs, now);
        tracing::info!(
            "{} of {} remote branches are eligible",
            eligible.len(),
            refs.len()
        );

        let configured = collect_configured(&self.jobs, &self.layout).map_err(SyncError::Jobs)?;
        tracing::info!("{} branch jobs configured", configured.branches.len());

        let plan = plan(&eligible, &configured.branches);
        let items = if dry_run {
            preview(&plan, &self.layout)
        } else {
            apply(&plan, &self.jobs, &self.jobs, &self.layout)
        };

        Ok(SyncReport {
            started_at: now,
            dry_run,
            branches: eligible,
            configured: configured.branches,
            anomalies: configured.anomalies,
            plan,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchjobs_core::{BranchRef, JobName, JobNameTemplate, SourceError, WriteError};

    struct NoBranches;

    impl BranchSource for NoBranches {
        fn list_remote_branches(&self) -> Result<Vec<BranchRef>, SourceError> {
            Err(SourceError::Command {
                command: "git for-each-ref".into(),
                status: "exit status: 128".into(),
                stderr: "fatal: not a git repository".into(),
            })
        }
    }

    struct Unreachable;

    impl JobSource for Unreachable {
        fn list_jobs(&self) -> Result<Vec<JobName>, SourceError> {
            Err(SourceError::Command {
                command: "list-jobs".into(),
                status: "exit status: 1".into(),
                stderr: "connection refused".into(),
            })
        }

        fn read_job(&self, _: &JobName) -> Result<String, SourceError> {
            unreachable!()
        }
    }

    impl JobWriter for Unreachable {
        fn create_job(&self, _: &JobName, _: &str) -> Result<(), WriteError> {
            unreachable!()
        }

        fn enable_job(&self, _: &JobName) -> Result<(), WriteError> {
            unreachable!()
        }

        fn delete_job(&self, _: &JobName) -> Result<(), WriteError> {
            unreachable!()
        }
    }

    struct OneBranch;

    impl BranchSource for OneBranch {
        fn list_remote_branches(&self) -> Result<Vec<BranchRef>, SourceError> {
            Ok(vec![BranchRef::new(
                "refs/remotes/origin/dev/A-1",
                "a".repeat(40),
                Utc::now(),
            )])
        }
    }

    fn reconciler<B: BranchSource>(branches: B) -> Reconciler<B, Unreachable> {
        Reconciler::new(
            branches,
            Unreachable,
            BranchFilter::new("refs/remotes/origin/dev/", 30, None).unwrap(),
            JobLayout {
                names: JobNameTemplate::parse("Build X %s").unwrap(),
                remote_prefix: "origin/".into(),
                template_job: JobName::from("TEMPLATE Build X"),
                branch_placeholder: "BBBBBB".into(),
            },
        )
    }

    #[test]
    fn branch_listing_failure_aborts() {
        let err = reconciler(NoBranches).run(false).unwrap_err();
        assert!(matches!(err, SyncError::Branches(_)), "got: {err}");
    }

    #[test]
    fn job_listing_failure_aborts_before_any_write() {
        let err = reconciler(OneBranch).run(false).unwrap_err();
        assert!(matches!(err, SyncError::Jobs(_)), "got: {err}");
        assert!(err.to_string().contains("connection refused"));
    }
}
