//! Capability traits for the three external collaborators.
//!
//! The reconciler only talks to git and Jenkins through these, so tests can
//! hand it in-memory fakes. All calls are blocking.

use crate::error::{SourceError, WriteError};
use crate::types::{BranchRef, JobName};

/// Lists remote-tracking branches with their last commit time.
pub trait BranchSource {
    fn list_remote_branches(&self) -> Result<Vec<BranchRef>, SourceError>;
}

/// Read access to the CI server's jobs.
pub trait JobSource {
    /// Names of every job on the server.
    fn list_jobs(&self) -> Result<Vec<JobName>, SourceError>;

    /// Raw XML config of one job.
    fn read_job(&self, job: &JobName) -> Result<String, SourceError>;
}

/// Write access to the CI server's jobs. Each call is an isolated unit of work.
pub trait JobWriter {
    fn create_job(&self, job: &JobName, config: &str) -> Result<(), WriteError>;
    fn enable_job(&self, job: &JobName) -> Result<(), WriteError>;
    fn delete_job(&self, job: &JobName) -> Result<(), WriteError>;
}

impl<T: BranchSource + ?Sized> BranchSource for &T {
    fn list_remote_branches(&self) -> Result<Vec<BranchRef>, SourceError> {
        (**self).list_remote_branches()
    }
}

impl<T: JobSource + ?Sized> JobSource for &T {
    fn list_jobs(&self) -> Result<Vec<JobName>, SourceError> {
        (**self).list_jobs()
    }

    fn read_job(&self, job: &JobName) -> Result<String, SourceError> {
        (**self).read_job(job)
    }
}

impl<T: JobWriter + ?Sized> JobWriter for &T {
    fn create_job(&self, job: &JobName, config: &str) -> Result<(), WriteError> {
        (**self).create_job(job, config)
    }

    fn enable_job(&self, job: &JobName) -> Result<(), WriteError> {
        (**self).enable_job(job)
    }

    fn delete_job(&self, job: &JobName) -> Result<(), WriteError> {
        (**self).delete_job(job)
    }
}
