//! Error types for branchjobs-sync.

use thiserror::Error;

use branchjobs_core::SourceError;

/// Errors that abort a reconciliation pass. Per-job write failures are not
/// errors at this level; they are collected in the
/// [`SyncReport`](crate::SyncReport).
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("cannot list remote branches: {0}")]
    Branches(#[source] SourceError),

    #[error("cannot list configured jobs: {0}")]
    Jobs(#[source] SourceError),
}
