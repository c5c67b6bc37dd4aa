//! # branchjobs-git
//!
//! Remote branch discovery. [`GitRemoteBranches`] implements
//! [`BranchSource`](branchjobs_core::BranchSource) by asking the `git`
//! binary for every ref under `refs/remotes/` together with its commit time.

pub mod remote;

pub use remote::{parse_for_each_ref, GitRemoteBranches};
