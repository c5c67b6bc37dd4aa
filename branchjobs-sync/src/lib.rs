//! # branchjobs-sync
//!
//! The reconciliation pass: snapshot both sides, diff, apply.
//!
//! Call [`Reconciler::run`] for a full pass, or use [`plan`] / [`apply`]
//! directly when the snapshots are already at hand.

pub mod apply;
pub mod configured;
pub mod error;
pub mod pipeline;
pub mod plan;
pub mod report;

pub use apply::{apply, preview, Action, ItemResult, ItemStatus};
pub use configured::{collect_configured, ConfiguredBranches, JobAnomaly};
pub use error::SyncError;
pub use pipeline::Reconciler;
pub use plan::{plan, ReconciliationPlan};
pub use report::{Summary, SyncReport};
