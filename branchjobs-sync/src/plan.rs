//! Pure set arithmetic between eligible and configured branches.

use std::collections::BTreeSet;

use serde::Serialize;

use branchjobs_core::BranchName;

/// What a pass intends to do. Both sets iterate in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationPlan {
    /// Eligible branches without a job.
    pub to_create: BTreeSet<BranchName>,
    /// Branches with a job that are no longer eligible.
    pub to_remove: BTreeSet<BranchName>,
}

impl ReconciliationPlan {
    /// `true` when the pass has nothing to write.
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_remove.is_empty()
    }
}

/// `to_create = eligible − configured`, `to_remove = configured − eligible`.
/// Branches in both sets are left alone.
pub fn plan(
    eligible: &BTreeSet<BranchName>,
    configured: &BTreeSet<BranchName>,
) -> ReconciliationPlan {
    ReconciliationPlan {
        to_create: eligible.difference(configured).cloned().collect(),
        to_remove: configured.difference(eligible).cloned().collect(),
    }
}
