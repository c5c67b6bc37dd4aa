//! Result of one reconciliation pass.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use branchjobs_core::BranchName;

use crate::apply::{Action, ItemResult, ItemStatus};
use crate::configured::JobAnomaly;
use crate::plan::ReconciliationPlan;

/// Everything a pass observed and did. Serialized as-is for `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub dry_run: bool,
    /// Eligible branches found in the repository.
    pub branches: BTreeSet<BranchName>,
    /// Branches that already had a job before the pass.
    pub configured: BTreeSet<BranchName>,
    pub anomalies: Vec<JobAnomaly>,
    pub plan: ReconciliationPlan,
    pub items: Vec<ItemResult>,
}

impl SyncReport {
    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            dry_run: self.dry_run,
            ..Summary::default()
        };
        for item in &self.items {
            match (&item.status, item.action) {
                (ItemStatus::Done, Action::Create) => summary.created += 1,
                (ItemStatus::Done, Action::Remove) => summary.removed += 1,
                (ItemStatus::Planned, Action::Create) => summary.created += 1,
                (ItemStatus::Planned, Action::Remove) => summary.removed += 1,
                (ItemStatus::Warning { .. }, _) => summary.warnings += 1,
                (ItemStatus::Failed { .. }, _) => summary.failed += 1,
            }
        }
        summary.warnings += self.anomalies.len();
        summary
    }

    /// Items whose write failed.
    pub fn failures(&self) -> impl Iterator<Item = &ItemResult> {
        self.items
            .iter()
            .filter(|i| matches!(i.status, ItemStatus::Failed { .. }))
    }
}

/// Counts for the one-line summary. In a dry run `created` and `removed`
/// count planned writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub dry_run: bool,
    pub created: usize,
    pub removed: usize,
    pub failed: usize,
    pub warnings: usize,
}

impl Summary {
    pub fn has_changes(&self) -> bool {
        self.created + self.removed + self.failed > 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_changes() {
            write!(f, "no changes needed")?;
        } else if self.dry_run {
            write!(
                f,
                "dry run: {} to create, {} to remove",
                self.created, self.removed
            )?;
        } else {
            write!(
                f,
                "{} created, {} removed, {} failed",
                self.created, self.removed, self.failed
            )?;
        }
        match self.warnings {
            0 => Ok(()),
            1 => write!(f, ", 1 warning"),
            n => write!(f, ", {n} warnings"),
        }
    }
}
