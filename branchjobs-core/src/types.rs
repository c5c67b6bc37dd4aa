//! Domain types shared by every branchjobs crate.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Namespace under which git stores remote-tracking branches.
pub const REMOTES_NAMESPACE: &str = "refs/remotes/";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A fully-qualified remote branch ref, e.g. `refs/remotes/origin/dev/FOO-1`.
///
/// Ordering is plain string ordering, which keeps every set of branches
/// iterated in a reproducible order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchName(pub String);

impl BranchName {
    /// Normalise a branch name read back from a job config: a name without
    /// the `refs/remotes/` namespace gets it prepended.
    pub fn normalized(raw: &str) -> Self {
        if raw.starts_with(REMOTES_NAMESPACE) {
            Self(raw.to_owned())
        } else {
            Self(format!("{REMOTES_NAMESPACE}{raw}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The ref without the `refs/remotes/` namespace, e.g. `origin/dev/FOO-1`.
    /// This is the form substituted into job configs.
    pub fn short(&self) -> &str {
        self.0.strip_prefix(REMOTES_NAMESPACE).unwrap_or(&self.0)
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for BranchName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BranchName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A Jenkins job name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobName(pub String);

impl JobName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for JobName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A remote branch as observed at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRef {
    pub name: BranchName,
    /// Object id of the commit the ref points at.
    pub commit_id: String,
    /// Committer timestamp of that commit.
    pub commit_time: DateTime<Utc>,
}

impl BranchRef {
    pub fn new(
        name: impl Into<BranchName>,
        commit_id: impl Into<String>,
        commit_time: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            commit_id: commit_id.into(),
            commit_time,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
