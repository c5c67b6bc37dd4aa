//! `git for-each-ref` backed branch source.

use std::path::PathBuf;
use std::process::Command;

use chrono::{DateTime, Utc};

use branchjobs_core::{types::REMOTES_NAMESPACE, BranchRef, BranchSource, SourceError};

/// `<refname> TAB <objectname> TAB <committer date as "secs tz">`
const FORMAT: &str = "--format=%(refname)%09%(objectname)%09%(committerdate:raw)";

/// Lists remote-tracking branches of a local clone.
#[derive(Debug, Clone)]
pub struct GitRemoteBranches {
    repo: PathBuf,
    git: PathBuf,
}

impl GitRemoteBranches {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self {
            repo: repo.into(),
            git: PathBuf::from("git"),
        }
    }

    /// Use a specific `git` binary instead of the one on `PATH`.
    pub fn with_git(mut self, git: impl Into<PathBuf>) -> Self {
        self.git = git.into();
        self
    }

    fn command_line(&self) -> String {
        format!(
            "{} -C {} for-each-ref {FORMAT} {REMOTES_NAMESPACE}",
            self.git.display(),
            self.repo.display()
        )
    }
}

impl BranchSource for GitRemoteBranches {
    fn list_remote_branches(&self) -> Result<Vec<BranchRef>, SourceError> {
        let output = Command::new(&self.git)
            .arg("-C")
            .arg(&self.repo)
            .args(["for-each-ref", FORMAT, REMOTES_NAMESPACE])
            // Ignore GIT_DIR / GIT_WORK_TREE leaking in from a hook or CI step.
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .output()
            .map_err(|source| SourceError::Spawn {
                program: self.git.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(SourceError::Command {
                command: self.command_line(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| SourceError::Parse {
            command: self.command_line(),
            detail: "output is not valid UTF-8".to_string(),
        })?;
        let branches = parse_for_each_ref(&stdout).map_err(|detail| SourceError::Parse {
            command: self.command_line(),
            detail,
        })?;
        tracing::debug!(
            "found {} remote refs in {}",
            branches.len(),
            self.repo.display()
        );
        Ok(branches)
    }
}

/// Parse the output of `git for-each-ref` run with [`FORMAT`].
///
/// Refs whose target is not a commit (no committer date) are skipped.
pub fn parse_for_each_ref(output: &str) -> Result<Vec<BranchRef>, String> {
    let mut branches = Vec::new();
    for (index, line) in output.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.splitn(3, '\t');
        let (Some(name), Some(commit_id), Some(date)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(format!("line {}: expected 3 tab-separated fields: {line:?}", index + 1));
        };

        let Some(seconds) = date.split_whitespace().next() else {
            tracing::debug!("skipping {name}: not a commit");
            continue;
        };
        let seconds: i64 = seconds
            .parse()
            .map_err(|_| format!("line {}: bad commit timestamp {seconds:?}", index + 1))?;
        let commit_time = DateTime::<Utc>::from_timestamp(seconds, 0)
            .ok_or_else(|| format!("line {}: timestamp {seconds} out of range", index + 1))?;

        branches.push(BranchRef::new(name, commit_id, commit_time));
    }
    Ok(branches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_refs_with_timezone_suffix() {
        let output = "refs/remotes/origin/dev/ACME-1\tdeadbee1234\t1424478767 +0100\n\
                      refs/remotes/origin/int/sprint/5\tdeadbee0001\t1424306000 -0500\n";
        let branches = parse_for_each_ref(output).expect("parse");
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].name.as_str(), "refs/remotes/origin/dev/ACME-1");
        assert_eq!(branches[0].commit_id, "deadbee1234");
        assert_eq!(branches[0].commit_time.timestamp(), 1_424_478_767);
        assert_eq!(branches[1].commit_time.timestamp(), 1_424_306_000);
    }

    #[test]
    fn skips_refs_without_commit_date() {
        let output = "refs/remotes/origin/some-tag\tabc123\t\n";
        let branches = parse_for_each_ref(output).expect("parse");
        assert!(branches.is_empty());
    }

    #[test]
    fn ignores_blank_lines() {
        assert!(parse_for_each_ref("\n\n").unwrap().is_empty());
    }

    #[test]
    fn rejects_truncated_lines() {
        let err = parse_for_each_ref("refs/remotes/origin/x\n").unwrap_err();
        assert!(err.contains("line 1"), "got: {err}");
    }

    #[test]
    fn rejects_non_numeric_timestamp() {
        let err = parse_for_each_ref("refs/remotes/origin/x\tabc\tyesterday +0000\n").unwrap_err();
        assert!(err.contains("bad commit timestamp"), "got: {err}");
    }

    #[test]
    fn missing_git_binary_is_a_spawn_error() {
        let source = GitRemoteBranches::new(".").with_git("/nonexistent/git-binary");
        let err = source.list_remote_branches().unwrap_err();
        assert!(matches!(err, SourceError::Spawn { .. }), "got: {err}");
    }
}
