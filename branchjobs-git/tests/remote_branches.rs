//! Drives a real `git` against a scratch repository.

use std::path::Path;
use std::process::Command;

use branchjobs_core::{BranchSource, SourceError};
use branchjobs_git::GitRemoteBranches;
use tempfile::TempDir;

fn run_git(repo: &Path, args: &[&str], committer_date: Option<&str>) -> String {
    let mut cmd = Command::new("git");
    cmd.args(["-c", "user.name=test-user", "-c", "user.email=test@example.com"])
        .args(args)
        .current_dir(repo)
        .env_remove("GIT_DIR")
        .env_remove("GIT_WORK_TREE");
    if let Some(date) = committer_date {
        cmd.env("GIT_COMMITTER_DATE", date).env("GIT_AUTHOR_DATE", date);
    }
    let output = cmd.output().expect("run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn commit(repo: &Path, message: &str, date: &str) -> String {
    run_git(repo, &["commit", "--allow-empty", "-m", message], Some(date));
    run_git(repo, &["rev-parse", "HEAD"], None)
}

#[test]
fn lists_remote_refs_with_commit_times() {
    let dir = TempDir::new().expect("tempdir");
    let repo = dir.path();
    run_git(repo, &["init", "-q"], None);

    let old = commit(repo, "old", "1000000000 +0000");
    let new = commit(repo, "new", "1424478767 +0100");
    run_git(repo, &["update-ref", "refs/remotes/origin/dev/ACME-1", &new], None);
    run_git(repo, &["update-ref", "refs/remotes/origin/dev/ACME-0-old", &old], None);
    // Local branches are not part of the remote namespace.
    run_git(repo, &["branch", "local-only"], None);

    let mut branches = GitRemoteBranches::new(repo)
        .list_remote_branches()
        .expect("list");
    branches.sort_by(|a, b| a.name.cmp(&b.name));

    let names: Vec<_> = branches.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "refs/remotes/origin/dev/ACME-0-old",
            "refs/remotes/origin/dev/ACME-1",
        ]
    );
    assert_eq!(branches[0].commit_id, old);
    assert_eq!(branches[0].commit_time.timestamp(), 1_000_000_000);
    assert_eq!(branches[1].commit_id, new);
    assert_eq!(branches[1].commit_time.timestamp(), 1_424_478_767);
}

#[test]
fn empty_repository_has_no_remote_branches() {
    let dir = TempDir::new().expect("tempdir");
    run_git(dir.path(), &["init", "-q"], None);
    let branches = GitRemoteBranches::new(dir.path())
        .list_remote_branches()
        .expect("list");
    assert!(branches.is_empty());
}

#[test]
fn non_repository_is_a_command_error() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("not-a-repo");
    std::fs::create_dir_all(&missing).unwrap();
    // Point GIT_CEILING_DIRECTORIES at the temp dir so git cannot discover a
    // parent repository.
    let source = GitRemoteBranches::new(&missing);
    std::env::set_var("GIT_CEILING_DIRECTORIES", dir.path());
    let err = source.list_remote_branches().unwrap_err();
    std::env::remove_var("GIT_CEILING_DIRECTORIES");
    assert!(matches!(err, SourceError::Command { .. }), "got: {err}");
}
