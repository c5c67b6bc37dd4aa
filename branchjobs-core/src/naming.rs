//! Branch → job name derivation.
//!
//! ```text
//! refs/remotes/origin/dev/ACME-1!   drop refs/remotes/
//!         origin/dev/ACME-1!        strip remote prefix
//!                dev/ACME-1!        sanitise
//!                dev-ACME-1-        substitute into "Build %s"
//!          Build dev-ACME-1-
//! ```
//!
//! Every step is a pure function, so deriving the job name for the same
//! branch twice always yields the same string. That is what lets a job found
//! on the server be matched back to the branch it was generated for.

use crate::error::ConfigError;
use crate::types::{BranchName, JobName};

/// The placeholder a job name template must contain exactly once.
pub const PLACEHOLDER: &str = "%s";

// ---------------------------------------------------------------------------
// Sanitisation
// ---------------------------------------------------------------------------

/// Replace every maximal run of characters outside `[A-Za-z0-9_-]` with a
/// single `-`.
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('-');
            in_run = true;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// JobNameTemplate
// ---------------------------------------------------------------------------

/// A job name template such as `Build project X %s`, split around its single
/// placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobNameTemplate {
    prefix: String,
    suffix: String,
}

impl JobNameTemplate {
    /// Parse a template. Fails unless it contains exactly one `%s`.
    pub fn parse(template: &str) -> Result<Self, ConfigError> {
        let found = template.matches(PLACEHOLDER).count();
        if found != 1 {
            return Err(ConfigError::InvalidTemplate {
                template: template.to_owned(),
                found,
            });
        }
        let (prefix, suffix) = template
            .split_once(PLACEHOLDER)
            .ok_or_else(|| ConfigError::InvalidTemplate {
                template: template.to_owned(),
                found,
            })?;
        Ok(Self {
            prefix: prefix.to_owned(),
            suffix: suffix.to_owned(),
        })
    }

    /// Substitute an already sanitised branch fragment.
    pub fn render(&self, fragment: &str) -> JobName {
        JobName(format!("{}{}{}", self.prefix, fragment, self.suffix))
    }

    /// Whether `job` could have been produced by [`render`](Self::render).
    pub fn matches(&self, job: &str) -> bool {
        job.len() >= self.prefix.len() + self.suffix.len()
            && job.starts_with(&self.prefix)
            && job.ends_with(&self.suffix)
    }
}

// ---------------------------------------------------------------------------
// JobLayout
// ---------------------------------------------------------------------------

/// Everything needed to go from a branch to the job that builds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLayout {
    pub names: JobNameTemplate,
    /// Remote name prefix stripped before sanitising, e.g. `origin/`.
    pub remote_prefix: String,
    /// The job whose config is copied for every new branch job.
    pub template_job: JobName,
    /// Text inside the template job's config that is replaced by the branch.
    pub branch_placeholder: String,
}

impl JobLayout {
    /// Derive the job name for a branch.
    pub fn job_name(&self, branch: &BranchName) -> JobName {
        let short = branch.short();
        let local = short.strip_prefix(&self.remote_prefix).unwrap_or(short);
        self.names.render(&sanitize(local))
    }

    /// Whether a job on the server is one of ours. The template job is never
    /// a branch job even if its name happens to fit the template.
    pub fn is_branch_job(&self, job: &JobName) -> bool {
        job != &self.template_job && self.names.matches(job.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn layout(template: &str) -> JobLayout {
        JobLayout {
            names: JobNameTemplate::parse(template).expect("template"),
            remote_prefix: "origin/".to_string(),
            template_job: JobName::from("TEMPLATE Build X"),
            branch_placeholder: "BBBBBB".to_string(),
        }
    }

    #[rstest]
    #[case("dev/ACME-123-branch", "dev-ACME-123-branch")]
    #[case("dev/ACME-123-branch!", "dev-ACME-123-branch-")]
    #[case("int/sprint/5", "int-sprint-5")]
    #[case("feature//a b..c", "feature-a-b-c")]
    #[case("Mixed_Case-ok", "Mixed_Case-ok")]
    #[case("übung", "-bung")]
    fn sanitize_collapses_runs(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize(input), expected);
    }

    #[rstest]
    #[case("Build")]
    #[case("Build %s %s")]
    #[case("")]
    fn template_without_single_placeholder_is_rejected(#[case] template: &str) {
        let err = JobNameTemplate::parse(template).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTemplate { .. }), "got: {err}");
    }

    #[test]
    fn branch_with_bang_maps_to_safe_job_name() {
        let layout = layout("Build %s");
        let job = layout.job_name(&BranchName::normalized("origin/dev/ACME-123-branch!"));
        assert_eq!(job.as_str(), "Build dev-ACME-123-branch-");
    }

    #[test]
    fn job_name_is_stable() {
        let layout = layout("Build X %s");
        let branch = BranchName::from("refs/remotes/origin/dev/ACME-123-branch");
        let first = layout.job_name(&branch);
        let second = layout.job_name(&branch);
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "Build X dev-ACME-123-branch");
    }

    #[test]
    fn remote_prefix_only_stripped_at_start() {
        let layout = layout("%s");
        let job = layout.job_name(&BranchName::from("refs/remotes/origin/dev/origin/x"));
        assert_eq!(job.as_str(), "dev-origin-x");
    }

    #[test]
    fn template_with_suffix_matches_rendered_names() {
        let template = JobNameTemplate::parse("Build %s (ci)").unwrap();
        let job = template.render("dev-A-1");
        assert_eq!(job.as_str(), "Build dev-A-1 (ci)");
        assert!(template.matches(job.as_str()));
        assert!(!template.matches("Build dev-A-1"));
        assert!(!template.matches("Deploy dev-A-1 (ci)"));
    }

    #[test]
    fn template_job_is_not_a_branch_job() {
        let mut layout = layout("Build X %s");
        layout.template_job = JobName::from("Build X TEMPLATE");
        assert!(!layout.is_branch_job(&JobName::from("Build X TEMPLATE")));
        assert!(layout.is_branch_job(&JobName::from("Build X dev-A-1")));
        assert!(!layout.is_branch_job(&JobName::from("Other job")));
    }
}
