//! Run configuration.
//!
//! Settings come from two layers, merged field by field:
//!
//! ```text
//! command-line flags  >  YAML config file (--config)  >  built-in defaults
//! ```
//!
//! [`SyncConfig`] is the raw, all-optional form both layers deserialize into.
//! [`SyncConfig::validate`] turns it into a [`ValidatedConfig`] or fails with
//! a [`ConfigError`]; nothing talks to git or Jenkins before that succeeds.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::filter::{BranchFilter, DEFAULT_MAX_AGE_DAYS};
use crate::naming::{JobLayout, JobNameTemplate};
use crate::types::JobName;

pub const DEFAULT_BRANCH_PLACEHOLDER: &str = "BBBBBBBBBB";
pub const DEFAULT_REMOTE_PREFIX: &str = "origin/";
pub const DEFAULT_JAVA: &str = "java";

/// Raw settings as supplied by the user. Every field is optional so that a
/// config file and the command line can each provide a subset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Jenkins base URL.
    pub host: Option<String>,
    /// Private key used by the Jenkins CLI to authenticate.
    pub ssh_key: Option<PathBuf>,
    /// Path to `jenkins-cli.jar`.
    pub cli_jar: Option<PathBuf>,
    /// Repository whose remote-tracking branches are inspected.
    pub git_repo: Option<PathBuf>,
    /// Job whose config is copied for every branch job.
    pub template_job: Option<String>,
    /// Branch job name, with one `%s` for the sanitised branch.
    pub job_name_template: Option<String>,
    /// Branches (full ref names) to build.
    pub ref_regex: Option<String>,
    /// Integration branches of which only the newest gets a job.
    pub integration_ref_regex: Option<String>,
    pub max_commit_age_days: Option<u32>,
    pub branch_placeholder: Option<String>,
    pub remote_prefix: Option<String>,
    pub java: Option<PathBuf>,
}

impl SyncConfig {
    /// Load a YAML config file.
    pub fn load_at(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Layer `overrides` on top of `self`; any field set in `overrides` wins.
    pub fn merge(self, overrides: SyncConfig) -> SyncConfig {
        SyncConfig {
            host: overrides.host.or(self.host),
            ssh_key: overrides.ssh_key.or(self.ssh_key),
            cli_jar: overrides.cli_jar.or(self.cli_jar),
            git_repo: overrides.git_repo.or(self.git_repo),
            template_job: overrides.template_job.or(self.template_job),
            job_name_template: overrides.job_name_template.or(self.job_name_template),
            ref_regex: overrides.ref_regex.or(self.ref_regex),
            integration_ref_regex: overrides.integration_ref_regex.or(self.integration_ref_regex),
            max_commit_age_days: overrides.max_commit_age_days.or(self.max_commit_age_days),
            branch_placeholder: overrides.branch_placeholder.or(self.branch_placeholder),
            remote_prefix: overrides.remote_prefix.or(self.remote_prefix),
            java: overrides.java.or(self.java),
        }
    }

    /// Check every setting and compile patterns/templates.
    ///
    /// Checks run in a fixed order (required fields, ssh key, CLI jar, git
    /// repo, job name template, patterns and age, placeholder) so the first
    /// problem reported is predictable.
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        let host = self.host.ok_or(ConfigError::Missing("host"))?;
        let ssh_key = self.ssh_key.ok_or(ConfigError::Missing("ssh key"))?;
        let cli_jar = self.cli_jar.ok_or(ConfigError::Missing("cli jar"))?;
        let git_repo = self.git_repo.ok_or(ConfigError::Missing("git repo"))?;
        let template_job = self.template_job.ok_or(ConfigError::Missing("template job"))?;
        let job_name_template = self
            .job_name_template
            .ok_or(ConfigError::Missing("job name template"))?;
        let ref_regex = self.ref_regex.ok_or(ConfigError::Missing("ref regex"))?;

        require_file("ssh key", &ssh_key)?;
        require_file("CLI jar", &cli_jar)?;
        if !git_repo.exists() {
            return Err(ConfigError::FileNotFound {
                what: "git repository",
                path: git_repo,
            });
        }

        let names = JobNameTemplate::parse(&job_name_template)?;
        let filter = BranchFilter::new(
            &ref_regex,
            self.max_commit_age_days.unwrap_or(DEFAULT_MAX_AGE_DAYS),
            self.integration_ref_regex.as_deref(),
        )?;

        let branch_placeholder = self
            .branch_placeholder
            .unwrap_or_else(|| DEFAULT_BRANCH_PLACEHOLDER.to_string());
        if branch_placeholder.is_empty() {
            return Err(ConfigError::EmptyPlaceholder);
        }

        Ok(ValidatedConfig {
            host,
            ssh_key,
            cli_jar,
            java: self.java.unwrap_or_else(|| PathBuf::from(DEFAULT_JAVA)),
            git_repo,
            layout: JobLayout {
                names,
                remote_prefix: self
                    .remote_prefix
                    .unwrap_or_else(|| DEFAULT_REMOTE_PREFIX.to_string()),
                template_job: JobName::from(template_job),
                branch_placeholder,
            },
            filter,
        })
    }
}

fn require_file(what: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ConfigError::FileNotFound {
            what,
            path: path.to_path_buf(),
        })
    }
}

/// Settings that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub host: String,
    pub ssh_key: PathBuf,
    pub cli_jar: PathBuf,
    pub java: PathBuf,
    pub git_repo: PathBuf,
    pub layout: JobLayout,
    pub filter: BranchFilter,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        config: SyncConfig,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().expect("tempdir");
        let key = dir.path().join("id_rsa");
        let jar = dir.path().join("jenkins-cli.jar");
        let repo = dir.path().join("repo");
        fs::write(&key, "key").unwrap();
        fs::write(&jar, "jar").unwrap();
        fs::create_dir_all(&repo).unwrap();
        let config = SyncConfig {
            host: Some("http://localhost:8080/".into()),
            ssh_key: Some(key),
            cli_jar: Some(jar),
            git_repo: Some(repo),
            template_job: Some("TEMPLATE Build X".into()),
            job_name_template: Some("Build X %s".into()),
            ref_regex: Some("^refs/remotes/origin/dev/".into()),
            ..SyncConfig::default()
        };
        Fixture { _dir: dir, config }
    }

    #[test]
    fn valid_config_applies_defaults() {
        let f = fixture();
        let validated = f.config.validate().expect("valid");
        assert_eq!(validated.filter.max_age_days(), 30);
        assert_eq!(validated.layout.branch_placeholder, "BBBBBBBBBB");
        assert_eq!(validated.layout.remote_prefix, "origin/");
        assert_eq!(validated.java, PathBuf::from("java"));
        assert_eq!(validated.layout.template_job.as_str(), "TEMPLATE Build X");
    }

    #[test]
    fn missing_required_field_is_reported_by_name() {
        let mut f = fixture();
        f.config.ref_regex = None;
        let err = f.config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ref regex")), "got: {err}");
    }

    #[test]
    fn missing_ssh_key_file_is_rejected() {
        let mut f = fixture();
        f.config.ssh_key = Some(PathBuf::from("/nonexistent/id_rsa"));
        let err = f.config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { what: "ssh key", .. }), "got: {err}");
    }

    #[test]
    fn missing_cli_jar_is_rejected() {
        let mut f = fixture();
        f.config.cli_jar = Some(PathBuf::from("/nonexistent/cli.jar"));
        let err = f.config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { what: "CLI jar", .. }), "got: {err}");
    }

    #[test]
    fn missing_git_repo_is_rejected() {
        let mut f = fixture();
        f.config.git_repo = Some(PathBuf::from("/nonexistent/repo"));
        let err = f.config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { what: "git repository", .. }));
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let mut f = fixture();
        f.config.job_name_template = Some("Build X".into());
        let err = f.config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTemplate { found: 0, .. }), "got: {err}");
    }

    #[test]
    fn out_of_range_age_is_rejected() {
        let mut f = fixture();
        f.config.max_commit_age_days = Some(1001);
        let err = f.config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::AgeOutOfRange(1001)), "got: {err}");
    }

    #[test]
    fn empty_placeholder_is_rejected() {
        let mut f = fixture();
        f.config.branch_placeholder = Some(String::new());
        let err = f.config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPlaceholder), "got: {err}");
    }

    #[test]
    fn command_line_overrides_file() {
        let file = SyncConfig {
            host: Some("http://file/".into()),
            max_commit_age_days: Some(10),
            ..SyncConfig::default()
        };
        let cli = SyncConfig {
            host: Some("http://cli/".into()),
            ..SyncConfig::default()
        };
        let merged = file.merge(cli);
        assert_eq!(merged.host.as_deref(), Some("http://cli/"));
        assert_eq!(merged.max_commit_age_days, Some(10));
    }

    #[test]
    fn load_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("branchjobs.yaml");
        fs::write(
            &path,
            "host: http://jenkins:8080/\n\
             job_name_template: Build X %s\n\
             integration_ref_regex: ^refs/remotes/origin/int/sprint/[0-9]+$\n\
             max_commit_age_days: 42\n",
        )
        .unwrap();
        let config = SyncConfig::load_at(&path).expect("load");
        assert_eq!(config.host.as_deref(), Some("http://jenkins:8080/"));
        assert_eq!(config.job_name_template.as_deref(), Some("Build X %s"));
        assert_eq!(config.max_commit_age_days, Some(42));
        assert!(config.ssh_key.is_none());
    }

    #[test]
    fn load_rejects_unknown_keys_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("branchjobs.yaml");
        fs::write(&path, "hots: typo\n").unwrap();
        let err = SyncConfig::load_at(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }), "got: {err}");
        assert!(err.to_string().contains("branchjobs.yaml"));
    }
}
