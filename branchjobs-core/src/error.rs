//! Error types for branchjobs-core.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration problems. All of these are detected before any git or
/// Jenkins I/O takes place.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting was supplied neither on the command line nor in
    /// the config file.
    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    /// A path setting points at nothing.
    #[error("{what} not found at {path}")]
    FileNotFound { what: &'static str, path: PathBuf },

    /// The job name template must contain exactly one `%s`.
    #[error("job name template '{template}' must contain exactly one %s placeholder (found {found})")]
    InvalidTemplate { template: String, found: usize },

    #[error("invalid {what} '{pattern}': {source}")]
    InvalidRegex {
        what: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("max commit age must be between 1 and 1000 days, got {0}")]
    AgeOutOfRange(u32),

    #[error("branch placeholder must not be empty")]
    EmptyPlaceholder,

    /// Underlying I/O failure while reading the config file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with the file path and serde_yaml line context.
    #[error("failed to parse config at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Failure to take one of the two snapshots (remote branches, configured
/// jobs). Fatal for a reconciliation pass.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The external tool could not be started at all.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external tool ran but reported failure.
    #[error("`{command}` failed ({status}): {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    /// Output was received but could not be understood.
    #[error("unexpected output from `{command}`: {detail}")]
    Parse { command: String, detail: String },
}

/// Failure of a single create / enable / delete call.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The job was already present when we tried to create it.
    #[error("job '{0}' already exists")]
    AlreadyExists(String),

    /// The job was already gone when we tried to delete or enable it.
    #[error("job '{0}' does not exist")]
    NotFound(String),

    /// The remote side rejected the call.
    #[error("`{command}` failed ({status}): {stderr}")]
    Remote {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("I/O error running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl WriteError {
    /// `true` for the two outcomes a concurrent reconciler can cause:
    /// creating a job that appeared meanwhile, or deleting one that vanished.
    pub fn is_race(&self) -> bool {
        matches!(self, WriteError::AlreadyExists(_) | WriteError::NotFound(_))
    }
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn race_errors_are_classified() {
        assert!(WriteError::AlreadyExists("Build x".into()).is_race());
        assert!(WriteError::NotFound("Build x".into()).is_race());
        let remote = WriteError::Remote {
            command: "create-job".into(),
            status: "exit status: 1".into(),
            stderr: "boom".into(),
        };
        assert!(!remote.is_race());
    }

    #[test]
    fn template_error_mentions_placeholder_count() {
        let err = ConfigError::InvalidTemplate {
            template: "Build".into(),
            found: 0,
        };
        let msg = err.to_string();
        assert!(msg.contains("exactly one %s"), "got: {msg}");
        assert!(msg.contains("found 0"), "got: {msg}");
    }
}
