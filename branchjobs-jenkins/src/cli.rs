//! Jenkins access through `jenkins-cli.jar`.
//!
//! Every call spawns
//!
//! ```text
//! <java> -jar <cli_jar> -s <host> -i <ssh_key> <command> [job]
//! ```
//!
//! and waits for it. `create-job` receives the config on stdin.

use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use branchjobs_core::{JobName, JobSource, JobWriter, SourceError, WriteError};

/// Handle on a Jenkins server reached through the CLI jar.
#[derive(Debug, Clone)]
pub struct JenkinsCli {
    java: PathBuf,
    cli_jar: PathBuf,
    host: String,
    ssh_key: PathBuf,
}

impl JenkinsCli {
    pub fn new(
        host: impl Into<String>,
        cli_jar: impl Into<PathBuf>,
        ssh_key: impl Into<PathBuf>,
    ) -> Self {
        Self {
            java: PathBuf::from("java"),
            cli_jar: cli_jar.into(),
            host: host.into(),
            ssh_key: ssh_key.into(),
        }
    }

    /// Use a specific java launcher instead of the one on `PATH`.
    pub fn with_java(mut self, java: impl Into<PathBuf>) -> Self {
        self.java = java.into();
        self
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.java);
        cmd.arg("-jar")
            .arg(&self.cli_jar)
            .arg("-s")
            .arg(&self.host)
            .arg("-i")
            .arg(&self.ssh_key)
            .args(args);
        cmd
    }

    fn run(&self, args: &[&str], stdin: Option<&str>) -> std::io::Result<Output> {
        let mut cmd = self.command(args);
        tracing::debug!("jenkins-cli {}", args.join(" "));
        match stdin {
            None => cmd.stdin(Stdio::null()).output(),
            Some(input) => {
                let mut child = cmd
                    .stdin(Stdio::piped())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .spawn()?;
                // The pipe is closed when `pipe` drops, before waiting.
                let written = child
                    .stdin
                    .take()
                    .map(|mut pipe| pipe.write_all(input.as_bytes()));
                let output = child.wait_with_output()?;
                match written {
                    // The CLI may reject a command and exit before reading
                    // stdin. Its exit status and stderr say why.
                    Some(Err(e))
                        if e.kind() != ErrorKind::BrokenPipe && output.status.success() =>
                    {
                        Err(e)
                    }
                    _ => Ok(output),
                }
            }
        }
    }

    fn read(&self, args: &[&str]) -> Result<String, SourceError> {
        let output = self.run(args, None).map_err(|source| SourceError::Spawn {
            program: self.java.display().to_string(),
            source,
        })?;
        if !output.status.success() {
            return Err(SourceError::Command {
                command: args.join(" "),
                status: output.status.to_string(),
                stderr: stderr_of(&output),
            });
        }
        String::from_utf8(output.stdout).map_err(|_| SourceError::Parse {
            command: args.join(" "),
            detail: "output is not valid UTF-8".to_string(),
        })
    }

    fn write(&self, args: &[&str], job: &JobName, stdin: Option<&str>) -> Result<(), WriteError> {
        let output = self.run(args, stdin).map_err(|source| WriteError::Io {
            program: self.java.display().to_string(),
            source,
        })?;
        if output.status.success() {
            return Ok(());
        }
        Err(classify_failure(args.join(" "), job, &output))
    }
}

impl JobSource for JenkinsCli {
    fn list_jobs(&self) -> Result<Vec<JobName>, SourceError> {
        let stdout = self.read(&["list-jobs"])?;
        Ok(parse_job_list(&stdout))
    }

    fn read_job(&self, job: &JobName) -> Result<String, SourceError> {
        self.read(&["get-job", job.as_str()])
    }
}

impl JobWriter for JenkinsCli {
    fn create_job(&self, job: &JobName, config: &str) -> Result<(), WriteError> {
        self.write(&["create-job", job.as_str()], job, Some(config))
    }

    fn enable_job(&self, job: &JobName) -> Result<(), WriteError> {
        self.write(&["enable-job", job.as_str()], job, None)
    }

    fn delete_job(&self, job: &JobName) -> Result<(), WriteError> {
        self.write(&["delete-job", job.as_str()], job, None)
    }
}

/// One job name per non-blank line.
pub fn parse_job_list(stdout: &str) -> Vec<JobName> {
    stdout
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .map(JobName::from)
        .collect()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

/// Map a failed write call onto [`WriteError`], recognising the messages the
/// CLI prints for a job that already exists or does not exist.
fn classify_failure(command: String, job: &JobName, output: &Output) -> WriteError {
    let stderr = stderr_of(output);
    let lower = stderr.to_ascii_lowercase();
    if lower.contains("already exists") {
        WriteError::AlreadyExists(job.to_string())
    } else if lower.contains("no such job") || lower.contains("does not exist") {
        WriteError::NotFound(job.to_string())
    } else {
        WriteError::Remote {
            command,
            status: output.status.to_string(),
            stderr,
        }
    }
}
