//! The reconciliation pass: read settings, snapshot both sides, apply, report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use branchjobs_core::{BranchName, SyncConfig};
use branchjobs_git::GitRemoteBranches;
use branchjobs_jenkins::JenkinsCli;
use branchjobs_sync::{ItemResult, ItemStatus, Reconciler, Summary, SyncReport};

/// Connection, naming and filtering settings. Every flag may instead come
/// from the `--config` file; flags win.
#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// YAML file with default settings.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Jenkins URL.
    #[arg(long, value_name = "URL")]
    pub host: Option<String>,

    /// Private SSH key used to authenticate with Jenkins.
    #[arg(long, value_name = "PATH")]
    pub key: Option<PathBuf>,

    /// Path to jenkins-cli.jar.
    #[arg(long, value_name = "PATH")]
    pub jar: Option<PathBuf>,

    /// Local clone whose remote-tracking branches are examined.
    #[arg(long, value_name = "PATH")]
    pub git_repo: Option<PathBuf>,

    /// Job whose config every new branch job is copied from.
    #[arg(long, value_name = "NAME")]
    pub tpl_job: Option<String>,

    /// Branch job name with one `%s` for the branch, e.g. "Build X %s".
    #[arg(long, value_name = "NAME_WITH_%s")]
    pub job_name_tpl: Option<String>,

    /// Branches to build, matched at the start of the full ref name.
    #[arg(long, value_name = "REGEX")]
    pub ref_regex: Option<String>,

    /// Integration branches; only the newest matching one keeps a job.
    #[arg(long, value_name = "REGEX")]
    pub int_ref_regex: Option<String>,

    /// Ignore branches whose last commit is older than this (1-1000, default 30).
    #[arg(long, value_name = "DAYS")]
    pub max_commit_age: Option<u32>,

    /// Text in the template config replaced by the branch name.
    #[arg(long, value_name = "TEXT")]
    pub branch_placeholder: Option<String>,

    /// Remote name prefix dropped from job names (default "origin/").
    #[arg(long, value_name = "PREFIX")]
    pub remote_prefix: Option<String>,

    /// Java launcher used to run the CLI jar.
    #[arg(long, value_name = "BIN")]
    pub java: Option<PathBuf>,

    /// Print the plan without creating or removing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let base = match &self.config {
            Some(path) => SyncConfig::load_at(path)
                .with_context(|| format!("failed to load config file {}", path.display()))?,
            None => SyncConfig::default(),
        };
        let (dry_run, json) = (self.dry_run, self.json);
        let config = base
            .merge(self.into_overrides())
            .validate()
            .context("invalid configuration")?;
        tracing::debug!(
            "reconciling {} against {}",
            config.git_repo.display(),
            config.host
        );

        let branches = GitRemoteBranches::new(&config.git_repo);
        let jenkins = JenkinsCli::new(
            config.host.clone(),
            config.cli_jar.clone(),
            config.ssh_key.clone(),
        )
        .with_java(&config.java);
        let reconciler = Reconciler::from_config(&config, branches, jenkins);

        let report = reconciler.run(dry_run).context("reconciliation aborted")?;
        if json {
            print_json(&report)?;
        } else {
            print_human(&report);
        }
        Ok(())
    }

    fn into_overrides(self) -> SyncConfig {
        SyncConfig {
            host: self.host,
            ssh_key: self.key,
            cli_jar: self.jar,
            git_repo: self.git_repo,
            template_job: self.tpl_job,
            job_name_template: self.job_name_tpl,
            ref_regex: self.ref_regex,
            integration_ref_regex: self.int_ref_regex,
            max_commit_age_days: self.max_commit_age,
            branch_placeholder: self.branch_placeholder,
            remote_prefix: self.remote_prefix,
            java: self.java,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct JsonOutput<'a> {
    #[serde(flatten)]
    report: &'a SyncReport,
    summary: Summary,
}

fn print_json(report: &SyncReport) -> Result<()> {
    let payload = JsonOutput {
        report,
        summary: report.summary(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize report")?
    );
    Ok(())
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "action")]
    action: String,
    #[tabled(rename = "job")]
    job: String,
    #[tabled(rename = "branch")]
    branch: String,
    #[tabled(rename = "result")]
    result: String,
}

impl From<&ItemResult> for ItemRow {
    fn from(item: &ItemResult) -> Self {
        let result = match &item.status {
            ItemStatus::Done => "done".to_string(),
            ItemStatus::Planned => "planned".to_string(),
            ItemStatus::Warning { reason } => format!("warning: {reason}"),
            ItemStatus::Failed { error } => format!("failed: {error}"),
        };
        ItemRow {
            action: item.action.to_string(),
            job: item.job.to_string(),
            branch: item.branch.short().to_string(),
            result,
        }
    }
}

fn print_human(report: &SyncReport) {
    print_branches("Found these branches in the repository", &report.branches);
    print_branches("Found these branches configured in Jenkins", &report.configured);
    for anomaly in &report.anomalies {
        println!(
            "  {} skipped job '{}': {}",
            "!".yellow(),
            anomaly.job,
            anomaly.reason
        );
    }

    print_plan_section("Remove these", "No branch jobs to remove.", &report.plan.to_remove);
    print_plan_section("Create these", "No branch jobs to create.", &report.plan.to_create);

    if !report.items.is_empty() {
        let rows: Vec<ItemRow> = report.items.iter().map(ItemRow::from).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    let summary = report.summary();
    let failed: Vec<&ItemResult> = report.failures().collect();
    if failed.is_empty() {
        println!("{} {summary}", "✓".green());
        return;
    }
    println!("{} {summary}", "✗".red());
    for item in failed {
        if let ItemStatus::Failed { error } = &item.status {
            println!("  {} {} '{}': {error}", "✗".red(), item.action, item.job);
        }
    }
}

fn print_branches<'a>(heading: &str, branches: impl IntoIterator<Item = &'a BranchName>) {
    println!("{}:", heading.bold());
    for branch in branches {
        println!("  {}", branch.short());
    }
}

fn print_plan_section<'a>(
    heading: &str,
    empty: &str,
    branches: impl IntoIterator<Item = &'a BranchName>,
) {
    let mut branches = branches.into_iter().peekable();
    if branches.peek().is_none() {
        println!("{empty}");
        return;
    }
    println!("{}:", heading.bold());
    for branch in branches {
        println!("  {}", branch.short());
    }
}
