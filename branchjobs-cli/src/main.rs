//! branchjobs: keep one Jenkins job per eligible git branch.
//!
//! # Usage
//!
//! ```text
//! branchjobs [--config FILE] --host URL --key PATH --jar PATH --git-repo PATH
//!            --tpl-job NAME --job-name-tpl NAME_WITH_%s --ref-regex REGEX
//!            [--int-ref-regex REGEX] [--max-commit-age DAYS]
//!            [--branch-placeholder TEXT] [--remote-prefix PREFIX] [--java BIN]
//!            [--dry-run] [--json] [-v]
//! ```

mod commands;

use anyhow::Result;
use clap::Parser;

use commands::sync::SyncArgs;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "branchjobs",
    version,
    about = "Create and remove Jenkins branch jobs to match the branches of a git repository",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    sync: SyncArgs,

    /// Log per-branch detail to stderr.
    #[arg(short, long)]
    verbose: bool,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli.sync.run()
}

/// Logs go to stderr; stdout carries the report.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
