//! branchjobs core library: domain types, configuration, branch policy.
//!
//! Public API surface:
//! - [`types`]: branch and job newtypes, [`BranchRef`]
//! - [`config`]: [`SyncConfig`] loading, merging and validation
//! - [`filter`]: [`BranchFilter`] age / name / integration policy
//! - [`naming`]: branch → job name derivation
//! - [`source`]: capability traits implemented by the git and Jenkins crates
//! - [`error`]: [`ConfigError`], [`SourceError`], [`WriteError`]

pub mod config;
pub mod error;
pub mod filter;
pub mod naming;
pub mod source;
pub mod types;

pub use config::{SyncConfig, ValidatedConfig};
pub use error::{ConfigError, SourceError, WriteError};
pub use filter::BranchFilter;
pub use naming::{JobLayout, JobNameTemplate};
pub use source::{BranchSource, JobSource, JobWriter};
pub use types::{BranchName, BranchRef, JobName};
