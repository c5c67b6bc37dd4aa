//! Branch eligibility policy.
//!
//! A branch is eligible when, in order:
//! 1. its full ref name matches the name pattern,
//! 2. its last commit is no older than `max_age_days` (inclusive bound),
//! 3. if an integration pattern is configured and the branch matches it, no
//!    higher-sorting integration branch survived steps 1 and 2.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;

use crate::error::ConfigError;
use crate::types::{BranchName, BranchRef};

/// Smallest and largest accepted `max_age_days`.
pub const MIN_AGE_DAYS: u32 = 1;
pub const MAX_AGE_DAYS: u32 = 1000;
pub const DEFAULT_MAX_AGE_DAYS: u32 = 30;

/// Compiled branch policy. Construct with [`BranchFilter::new`], which
/// rejects malformed patterns and out-of-range ages up front.
#[derive(Debug, Clone)]
pub struct BranchFilter {
    name_pattern: Regex,
    max_age_days: u32,
    integration_pattern: Option<Regex>,
}

impl BranchFilter {
    pub fn new(
        name_pattern: &str,
        max_age_days: u32,
        integration_pattern: Option<&str>,
    ) -> Result<Self, ConfigError> {
        if !(MIN_AGE_DAYS..=MAX_AGE_DAYS).contains(&max_age_days) {
            return Err(ConfigError::AgeOutOfRange(max_age_days));
        }
        let name_pattern = compile_anchored("ref regex", name_pattern)?;
        let integration_pattern = integration_pattern
            .map(|p| compile_anchored("integration ref regex", p))
            .transpose()?;
        Ok(Self {
            name_pattern,
            max_age_days,
            integration_pattern,
        })
    }

    pub fn max_age_days(&self) -> u32 {
        self.max_age_days
    }

    /// Filter against the current wall clock.
    pub fn filter(&self, branches: &[BranchRef]) -> BTreeSet<BranchName> {
        self.filter_at(branches, Utc::now())
    }

    /// Filter against an explicit `now`.
    pub fn filter_at(&self, branches: &[BranchRef], now: DateTime<Utc>) -> BTreeSet<BranchName> {
        let cutoff = now - Duration::days(i64::from(self.max_age_days));

        let mut eligible: Vec<&BranchRef> = branches
            .iter()
            .filter(|b| self.name_pattern.is_match(b.name.as_str()))
            .filter(|b| {
                let fresh = b.commit_time >= cutoff;
                if !fresh {
                    tracing::debug!(
                        "ignoring {}: last commit {} is older than {} days",
                        b.name,
                        b.commit_time,
                        self.max_age_days
                    );
                }
                fresh
            })
            .collect();

        if let Some(integration) = &self.integration_pattern {
            // Newest integration branch first; everything after it is dropped.
            eligible.sort_by(|a, b| natural_cmp(b.name.as_str(), a.name.as_str()));
            let mut kept_integration = false;
            eligible.retain(|b| {
                if !integration.is_match(b.name.as_str()) {
                    return true;
                }
                if kept_integration {
                    tracing::debug!("ignoring {}: superseded integration branch", b.name);
                    return false;
                }
                kept_integration = true;
                true
            });
        }

        eligible.into_iter().map(|b| b.name.clone()).collect()
    }
}

/// Compile a pattern anchored at the start of the ref name. Every
/// alternative is anchored; a leading `^` in the pattern is redundant.
pub fn compile_anchored(what: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(&format!("^(?:{pattern})")).map_err(|source| ConfigError::InvalidRegex {
        what,
        pattern: pattern.to_owned(),
        source,
    })
}

/// Compare two strings treating runs of ASCII digits as numbers, so that
/// `sprint/10` sorts after `sprint/9`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let left = take_digits(&mut a);
                let right = take_digits(&mut b);
                let ord = cmp_digit_runs(&left, &right);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
        run.push(c);
    }
    run
}

// Digit runs of any length compare by value without overflow: strip leading
// zeros, then longer is larger, then lexicographic.
fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        .then_with(|| a.len().cmp(&b.len()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
