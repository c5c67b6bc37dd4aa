//! Job config XML handling.
//!
//! A git-backed Jenkins job stores the branch it builds at
//!
//! ```text
//! <project>
//!   <scm class="hudson.plugins.git.GitSCM">
//!     <branches>
//!       <hudson.plugins.git.BranchSpec>
//!         <name>origin/dev/ACME-123</name>
//! ```
//!
//! A config is only usable when exactly one such `<name>` exists.

use std::fmt;

use roxmltree::{Document, Node};

const SCM: &str = "scm";
const BRANCHES: &str = "branches";
const BRANCH_SPEC: &str = "hudson.plugins.git.BranchSpec";
const NAME: &str = "name";

/// Why a job config did not yield a branch name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobConfigAnomaly {
    /// The config is not well-formed XML.
    Malformed(String),
    /// No branch spec present.
    NoBranch,
    /// More than one branch spec present.
    MultipleBranches(usize),
    /// A branch spec with an empty name.
    EmptyBranch,
}

impl fmt::Display for JobConfigAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobConfigAnomaly::Malformed(e) => write!(f, "config is not valid XML: {e}"),
            JobConfigAnomaly::NoBranch => write!(f, "config has no branch name"),
            JobConfigAnomaly::MultipleBranches(n) => {
                write!(f, "config has {n} branch names, expected exactly one")
            }
            JobConfigAnomaly::EmptyBranch => write!(f, "config has an empty branch name"),
        }
    }
}

/// Extract the single branch name from a job config, or say why not.
pub fn parse_branch_name(config: &str) -> Result<String, JobConfigAnomaly> {
    let doc = Document::parse(config).map_err(|e| JobConfigAnomaly::Malformed(e.to_string()))?;
    let root = doc.root_element();

    let names: Vec<Node<'_, '_>> = root
        .descendants()
        .filter(|n| n.has_tag_name(SCM) && *n != root)
        .flat_map(|scm| children_named(scm, BRANCHES))
        .flat_map(|branches| children_named(branches, BRANCH_SPEC))
        .flat_map(|spec| children_named(spec, NAME))
        .collect();

    match names.as_slice() {
        [] => Err(JobConfigAnomaly::NoBranch),
        [name] => {
            let text = name.text().map(str::trim).unwrap_or_default();
            if text.is_empty() {
                Err(JobConfigAnomaly::EmptyBranch)
            } else {
                Ok(text.to_string())
            }
        }
        many => Err(JobConfigAnomaly::MultipleBranches(many.len())),
    }
}

/// [`parse_branch_name`] without the reason.
pub fn read_branch_name(config: &str) -> Option<String> {
    parse_branch_name(config).ok()
}

fn children_named<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |c| c.has_tag_name(tag))
}

/// Produce a branch job's config from the template job's config by replacing
/// every occurrence of `placeholder` with the (XML-escaped) short ref.
pub fn render_job_config(template: &str, placeholder: &str, short_ref: &str) -> String {
    template.replace(placeholder, &escape_text(short_ref))
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
