//! Run report
//!
//! Everything a sync run did, in a serializable shape so the CLI can print it
//! as text or JSON and tests can assert on it.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// A non-fatal event during assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A second directory produced an already-seen slug; it was dropped
    DuplicateSlug {
        slug: String,
        kept: PathBuf,
        dropped: PathBuf,
    },
    /// A legacy page carries the name of a discovered project; it was skipped
    DuplicateName { name: String, page: PathBuf },
    /// A legacy page has no `# ` title and cannot be ingested
    UntitledPage { page: PathBuf },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateSlug {
                slug,
                kept,
                dropped,
            } => write!(
                f,
                "duplicate slug '{slug}': kept {}, dropped {}",
                kept.display(),
                dropped.display()
            ),
            Self::DuplicateName { name, page } => {
                write!(f, "legacy page {} duplicates project '{name}'", page.display())
            }
            Self::UntitledPage { page } => {
                write!(f, "legacy page {} has no title", page.display())
            }
        }
    }
}

/// A page or index that could not be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub error: String,
}

/// One project's entry in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    pub slug: String,
    pub category: String,
    pub legacy: bool,
}

/// Outcome of a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Projects in the index, sorted by name
    pub projects: Vec<ProjectSummary>,
    /// Pages written whole (new or replaced)
    pub written: Vec<PathBuf>,
    /// Hand-enriched pages with generated fields refreshed
    pub rewritten: Vec<PathBuf>,
    /// Hand-enriched pages left untouched
    pub preserved: Vec<PathBuf>,
    /// Pages already up to date
    pub unchanged: Vec<PathBuf>,
    /// The index page, if it was written or already current
    pub index: Option<PathBuf>,
    pub failures: Vec<WriteFailure>,
    pub diagnostics: Vec<Diagnostic>,
}

impl SyncReport {
    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn legacy_count(&self) -> usize {
        self.projects.iter().filter(|p| p.legacy).count()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
