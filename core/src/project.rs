//! Canonical project entity
//!
//! One `Project` is built per discovered planning directory (or legacy page),
//! tagged once by the categorizer, and then only read by the renderers.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::categorize::Category;
use crate::sections::SectionMap;

/// Renames applied to every derived slug so renamed or duplicated projects
/// collapse onto one page.
pub const DEFAULT_SLUG_RENAMES: &[(&str, &str)] = &[("multi-agent-assistant", "multi-agent")];

/// Lifecycle status shown on the badge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Planning,
    Complete,
}

impl Status {
    /// Lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Planning => "planning",
            Self::Complete => "complete",
        }
    }

    /// Capitalized label used when no status detail exists
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Planning => "Planning",
            Self::Complete => "Complete",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a project's data came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum Origin {
    /// A project directory with planning documents
    Planning(PathBuf),
    /// A previously rendered page with no source directory
    Legacy(PathBuf),
}

impl Origin {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Planning(path) | Self::Legacy(path) => path,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }
}

/// A portfolio project assembled from its planning documents
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    /// Human-readable title, never empty
    pub name: String,
    /// Stable identifier used for the page filename
    pub slug: String,
    /// Index grouping, assigned by the categorizer
    pub category: Category,
    pub status: Status,
    /// Progress annotation such as `Phase 3/7 (42%)`
    pub status_detail: Option<String>,
    /// Technologies in discovery order
    pub stack: Vec<String>,
    /// Every section of the primary document
    #[serde(skip)]
    pub sections: SectionMap,
    /// Latest activity note; empty means none
    pub current_status: String,
    /// Upcoming milestones, at most three
    pub roadmap: Vec<String>,
    pub origin: Origin,
}

impl Project {
    /// Create a project with default status and no extracted fields.
    pub fn new(name: impl Into<String>, slug: impl Into<String>, origin: Origin) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            category: Category::Other,
            status: Status::default(),
            status_detail: None,
            stack: Vec::new(),
            sections: SectionMap::new(),
            current_status: String::new(),
            roadmap: Vec::new(),
            origin,
        }
    }

    /// Text for the fact table Status row.
    pub fn status_text(&self) -> String {
        self.status_detail
            .clone()
            .unwrap_or_else(|| self.status.label().to_string())
    }
}

/// Ordered old → new slug table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugRenames {
    renames: BTreeMap<String, String>,
}

impl Default for SlugRenames {
    fn default() -> Self {
        Self {
            renames: DEFAULT_SLUG_RENAMES
                .iter()
                .map(|(old, new)| (old.to_string(), new.to_string()))
                .collect(),
        }
    }
}

impl SlugRenames {
    /// Built-in renames extended (and overridden) by `extra`.
    pub fn with_extra<'a>(extra: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        let mut table = Self::default();
        for (old, new) in extra {
            table.renames.insert(old.clone(), new.clone());
        }
        table
    }

    pub fn resolve<'a>(&'a self, slug: &'a str) -> &'a str {
        self.renames.get(slug).map_or(slug, String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.renames
            .iter()
            .map(|(old, new)| (old.as_str(), new.as_str()))
    }
}

/// Filesystem-safe slug for a directory or file name.
///
/// Lowercases, turns whitespace and underscores into hyphens, then applies
/// the rename table.
pub fn slugify(entry_name: &str, renames: &SlugRenames) -> String {
    let base: String = entry_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '_' {
                '-'
            } else {
                c
            }
        })
        .collect::<String>()
        .to_lowercase();
    renames.resolve(&base).to_string()
}
