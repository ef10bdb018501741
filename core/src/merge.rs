//! Preservation merger
//!
//! Decides, per detail page, whether a freshly rendered page replaces the one
//! on disk or whether the existing page looks hand-enriched and must be kept.
//! Kept pages are either left alone (`skip`) or get a targeted rewrite of the
//! generated fields only (`rewrite`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::fields;
use crate::project::Project;
use crate::render;

/// Decides whether an existing page is hand-enriched.
pub trait PreservationPolicy: fmt::Debug {
    fn should_preserve(&self, existing: &str, candidate: &str) -> bool;
}

/// Preserve when the existing page is more than `ratio` times as long as the
/// candidate, counted in lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineRatioPolicy {
    pub ratio: f64,
}

impl LineRatioPolicy {
    pub fn new(ratio: f64) -> Self {
        Self { ratio }
    }
}

impl PreservationPolicy for LineRatioPolicy {
    fn should_preserve(&self, existing: &str, candidate: &str) -> bool {
        line_count(existing) as f64 > line_count(candidate) as f64 * self.ratio
    }
}

/// Newline count plus one.
pub fn line_count(text: &str) -> usize {
    text.matches('\n').count() + 1
}

/// What happens to a preserved page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Leave the page untouched and adopt its title
    Skip,
    /// Refresh generated fields in place
    #[default]
    Rewrite,
}

impl MergeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Rewrite => "rewrite",
        }
    }

    /// Line ratio used when none is configured.
    pub fn default_ratio(&self) -> f64 {
        match self {
            Self::Skip => 3.0,
            Self::Rewrite => 2.0,
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MergeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "rewrite" => Ok(Self::Rewrite),
            _ => Err(format!("Unknown merge mode: {s}")),
        }
    }
}

/// Result of merging one page.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// Write the candidate page whole
    Replace(String),
    /// Write the existing page with generated fields refreshed
    Rewrite(String),
    /// Page left as is; carries the existing title for the index
    Skip { adopted_title: Option<String> },
    /// The page on disk already has this content
    Unchanged,
}

impl MergeOutcome {
    /// Text to write, if any.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Replace(text) | Self::Rewrite(text) => Some(text),
            Self::Skip { .. } | Self::Unchanged => None,
        }
    }
}

/// Mode plus preservation policy.
#[derive(Debug)]
pub struct Merger {
    mode: MergeMode,
    policy: Box<dyn PreservationPolicy>,
}

impl Merger {
    pub fn new(mode: MergeMode, policy: Box<dyn PreservationPolicy>) -> Self {
        Self { mode, policy }
    }

    /// Line-ratio merger; `ratio` falls back to the mode default.
    pub fn from_mode(mode: MergeMode, ratio: Option<f64>) -> Self {
        let ratio = ratio.unwrap_or_else(|| mode.default_ratio());
        Self::new(mode, Box::new(LineRatioPolicy::new(ratio)))
    }

    pub fn mode(&self) -> MergeMode {
        self.mode
    }

    /// Merge `candidate` for `project` against the page currently on disk.
    pub fn merge(
        &self,
        existing: Option<&str>,
        candidate: &str,
        project: &Project,
        started_year: &str,
    ) -> MergeOutcome {
        let Some(existing) = existing else {
            return MergeOutcome::Replace(candidate.to_string());
        };
        if existing == candidate {
            return MergeOutcome::Unchanged;
        }
        if !self.policy.should_preserve(existing, candidate) {
            return MergeOutcome::Replace(candidate.to_string());
        }

        tracing::debug!(
            slug = %project.slug,
            existing_lines = line_count(existing),
            candidate_lines = line_count(candidate),
            mode = %self.mode,
            "Preserving hand-enriched page"
        );

        match self.mode {
            MergeMode::Skip => MergeOutcome::Skip {
                adopted_title: fields::page_title(existing),
            },
            MergeMode::Rewrite => {
                let rewritten = rewrite_fields(existing, project, started_year);
                if rewritten == existing {
                    MergeOutcome::Unchanged
                } else {
                    MergeOutcome::Rewrite(rewritten)
                }
            }
        }
    }
}

impl Default for Merger {
    fn default() -> Self {
        Self::from_mode(MergeMode::default(), None)
    }
}

/// Refresh the generated fields of an existing page.
///
/// Touches the title line, the first status badge, the Quick Facts block and,
/// when both the page has them and the project carries values, the Roadmap
/// and Current Status blocks. Every other byte is kept.
pub fn rewrite_fields(existing: &str, project: &Project, started_year: &str) -> String {
    let page = match fields::badge_span(existing) {
        Some(span) => {
            let mut out = String::with_capacity(existing.len());
            out.push_str(&existing[..span.start]);
            out.push_str(&render::status_badge(project));
            out.push_str(&existing[span.end..]);
            out
        }
        None => existing.to_string(),
    };

    let mut lines: Vec<String> = page.split('\n').map(str::to_string).collect();

    if let Some(title) = lines.iter_mut().find(|line| line.starts_with("# ")) {
        *title = render::title_line(&project.name);
    }

    replace_block(
        &mut lines,
        render::QUICK_FACTS_HEADING,
        render::quick_facts_block(project, started_year),
    );
    if !project.roadmap.is_empty() {
        replace_block(
            &mut lines,
            render::ROADMAP_HEADING,
            render::roadmap_block(&project.roadmap),
        );
    }
    if !project.current_status.is_empty() {
        replace_block(
            &mut lines,
            render::CURRENT_STATUS_HEADING,
            render::current_status_block(&project.current_status),
        );
    }

    lines.join("\n")
}

/// Replace the lines after `heading` up to the next block boundary. Pages
/// without the heading are left alone.
fn replace_block(lines: &mut Vec<String>, heading: &str, body: Vec<String>) {
    let Some(start) = lines.iter().position(|line| line.trim_end() == heading) else {
        tracing::debug!(heading, "Block not on page");
        return;
    };
    let end = lines[start + 1..]
        .iter()
        .position(|line| is_block_boundary(line))
        .map_or(lines.len(), |offset| start + 1 + offset);
    lines.splice(start + 1..end, body);
}

/// A `---` rule or any ATX heading (`#` through `######`).
fn is_block_boundary(line: &str) -> bool {
    let line = line.trim_end();
    if line == "---" {
        return true;
    }
    let level = line.len() - line.trim_start_matches('#').len();
    (1..=6).contains(&level) && line[level..].starts_with(' ')
}
