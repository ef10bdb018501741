//! Field parsers for planning documents and previously rendered pages
//!
//! Each parser is an independent pure function from text to an optional
//! value. A pattern that does not match is a missing field, never an error.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::sections::SectionMap;

/// Status detail forced by a completion signal.
pub const PRODUCTION_READY: &str = "Production Ready";

/// Literal phrase in a roadmap that marks the whole project as finished.
pub const COMPLETION_PHRASE: &str = "All phases complete";

/// Upcoming milestones kept per project.
pub const MAX_ROADMAP_ITEMS: usize = 3;

/// Heading of the primary-document section that carries the stack.
pub const CONSTRAINTS_SECTION: &str = "Constraints";

/// Heading of the secondary-document section that carries phase progress.
pub const POSITION_SECTION: &str = "Current Position";

static TECH_STACK_BOLD: Lazy<Regex> = Lazy::new(|| pattern(r"\*\*Tech Stack[:\-]?\*\*:?\s*(.+)"));

static TECH_STACK_PLAIN: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"(?im)^[ \t]*(?:[-*][ \t]+)?(?:tech(?:nology)? stack|stack|languages?)[ \t]*:[ \t]*(.+)$",
    )
});

static PHASE: Lazy<Regex> = Lazy::new(|| pattern(r"Phase:\s*(\d+)\s*of\s*(\d+)"));

static PROGRESS: Lazy<Regex> = Lazy::new(|| pattern(r"Progress:.*?(\d+)%"));

static LAST_ACTIVITY: Lazy<Regex> = Lazy::new(|| pattern(r"\*\*Last activity:\*\*[ \t]*(.+)"));

static FULL_PROGRESS: Lazy<Regex> = Lazy::new(|| pattern(r"(?:^|[^0-9.])100%"));

static MILESTONE: Lazy<Regex> = Lazy::new(|| {
    pattern(r"(?m)^[ \t]*[-*][ \t]+(?:\[([ xX])\][ \t]+)?\*\*(.+?)\*\*(.*)$")
});

static TITLE: Lazy<Regex> = Lazy::new(|| pattern(r"(?m)^#[ \t]+(.+)$"));

static TITLE_PREFIX: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)^project:\s*"));

static TITLE_QUALIFIER: Lazy<Regex> = Lazy::new(|| pattern(r"\s*\([^)]+\)$"));

static BADGE: Lazy<Regex> =
    Lazy::new(|| pattern(r#"<span class="status-badge\s*([^"]*)"[^>]*>(.*?)</span>"#));

static LANGUAGE_CELL: Lazy<Regex> =
    Lazy::new(|| pattern(r"\|\s*\*\*Language\*\*\s*\|\s*(.*?)\s*\|"));

#[allow(clippy::expect_used)]
fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("valid field pattern")
}

// ─────────────────────────────────────────────────────────────────────────────
// Planning documents
// ─────────────────────────────────────────────────────────────────────────────

/// Tech stack from the body of a Constraints section.
///
/// Tries the bold `**Tech Stack:**` field first, then a plain labeled line.
/// Only the first line of the value is used; tokens are split on `,` or `;`.
pub fn tech_stack(constraints: &str) -> Option<Vec<String>> {
    [&*TECH_STACK_BOLD, &*TECH_STACK_PLAIN]
        .into_iter()
        .find_map(|re| re.captures(constraints))
        .and_then(|caps| caps.get(1))
        .map(|value| split_list(first_line(value.as_str()), &[',', ';']))
        .filter(|stack| !stack.is_empty())
}

/// `Phase X/Y` or `Phase X/Y (Z%)` from a Current Position section.
pub fn phase_progress(position: &str) -> Option<String> {
    let phase = PHASE.captures(position)?;
    let current = phase.get(1)?.as_str();
    let total = phase.get(2)?.as_str();

    match PROGRESS.captures(position).and_then(|caps| caps.get(1)) {
        Some(percent) => Some(format!("Phase {current}/{total} ({}%)", percent.as_str())),
        None => Some(format!("Phase {current}/{total}")),
    }
}

/// First `**Last activity:**` note anywhere in a state document.
pub fn last_activity(state: &str) -> Option<String> {
    LAST_ACTIVITY
        .captures(state)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|note| !note.is_empty())
}

/// Whether a roadmap declares the project finished.
pub fn is_complete(roadmap: &str) -> bool {
    roadmap.contains(COMPLETION_PHRASE) || FULL_PROGRESS.is_match(roadmap)
}

/// Up to [`MAX_ROADMAP_ITEMS`] upcoming milestones, in source order.
///
/// Matches bulleted lines whose text opens with a bold title. Checked task
/// items are finished work and are skipped.
pub fn roadmap_milestones(roadmap: &str) -> Vec<String> {
    MILESTONE
        .captures_iter(roadmap)
        .filter(|caps| {
            !caps
                .get(1)
                .is_some_and(|mark| mark.as_str().eq_ignore_ascii_case("x"))
        })
        .filter_map(|caps| {
            let title = caps.get(2)?.as_str().trim().trim_end_matches(':').trim();
            if title.is_empty() {
                return None;
            }
            let note = caps
                .get(3)
                .map(|m| {
                    m.as_str()
                        .trim()
                        .trim_start_matches([':', '-', '–', '—'])
                        .trim()
                })
                .unwrap_or_default();
            Some(if note.is_empty() {
                title.to_string()
            } else {
                format!("{title}: {note}")
            })
        })
        .take(MAX_ROADMAP_ITEMS)
        .collect()
}

/// Cleaned project title from the first `# ` header of a primary document.
///
/// Strips a leading `Project:` label and a trailing parenthetical qualifier.
pub fn project_title(document: &str) -> Option<String> {
    let raw = page_title(document)?;
    let without_prefix = TITLE_PREFIX.replace(&raw, "");
    let cleaned = TITLE_QUALIFIER.replace(&without_prefix, "");
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendered pages
// ─────────────────────────────────────────────────────────────────────────────

/// Text of the first `# ` header, verbatim apart from trimming.
pub fn page_title(page: &str) -> Option<String> {
    TITLE
        .captures(page)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Inner text of the first status badge span.
pub fn badge_text(page: &str) -> Option<String> {
    BADGE
        .captures(page)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str().trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Modifier class of the first status badge, e.g. `status-planning`.
pub fn badge_class(page: &str) -> Option<String> {
    BADGE
        .captures(page)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|class| !class.is_empty())
}

/// Byte range of the whole first status badge span.
pub fn badge_span(page: &str) -> Option<Range<usize>> {
    BADGE.find(page).map(|m| m.range())
}

/// Sections of a rendered page.
///
/// Each body is cut at its first `---` rule so page chrome (fact-table
/// separators, footer links) never leaks into section text.
pub fn page_sections(page: &str) -> SectionMap {
    let mut sections = SectionMap::new();
    for (header, body) in SectionMap::parse(page).iter() {
        let kept: Vec<&str> = body
            .lines()
            .take_while(|line| line.trim_end() != "---")
            .collect();
        sections.insert(header, &kept.join("\n"));
    }
    sections
}

/// Bullet items of a rendered `## Roadmap` block.
pub fn page_roadmap(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| line.trim_start().strip_prefix("- "))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .take(MAX_ROADMAP_ITEMS)
        .collect()
}

/// Stack listed in the `**Language**` row of a fact table.
pub fn fact_table_stack(page: &str) -> Vec<String> {
    LANGUAGE_CELL
        .captures(page)
        .and_then(|caps| caps.get(1))
        .map(|cell| {
            split_list(cell.as_str(), &[',', '·'])
                .into_iter()
                .filter(|item| item != "N/A")
                .collect()
        })
        .unwrap_or_default()
}

/// Hand-written body of the `## The Insight` block of an existing page.
///
/// The block runs to the `## Quick Facts` heading that always follows it on a
/// rendered page, so sub-headings and rules inside the insight are kept. Pages
/// without that heading end the block at the next `## ` heading or `---` rule;
/// a block with no terminator at all is not recognized.
pub fn prior_insight(page: &str) -> Option<String> {
    const INSIGHT: &str = "## The Insight";
    const QUICK_FACTS: &str = "## Quick Facts";

    let lines: Vec<&str> = page.lines().collect();
    let start = lines.iter().position(|line| line.trim_end() == INSIGHT)? + 1;
    let body = &lines[start..];
    let end = body
        .iter()
        .position(|line| line.trim_end() == QUICK_FACTS)
        .or_else(|| {
            body.iter().position(|line| {
                let line = line.trim_end();
                line == "---" || line.starts_with("## ")
            })
        })?;
    let insight = body[..end].join("\n");
    let insight = insight.trim();
    (!insight.is_empty()).then(|| insight.to_string())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

fn split_list(text: &str, separators: &[char]) -> Vec<String> {
    text.split(separators)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tech_stack_bold_field() {
        assert_eq!(
            tech_stack("**Tech Stack:** Go, Rust; Python"),
            Some(vec!["Go".into(), "Rust".into(), "Python".into()])
        );
    }

    #[test]
    fn test_tech_stack_uses_first_line_only() {
        let body = "- **Tech Stack**: Rust, Tokio\n- **Timeline:** Q3";
        assert_eq!(
            tech_stack(body),
            Some(vec!["Rust".into(), "Tokio".into()])
        );
    }

    #[test]
    fn test_tech_stack_drops_empty_tokens() {
        assert_eq!(
            tech_stack("**Tech Stack-** Python,, ;SciPy ;"),
            Some(vec!["Python".into(), "SciPy".into()])
        );
    }

    #[test]
    fn test_tech_stack_plain_fallback() {
        assert_eq!(
            tech_stack("- Budget: none\n- Languages: C, Zig\n"),
            Some(vec!["C".into(), "Zig".into()])
        );
    }

    #[test]
    fn test_tech_stack_bold_wins_over_plain() {
        let body = "Stack: Java\n**Tech Stack:** Kotlin";
        assert_eq!(tech_stack(body), Some(vec!["Kotlin".into()]));
    }

    #[test]
    fn test_tech_stack_absent() {
        assert_eq!(tech_stack("- Must run offline"), None);
    }

    #[test]
    fn test_phase_with_progress() {
        let block = "Phase: 3 of 7 (Parser)\nPlan: 2 of 4\nProgress: [████░░] 42%";
        assert_eq!(phase_progress(block), Some("Phase 3/7 (42%)".into()));
    }

    #[test]
    fn test_phase_alone() {
        assert_eq!(phase_progress("Phase: 3 of 7"), Some("Phase 3/7".into()));
        assert_eq!(phase_progress("Progress: 42%"), None);
    }

    #[test]
    fn test_last_activity_first_match() {
        let state = "# State\n**Last activity:** 2025-01-10 - shipped parser\n\n**Last activity:** older";
        assert_eq!(
            last_activity(state),
            Some("2025-01-10 - shipped parser".into())
        );
        assert_eq!(last_activity("**Last activity:**   \nnext line"), None);
    }

    #[test]
    fn test_completion_signal() {
        assert!(is_complete("Status: All phases complete"));
        assert!(is_complete("| v1 | 100% |"));
        assert!(!is_complete("Progress: 1100%"));
        assert!(!is_complete("Progress: 10%"));
        assert!(!is_complete("all phases complete"));
    }

    #[test]
    fn test_roadmap_milestones_cap_and_order() {
        let roadmap = "\
## Phases

- [x] **Phase 1: Foundation** - done already
- [ ] **Phase 2: Parser** - tokenizer and AST
- [ ] **Phase 3: Codegen**
* **Phase 4: Polish**: docs
- **Phase 5: Release** — crates.io
";
        assert_eq!(
            roadmap_milestones(roadmap),
            vec![
                "Phase 2: Parser: tokenizer and AST".to_string(),
                "Phase 3: Codegen".to_string(),
                "Phase 4: Polish: docs".to_string(),
            ]
        );
    }

    #[test]
    fn test_roadmap_ignores_plain_bullets() {
        assert!(roadmap_milestones("- plain item\n- another").is_empty());
    }

    #[test]
    fn test_project_title_cleanup() {
        assert_eq!(
            project_title("# PROJECT: Passive Radar (KrakenSDR)\n"),
            Some("Passive Radar".into())
        );
        assert_eq!(
            project_title("intro\n# Project:   Netvis\n"),
            Some("Netvis".into())
        );
        assert_eq!(project_title("## Only sections\n"), None);
        assert_eq!(project_title("# (draft)\n"), None);
    }

    #[test]
    fn test_legacy_page_parsers() {
        let page = "---\nlayout: default\n---\n\n# Tile Server\n\n<span class=\"status-badge status-active\">Phase 2/5</span>\n\n| **Language** | Rust · TypeScript, N/A |\n";
        assert_eq!(page_title(page), Some("Tile Server".into()));
        assert_eq!(badge_text(page), Some("Phase 2/5".into()));
        assert_eq!(badge_class(page), Some("status-active".into()));
        let span = badge_span(page).unwrap_or_default();
        assert!(page[span].ends_with("Phase 2/5</span>"));
        assert_eq!(
            fact_table_stack(page),
            vec!["Rust".to_string(), "TypeScript".to_string()]
        );
        assert!(fact_table_stack("no table").is_empty());
    }

    #[test]
    fn test_page_sections_stop_at_rule() {
        let page = "# X\n\n## Overview\n\nBody.\n\n## Current Status\n\nShipped.\n\n---\n\n[← Back to Projects](../projects)\n";
        let sections = page_sections(page);
        assert_eq!(sections.get("Overview"), Some("Body."));
        assert_eq!(sections.get("Current Status"), Some("Shipped."));
    }

    #[test]
    fn test_page_roadmap_bullets() {
        assert_eq!(
            page_roadmap("- Phase 2: Parser\n- Phase 3\nnot a bullet"),
            vec!["Phase 2: Parser".to_string(), "Phase 3".to_string()]
        );
    }

    #[test]
    fn test_prior_insight() {
        let page = "## The Insight\n\nHand written.\nSecond line.\n\n## Quick Facts\n";
        assert_eq!(
            prior_insight(page),
            Some("Hand written.\nSecond line.".into())
        );
        assert_eq!(prior_insight("## The Insight\n\nunterminated"), None);
        assert_eq!(
            prior_insight("## The Insight\n\nx\n\n---\n"),
            Some("x".into())
        );
    }

    #[test]
    fn test_prior_insight_keeps_subheadings_and_rules() {
        let page = "## The Insight\n\nSee the network.\n\n### Why it matters\n\nOutages are visible.\n\n---\n\nPart two.\n\n## Quick Facts\n\n| | |\n";
        assert_eq!(
            prior_insight(page),
            Some("See the network.\n\n### Why it matters\n\nOutages are visible.\n\n---\n\nPart two.".into())
        );
    }
}
