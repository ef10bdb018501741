//! Page synthesis
//!
//! Renders one detail page per project and the index page for the whole list.
//! Rendering is a pure function of its inputs: the same project list always
//! produces byte-identical text. Block helpers are public so the merger can
//! splice freshly rendered blocks into hand-edited pages.

use crate::categorize::Category;
use crate::project::{Project, Status};

/// Sections copied onto a detail page, in page order.
pub const PRIORITY_SECTIONS: &[&str] = &[
    "Overview",
    "What This Is",
    "Problem It Solves",
    "Core Value",
    "Features",
    "Key Capabilities",
    "Technical Features",
    "Architecture",
    "Technical Depth",
    "Security Model",
    "Implementation Details",
    "Design Decisions",
    "Protocols Implemented",
    "Performance",
    "Metrics",
    "Use Cases",
    "Integration",
    "Hardware",
    "Agents",
    "Components",
];

/// Sections whose first paragraph feeds the index summary.
pub const SUMMARY_SECTIONS: &[&str] = &["Overview", "What This Is", "Core Value", "Problem It Solves"];

pub const CORE_VALUE_SECTION: &str = "Core Value";
pub const INSIGHT_HEADING: &str = "## The Insight";
pub const QUICK_FACTS_HEADING: &str = "## Quick Facts";
pub const ROADMAP_HEADING: &str = "## Roadmap";
pub const CURRENT_STATUS_HEADING: &str = "## Current Status";

/// Badge text when a project has no status detail.
pub const DEFAULT_BADGE_TEXT: &str = "Active Development";

const FRONT_MATTER: [&str; 3] = ["---", "layout: default", "---"];
const BACK_LINK: &str = "[← Back to Projects](../projects)";
const FOOTER_LINKS: &str = "[← Back to Projects](../projects) | [Development Philosophy](../development)";
const RULE: &str = "---";

const STYLE_BLOCK: [&str; 6] = [
    "<style>",
    ".status-badge { display: inline-block; padding: 0.3em 0.8em; margin: 0.5em 0; border-radius: 4px; font-size: 0.85em; font-weight: 600; }",
    ".status-active { background-color: #007bff; color: white; }",
    ".status-planning { background-color: #ffc107; color: #343a40; }",
    ".status-complete { background-color: #28a745; color: white; }",
    "</style>",
];

/// Sentences kept in a summary with a long opening sentence.
const LONG_OPENING_SENTENCES: usize = 4;
const DEFAULT_SUMMARY_SENTENCES: usize = 5;
const LONG_SENTENCE_CHARS: usize = 100;
const SENTENCES_PER_PARAGRAPH: usize = 2;

// ─────────────────────────────────────────────────────────────────────────────
// Shared blocks
// ─────────────────────────────────────────────────────────────────────────────

/// HTML status badge for a project.
pub fn status_badge(project: &Project) -> String {
    match project.status {
        Status::Complete => {
            r#"<span class="status-badge status-complete">Production Ready</span>"#.to_string()
        }
        Status::Active | Status::Planning => {
            let detail = project
                .status_detail
                .as_deref()
                .unwrap_or(DEFAULT_BADGE_TEXT);
            format!(
                r#"<span class="status-badge status-{}">{detail}</span>"#,
                project.status.as_str()
            )
        }
    }
}

pub fn title_line(name: &str) -> String {
    format!("# {name}")
}

/// Lines under the `## Quick Facts` heading, up to (not including) the rule.
pub fn quick_facts_block(project: &Project, started_year: &str) -> Vec<String> {
    let language = if project.stack.is_empty() {
        "N/A".to_string()
    } else {
        project.stack.join(", ")
    };
    vec![
        String::new(),
        "| | |".to_string(),
        "|---|---|".to_string(),
        format!("| **Status** | {} |", project.status_text()),
        format!("| **Language** | {language} |"),
        format!("| **Started** | {started_year} |"),
        String::new(),
    ]
}

/// Lines under the `## Roadmap` heading.
pub fn roadmap_block(roadmap: &[String]) -> Vec<String> {
    let mut lines = vec![String::new()];
    lines.extend(roadmap.iter().map(|item| format!("- {item}")));
    lines.push(String::new());
    lines
}

/// Lines under the `## Current Status` heading.
pub fn current_status_block(note: &str) -> Vec<String> {
    vec![String::new(), note.to_string(), String::new()]
}

// ─────────────────────────────────────────────────────────────────────────────
// Detail page
// ─────────────────────────────────────────────────────────────────────────────

/// Render the detail page for one project.
///
/// `prior_insight` is the hand-written insight of the page being replaced,
/// if any; it wins over the `Core Value` section.
pub fn render_detail(project: &Project, prior_insight: Option<&str>, started_year: &str) -> String {
    let mut lines: Vec<String> = FRONT_MATTER.iter().map(|l| l.to_string()).collect();
    lines.extend([
        String::new(),
        title_line(&project.name),
        String::new(),
        status_badge(project),
        String::new(),
        BACK_LINK.to_string(),
        String::new(),
        RULE.to_string(),
        String::new(),
    ]);

    let insight = prior_insight
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .or_else(|| project.sections.get(CORE_VALUE_SECTION));
    if let Some(insight) = insight {
        lines.extend([
            INSIGHT_HEADING.to_string(),
            String::new(),
            insight.to_string(),
            String::new(),
        ]);
    }

    lines.push(QUICK_FACTS_HEADING.to_string());
    lines.extend(quick_facts_block(project, started_year));
    lines.extend([RULE.to_string(), String::new()]);
    let body_start = lines.len();

    for &name in PRIORITY_SECTIONS {
        if name == CORE_VALUE_SECTION && insight.is_some() {
            continue;
        }
        if let Some(body) = project.sections.get(name) {
            lines.extend([format!("## {name}"), String::new(), body.to_string(), String::new()]);
        }
    }

    if !project.roadmap.is_empty() {
        lines.push(ROADMAP_HEADING.to_string());
        lines.extend(roadmap_block(&project.roadmap));
    }

    if !project.current_status.is_empty() {
        lines.push(CURRENT_STATUS_HEADING.to_string());
        lines.extend(current_status_block(&project.current_status));
    }

    if lines.len() > body_start {
        lines.extend([RULE.to_string(), String::new()]);
    }
    lines.extend([FOOTER_LINKS.to_string(), String::new()]);
    lines.join("\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Index page
// ─────────────────────────────────────────────────────────────────────────────

/// Render the index page, grouping projects by category.
///
/// Empty categories are omitted; projects within a category are sorted by
/// name (slug breaks ties).
pub fn render_index(projects: &[Project], intro: &str) -> String {
    let mut lines: Vec<String> = FRONT_MATTER.iter().map(|l| l.to_string()).collect();
    lines.extend([
        String::new(),
        "# Projects".to_string(),
        String::new(),
        intro.trim().to_string(),
        String::new(),
        RULE.to_string(),
        String::new(),
    ]);

    for category in Category::DISPLAY_ORDER {
        let mut members: Vec<&Project> = projects
            .iter()
            .filter(|project| project.category == category)
            .collect();
        if members.is_empty() {
            continue;
        }
        members.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.slug.cmp(&b.slug)));

        lines.extend([format!("## {}", category.title()), String::new()]);
        for project in members {
            lines.extend([
                format!("### [{}](projects/{})", project.name, project.slug),
                String::new(),
                badge_line(project),
                String::new(),
            ]);
            if let Some(summary) = summarize(project) {
                lines.extend([summary, String::new()]);
            }
        }
    }

    lines.extend(STYLE_BLOCK.iter().map(|l| l.to_string()));
    lines.push(String::new());
    lines.join("\n")
}

fn badge_line(project: &Project) -> String {
    let badge = status_badge(project);
    if project.stack.is_empty() {
        return badge;
    }
    let tech: Vec<&str> = project.stack.iter().take(3).map(String::as_str).collect();
    format!("{badge} · **{}**", tech.join(" · "))
}

/// Short index summary built from the opening paragraphs of the summary
/// sections. `None` when none of them is present.
pub fn summarize(project: &Project) -> Option<String> {
    let opening: Vec<&str> = SUMMARY_SECTIONS
        .iter()
        .filter_map(|name| project.sections.get(name))
        .filter_map(|body| body.split("\n\n").next())
        .collect();
    if opening.is_empty() {
        return None;
    }

    let sentences = split_sentences(&opening.join(" "));
    let keep = match sentences.first() {
        _ if sentences.len() <= 3 => sentences.len(),
        Some(first) if first.chars().count() > LONG_SENTENCE_CHARS => LONG_OPENING_SENTENCES,
        _ => DEFAULT_SUMMARY_SENTENCES,
    };

    let paragraphs: Vec<String> = sentences[..keep.min(sentences.len())]
        .chunks(SENTENCES_PER_PARAGRAPH)
        .map(|pair| pair.join(" "))
        .collect();
    let summary = paragraphs.join("\n\n");
    (!summary.is_empty()).then_some(summary)
}

/// Split text after `.`, `!` or `?` followed by whitespace. Whitespace inside
/// each sentence is collapsed to single spaces.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().is_some_and(|next| next.is_whitespace());
        if at_boundary {
            sentences.push(collapse_whitespace(&current));
            current.clear();
        }
    }
    if !current.trim().is_empty() {
        sentences.push(collapse_whitespace(&current));
    }

    sentences.retain(|s| !s.is_empty());
    sentences
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
