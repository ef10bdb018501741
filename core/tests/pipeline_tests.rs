//! End-to-end sync tests against a real directory tree.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;
use std::path::{Path, PathBuf};

use folio_core::{Diagnostic, FolioConfig, FsStore, MergeMode, run};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const RADAR_PROJECT: &str = "\
# PROJECT: Passive Radar (KrakenSDR)

## Core Value

Detect aircraft using ambient FM broadcasts.

## Overview

A passive bistatic radar built on a five-channel coherent SDR. It correlates
reference and surveillance channels. Detections are plotted live.

## Constraints

- **Tech Stack:** Python, GNU Radio, NumPy
- **Budget:** hobby

## Hardware

KrakenSDR and a Yagi array.
";

const RADAR_STATE: &str = "\
# State

## Current Position

Phase: 4 of 6 (Tracking)
Plan: 2 of 3
Progress: [███████░░░] 70%

**Last activity:** 2025-02-01 - range tests on the roof
";

const RADAR_ROADMAP: &str = "\
# Roadmap

- [x] **Phase 3: Detection** - CFAR
- [ ] **Phase 5: Tracking** - Kalman filter
- [ ] **Phase 6: Web UI**
";

struct Fixture {
    _scan: TempDir,
    _site: TempDir,
    scan: PathBuf,
    site: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let scan = TempDir::new().expect("temp dir");
        let site = TempDir::new().expect("temp dir");
        Self {
            scan: scan.path().to_path_buf(),
            site: site.path().to_path_buf(),
            _scan: scan,
            _site: site,
        }
    }

    fn project(&self, dir: &str, files: &[(&str, &str)]) {
        let planning = self.scan.join(dir).join(".planning");
        fs::create_dir_all(&planning).expect("create planning dir");
        for (name, text) in files {
            fs::write(planning.join(name), text).expect("write planning doc");
        }
    }

    fn sync(&self, config: &FolioConfig) -> folio_core::SyncReport {
        run(config, &FsStore, &[self.scan.clone()], &self.site).expect("sync")
    }

    fn page(&self, slug: &str) -> String {
        fs::read_to_string(self.site.join("projects").join(format!("{slug}.md"))).expect("page")
    }

    fn index(&self) -> String {
        fs::read_to_string(self.site.join("projects.md")).expect("index")
    }
}

fn radar(fx: &Fixture) {
    fx.project(
        "passive_radar",
        &[
            ("PROJECT.md", RADAR_PROJECT),
            ("STATE.md", RADAR_STATE),
            ("ROADMAP.md", RADAR_ROADMAP),
        ],
    );
}

fn snapshot(root: &Path) -> Vec<(PathBuf, String)> {
    let mut files: Vec<(PathBuf, String)> = walk(root)
        .into_iter()
        .map(|path| {
            let text = fs::read_to_string(&path).unwrap();
            (path.strip_prefix(root).unwrap().to_path_buf(), text)
        })
        .collect();
    files.sort();
    files
}

fn walk(dir: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            out.extend(walk(&path));
        } else {
            out.push(path);
        }
    }
    out
}

#[test]
fn detail_page_carries_extracted_fields() {
    let fx = Fixture::new();
    radar(&fx);
    fx.sync(&FolioConfig::default());

    let page = fx.page("passive-radar");
    assert!(page.starts_with("---\nlayout: default\n---\n\n# Passive Radar\n"));
    assert!(page.contains(r#"<span class="status-badge status-active">Phase 4/6 (70%)</span>"#));
    assert!(page.contains("## The Insight\n\nDetect aircraft using ambient FM broadcasts.\n"));
    assert!(page.contains("| **Language** | Python, GNU Radio, NumPy |"));
    assert!(page.contains("## Roadmap\n\n- Phase 5: Tracking: Kalman filter\n- Phase 6: Web UI\n"));
    assert!(page.contains("## Current Status\n\n2025-02-01 - range tests on the roof\n"));
    assert!(!page.contains("## Core Value"));
    assert!(!page.contains("## Constraints"));

    let index = fx.index();
    assert!(index.contains("## Signal Processing & SDR"));
    assert!(index.contains("· **Python · GNU Radio · NumPy**"));
}

#[test]
fn fresh_runs_are_byte_identical() {
    let a = Fixture::new();
    let b = Fixture::new();
    for fx in [&a, &b] {
        radar(fx);
        fx.project("netvis", &[("PROJECT.md", "# Netvis\n\n## Overview\n\nDraws graphs.\n")]);
        fx.sync(&FolioConfig::default());
    }
    assert_eq!(snapshot(&a.site), snapshot(&b.site));
}

#[test]
fn second_run_over_own_output_is_unchanged() {
    let fx = Fixture::new();
    radar(&fx);
    fx.project("sleep_waves", &[("PROJECT.md", "# Sleep Waves\n")]);

    let first = fx.sync(&FolioConfig::default());
    assert_eq!(first.written.len(), 2);
    let before = snapshot(&fx.site);

    let second = fx.sync(&FolioConfig::default());
    assert!(second.written.is_empty());
    assert!(second.rewritten.is_empty());
    assert_eq!(second.unchanged.len(), 2);
    assert_eq!(snapshot(&fx.site), before);
}

#[test]
fn insight_with_subheadings_and_rules_survives_reruns() {
    let fx = Fixture::new();
    fx.project(
        "netvis",
        &[(
            "PROJECT.md",
            "# Netvis\n\n## Core Value\n\nSee the network.\n\n### Why it matters\n\nOutages are visible.\n\n---\n\nPart two.\n\n## Overview\n\nDraws graphs.\n",
        )],
    );

    fx.sync(&FolioConfig::default());
    let first = fx.page("netvis");
    assert!(first.contains(
        "## The Insight\n\nSee the network.\n\n### Why it matters\n\nOutages are visible.\n\n---\n\nPart two.\n\n## Quick Facts\n"
    ));

    let second = fx.sync(&FolioConfig::default());
    assert!(second.written.is_empty());
    assert!(second.rewritten.is_empty());
    assert_eq!(fx.page("netvis"), first);
}

#[test]
fn completion_signal_forces_production_ready() {
    let fx = Fixture::new();
    fx.project(
        "tileserver",
        &[
            ("PROJECT.md", "# Tileserver\n"),
            ("STATE.md", RADAR_STATE),
            ("ROADMAP.md", "Status: All phases complete\n"),
        ],
    );
    fx.sync(&FolioConfig::default());

    let page = fx.page("tileserver");
    assert!(page.contains(r#"<span class="status-badge status-complete">Production Ready</span>"#));
    assert!(page.contains("| **Status** | Production Ready |"));
    assert!(!page.contains("Phase 4/6"));
}

#[test]
fn enriched_page_keeps_prose_and_refreshes_facts() {
    let fx = Fixture::new();
    radar(&fx);
    fx.sync(&FolioConfig::default());

    // hand-enrich the generated page well past 3x its length
    let generated = fx.page("passive-radar");
    let mut prose = String::from("## Field Notes\n\n");
    for i in 0..300 {
        prose.push_str(&format!("Night {i}: tracked a departure off runway 27.\n"));
    }
    prose.push('\n');
    let marker = "## Overview";
    let at = generated.find(marker).unwrap();
    let enriched = format!("{}{prose}{}", &generated[..at], &generated[at..]);
    fs::write(fx.site.join("projects/passive-radar.md"), &enriched).unwrap();

    // the state moves on
    fx.project(
        "passive_radar",
        &[(
            "STATE.md",
            "## Current Position\n\nPhase: 5 of 6\nProgress: 85%\n\n**Last activity:** 2025-03-09 - tracker merged\n",
        )],
    );
    let report = fx.sync(&FolioConfig::default());
    assert_eq!(report.rewritten, vec![fx.site.join("projects/passive-radar.md")]);

    let page = fx.page("passive-radar");
    assert!(page.contains(&prose));
    assert!(page.contains(r#"<span class="status-badge status-active">Phase 5/6 (85%)</span>"#));
    assert!(page.contains("| **Status** | Phase 5/6 (85%) |"));
    assert!(page.contains("## Current Status\n\n2025-03-09 - tracker merged\n"));
    assert!(!page.contains("Phase 4/6"));
}

#[test]
fn skip_mode_leaves_enriched_page_alone() {
    let fx = Fixture::new();
    radar(&fx);
    let mut enriched = String::from("# Passive Radar: Listening to the Sky\n\n");
    for i in 0..400 {
        enriched.push_str(&format!("line {i}\n"));
    }
    fs::create_dir_all(fx.site.join("projects")).unwrap();
    fs::write(fx.site.join("projects/passive-radar.md"), &enriched).unwrap();

    let mut config = FolioConfig::default();
    config.merge.mode = MergeMode::Skip;
    let report = fx.sync(&config);

    assert_eq!(report.preserved.len(), 1);
    assert_eq!(fx.page("passive-radar"), enriched);
    assert!(fx.index().contains("### [Passive Radar: Listening to the Sky](projects/passive-radar)"));
}

#[test]
fn slug_collision_keeps_first_discovery() {
    let fx = Fixture::new();
    fx.project("multi_agent_assistant", &[("PROJECT.md", "# Assistant One\n")]);
    fx.project("multi-agent", &[("PROJECT.md", "# Assistant Two\n")]);

    let report = fx.sync(&FolioConfig::default());
    assert_eq!(report.project_count(), 1);
    assert_eq!(report.projects[0].name, "Assistant Two");
    assert!(matches!(
        report.diagnostics.as_slice(),
        [Diagnostic::DuplicateSlug { slug, .. }] if slug == "multi-agent"
    ));
}

#[test]
fn legacy_pages_survive_and_stabilize() {
    let fx = Fixture::new();
    fx.project("netvis", &[("PROJECT.md", "# Netvis\n")]);
    fs::create_dir_all(fx.site.join("projects")).unwrap();
    fs::write(
        fx.site.join("projects/old-cleanup.md"),
        "# Old Cleanup\n\n<span class=\"status-badge status-active\">Archived</span>\n\n| **Language** | Bash |\n\n## Overview\n\nDeletes stale files.\n",
    )
    .unwrap();

    let first = fx.sync(&FolioConfig::default());
    assert_eq!(first.legacy_count(), 1);
    let index = fx.index();
    assert!(index.contains("## Data & Utilities"));
    assert!(index.contains("### [Old Cleanup](projects/old-cleanup)"));
    assert!(index.contains("Deletes stale files."));

    let page = fx.page("old-cleanup");
    assert!(page.contains(r#"<span class="status-badge status-active">Archived</span>"#));
    assert!(page.contains("| **Language** | Bash |"));

    let before = snapshot(&fx.site);
    let second = fx.sync(&FolioConfig::default());
    assert!(second.written.is_empty());
    assert_eq!(snapshot(&fx.site), before);
}

#[test]
fn no_projects_still_writes_index() {
    let fx = Fixture::new();
    let report = fx.sync(&FolioConfig::default());
    assert_eq!(report.project_count(), 0);
    assert!(fx.index().contains("# Projects"));
}
