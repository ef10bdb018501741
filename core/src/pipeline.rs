//! Sync pipeline
//!
//! discovery → assembly → legacy ingest → categorize → render details →
//! merge/write → render/write index → report.
//!
//! Single-threaded. Write failures are recorded in the report and the batch
//! keeps going; only configuration problems abort a run.

use std::path::{Path, PathBuf};

use crate::assembler::Assembler;
use crate::config::FolioConfig;
use crate::errors::{FolioError, Result};
use crate::fields;
use crate::merge::{MergeOutcome, Merger};
use crate::project::Project;
use crate::render;
use crate::report::{ProjectSummary, SyncReport, WriteFailure};
use crate::store::DocumentStore;

/// Run one sync over `roots`, writing under `output_root`.
pub fn run<S: DocumentStore + ?Sized>(
    config: &FolioConfig,
    store: &S,
    roots: &[PathBuf],
    output_root: &Path,
) -> Result<SyncReport> {
    let renames = config.slug_table();
    let categorizer = config.categorizer()?;
    let merger = config.merger();
    let pages_dir = output_root.join(&config.output.pages_dir);
    let started_year = config.output.started_year.as_str();

    let assembler = Assembler::new(store, &config.documents, &renames);
    let mut assembly = assembler.assemble_all(roots);
    let discovered = assembly.projects.len();
    assembler.ingest_legacy(&pages_dir, &mut assembly);

    let mut report = SyncReport {
        diagnostics: assembly.diagnostics,
        ..SyncReport::default()
    };
    let mut projects = assembly.projects;
    tracing::info!(
        discovered,
        legacy = projects.len() - discovered,
        "Assembled projects"
    );

    categorizer.categorize_all(&mut projects);

    for project in &mut projects {
        sync_page(project, store, &pages_dir, started_year, &merger, &mut report);
    }

    let index_path = output_root.join(&config.output.index_path);
    let index = render::render_index(&projects, &config.output.intro);
    let existing_index = store.read(output_root, &config.output.index_path);
    if existing_index.as_deref() == Some(index.as_str()) {
        tracing::debug!(path = %index_path.display(), "Index unchanged");
        report.index = Some(index_path);
    } else if write_recorded(store, &index_path, &index, &mut report) {
        report.index = Some(index_path);
    }

    projects.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.slug.cmp(&b.slug)));
    report.projects = projects
        .iter()
        .map(|project| ProjectSummary {
            name: project.name.clone(),
            slug: project.slug.clone(),
            category: project.category.to_string(),
            legacy: project.origin.is_legacy(),
        })
        .collect();

    Ok(report)
}

fn sync_page<S: DocumentStore + ?Sized>(
    project: &mut Project,
    store: &S,
    pages_dir: &Path,
    started_year: &str,
    merger: &Merger,
    report: &mut SyncReport,
) {
    let file_name = format!("{}.md", project.slug);
    let path = pages_dir.join(&file_name);
    let existing = store.read(pages_dir, &file_name);
    let prior_insight = existing.as_deref().and_then(fields::prior_insight);
    let candidate = render::render_detail(project, prior_insight.as_deref(), started_year);

    match merger.merge(existing.as_deref(), &candidate, project, started_year) {
        MergeOutcome::Replace(text) => {
            if write_recorded(store, &path, &text, report) {
                report.written.push(path);
            }
        }
        MergeOutcome::Rewrite(text) => {
            if write_recorded(store, &path, &text, report) {
                report.rewritten.push(path);
            }
        }
        MergeOutcome::Skip { adopted_title } => {
            if let Some(title) = adopted_title {
                tracing::debug!(slug = %project.slug, %title, "Adopting edited title");
                project.name = title;
            }
            tracing::info!(path = %path.display(), "Preserving detailed content");
            report.preserved.push(path);
        }
        MergeOutcome::Unchanged => {
            tracing::debug!(path = %path.display(), "Page unchanged");
            report.unchanged.push(path);
        }
    }
}

/// Write `text`, recording a failure instead of returning it.
fn write_recorded<S: DocumentStore + ?Sized>(
    store: &S,
    path: &Path,
    text: &str,
    report: &mut SyncReport,
) -> bool {
    match store.write(path, text) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "Wrote page");
            true
        }
        Err(source) => {
            let err = FolioError::io_with_source(path, source);
            tracing::warn!(
                category = err.category().as_str(),
                error = %err,
                "Failed to write page"
            );
            report.failures.push(WriteFailure {
                path: path.to_path_buf(),
                error: err.to_string(),
            });
            false
        }
    }
}
