//! Project assembly
//!
//! Combines the primary, secondary and tertiary planning documents of one
//! directory into a [`Project`], and rebuilds projects from previously
//! rendered pages that no longer have a source directory.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::config::DocumentsConfig;
use crate::fields;
use crate::project::{Origin, Project, SlugRenames, Status, slugify};
use crate::render;
use crate::report::Diagnostic;
use crate::sections::SectionMap;
use crate::store::DocumentStore;

const LEGACY_EXTENSION: &str = "md";
const LEGACY_PLANNING_CLASS: &str = "status-planning";

/// Projects in discovery order plus what was dropped along the way.
#[derive(Debug, Default)]
pub struct Assembly {
    pub projects: Vec<Project>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Assembler<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    documents: &'a DocumentsConfig,
    renames: &'a SlugRenames,
}

impl<'a, S: DocumentStore + ?Sized> Assembler<'a, S> {
    pub fn new(store: &'a S, documents: &'a DocumentsConfig, renames: &'a SlugRenames) -> Self {
        Self {
            store,
            documents,
            renames,
        }
    }

    /// Build a project from one directory.
    ///
    /// Returns `None` when the directory has no primary document; that is
    /// the normal "not a project" case, not an error.
    pub fn assemble(&self, location: &Path) -> Option<Project> {
        let primary_name = self.documents.relative(&self.documents.primary);
        if !self.store.exists(location, &primary_name) {
            return None;
        }
        let primary = self.store.read(location, &primary_name)?;

        let entry_name = location.file_name()?.to_string_lossy().into_owned();
        let slug = slugify(&entry_name, self.renames);
        let name = fields::project_title(&primary).unwrap_or_else(|| entry_name.clone());

        let mut project = Project::new(name, slug, Origin::Planning(location.to_path_buf()));
        project.sections = SectionMap::parse(&primary);
        project.stack = project
            .sections
            .get(fields::CONSTRAINTS_SECTION)
            .and_then(fields::tech_stack)
            .unwrap_or_default();

        let secondary_name = self.documents.relative(&self.documents.secondary);
        if let Some(state) = self.store.read(location, &secondary_name) {
            project.status_detail = SectionMap::parse(&state)
                .get(fields::POSITION_SECTION)
                .and_then(fields::phase_progress);
            project.current_status = fields::last_activity(&state).unwrap_or_default();
        }

        let tertiary_name = self.documents.relative(&self.documents.tertiary);
        if let Some(roadmap) = self.store.read(location, &tertiary_name) {
            project.roadmap = fields::roadmap_milestones(&roadmap);
            if fields::is_complete(&roadmap) {
                project.status = Status::Complete;
                project.status_detail = Some(fields::PRODUCTION_READY.to_string());
            }
        }

        tracing::debug!(
            slug = %project.slug,
            name = %project.name,
            status = %project.status,
            stack = project.stack.len(),
            sections = project.sections.len(),
            "Assembled project"
        );
        Some(project)
    }

    /// Assemble every immediate child of every root, first slug wins.
    pub fn assemble_all(&self, roots: &[PathBuf]) -> Assembly {
        let mut assembly = Assembly::default();
        let mut seen: BTreeMap<String, PathBuf> = BTreeMap::new();

        for root in roots {
            for location in self.store.list(root) {
                let Some(project) = self.assemble(&location) else {
                    continue;
                };
                if let Some(kept) = seen.get(&project.slug) {
                    let diagnostic = Diagnostic::DuplicateSlug {
                        slug: project.slug.clone(),
                        kept: kept.clone(),
                        dropped: location.clone(),
                    };
                    tracing::warn!(%diagnostic, "Dropping duplicate project");
                    assembly.diagnostics.push(diagnostic);
                    continue;
                }
                seen.insert(project.slug.clone(), location.clone());
                assembly.projects.push(project);
            }
        }

        assembly
    }

    /// Add projects for rendered pages in `pages_dir` that have no source.
    pub fn ingest_legacy(&self, pages_dir: &Path, assembly: &mut Assembly) {
        let slugs: BTreeSet<String> = assembly.projects.iter().map(|p| p.slug.clone()).collect();
        let names: BTreeSet<String> = assembly.projects.iter().map(|p| p.name.clone()).collect();

        for page_path in self.store.list(pages_dir) {
            if page_path.extension().is_none_or(|ext| ext != LEGACY_EXTENSION) {
                continue;
            }
            let (Some(stem), Some(file_name)) = (page_path.file_stem(), page_path.file_name()) else {
                continue;
            };
            let stem = stem.to_string_lossy().into_owned();
            if slugs.contains(&stem) {
                continue;
            }
            let Some(page) = self.store.read(pages_dir, &file_name.to_string_lossy()) else {
                continue;
            };

            let Some(project) = legacy_project(&page, stem, &page_path) else {
                let diagnostic = Diagnostic::UntitledPage { page: page_path };
                tracing::warn!(%diagnostic, "Skipping legacy page");
                assembly.diagnostics.push(diagnostic);
                continue;
            };
            if names.contains(&project.name) {
                let diagnostic = Diagnostic::DuplicateName {
                    name: project.name,
                    page: page_path,
                };
                tracing::warn!(%diagnostic, "Skipping legacy page");
                assembly.diagnostics.push(diagnostic);
                continue;
            }

            tracing::info!(slug = %project.slug, name = %project.name, "Preserving legacy project");
            assembly.projects.push(project);
        }
    }
}

/// Rebuild a project from a rendered page. `None` if the page has no title.
fn legacy_project(page: &str, slug: String, path: &Path) -> Option<Project> {
    let name = fields::page_title(page)?;
    let mut project = Project::new(name, slug, Origin::Legacy(path.to_path_buf()));

    let detail = fields::badge_text(page).unwrap_or_else(|| render::DEFAULT_BADGE_TEXT.to_string());
    if detail.contains("Complete") || detail.contains("Ready") {
        project.status = Status::Complete;
    } else if fields::badge_class(page).as_deref() == Some(LEGACY_PLANNING_CLASS) {
        project.status = Status::Planning;
    }
    project.status_detail = Some(detail);
    project.stack = fields::fact_table_stack(page);
    project.sections = fields::page_sections(page);
    project.roadmap = project
        .sections
        .get(render::ROADMAP_HEADING.trim_start_matches("## "))
        .map(fields::page_roadmap)
        .unwrap_or_default();
    project.current_status = project
        .sections
        .get(render::CURRENT_STATUS_HEADING.trim_start_matches("## "))
        .unwrap_or_default()
        .to_string();

    Some(project)
}
