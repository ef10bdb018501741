//! folio core: planning documents in, portfolio pages out
//!
//! Scans project directories for planning documents (`.planning/PROJECT.md`,
//! `STATE.md`, `ROADMAP.md`), assembles one [`Project`] per directory, tags
//! each with a [`Category`], and synthesizes:
//! - one detail page per project
//! - one index page grouping every project by category
//!
//! Pages a person has enriched by hand are detected and either preserved or
//! refreshed field by field. All filesystem access goes through
//! [`DocumentStore`].

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod assembler;
pub mod categorize;
pub mod config;
pub mod errors;
pub mod fields;
pub mod merge;
pub mod pipeline;
pub mod project;
pub mod render;
pub mod report;
pub mod sections;
pub mod store;

pub use assembler::{Assembler, Assembly};
pub use categorize::{Categorizer, Category, CategoryMatch, MatchReason};
pub use config::FolioConfig;
pub use errors::{ErrorCategory, FolioError, Result};
pub use merge::{LineRatioPolicy, MergeMode, MergeOutcome, Merger, PreservationPolicy};
pub use pipeline::run;
pub use project::{Origin, Project, SlugRenames, Status, slugify};
pub use render::{render_detail, render_index, status_badge};
pub use report::{Diagnostic, ProjectSummary, SyncReport, WriteFailure};
pub use sections::SectionMap;
pub use store::{DocumentStore, DryRunStore, FsStore, MemoryStore};

/// folio version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
