//! folio configuration loading
//!
//! Loads configuration from `~/.config/folio/folio.toml` (or `FOLIO_CONFIG` env,
//! or an explicit path from the command line). Every field has a default, so
//! an empty file or no file at all is a valid configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::categorize::{Categorizer, Category};
use crate::errors::{FolioError, Result};
use crate::merge::{MergeMode, Merger};
use crate::project::SlugRenames;

/// Root configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FolioConfig {
    /// Directories whose immediate children are candidate projects
    #[serde(default = "default_scan_dirs")]
    pub scan_dirs: Vec<String>,

    /// Planning document names
    #[serde(default)]
    pub documents: DocumentsConfig,

    /// Output locations and page text
    #[serde(default)]
    pub output: OutputConfig,

    /// Preservation of hand-edited pages
    #[serde(default)]
    pub merge: MergeConfig,

    /// Extra slug renames (old → new), applied after the built-ins
    #[serde(default)]
    pub slug_renames: BTreeMap<String, String>,

    /// Slug → category name, checked before the keyword rules
    #[serde(default)]
    pub category_overrides: BTreeMap<String, String>,
}

fn default_scan_dirs() -> Vec<String> {
    ["~/dev", "~/PycharmProjects", "~/RustroverProjects"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Where the planning documents live inside a project directory
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DocumentsConfig {
    /// Directory holding the planning documents
    #[serde(default = "default_planning_dir")]
    pub planning_dir: String,

    /// Identity, constraints and sections; required
    #[serde(default = "default_primary")]
    pub primary: String,

    /// Current position and activity
    #[serde(default = "default_secondary")]
    pub secondary: String,

    /// Milestones and completion
    #[serde(default = "default_tertiary")]
    pub tertiary: String,
}

fn default_planning_dir() -> String {
    ".planning".to_string()
}

fn default_primary() -> String {
    "PROJECT.md".to_string()
}

fn default_secondary() -> String {
    "STATE.md".to_string()
}

fn default_tertiary() -> String {
    "ROADMAP.md".to_string()
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            planning_dir: default_planning_dir(),
            primary: default_primary(),
            secondary: default_secondary(),
            tertiary: default_tertiary(),
        }
    }
}

impl DocumentsConfig {
    /// Path of a document relative to the project directory.
    pub fn relative(&self, document: &str) -> String {
        Path::new(&self.planning_dir)
            .join(document)
            .to_string_lossy()
            .into_owned()
    }
}

/// Output layout
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Index page, relative to the output root
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// Detail page directory, relative to the output root
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,

    /// Line under the index title
    #[serde(default = "default_intro")]
    pub intro: String,

    /// Value of the Started fact
    #[serde(default = "default_started_year")]
    pub started_year: String,
}

fn default_index_path() -> String {
    "projects.md".to_string()
}

fn default_pages_dir() -> String {
    "projects".to_string()
}

fn default_intro() -> String {
    "My work focuses on network automation tools, signal processing systems, and multi-agent architectures."
        .to_string()
}

fn default_started_year() -> String {
    "2025".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
            pages_dir: default_pages_dir(),
            intro: default_intro(),
            started_year: default_started_year(),
        }
    }
}

/// Preservation settings
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct MergeConfig {
    /// `rewrite` (default) or `skip`
    #[serde(default)]
    pub mode: MergeMode,

    /// Line ratio above which a page counts as hand-enriched; defaults per mode
    #[serde(default)]
    pub ratio: Option<f64>,
}

impl MergeConfig {
    pub fn effective_ratio(&self) -> f64 {
        self.ratio.unwrap_or_else(|| self.mode.default_ratio())
    }
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            scan_dirs: default_scan_dirs(),
            documents: DocumentsConfig::default(),
            output: OutputConfig::default(),
            merge: MergeConfig::default(),
            slug_renames: BTreeMap::new(),
            category_overrides: BTreeMap::new(),
        }
    }
}

impl FolioConfig {
    /// Environment variable for config path override
    pub const ENV_CONFIG_PATH: &'static str = "FOLIO_CONFIG";

    /// Default config filename
    pub const DEFAULT_CONFIG_FILENAME: &'static str = "folio.toml";

    /// Load configuration
    ///
    /// Resolution order:
    /// 1. `explicit` (a missing explicit file is an error)
    /// 2. `FOLIO_CONFIG` environment variable
    /// 3. `~/.config/folio/folio.toml`
    ///
    /// If the resolved file doesn't exist, returns default configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        let path = Self::resolve_config_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "folio config not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from_path(&path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            FolioError::config_with_source(format!("failed to read config at {}", path.display()), e)
        })?;

        Self::parse(&contents)
    }

    /// Parse configuration from TOML string
    pub fn parse(contents: &str) -> Result<Self> {
        let cfg: FolioConfig = toml::from_str(contents)
            .map_err(|e| FolioError::config_with_source("failed to parse config", e))?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Resolve the configuration file path
    fn resolve_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(Self::ENV_CONFIG_PATH) {
            return PathBuf::from(path);
        }

        dirs::home_dir()
            .map(|h| {
                h.join(".config")
                    .join("folio")
                    .join(Self::DEFAULT_CONFIG_FILENAME)
            })
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_CONFIG_FILENAME))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        let ratio = self.merge.effective_ratio();
        if ratio <= 1.0 {
            tracing::warn!(
                ratio,
                "merge.ratio <= 1.0 preserves pages that are not longer than their replacement"
            );
        }

        if self.documents.primary.trim().is_empty() {
            return Err(FolioError::config("documents.primary must not be empty"));
        }

        if self.output.pages_dir.trim().is_empty() {
            return Err(FolioError::config("output.pages_dir must not be empty"));
        }

        self.parsed_category_overrides()?;
        Ok(())
    }

    /// Category overrides with names resolved.
    pub fn parsed_category_overrides(&self) -> Result<BTreeMap<String, Category>> {
        self.category_overrides
            .iter()
            .map(|(slug, name)| {
                name.parse::<Category>()
                    .map(|category| (slug.clone(), category))
                    .map_err(|e| FolioError::config(format!("category_overrides.{slug}: {e}")))
            })
            .collect()
    }

    /// Scan directories with a leading `~/` expanded.
    pub fn resolved_scan_dirs(&self) -> Vec<PathBuf> {
        self.scan_dirs.iter().map(String::as_str).map(expand_home).collect()
    }

    pub fn slug_table(&self) -> SlugRenames {
        SlugRenames::with_extra(&self.slug_renames)
    }

    pub fn categorizer(&self) -> Result<Categorizer> {
        Ok(Categorizer::with_overrides(&self.parsed_category_overrides()?))
    }

    pub fn merger(&self) -> Merger {
        Merger::from_mode(self.merge.mode, self.merge.ratio)
    }
}

/// Expand a leading `~/` (or a bare `~`) to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return home;
    }
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}
