//! Document store
//!
//! The core never touches the filesystem directly; discovery, reads and
//! writes go through [`DocumentStore`].

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use walkdir::WalkDir;

/// Filesystem collaborator interface
///
/// Implementations:
/// - `FsStore` - real filesystem
/// - `DryRunStore` - reads through to another store, captures writes
/// - `MemoryStore` - in-memory tree for tests and embedding
pub trait DocumentStore: Send + Sync {
    /// Immediate children of `root`, sorted. A missing root has none.
    fn list(&self, root: &Path) -> Vec<PathBuf>;

    /// Text of `location/name`, or `None` if absent or unreadable.
    fn read(&self, location: &Path, name: &str) -> Option<String>;

    /// Whether `location/name` exists as a document.
    fn exists(&self, location: &Path, name: &str) -> bool;

    /// Replace the whole file at `path`, creating parent directories.
    fn write(&self, path: &Path, text: &str) -> io::Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Filesystem
// ─────────────────────────────────────────────────────────────────────────────

/// Store backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl DocumentStore for FsStore {
    fn list(&self, root: &Path) -> Vec<PathBuf> {
        WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.into_path()),
                Err(err) => {
                    tracing::debug!(root = %root.display(), error = %err, "Skipping unreadable entry");
                    None
                }
            })
            .collect()
    }

    fn read(&self, location: &Path, name: &str) -> Option<String> {
        let path = location.join(name);
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Failed to read document");
                None
            }
        }
    }

    fn exists(&self, location: &Path, name: &str) -> bool {
        location.join(name).is_file()
    }

    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dry run
// ─────────────────────────────────────────────────────────────────────────────

/// Reads from an inner store; writes are recorded instead of performed.
#[derive(Debug)]
pub struct DryRunStore<S> {
    inner: S,
    writes: RwLock<Vec<(PathBuf, String)>>,
}

impl<S: DocumentStore> DryRunStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            writes: RwLock::new(Vec::new()),
        }
    }

    /// Captured writes in the order they were requested.
    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        self.writes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<S: DocumentStore> DocumentStore for DryRunStore<S> {
    fn list(&self, root: &Path) -> Vec<PathBuf> {
        self.inner.list(root)
    }

    fn read(&self, location: &Path, name: &str) -> Option<String> {
        self.inner.read(location, name)
    }

    fn exists(&self, location: &Path, name: &str) -> bool {
        self.inner.exists(location, name)
    }

    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        self.writes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((path.to_path_buf(), text.to_string()));
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In memory
// ─────────────────────────────────────────────────────────────────────────────

/// Path-keyed in-memory document tree.
///
/// Directories exist implicitly as prefixes of stored files. Writes under a
/// denied prefix fail with `PermissionDenied`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RwLock<BTreeMap<PathBuf, String>>,
    denied: Vec<PathBuf>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file (builder style).
    pub fn with_file(self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    /// Make every write under `prefix` fail.
    pub fn deny_writes_under(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.denied.push(prefix.into());
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), text.into());
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path.as_ref())
            .cloned()
    }

    /// Every stored path, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

impl DocumentStore for MemoryStore {
    fn list(&self, root: &Path) -> Vec<PathBuf> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let children: BTreeSet<PathBuf> = files
            .keys()
            .filter_map(|path| path.strip_prefix(root).ok())
            .filter_map(|rest| match rest.components().next() {
                Some(Component::Normal(child)) => Some(root.join(child)),
                _ => None,
            })
            .collect();
        children.into_iter().collect()
    }

    fn read(&self, location: &Path, name: &str) -> Option<String> {
        self.get(location.join(name))
    }

    fn exists(&self, location: &Path, name: &str) -> bool {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&location.join(name))
    }

    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        if self.denied.iter().any(|prefix| path.starts_with(prefix)) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("writes denied under {}", path.display()),
            ));
        }
        self.insert(path, text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fs_store_lists_sorted_children() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("zeta")).unwrap();
        fs::create_dir_all(dir.path().join("alpha/nested")).unwrap();
        fs::write(dir.path().join("beta.md"), "x").unwrap();

        let names: Vec<String> = FsStore
            .list(dir.path())
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        assert_eq!(names, vec!["alpha", "beta.md", "zeta"]);
        assert!(FsStore.list(&dir.path().join("missing")).is_empty());
    }

    #[test]
    fn test_fs_store_read_write_exists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/projects/x.md");
        FsStore.write(&path, "page").unwrap();
        assert!(FsStore.exists(dir.path(), "out/projects/x.md"));
        assert_eq!(FsStore.read(dir.path(), "out/projects/x.md"), Some("page".into()));
        assert_eq!(FsStore.read(dir.path(), "out/projects/y.md"), None);
        assert!(!FsStore.exists(dir.path(), "out/projects"));
    }

    #[test]
    fn test_dry_run_captures_writes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "on disk").unwrap();
        let store = DryRunStore::new(FsStore);

        assert_eq!(store.read(dir.path(), "a.md"), Some("on disk".into()));
        store.write(&dir.path().join("b.md"), "new").unwrap();

        assert!(!dir.path().join("b.md").exists());
        assert_eq!(store.writes(), vec![(dir.path().join("b.md"), "new".to_string())]);
    }

    #[test]
    fn test_memory_store_lists_immediate_children() {
        let store = MemoryStore::new()
            .with_file("/scan/netvis/.planning/PROJECT.md", "# Netvis")
            .with_file("/scan/radar/.planning/PROJECT.md", "# Radar")
            .with_file("/scan/notes.md", "notes")
            .with_file("/elsewhere/x.md", "x");
        assert_eq!(
            store.list(Path::new("/scan")),
            vec![
                PathBuf::from("/scan/netvis"),
                PathBuf::from("/scan/notes.md"),
                PathBuf::from("/scan/radar"),
            ]
        );
        assert!(store.exists(Path::new("/scan/netvis"), ".planning/PROJECT.md"));
        assert!(!store.exists(Path::new("/scan/netvis"), ".planning/STATE.md"));
    }

    #[test]
    fn test_memory_store_denied_writes() {
        let store = MemoryStore::new().deny_writes_under("/out/projects");
        let err = store.write(Path::new("/out/projects/x.md"), "x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(store.write(Path::new("/out/projects.md"), "index").is_ok());
        assert_eq!(store.get("/out/projects.md"), Some("index".into()));
    }
}
