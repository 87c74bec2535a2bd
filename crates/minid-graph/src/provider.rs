//! Source access abstraction.
//!
//! Discovery reads files through [`SourceProvider`] so the same pipeline runs
//! against the real file system ([`NativeProvider`]) or an in-memory project
//! ([`MemoryProvider`]) when embedded in a host tool or under test.

use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use path_clean::PathClean;
use walkdir::WalkDir;

use crate::registry::is_declaration_file;

/// Read-only view of the project sources.
pub trait SourceProvider {
    /// Read a file as UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Whether `path` names an existing regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Every ambient declaration file below `root`, in a stable order.
    fn declaration_files(&self, root: &Path) -> Vec<PathBuf>;
}

/// File-system backed provider.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeProvider;

impl SourceProvider for NativeProvider {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn declaration_files(&self, root: &Path) -> Vec<PathBuf> {
        WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| !is_in_node_modules(entry.path()))
            .map(|entry| entry.into_path().clean())
            .filter(|path| is_declaration_file(path))
            .collect()
    }
}

fn is_in_node_modules(path: &Path) -> bool {
    path.components()
        .any(|component| component.as_os_str() == "node_modules")
}

/// In-memory provider keyed by absolute path.
#[derive(Debug, Default, Clone)]
pub struct MemoryProvider {
    files: IndexMap<PathBuf, String>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with_file(mut self, path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, source: impl Into<String>) {
        self.files.insert(path.into().clean(), source.into());
    }
}

impl SourceProvider for MemoryProvider {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no in-memory file at {}", path.display()),
            )
        })
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn declaration_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = self
            .files
            .keys()
            .filter(|path| path.starts_with(root) && is_declaration_file(path))
            .cloned()
            .collect();
        found.sort();
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_provider_normalizes_paths() {
        let provider = MemoryProvider::new().with_file("/src/lib/../a.ts", "x");
        assert!(provider.is_file(Path::new("/src/a.ts")));
        assert_eq!(provider.read_to_string(Path::new("/src/a.ts")).unwrap(), "x");
    }

    #[test]
    fn memory_provider_lists_declaration_files_under_root() {
        let provider = MemoryProvider::new()
            .with_file("/src/types/b.d.ts", "")
            .with_file("/src/a.d.ts", "")
            .with_file("/src/main.ts", "")
            .with_file("/other/c.d.ts", "");
        let found = provider.declaration_files(Path::new("/src"));
        assert_eq!(
            found,
            vec![PathBuf::from("/src/a.d.ts"), PathBuf::from("/src/types/b.d.ts")]
        );
    }

    #[test]
    fn native_provider_skips_node_modules() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        std::fs::write(dir.path().join("node_modules/pkg/index.d.ts"), "").unwrap();
        std::fs::write(dir.path().join("env.d.ts"), "").unwrap();
        let found = NativeProvider.declaration_files(dir.path());
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("env.d.ts"));
    }
}
