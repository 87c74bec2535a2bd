//! File registry.
//!
//! Every discovered file gets a stable zero-based [`FileId`] in discovery
//! order. A file is either *rewritable* (project source that will be renamed)
//! or *copy-only* (an ambient declaration file that is passed through
//! verbatim).

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Stable index of a file within one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A discovered source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: FileId,
    /// Absolute, lexically normalized path.
    pub path: PathBuf,
    /// Path relative to the source root; mirrored under the destination root.
    pub relative: PathBuf,
    pub is_rewritable: bool,
    pub source: String,
}

/// Ordered set of the files taking part in a run.
#[derive(Debug, Default)]
pub struct FileRegistry {
    root: PathBuf,
    files: IndexMap<PathBuf, SourceFile>,
}

impl FileRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: IndexMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Register a file, returning the existing id if it is already known.
    pub fn register(&mut self, path: PathBuf, source: String) -> FileId {
        if let Some(existing) = self.files.get(&path) {
            return existing.id;
        }
        let id = FileId::new(self.files.len());
        let relative = path
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.file_name().map(PathBuf::from).unwrap_or_default());
        let is_rewritable = !is_declaration_file(&path);
        self.files.insert(
            path.clone(),
            SourceFile {
                id,
                path,
                relative,
                is_rewritable,
                source,
            },
        );
        id
    }

    pub fn id_of(&self, path: &Path) -> Option<FileId> {
        self.files.get(path).map(|file| file.id)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    pub fn get(&self, id: FileId) -> &SourceFile {
        &self.files[id.index()]
    }

    pub fn is_rewritable(&self, id: FileId) -> bool {
        self.get(id).is_rewritable
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.values()
    }

    pub fn rewritable(&self) -> impl Iterator<Item = &SourceFile> {
        self.iter().filter(|file| file.is_rewritable)
    }

    pub fn copy_only(&self) -> impl Iterator<Item = &SourceFile> {
        self.iter().filter(|file| !file.is_rewritable)
    }
}

/// Ambient declaration files (`.d.ts`, `.d.mts`, `.d.cts`) are never rewritten.
pub fn is_declaration_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    name.ends_with(".d.ts") || name.ends_with(".d.mts") || name.ends_with(".d.cts")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_ids_in_discovery_order() {
        let mut registry = FileRegistry::new("/src");
        let a = registry.register(PathBuf::from("/src/a.ts"), String::new());
        let b = registry.register(PathBuf::from("/src/lib/b.ts"), String::new());
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(registry.get(b).relative, PathBuf::from("lib/b.ts"));
    }

    #[test]
    fn registering_twice_returns_same_id() {
        let mut registry = FileRegistry::new("/src");
        let first = registry.register(PathBuf::from("/src/a.ts"), "1".into());
        let second = registry.register(PathBuf::from("/src/a.ts"), "2".into());
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(first).source, "1");
    }

    #[test]
    fn declaration_files_are_copy_only() {
        let mut registry = FileRegistry::new("/src");
        let dts = registry.register(PathBuf::from("/src/globals.d.ts"), String::new());
        let ts = registry.register(PathBuf::from("/src/main.ts"), String::new());
        assert!(!registry.is_rewritable(dts));
        assert!(registry.is_rewritable(ts));
        assert_eq!(registry.copy_only().count(), 1);
        assert_eq!(registry.rewritable().count(), 1);
    }
}
