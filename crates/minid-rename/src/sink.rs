//! Output destinations.
//!
//! The pipeline hands every file to an [`OutputSink`] once analysis has
//! finished. [`FsSink`] mirrors the project under a destination directory;
//! [`MemorySink`] keeps everything in memory for hosts that transform
//! sources themselves.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use path_clean::PathClean;

use crate::error::{RenameError, Result};

/// Receives the files of one run. `relative` is the file's path relative to
/// the source root.
pub trait OutputSink {
    /// A renamed file, with its source map JSON when maps are enabled.
    fn write_rewritten(&mut self, source: &Path, relative: &Path, content: &str, map: Option<&str>) -> Result<()>;

    /// A copy-only file, passed through verbatim.
    fn copy_through(&mut self, source: &Path, relative: &Path, content: &str) -> Result<()>;
}

/// `<name>.map` next to `path`.
pub fn map_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".map");
    path.with_file_name(name)
}

/// Mirrors files under `out_dir`, creating parent directories as needed.
#[derive(Debug, Clone)]
pub struct FsSink {
    out_dir: PathBuf,
}

impl FsSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into().clean(),
        }
    }

    pub fn destination(&self, relative: &Path) -> PathBuf {
        self.out_dir.join(relative).clean()
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| RenameError::io(parent, err))?;
        }
        fs::write(path, content).map_err(|err| RenameError::io(path, err))
    }
}

impl OutputSink for FsSink {
    fn write_rewritten(&mut self, _source: &Path, relative: &Path, content: &str, map: Option<&str>) -> Result<()> {
        let dest = self.destination(relative);
        self.write(&dest, content)?;
        if let Some(map) = map {
            self.write(&map_path(&dest), map)?;
        }
        tracing::trace!(dest = %dest.display(), "rewritten file written");
        Ok(())
    }

    fn copy_through(&mut self, _source: &Path, relative: &Path, content: &str) -> Result<()> {
        let dest = self.destination(relative);
        self.write(&dest, content)?;
        tracing::trace!(dest = %dest.display(), "file copied");
        Ok(())
    }
}

/// One collected output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    /// Absolute path of the input file.
    pub source: PathBuf,
    pub content: String,
    pub map: Option<String>,
    pub rewritten: bool,
}

/// Collects outputs keyed by relative path, in write order.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    files: IndexMap<PathBuf, OutputFile>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, relative: impl AsRef<Path>) -> Option<&OutputFile> {
        self.files.get(relative.as_ref())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &OutputFile)> {
        self.files.iter().map(|(path, file)| (path.as_path(), file))
    }

    pub fn into_files(self) -> IndexMap<PathBuf, OutputFile> {
        self.files
    }
}

impl OutputSink for MemorySink {
    fn write_rewritten(&mut self, source: &Path, relative: &Path, content: &str, map: Option<&str>) -> Result<()> {
        self.files.insert(
            relative.to_path_buf(),
            OutputFile {
                source: source.to_path_buf(),
                content: content.to_string(),
                map: map.map(str::to_string),
                rewritten: true,
            },
        );
        Ok(())
    }

    fn copy_through(&mut self, source: &Path, relative: &Path, content: &str) -> Result<()> {
        self.files.insert(
            relative.to_path_buf(),
            OutputFile {
                source: source.to_path_buf(),
                content: content.to_string(),
                map: None,
                rewritten: false,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn map_path_appends_suffix() {
        assert_eq!(map_path(Path::new("/out/lib/a.ts")), PathBuf::from("/out/lib/a.ts.map"));
    }

    #[test]
    fn fs_sink_mirrors_nested_paths() {
        let temp = TempDir::new().unwrap();
        let mut sink = FsSink::new(temp.path());
        sink.write_rewritten(Path::new("/src/lib/a.ts"), Path::new("lib/a.ts"), "let a;", Some("{}"))
            .unwrap();
        sink.copy_through(Path::new("/src/env.d.ts"), Path::new("env.d.ts"), "declare const X: 1;")
            .unwrap();

        assert_eq!(fs::read_to_string(temp.path().join("lib/a.ts")).unwrap(), "let a;");
        assert_eq!(fs::read_to_string(temp.path().join("lib/a.ts.map")).unwrap(), "{}");
        assert!(temp.path().join("env.d.ts").is_file());
        assert!(!temp.path().join("env.d.ts.map").exists());
    }

    #[test]
    fn memory_sink_keeps_write_order() {
        let mut sink = MemorySink::new();
        sink.write_rewritten(Path::new("/src/b.ts"), Path::new("b.ts"), "b", None).unwrap();
        sink.copy_through(Path::new("/src/a.d.ts"), Path::new("a.d.ts"), "a").unwrap();

        let order: Vec<&Path> = sink.iter().map(|(path, _)| path).collect();
        assert_eq!(order, vec![Path::new("b.ts"), Path::new("a.d.ts")]);
        assert!(sink.get("b.ts").unwrap().rewritten);
        assert!(!sink.get("a.d.ts").unwrap().rewritten);
    }
}
