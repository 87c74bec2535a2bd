//! Rename table for hosts that transform sources themselves.
//!
//! A bundler plugin or loader sees one file at a time. [`RenameTable`] runs
//! the whole pipeline on the first query, keeps the result, and answers
//! every later query from it. The pipeline runs at most once per table,
//! whether or not that run succeeded.

use std::path::{Path, PathBuf};

use minid_graph::{NativeProvider, SourceProvider};
use once_cell::sync::OnceCell;
use path_clean::PathClean;
use rustc_hash::FxHashMap;

use crate::error::{RenameError, Result};
use crate::pipeline::{analyze, RenameOptions, RenameReport};
use crate::plan::Substitution;
use crate::sink::MemorySink;

#[derive(Debug)]
struct TableEntry {
    original: String,
    rewritten: String,
    substitutions: Vec<Substitution>,
}

#[derive(Debug)]
struct TableData {
    files: FxHashMap<PathBuf, TableEntry>,
    report: RenameReport,
}

/// Lazily computed `path → offset → replacement` table.
#[derive(Debug)]
pub struct RenameTable<P: SourceProvider = NativeProvider> {
    options: RenameOptions,
    provider: P,
    data: OnceCell<std::result::Result<TableData, String>>,
}

impl RenameTable<NativeProvider> {
    pub fn new(options: RenameOptions) -> Self {
        Self::with_provider(options, NativeProvider)
    }
}

impl<P: SourceProvider> RenameTable<P> {
    pub fn with_provider(options: RenameOptions, provider: P) -> Self {
        Self {
            options,
            provider,
            data: OnceCell::new(),
        }
    }

    /// Whether the pipeline has already run.
    pub fn is_loaded(&self) -> bool {
        self.data.get().is_some()
    }

    fn data(&self) -> Result<&TableData> {
        let data = self.data.get_or_init(|| {
            tracing::debug!(src_dir = %self.options.src_dir.display(), "building rename table");
            self.load().map_err(|err| err.to_string())
        });
        data.as_ref().map_err(|message| RenameError::Unavailable(message.clone()))
    }

    fn load(&self) -> Result<TableData> {
        let analysis = analyze(&self.options, &self.provider)?;
        let mut sink = MemorySink::new();
        let report = analysis.emit(&self.options.out_dir, false, &mut sink)?;

        let mut files = FxHashMap::default();
        for file in analysis.project.registry.rewritable() {
            let Some(output) = sink.get(&file.relative) else {
                continue;
            };
            files.insert(
                file.path.clone(),
                TableEntry {
                    original: file.source.clone(),
                    rewritten: output.content.clone(),
                    substitutions: analysis.plan.for_file(file.id).to_vec(),
                },
            );
        }
        Ok(TableData { files, report })
    }

    fn key(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.clean()
        } else {
            self.options.src_dir.join(path).clean()
        }
    }

    /// The replacement for the identifier starting at `offset` in `path`.
    pub fn replacement(&self, path: impl AsRef<Path>, offset: u32) -> Result<Option<&str>> {
        let data = self.data()?;
        let Some(entry) = data.files.get(&self.key(path.as_ref())) else {
            return Ok(None);
        };
        Ok(entry
            .substitutions
            .binary_search_by_key(&offset, |substitution| substitution.offset)
            .ok()
            .map(|idx| entry.substitutions[idx].replacement.as_str()))
    }

    /// The renamed text of `path`, when `source` is the text that was
    /// analysed. Unknown files and stale sources yield `None`.
    pub fn rewrite(&self, path: impl AsRef<Path>, source: &str) -> Result<Option<&str>> {
        let data = self.data()?;
        let key = self.key(path.as_ref());
        let Some(entry) = data.files.get(&key) else {
            return Ok(None);
        };
        if entry.original != source {
            tracing::warn!(path = %key.display(), "source changed since the rename table was built");
            return Ok(None);
        }
        Ok(Some(entry.rewritten.as_str()))
    }

    pub fn report(&self) -> Result<RenameReport> {
        Ok(self.data()?.report)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io;

    use minid_graph::MemoryProvider;

    use super::*;

    /// Counts reads so tests can see how often the pipeline ran.
    struct CountingProvider {
        inner: MemoryProvider,
        reads: Cell<usize>,
    }

    impl SourceProvider for CountingProvider {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.reads.set(self.reads.get() + 1);
            self.inner.read_to_string(path)
        }

        fn is_file(&self, path: &Path) -> bool {
            self.inner.is_file(path)
        }

        fn declaration_files(&self, root: &Path) -> Vec<PathBuf> {
            self.inner.declaration_files(root)
        }
    }

    const INDEX: &str = "function localHelper() { return 1 }\nexport const value: number = localHelper();\n";

    fn table() -> RenameTable<CountingProvider> {
        let provider = CountingProvider {
            inner: MemoryProvider::new().with_file("/src/index.ts", INDEX),
            reads: Cell::new(0),
        };
        let options = RenameOptions::new("/src", "/out", ["index.ts"]).with_obfuscate(true);
        RenameTable::with_provider(options, provider)
    }

    #[test]
    fn runs_the_pipeline_once() {
        let table = table();
        assert!(!table.is_loaded());
        let offset = INDEX.find("localHelper").unwrap() as u32;
        assert!(table.replacement("/src/index.ts", offset).unwrap().is_some());
        let reads = table.provider.reads.get();
        assert!(table.rewrite("index.ts", INDEX).unwrap().is_some());
        assert_eq!(table.provider.reads.get(), reads);
        assert!(table.is_loaded());
    }

    #[test]
    fn rewrite_matches_replacements() {
        let table = table();
        let rewritten = table.rewrite("/src/index.ts", INDEX).unwrap().unwrap();
        assert!(!rewritten.contains("localHelper"));
        assert!(rewritten.contains("export const value"));

        let value = INDEX.find("value").unwrap() as u32;
        assert_eq!(table.replacement("/src/index.ts", value).unwrap(), None);
    }

    #[test]
    fn stale_sources_are_not_rewritten() {
        let table = table();
        assert_eq!(table.rewrite("/src/index.ts", "changed").unwrap(), None);
        assert_eq!(table.rewrite("/src/other.ts", INDEX).unwrap(), None);
    }

    #[test]
    fn failures_are_cached() {
        let options = RenameOptions::new("/src", "/out", ["missing.ts"]);
        let table = RenameTable::with_provider(options, MemoryProvider::new());
        assert!(matches!(table.replacement("/src/a.ts", 0), Err(RenameError::Unavailable(_))));
        assert!(table.is_loaded());
        assert!(matches!(table.report(), Err(RenameError::Unavailable(_))));
    }
}
