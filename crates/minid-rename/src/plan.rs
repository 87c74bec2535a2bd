//! Rename plans: the per-file list of substitutions to apply.

use minid_graph::{FileId, FileRegistry, RefGraph};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::allocator::Allocation;

/// Replace `original_len` bytes at `offset` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Substitution {
    pub offset: u32,
    pub original_len: u32,
    pub replacement: String,
}

impl Substitution {
    pub fn end(&self) -> usize {
        self.offset as usize + self.original_len as usize
    }
}

/// Substitutions for every rewritable file, each list ordered by offset.
#[derive(Debug, Default)]
pub struct RenamePlan {
    files: FxHashMap<FileId, Vec<Substitution>>,
}

impl RenamePlan {
    /// Collect one substitution per occurrence of every renamed class.
    pub fn build(graph: &RefGraph, allocation: &Allocation, registry: &FileRegistry) -> Self {
        let mut files: FxHashMap<FileId, Vec<Substitution>> = FxHashMap::default();

        for (root, name) in allocation.iter() {
            let node = graph.node(root);
            let replacement = if node.name.starts_with('#') {
                format!("#{name}")
            } else {
                name.to_string()
            };
            if replacement == node.name {
                continue;
            }
            for occurrence in &node.occurrences {
                if !registry.is_rewritable(occurrence.key.file) {
                    continue;
                }
                files
                    .entry(occurrence.key.file)
                    .or_default()
                    .push(Substitution {
                        offset: occurrence.key.offset,
                        original_len: occurrence.len,
                        replacement: replacement.clone(),
                    });
            }
        }

        for substitutions in files.values_mut() {
            substitutions.sort_by_key(|substitution| substitution.offset);
            substitutions.dedup_by_key(|substitution| substitution.offset);
        }
        Self { files }
    }

    pub fn for_file(&self, file: FileId) -> &[Substitution] {
        self.files.get(&file).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total number of substitutions.
    pub fn len(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.files.values().all(Vec::is_empty)
    }
}
