//! Name allocation.
//!
//! Every live, non-fixed class receives the shortest candidate that is not
//! reserved, not taken in any file the class touches and, for structural
//! member classes, not taken anywhere in the project's member namespace.
//! Classes are served by occurrence count, so the most frequent identifiers
//! get the shortest names.

use minid_graph::{ExternalNames, FileId, RefFlags, RefGraph, RefId};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::names::{candidate, is_reserved, NameClass};

/// Allocator policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocatorOptions {
    /// Skip lexical coalescing and allow renaming `$`-prefixed names.
    pub obfuscate: bool,
}

/// Names committed so far, per file and in the member namespace.
#[derive(Debug, Default)]
pub struct ExclusionSets {
    per_file: FxHashMap<FileId, FxHashSet<String>>,
    signature: FxHashSet<String>,
}

impl ExclusionSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_taken_in(&self, file: FileId, name: &str) -> bool {
        self.per_file
            .get(&file)
            .is_some_and(|names| names.contains(name))
    }

    pub fn is_signature_taken(&self, name: &str) -> bool {
        self.signature.contains(name)
    }

    /// Whether `name` may be given to a class touching `files`.
    pub fn admits(&self, name: &str, files: &[FileId], signature: bool) -> bool {
        if is_reserved(name) {
            return false;
        }
        if signature && self.signature.contains(name) {
            return false;
        }
        !files.iter().any(|&file| self.is_taken_in(file, name))
    }

    pub fn commit(&mut self, name: &str, files: &[FileId], signature: bool) {
        for &file in files {
            self.per_file
                .entry(file)
                .or_default()
                .insert(name.to_string());
        }
        if signature {
            self.signature.insert(name.to_string());
        }
    }

    fn commit_file(&mut self, file: FileId, name: &str) {
        self.per_file
            .entry(file)
            .or_default()
            .insert(name.to_string());
    }

    fn commit_signature(&mut self, name: &str) {
        self.signature.insert(name.to_string());
    }
}

/// Chosen names, keyed by class root.
#[derive(Debug, Default)]
pub struct Allocation {
    names: FxHashMap<RefId, String>,
    /// Live classes after coalescing.
    pub classes: usize,
    /// Live classes left untouched.
    pub fixed: usize,
}

impl Allocation {
    /// New spelling for the class rooted at `root`, without any `#` prefix.
    pub fn name_of(&self, root: RefId) -> Option<&str> {
        self.names.get(&root).map(String::as_str)
    }

    pub fn renamed(&self) -> usize {
        self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RefId, &str)> {
        self.names.iter().map(|(&id, name)| (id, name.as_str()))
    }
}

/// Per-run allocator state.
pub struct NameAllocator<'g> {
    graph: &'g mut RefGraph,
    external: &'g ExternalNames,
    options: AllocatorOptions,
    exclusions: ExclusionSets,
}

impl<'g> NameAllocator<'g> {
    pub fn new(graph: &'g mut RefGraph, external: &'g ExternalNames, options: AllocatorOptions) -> Self {
        Self {
            graph,
            external,
            options,
            exclusions: ExclusionSets::new(),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(obfuscate = self.options.obfuscate))]
    pub fn allocate(mut self) -> Allocation {
        if !self.options.obfuscate {
            self.canonicalize();
        }
        self.preregister();

        let mut units: Vec<RefId> = self
            .graph
            .roots()
            .filter(|&root| !self.graph.node(root).is_fixed())
            .collect();
        units.sort_by(|&a, &b| {
            let na = self.graph.node(a);
            let nb = self.graph.node(b);
            nb.occurrences
                .len()
                .cmp(&na.occurrences.len())
                .then(na.key.cmp(&nb.key))
        });

        let mut allocation = Allocation {
            classes: self.graph.roots().count(),
            ..Allocation::default()
        };
        allocation.fixed = allocation.classes - units.len();

        for root in units {
            let node = self.graph.node(root);
            let files = touched_files(self.graph, root);
            let signature = node.flags.contains(RefFlags::SIGNATURE);
            let class = if node.flags.contains(RefFlags::JSX_COMPONENT) {
                NameClass::Component
            } else {
                NameClass::Ordinary
            };

            let name = (0u64..)
                .map(|n| candidate(n, class))
                .find(|name| self.exclusions.admits(name, &files, signature))
                .unwrap_or_default();
            tracing::trace!(from = %node.name, to = %name, occurrences = node.occurrences.len(), "name allocated");

            self.exclusions.commit(&name, &files, signature);
            allocation.names.insert(root, name);
        }

        tracing::debug!(
            classes = allocation.classes,
            fixed = allocation.fixed,
            renamed = allocation.renamed(),
            "names allocated"
        );
        allocation
    }

    /// Lexical coalescing: same-spelled free classes share one name, and
    /// `$`-prefixed names are left alone.
    fn canonicalize(&mut self) {
        let mut by_name: FxHashMap<String, RefId> = FxHashMap::default();
        let roots: Vec<RefId> = self.graph.roots().collect();
        for root in roots {
            let node = self.graph.node(root);
            if node.is_fixed() {
                continue;
            }
            if node.name.starts_with('$') {
                self.graph.mark(root, RefFlags::FIXED);
                continue;
            }
            match by_name.get(&node.name).copied() {
                Some(existing) => {
                    let merged = self.graph.union(existing, root);
                    let name = self.graph.node(merged).name.clone();
                    by_name.insert(name, merged);
                }
                None => {
                    by_name.insert(node.name.clone(), root);
                }
            }
        }
    }

    fn preregister(&mut self) {
        let fixed: Vec<RefId> = self
            .graph
            .roots()
            .filter(|&root| self.graph.node(root).is_fixed())
            .collect();
        for root in fixed {
            let node = self.graph.node(root);
            let name = bare(&node.name);
            for file in touched_files(self.graph, root) {
                self.exclusions.commit_file(file, name);
            }
            if node.flags.contains(RefFlags::SIGNATURE) {
                self.exclusions.commit_signature(name);
            }
        }

        for (&file, names) in &self.external.per_file {
            for name in names {
                self.exclusions.commit_file(file, name);
            }
        }
        for name in &self.external.members {
            self.exclusions.commit_signature(bare(name));
        }
    }
}

/// Allocate names for every free class of `graph`.
pub fn allocate_names(graph: &mut RefGraph, external: &ExternalNames, options: AllocatorOptions) -> Allocation {
    NameAllocator::new(graph, external, options).allocate()
}

fn bare(name: &str) -> &str {
    name.strip_prefix('#').unwrap_or(name)
}

fn touched_files(graph: &RefGraph, root: RefId) -> Vec<FileId> {
    let mut files: Vec<FileId> = graph
        .node(root)
        .occurrences
        .iter()
        .map(|occurrence| occurrence.key.file)
        .collect();
    files.sort_unstable();
    files.dedup();
    files
}
