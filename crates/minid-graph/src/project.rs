//! Project discovery.
//!
//! Starting from the interface files, follow every relative module
//! specifier breadth-first, indexing each file as it is reached. Ambient
//! declaration files under the root are registered as copy-only regardless
//! of whether anything imports them.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use rustc_hash::FxHashMap;

use crate::index::{index_file, FileIndex};
use crate::oracle::ProjectIndex;
use crate::provider::SourceProvider;
use crate::registry::{FileId, FileRegistry};
use crate::resolve::{ModuleResolver, ModuleTarget, Resolution};
use crate::{GraphError, Result};

/// Inputs for [`Project::load`].
#[derive(Debug, Clone)]
pub struct ProjectOptions {
    pub root: PathBuf,
    /// Interface files, relative to `root` or absolute.
    pub interfaces: Vec<PathBuf>,
    /// Extension search order; empty keeps the default order.
    pub extensions: Vec<String>,
}

impl ProjectOptions {
    pub fn new<I, P>(root: impl Into<PathBuf>, interfaces: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            root: root.into(),
            interfaces: interfaces.into_iter().map(Into::into).collect(),
            extensions: Vec::new(),
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }
}

/// Every file of a run, indexed and linked.
#[derive(Debug)]
pub struct Project {
    pub registry: FileRegistry,
    pub index: ProjectIndex,
    pub interfaces: Vec<FileId>,
    /// Project modules loaded through `import()` or `require()`; their
    /// exports are public in the same way as an interface file's.
    pub dynamic_targets: Vec<FileId>,
}

impl Project {
    #[tracing::instrument(skip_all, fields(root = %options.root.display()))]
    pub fn load(options: &ProjectOptions, provider: &dyn SourceProvider) -> Result<Self> {
        let root = options.root.clean();
        let resolver = ModuleResolver::new(&root).with_extensions(&options.extensions);
        let mut registry = FileRegistry::new(&root);
        let mut queue = VecDeque::new();

        let mut interfaces = Vec::with_capacity(options.interfaces.len());
        for interface in &options.interfaces {
            let path = root.join(interface).clean();
            if !provider.is_file(&path) {
                return Err(GraphError::InterfaceNotFound(path));
            }
            let id = register(&mut registry, provider, path, &mut queue)?;
            interfaces.push(id);
        }

        for path in provider.declaration_files(&root) {
            register(&mut registry, provider, path, &mut queue)?;
        }

        let mut files: Vec<FileIndex> = Vec::new();
        let mut links = FxHashMap::default();
        let mut dynamic_targets = Vec::new();

        while let Some(id) = queue.pop_front() {
            let (path, index) = {
                let file = registry.get(id);
                (file.path.clone(), index_file(id, &file.path, &file.source)?)
            };

            for specifier in &index.specifiers {
                let key = (id, specifier.clone());
                if links.contains_key(&key) {
                    continue;
                }
                match resolver.resolve(specifier, &path, provider) {
                    Resolution::Local(found) => {
                        let target = register(&mut registry, provider, found, &mut queue)?;
                        links.insert(key, ModuleTarget::Project(target));
                    }
                    Resolution::External => {
                        links.insert(key, ModuleTarget::External);
                    }
                    Resolution::Unresolved(candidate) => {
                        tracing::warn!(
                            from = %path.display(),
                            specifier = %specifier,
                            candidate = %candidate.display(),
                            "unresolved relative import; its bindings stay fixed"
                        );
                    }
                }
            }

            for specifier in &index.dynamic_imports {
                if let Some(ModuleTarget::Project(target)) = links.get(&(id, specifier.clone())) {
                    if !dynamic_targets.contains(target) {
                        dynamic_targets.push(*target);
                    }
                }
            }

            debug_assert_eq!(files.len(), id.index());
            files.push(index);
        }

        tracing::debug!(
            files = registry.len(),
            rewritable = registry.rewritable().count(),
            copy_only = registry.copy_only().count(),
            links = links.len(),
            "project discovered"
        );

        Ok(Self {
            registry,
            index: ProjectIndex::new(files, links),
            interfaces,
            dynamic_targets,
        })
    }

    pub fn file_index(&self, id: FileId) -> &FileIndex {
        self.index.file(id)
    }

    pub fn source(&self, id: FileId) -> &str {
        &self.registry.get(id).source
    }

    pub fn path(&self, id: FileId) -> &Path {
        &self.registry.get(id).path
    }
}

/// Register `path`, reading it once, and queue it for indexing when new.
fn register(
    registry: &mut FileRegistry,
    provider: &dyn SourceProvider,
    path: PathBuf,
    queue: &mut VecDeque<FileId>,
) -> Result<FileId> {
    if let Some(id) = registry.id_of(&path) {
        return Ok(id);
    }
    let source = provider
        .read_to_string(&path)
        .map_err(|source| GraphError::Io {
            path: path.clone(),
            source,
        })?;
    let id = registry.register(path, source);
    queue.push_back(id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryProvider;

    #[test]
    fn follows_relative_specifiers_and_registers_declarations() {
        let provider = MemoryProvider::new()
            .with_file("/src/index.ts", "import { a } from './lib/a.js';\nimport 'left-pad';\nexport const x = a;")
            .with_file("/src/lib/a.ts", "export const a = 1;")
            .with_file("/src/unused.ts", "export const never = 1;")
            .with_file("/src/types/globals.d.ts", "declare const VERSION: string;");

        let project = Project::load(&ProjectOptions::new("/src", ["index.ts"]), &provider).unwrap();
        assert_eq!(project.registry.len(), 3);
        assert!(project.registry.contains(Path::new("/src/lib/a.ts")));
        assert!(!project.registry.contains(Path::new("/src/unused.ts")));
        assert_eq!(project.registry.copy_only().count(), 1);

        let index_id = project.interfaces[0];
        let lib = project.registry.id_of(Path::new("/src/lib/a.ts")).unwrap();
        assert_eq!(
            project.index.module_target(index_id, "./lib/a.js"),
            Some(ModuleTarget::Project(lib))
        );
        assert_eq!(
            project.index.module_target(index_id, "left-pad"),
            Some(ModuleTarget::External)
        );
    }

    #[test]
    fn missing_interface_is_an_error() {
        let provider = MemoryProvider::new();
        let err = Project::load(&ProjectOptions::new("/src", ["index.ts"]), &provider).unwrap_err();
        assert!(matches!(err, GraphError::InterfaceNotFound(_)));
    }

    #[test]
    fn unresolved_relative_imports_are_not_links() {
        let provider = MemoryProvider::new().with_file("/src/index.ts", "import { gone } from './gone';\nexport { gone };");
        let project = Project::load(&ProjectOptions::new("/src", ["index.ts"]), &provider).unwrap();
        assert_eq!(project.registry.len(), 1);
        assert_eq!(project.index.module_target(project.interfaces[0], "./gone"), None);
    }

    #[test]
    fn dynamic_imports_are_recorded_as_targets() {
        let provider = MemoryProvider::new()
            .with_file("/src/index.ts", "export async function load() { return import('./lazy') }")
            .with_file("/src/lazy.ts", "export function heavy() {}");
        let project = Project::load(&ProjectOptions::new("/src", ["index.ts"]), &provider).unwrap();
        let lazy = project.registry.id_of(Path::new("/src/lazy.ts")).unwrap();
        assert_eq!(project.dynamic_targets, vec![lazy]);
    }

    #[test]
    fn syntax_errors_abort_loading() {
        let provider = MemoryProvider::new()
            .with_file("/src/index.ts", "import './broken';")
            .with_file("/src/broken.ts", "export const = 1;");
        let err = Project::load(&ProjectOptions::new("/src", ["index.ts"]), &provider).unwrap_err();
        assert!(matches!(err, GraphError::Syntax { .. }));
    }
}
