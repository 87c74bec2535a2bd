//! Semantic queries over the indexed project.
//!
//! [`SemanticOracle`] is the seam between the reference graph and the
//! language front end. [`ProjectIndex`] answers it from the per-file
//! [`FileIndex`] records plus the resolved module links; a host with a full
//! type checker can substitute its own implementation.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::index::{
    DeclFlags, DeclKind, Declaration, ExportTarget, FileIndex, ImportBinding, ImportedName,
    OccurrenceKey,
};
use crate::registry::FileId;
use crate::resolve::ModuleTarget;

/// One spelling of a declaration's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub key: OccurrenceKey,
    /// Byte length of the spelled name.
    pub len: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExportKind {
    /// Backed by a declaration in the project.
    Declaration,
    /// `export * as name from "./module"`.
    Namespace(FileId),
    /// Re-exported from a package or a file outside the project.
    External,
    /// Re-exported from a relative module that does not exist.
    Unresolved,
}

/// A name visible from outside a module.
#[derive(Debug, Clone, Serialize)]
pub struct ExportBinding {
    pub name: String,
    /// File that spells the exported name.
    pub file: FileId,
    /// The exported-name token, when it is an identifier.
    pub key: Option<OccurrenceKey>,
    /// The declaration the chain ends at.
    pub declaration: Option<OccurrenceKey>,
    /// The exported name differs from the declared name.
    pub is_alias: bool,
    pub kind: ExportKind,
}

/// What an import or re-export binding stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasTarget {
    /// A named export of a project module.
    Export {
        key: Option<OccurrenceKey>,
        declaration: Option<OccurrenceKey>,
        imported: String,
    },
    /// A binding of a module the tool cannot see.
    External { imported: String },
    /// A default import of a project module: an independent local name.
    Local,
    /// A namespace import or `export * as` of a project module.
    Namespace(FileId),
    /// A relative module or export name that does not exist.
    Unresolved,
    /// The key is not an import or re-export binding.
    NotAlias,
}

/// Semantic queries consumed by the graph builder and the surface tracer.
pub trait SemanticOracle {
    /// Every spelling of the symbol declared at `decl` within its file.
    fn occurrences_of(&self, decl: OccurrenceKey) -> Vec<Occurrence>;

    /// Member declarations of a class, interface, enum or namespace.
    fn members_of(&self, ty: OccurrenceKey) -> Vec<OccurrenceKey>;

    /// Project declarations named in `extends` and `implements`.
    fn base_types_of(&self, ty: OccurrenceKey) -> Vec<OccurrenceKey>;

    /// Whether `ty` derives from something outside the project.
    fn has_opaque_base(&self, ty: OccurrenceKey) -> bool;

    /// Exports of `file`, with `export *` expanded.
    fn exports_of(&self, file: FileId) -> Vec<ExportBinding>;

    /// Follow an import or re-export binding to its target.
    fn resolve_alias(&self, binding: OccurrenceKey) -> AliasTarget;

    fn declaration(&self, key: OccurrenceKey) -> Option<&Declaration>;

    /// Declarations of a file-local symbol.
    fn symbol_declarations(&self, file: FileId, symbol: u32) -> Vec<OccurrenceKey>;
}

/// [`SemanticOracle`] over the indexed files of one project.
#[derive(Debug)]
pub struct ProjectIndex {
    files: Vec<FileIndex>,
    links: FxHashMap<(FileId, String), ModuleTarget>,
    exports: Vec<Vec<ExportBinding>>,
}

impl ProjectIndex {
    /// `files` must be ordered by [`FileId`].
    pub fn new(files: Vec<FileIndex>, links: FxHashMap<(FileId, String), ModuleTarget>) -> Self {
        let mut index = Self {
            files,
            links,
            exports: Vec::new(),
        };
        let mut memo: FxHashMap<FileId, Vec<ExportBinding>> = FxHashMap::default();
        let mut visiting = FxHashSet::default();
        for file in 0..index.files.len() {
            index.collect_exports(FileId::new(file), &mut visiting, &mut memo);
        }
        index.exports = (0..index.files.len())
            .map(|file| memo.remove(&FileId::new(file)).unwrap_or_default())
            .collect();
        index
    }

    pub fn file(&self, id: FileId) -> &FileIndex {
        &self.files[id.index()]
    }

    pub fn files(&self) -> impl Iterator<Item = &FileIndex> {
        self.files.iter()
    }

    pub fn module_target(&self, from: FileId, specifier: &str) -> Option<ModuleTarget> {
        self.links.get(&(from, specifier.to_string())).copied()
    }

    /// Look up a named export of `file`.
    pub fn export_named(&self, file: FileId, name: &str) -> Option<&ExportBinding> {
        self.exports[file.index()].iter().find(|binding| binding.name == name)
    }

    fn declared_name(&self, key: OccurrenceKey) -> Option<&str> {
        self.declaration(key).map(|decl| decl.name.as_str())
    }

    fn collect_exports(
        &self,
        file: FileId,
        visiting: &mut FxHashSet<FileId>,
        memo: &mut FxHashMap<FileId, Vec<ExportBinding>>,
    ) -> Vec<ExportBinding> {
        if let Some(done) = memo.get(&file) {
            return done.clone();
        }
        if !visiting.insert(file) {
            tracing::trace!(%file, "export cycle, stopping expansion");
            return Vec::new();
        }

        let index = &self.files[file.index()];
        let mut out: IndexMap<String, ExportBinding> = IndexMap::new();
        let mut stars = Vec::new();

        for entry in &index.exports {
            let name = match (&entry.name, &entry.target) {
                (_, ExportTarget::Star { specifier }) => {
                    stars.push(specifier.clone());
                    continue;
                }
                (Some(name), _) => name.clone(),
                (None, _) => continue,
            };

            let binding = match &entry.target {
                ExportTarget::Local { symbol, .. } => {
                    let declaration = index.symbols[*symbol as usize]
                        .declarations
                        .first()
                        .map(|&decl| index.declarations[decl as usize].key);
                    self.binding(file, &name, entry.name_key, declaration, ExportKind::Declaration)
                }
                ExportTarget::Declaration(key) => {
                    self.binding(file, &name, entry.name_key, Some(*key), ExportKind::Declaration)
                }
                ExportTarget::ReExport {
                    specifier,
                    imported,
                    ..
                } => match self.module_target(file, specifier) {
                    Some(ModuleTarget::Project(target)) if imported == "*" => {
                        self.binding(file, &name, entry.name_key, None, ExportKind::Namespace(target))
                    }
                    Some(ModuleTarget::Project(target)) => {
                        let upstream = self.collect_exports(target, visiting, memo);
                        match upstream.iter().find(|binding| &binding.name == imported) {
                            Some(found) => {
                                self.binding(file, &name, entry.name_key, found.declaration, found.kind)
                            }
                            None => self.binding(file, &name, entry.name_key, None, ExportKind::Unresolved),
                        }
                    }
                    Some(ModuleTarget::External) => {
                        self.binding(file, &name, entry.name_key, None, ExportKind::External)
                    }
                    None => self.binding(file, &name, entry.name_key, None, ExportKind::Unresolved),
                },
                ExportTarget::Star { .. } => continue,
            };
            out.insert(name, binding);
        }

        for specifier in stars {
            let Some(ModuleTarget::Project(target)) = self.module_target(file, &specifier) else {
                continue;
            };
            for binding in self.collect_exports(target, visiting, memo) {
                if binding.name != "default" && !out.contains_key(&binding.name) {
                    out.insert(binding.name.clone(), binding);
                }
            }
        }

        visiting.remove(&file);
        let bindings: Vec<ExportBinding> = out.into_values().collect();
        memo.insert(file, bindings.clone());
        bindings
    }

    fn binding(
        &self,
        file: FileId,
        name: &str,
        key: Option<OccurrenceKey>,
        declaration: Option<OccurrenceKey>,
        kind: ExportKind,
    ) -> ExportBinding {
        let is_alias = declaration
            .and_then(|decl| self.declared_name(decl))
            .is_some_and(|declared| declared != name);
        ExportBinding {
            name: name.to_string(),
            file,
            key,
            declaration,
            is_alias,
            kind,
        }
    }

    fn resolve_import(&self, file: FileId, import: &ImportBinding) -> AliasTarget {
        let imported_name = match &import.imported {
            ImportedName::Named { name, .. } => name.clone(),
            ImportedName::Default => "default".to_string(),
            ImportedName::Namespace => "*".to_string(),
        };
        match self.module_target(file, &import.specifier) {
            None => AliasTarget::Unresolved,
            Some(ModuleTarget::External) => AliasTarget::External {
                imported: imported_name,
            },
            Some(ModuleTarget::Project(target)) => match &import.imported {
                ImportedName::Namespace => AliasTarget::Namespace(target),
                ImportedName::Default => match self.export_named(target, "default") {
                    Some(_) => AliasTarget::Local,
                    None => AliasTarget::Unresolved,
                },
                ImportedName::Named { name, .. } => self.resolve_export(target, name),
            },
        }
    }

    fn resolve_export(&self, target: FileId, name: &str) -> AliasTarget {
        match self.export_named(target, name) {
            Some(found) => match found.kind {
                ExportKind::Declaration => AliasTarget::Export {
                    key: found.key,
                    declaration: found.declaration,
                    imported: name.to_string(),
                },
                ExportKind::Namespace(module) => AliasTarget::Namespace(module),
                ExportKind::External => AliasTarget::External {
                    imported: name.to_string(),
                },
                ExportKind::Unresolved => AliasTarget::Unresolved,
            },
            None => AliasTarget::Unresolved,
        }
    }
}

impl SemanticOracle for ProjectIndex {
    fn occurrences_of(&self, decl: OccurrenceKey) -> Vec<Occurrence> {
        let Some(declaration) = self.declaration(decl) else {
            return Vec::new();
        };
        let len = declaration.name.len() as u32;
        let index = self.file(decl.file);
        match declaration.symbol {
            Some(symbol) => index.symbols[symbol as usize]
                .occurrences
                .iter()
                .map(|&offset| Occurrence {
                    key: index.key(offset),
                    len,
                })
                .collect(),
            None => vec![Occurrence { key: decl, len }],
        }
    }

    fn members_of(&self, ty: OccurrenceKey) -> Vec<OccurrenceKey> {
        self.declaration(ty)
            .map(|decl| decl.members.clone())
            .unwrap_or_default()
    }

    fn base_types_of(&self, ty: OccurrenceKey) -> Vec<OccurrenceKey> {
        let Some(decl) = self.declaration(ty) else {
            return Vec::new();
        };
        let mut bases = Vec::new();
        for &symbol in &decl.heritage {
            for base in self.symbol_declarations(ty.file, symbol) {
                match self.declaration(base).map(|d| d.kind) {
                    Some(DeclKind::Import) => {
                        if let AliasTarget::Export {
                            declaration: Some(target),
                            ..
                        } = self.resolve_alias(base)
                        {
                            bases.push(target);
                        }
                    }
                    Some(_) => bases.push(base),
                    None => {}
                }
            }
        }
        bases
    }

    fn has_opaque_base(&self, ty: OccurrenceKey) -> bool {
        let Some(decl) = self.declaration(ty) else {
            return false;
        };
        if decl.flags.contains(DeclFlags::EXTERNAL_BASE) {
            return true;
        }
        decl.heritage.iter().any(|&symbol| {
            let declarations = self.symbol_declarations(ty.file, symbol);
            declarations.is_empty()
                || declarations.iter().any(|&base| {
                    let is_import =
                        self.declaration(base).map(|d| d.kind) == Some(DeclKind::Import);
                    let is_ambient = self
                        .declaration(base)
                        .is_some_and(|d| d.flags.contains(DeclFlags::AMBIENT));
                    is_ambient
                        || (is_import
                            && !matches!(
                                self.resolve_alias(base),
                                AliasTarget::Export {
                                    declaration: Some(_),
                                    ..
                                }
                            ))
                })
        })
    }

    fn exports_of(&self, file: FileId) -> Vec<ExportBinding> {
        self.exports[file.index()].clone()
    }

    fn resolve_alias(&self, binding: OccurrenceKey) -> AliasTarget {
        let index = self.file(binding.file);

        let import = index.imports.iter().find(|import| {
            import.local == binding
                || matches!(&import.imported, ImportedName::Named { key: Some(key), .. } if *key == binding)
        });
        if let Some(import) = import {
            return self.resolve_import(binding.file, import);
        }

        for entry in &index.exports {
            let ExportTarget::ReExport {
                specifier,
                imported,
                local_key: Some(local_key),
            } = &entry.target
            else {
                continue;
            };
            if *local_key != binding {
                continue;
            }
            return match self.module_target(binding.file, specifier) {
                None => AliasTarget::Unresolved,
                Some(ModuleTarget::External) => AliasTarget::External {
                    imported: imported.clone(),
                },
                Some(ModuleTarget::Project(target)) => self.resolve_export(target, imported),
            };
        }

        AliasTarget::NotAlias
    }

    fn declaration(&self, key: OccurrenceKey) -> Option<&Declaration> {
        self.files
            .get(key.file.index())
            .and_then(|index| index.declaration_at(key.offset))
    }

    fn symbol_declarations(&self, file: FileId, symbol: u32) -> Vec<OccurrenceKey> {
        let index = self.file(file);
        index
            .symbols
            .get(symbol as usize)
            .map(|entry| {
                entry
                    .declarations
                    .iter()
                    .map(|&decl| index.declarations[decl as usize].key)
                    .collect()
            })
            .unwrap_or_default()
    }
}
