//! Reference graph construction.
//!
//! One pass per concern over every registered file:
//!
//! 1. declarations become classes (symbol occurrences via the oracle);
//! 2. inheritance merges same-named members of base types;
//! 3. member accesses, object keys and destructuring keys join member classes;
//! 4. imports and re-exports join the classes of their targets; default and
//!    namespace import bindings and re-exported names are fixed;
//! 5. JSX tags flag component classes.
//!
//! Anything that cannot be traced to a declaration in a rewritable file is
//! fixed.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::{RefFlags, RefGraph, RefId};
use crate::index::lib_members::is_lib_member;
use crate::index::{
    DeclFlags, DeclKind, Declaration, ExportTarget, FileIndex, ImportedName, MemberRoot, MemberUse,
    OccurrenceKey,
};
use crate::oracle::{AliasTarget, Occurrence, SemanticOracle};
use crate::project::Project;
use crate::registry::FileId;

/// Knobs for [`GraphBuilder`].
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Names that are never renamed, wherever they are declared.
    pub preserve: Vec<String>,
}

/// Names the allocator must avoid although no class owns them.
#[derive(Debug, Clone, Default)]
pub struct ExternalNames {
    /// Unresolved globals referenced in each file.
    pub per_file: FxHashMap<FileId, FxHashSet<String>>,
    /// Member names left untouched somewhere in the project.
    pub members: FxHashSet<String>,
}

#[derive(Debug)]
pub struct BuildOutput {
    pub graph: RefGraph,
    pub external: ExternalNames,
}

pub struct GraphBuilder<'p> {
    project: &'p Project,
    preserve: FxHashSet<&'p str>,
    graph: RefGraph,
    symbol_nodes: FxHashMap<(FileId, u32), RefId>,
    fixed_members: FxHashSet<String>,
    external: ExternalNames,
}

impl<'p> GraphBuilder<'p> {
    pub fn new(project: &'p Project, options: &'p BuildOptions) -> Self {
        Self {
            project,
            preserve: options.preserve.iter().map(String::as_str).collect(),
            graph: RefGraph::new(),
            symbol_nodes: FxHashMap::default(),
            fixed_members: FxHashSet::default(),
            external: ExternalNames::default(),
        }
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build(mut self) -> BuildOutput {
        let files: Vec<FileId> = self.project.registry.iter().map(|file| file.id).collect();

        for &file in &files {
            self.declare_file(file);
        }
        tracing::debug!(classes = self.graph.len(), "declarations registered");

        for &file in &files {
            self.link_inheritance(file);
        }
        for &file in &files {
            self.link_member_uses(file);
        }
        for &file in &files {
            self.link_imports(file);
            self.link_exports(file);
        }
        for &file in &files {
            self.mark_jsx(file);
        }
        self.fix_member_names();

        let roots = self.graph.roots().count();
        let fixed = self
            .graph
            .roots()
            .filter(|&root| self.graph.node(root).is_fixed())
            .count();
        tracing::info!(
            classes = roots,
            fixed,
            occurrences = self.graph.occurrence_count(),
            "reference graph built"
        );

        BuildOutput {
            graph: self.graph,
            external: self.external,
        }
    }

    fn index(&self, file: FileId) -> &'p FileIndex {
        self.project.index.file(file)
    }

    fn spelled(&self, key: OccurrenceKey, name: &str) -> bool {
        let source = self.project.source(key.file);
        let start = key.offset as usize;
        source.get(start..start + name.len()) == Some(name)
    }

    fn occurrence(key: OccurrenceKey, name: &str) -> Occurrence {
        Occurrence {
            key,
            len: name.len() as u32,
        }
    }

    fn declare_file(&mut self, file: FileId) {
        let index = self.index(file);
        let rewritable = self.project.registry.is_rewritable(file);
        self.external
            .per_file
            .entry(file)
            .or_default()
            .extend(index.unresolved.iter().cloned());

        for decl in &index.declarations {
            if decl.kind == DeclKind::DefaultExport {
                continue;
            }
            if !self.spelled(decl.key, &decl.name) {
                tracing::trace!(key = %decl.key, name = %decl.name, "declaration text mismatch, skipped");
                continue;
            }

            let mut flags = RefFlags::empty();
            if !rewritable || self.must_fix(index, decl) {
                flags |= RefFlags::FIXED;
            }
            let is_member = decl.kind.is_member() || decl.flags.contains(DeclFlags::MEMBER_ALIAS);
            if is_member {
                flags |= RefFlags::SIGNATURE;
            }

            let occurrences: Vec<Occurrence> = self
                .project
                .index
                .occurrences_of(decl.key)
                .into_iter()
                .filter(|occurrence| self.spelled(occurrence.key, &decl.name))
                .collect();

            let id = match decl.symbol {
                Some(symbol) => match self.symbol_nodes.get(&(file, symbol)).copied() {
                    Some(existing) => {
                        self.graph.mark(existing, flags);
                        self.graph
                            .add_occurrence(existing, Self::occurrence(decl.key, &decl.name))
                    }
                    None => {
                        let id = self.graph.add_node(decl.key, &decl.name, occurrences, flags);
                        self.symbol_nodes.insert((file, symbol), id);
                        id
                    }
                },
                None => self.graph.add_node(decl.key, &decl.name, occurrences, flags),
            };

            if is_member {
                self.graph.join_member(&decl.name, id);
            }
        }
    }

    fn must_fix(&self, index: &FileIndex, decl: &Declaration) -> bool {
        decl.kind.is_type_name()
            || decl
                .flags
                .intersects(DeclFlags::AMBIENT | DeclFlags::FIXED)
            || (!index.is_module && decl.flags.contains(DeclFlags::TOP_LEVEL))
            || self.preserve.contains(decl.name.as_str())
    }

    fn link_inheritance(&mut self, file: FileId) {
        let project = self.project;
        let oracle = &project.index;
        for decl in &self.index(file).declarations {
            if !matches!(decl.kind, DeclKind::Class | DeclKind::Interface) {
                continue;
            }
            let members = oracle.members_of(decl.key);
            if oracle.has_opaque_base(decl.key) {
                for member in &members {
                    if let Some(member_decl) = oracle.declaration(*member) {
                        tracing::trace!(member = %member_decl.name, "member of externally derived type fixed");
                        self.fixed_members.insert(member_decl.name.clone());
                    }
                }
            }

            for base in oracle.base_types_of(decl.key) {
                for inherited in oracle.members_of(base) {
                    let Some(inherited_decl) = oracle.declaration(inherited) else {
                        continue;
                    };
                    for own in &members {
                        let same_name = oracle
                            .declaration(*own)
                            .is_some_and(|d| d.name == inherited_decl.name);
                        if !same_name {
                            continue;
                        }
                        if let (Some(a), Some(b)) =
                            (self.graph.class_of(*own), self.graph.class_of(inherited))
                        {
                            self.graph.union(a, b);
                        }
                    }
                }
            }
        }
    }

    /// Whether members read through `symbol` may belong to a shape the
    /// project does not declare.
    fn symbol_is_opaque(&self, file: FileId, symbol: u32) -> bool {
        self.opaque_symbol(file, symbol, &mut FxHashSet::default())
    }

    fn opaque_symbol(&self, file: FileId, symbol: u32, seen: &mut FxHashSet<OccurrenceKey>) -> bool {
        let declarations = self.project.index.symbol_declarations(file, symbol);
        if declarations.is_empty() {
            return true;
        }
        declarations
            .iter()
            .any(|&key| self.opaque_declaration(key, seen))
    }

    /// A declaration is opaque when it is ambient, imported from outside
    /// the project, derived from an outside type, or when its annotation,
    /// initializer or returned values lead to something opaque.
    fn opaque_declaration(&self, key: OccurrenceKey, seen: &mut FxHashSet<OccurrenceKey>) -> bool {
        if !seen.insert(key) {
            return false;
        }
        let oracle = &self.project.index;
        let Some(decl) = oracle.declaration(key) else {
            return true;
        };
        if decl.flags.contains(DeclFlags::AMBIENT) {
            return true;
        }
        match decl.kind {
            DeclKind::Import => {
                return match oracle.resolve_alias(key) {
                    AliasTarget::External { .. } | AliasTarget::Unresolved => true,
                    AliasTarget::Export {
                        declaration: Some(target),
                        ..
                    } => self.opaque_declaration(target, seen),
                    _ => false,
                };
            }
            DeclKind::Class | DeclKind::Interface if oracle.has_opaque_base(key) => return true,
            _ => {}
        }
        decl.origins.iter().any(|origin| match origin {
            MemberRoot::Global(_) => true,
            MemberRoot::Symbol(symbol) => self.opaque_symbol(key.file, *symbol, seen),
            MemberRoot::Other => false,
        })
    }

    /// `ns.name` where `ns` is a namespace import of a project module.
    fn namespace_export(&self, file: FileId, use_: &MemberUse) -> Option<Option<OccurrenceKey>> {
        let MemberRoot::Symbol(symbol) = use_.root else {
            return None;
        };
        if !use_.direct {
            return None;
        }
        let oracle = &self.project.index;
        let import = self.index(file).import_of_symbol(symbol)?;
        match oracle.resolve_alias(import.local) {
            AliasTarget::Namespace(module) => Some(
                oracle
                    .export_named(module, &use_.name)
                    .and_then(|binding| binding.key),
            ),
            _ => None,
        }
    }

    fn link_member_uses(&mut self, file: FileId) {
        let index = self.index(file);
        for use_ in &index.member_uses {
            if !self.spelled(use_.key, &use_.name) {
                continue;
            }
            let occurrence = Self::occurrence(use_.key, &use_.name);

            if let Some(target) = self.namespace_export(file, use_) {
                match target.and_then(|key| self.graph.class_of(key)) {
                    Some(class) => {
                        self.graph.add_occurrence(class, occurrence);
                    }
                    None => self.fix_member_use(use_),
                }
                continue;
            }

            let opaque = match &use_.root {
                MemberRoot::Global(_) => true,
                MemberRoot::Symbol(symbol) => self.symbol_is_opaque(file, *symbol),
                MemberRoot::Other => false,
            };
            if opaque {
                self.fix_member_use(use_);
                continue;
            }

            match self.graph.member_class(&use_.name) {
                Some(class) => {
                    self.graph.add_occurrence(class, occurrence);
                }
                None => self.fix_member_use(use_),
            }
        }
    }

    fn fix_member_use(&mut self, use_: &MemberUse) {
        self.fixed_members.insert(use_.name.clone());
        if let Some(class) = self.graph.class_of(use_.key) {
            self.graph.mark(class, RefFlags::FIXED);
        }
    }

    /// Class for a name token that is not a symbol occurrence, such as the
    /// `b` of `export { a as b }`.
    fn token_class(&mut self, key: OccurrenceKey, name: &str) -> Option<RefId> {
        if let Some(class) = self.graph.class_of(key) {
            return Some(class);
        }
        if !self.spelled(key, name) {
            return None;
        }
        let mut flags = RefFlags::empty();
        if name == "default" || self.preserve.contains(name) || !self.project.registry.is_rewritable(key.file) {
            flags |= RefFlags::FIXED;
        }
        Some(self.graph.add_node(key, name, [], flags))
    }

    fn link_to(&mut self, class: RefId, target: AliasTarget) {
        match target {
            AliasTarget::Export { key, .. } => match key.and_then(|key| self.graph.class_of(key)) {
                Some(export) => {
                    self.graph.union(class, export);
                }
                None => self.graph.mark(class, RefFlags::FIXED),
            },
            AliasTarget::External { .. } | AliasTarget::Unresolved => {
                self.graph.mark(class, RefFlags::FIXED);
            }
            AliasTarget::Local | AliasTarget::Namespace(_) | AliasTarget::NotAlias => {}
        }
    }

    fn link_imports(&mut self, file: FileId) {
        let project = self.project;
        for import in &self.index(file).imports {
            match &import.imported {
                ImportedName::Named { name, key } => {
                    let Some(token) = key.and_then(|key| self.token_class(key, name)) else {
                        continue;
                    };
                    self.link_to(token, project.index.resolve_alias(import.local));
                }
                ImportedName::Default | ImportedName::Namespace => {
                    if let Some(local) = self.graph.class_of(import.local) {
                        self.graph.mark(local, RefFlags::FIXED);
                    }
                }
            }
        }
    }

    fn link_exports(&mut self, file: FileId) {
        let project = self.project;
        for entry in &self.index(file).exports {
            let name_class = match (&entry.name, entry.name_key) {
                (Some(name), Some(key)) => self.token_class(key, name),
                _ => None,
            };

            let ExportTarget::ReExport {
                imported,
                local_key,
                ..
            } = &entry.target
            else {
                continue;
            };
            if let Some(class) = name_class {
                self.graph.mark(class, RefFlags::FIXED);
            }
            let Some(local_key) = *local_key else {
                continue;
            };
            let Some(local) = self.token_class(local_key, imported) else {
                continue;
            };
            if imported == "default" {
                self.graph.mark(local, RefFlags::FIXED);
                continue;
            }
            self.link_to(local, project.index.resolve_alias(local_key));
        }
    }

    fn mark_jsx(&mut self, file: FileId) {
        for &tag in &self.index(file).jsx_tags {
            if let Some(class) = self.graph.class_of(tag) {
                self.graph.mark(class, RefFlags::JSX_COMPONENT);
            }
        }
    }

    fn fix_member_names(&mut self) {
        for index in self.project.index.files() {
            self.fixed_members
                .extend(index.fixed_member_names.iter().cloned());
        }

        let names: Vec<String> = self.graph.member_names().map(str::to_string).collect();
        for name in names {
            let pinned = is_lib_member(&name)
                || self.fixed_members.contains(&name)
                || self.preserve.contains(name.as_str());
            if let Some(class) = self.graph.member_class(&name) {
                if pinned {
                    self.graph.mark(class, RefFlags::FIXED);
                }
                if self.graph.node(class).is_fixed() {
                    self.fixed_members.insert(name);
                }
            }
        }

        self.external.members = std::mem::take(&mut self.fixed_members);
        tracing::debug!(fixed_members = self.external.members.len(), "member names pinned");
    }
}

/// Build the reference graph for every file of `project`.
pub fn build_reference_graph(project: &Project, options: &BuildOptions) -> BuildOutput {
    GraphBuilder::new(project, options).build()
}
