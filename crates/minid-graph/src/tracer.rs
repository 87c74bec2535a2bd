//! Public-surface tracing.
//!
//! Worklist traversal from the exports of every interface file through the
//! type graph: members, base types, parameter and property types, inferred
//! initializer shapes. Every class reached is fixed, except private members
//! and the local names behind aliased exports.

use rustc_hash::FxHashSet;

use crate::graph::{RefFlags, RefGraph, RefId};
use crate::index::{DeclKind, OccurrenceKey, TypeEdge};
use crate::oracle::{AliasTarget, ExportBinding, ExportKind, SemanticOracle};
use crate::project::Project;
use crate::registry::FileId;

/// What the tracer reached.
#[derive(Debug, Default)]
pub struct PublicSurface {
    visited: FxHashSet<OccurrenceKey>,
    modules: FxHashSet<FileId>,
    fixed: FxHashSet<RefId>,
}

impl PublicSurface {
    pub fn contains(&self, decl: OccurrenceKey) -> bool {
        self.visited.contains(&decl)
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty() && self.fixed.is_empty()
    }

    /// Classes this trace fixed.
    pub fn fixed_classes(&self) -> usize {
        self.fixed.len()
    }

    pub fn modules(&self) -> impl Iterator<Item = FileId> + '_ {
        self.modules.iter().copied()
    }
}

enum Work {
    Module(FileId),
    Decl { key: OccurrenceKey, fix: bool },
}

pub struct SurfaceTracer<'a, O: SemanticOracle + ?Sized> {
    oracle: &'a O,
    graph: &'a mut RefGraph,
    worklist: Vec<Work>,
    surface: PublicSurface,
}

impl<'a, O: SemanticOracle + ?Sized> SurfaceTracer<'a, O> {
    pub fn new(oracle: &'a O, graph: &'a mut RefGraph) -> Self {
        Self {
            oracle,
            graph,
            worklist: Vec::new(),
            surface: PublicSurface::default(),
        }
    }

    /// Seed the trace with every export of `file`.
    pub fn add_interface(&mut self, file: FileId) {
        self.worklist.push(Work::Module(file));
    }

    /// Seed the trace with a module whose exports are reachable at runtime
    /// without being an interface file.
    pub fn add_module(&mut self, file: FileId) {
        self.worklist.push(Work::Module(file));
    }

    pub fn run(mut self) -> PublicSurface {
        while let Some(work) = self.worklist.pop() {
            match work {
                Work::Module(file) => self.visit_module(file),
                Work::Decl { key, fix } => self.visit_declaration(key, fix),
            }
        }
        tracing::debug!(
            declarations = self.surface.visited.len(),
            modules = self.surface.modules.len(),
            fixed = self.surface.fixed.len(),
            "public surface traced"
        );
        self.surface
    }

    fn fix(&mut self, key: OccurrenceKey) {
        if let Some(class) = self.graph.class_of(key) {
            self.graph.mark(class, RefFlags::FIXED);
            self.surface.fixed.insert(self.graph.root(class));
        }
    }

    fn visit_module(&mut self, file: FileId) {
        if !self.surface.modules.insert(file) {
            return;
        }
        for binding in self.oracle.exports_of(file) {
            self.visit_export(binding);
        }
    }

    fn visit_export(&mut self, binding: ExportBinding) {
        if let Some(key) = binding.key {
            self.fix(key);
        }
        match binding.kind {
            ExportKind::Namespace(module) => self.worklist.push(Work::Module(module)),
            ExportKind::Declaration => {
                if let Some(key) = binding.declaration {
                    // An aliased export leaves its local name free.
                    let fix = !binding.is_alias && binding.name != "default";
                    self.worklist.push(Work::Decl { key, fix });
                }
            }
            ExportKind::External | ExportKind::Unresolved => {}
        }
    }

    fn visit_declaration(&mut self, key: OccurrenceKey, fix: bool) {
        let oracle = self.oracle;
        let Some(decl) = oracle.declaration(key) else {
            return;
        };
        if decl.is_private() {
            return;
        }
        if fix {
            self.fix(key);
        }
        if !self.surface.visited.insert(key) {
            return;
        }

        if decl.kind == DeclKind::Import {
            match oracle.resolve_alias(key) {
                AliasTarget::Export {
                    declaration: Some(target),
                    ..
                } => self.worklist.push(Work::Decl { key: target, fix }),
                AliasTarget::Namespace(module) => self.worklist.push(Work::Module(module)),
                AliasTarget::Export { .. }
                | AliasTarget::NotAlias
                | AliasTarget::Local
                | AliasTarget::External { .. }
                | AliasTarget::Unresolved => {}
            }
            return;
        }

        for member in oracle.members_of(key) {
            self.worklist.push(Work::Decl { key: member, fix: true });
        }
        for base in oracle.base_types_of(key) {
            self.worklist.push(Work::Decl { key: base, fix: true });
        }
        for edge in &decl.edges {
            match edge {
                TypeEdge::Symbol(symbol) => {
                    for target in oracle.symbol_declarations(key.file, *symbol) {
                        self.worklist.push(Work::Decl { key: target, fix: true });
                    }
                }
                TypeEdge::Nested(nested) => {
                    self.worklist.push(Work::Decl {
                        key: *nested,
                        fix: true,
                    });
                }
                TypeEdge::MemberName(name) => {
                    if let Some(class) = self.graph.member_class(name) {
                        self.graph.mark(class, RefFlags::FIXED);
                        self.surface.fixed.insert(class);
                    }
                }
            }
        }
    }
}

/// Fix every class reachable from the project's interface files and its
/// dynamically imported modules.
#[tracing::instrument(level = "debug", skip_all)]
pub fn trace_public_surface(project: &Project, graph: &mut RefGraph) -> PublicSurface {
    let mut tracer = SurfaceTracer::new(&project.index, graph);
    for &file in &project.interfaces {
        tracer.add_interface(file);
    }
    for &file in &project.dynamic_targets {
        tracer.add_module(file);
    }
    tracer.run()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::builder::{build_reference_graph, BuildOptions};
    use crate::project::ProjectOptions;
    use crate::provider::MemoryProvider;

    struct Traced {
        project: Project,
        graph: RefGraph,
        surface: PublicSurface,
    }

    impl Traced {
        fn fixed(&self, path: &str, needle: &str) -> bool {
            let id = self.project.registry.id_of(Path::new(path)).unwrap();
            let offset = self.project.source(id).find(needle).unwrap() as u32;
            let class = self
                .graph
                .class_of(OccurrenceKey::new(id, offset))
                .unwrap_or_else(|| panic!("no class at {needle}"));
            self.graph.node(class).is_fixed()
        }
    }

    fn trace(files: &[(&str, &str)]) -> Traced {
        let mut provider = MemoryProvider::new();
        for (path, source) in files {
            provider.insert(*path, *source);
        }
        let project = Project::load(&ProjectOptions::new("/src", ["index.ts"]), &provider).unwrap();
        let mut build = build_reference_graph(&project, &BuildOptions::default());
        let surface = trace_public_surface(&project, &mut build.graph);
        Traced {
            project,
            graph: build.graph,
            surface,
        }
    }

    #[test]
    fn exported_function_keeps_name_and_parameters() {
        let t = trace(&[(
            "/src/index.ts",
            "function helper(v: number) { return v }\nexport function api(count: number): number { return helper(count) }",
        )]);
        assert!(t.fixed("/src/index.ts", "api"));
        assert!(t.fixed("/src/index.ts", "count:"));
        assert!(!t.fixed("/src/index.ts", "helper"));
        assert!(!t.fixed("/src/index.ts", "v:"));
        assert!(!t.surface.is_empty());
    }

    #[test]
    fn members_of_exported_classes_are_fixed_except_private() {
        let t = trace(&[(
            "/src/index.ts",
            "export class Account {\n  balance = 0;\n  private ledger = 1;\n  #secret = 2;\n  deposit(amount: number) {}\n}",
        )]);
        assert!(t.fixed("/src/index.ts", "balance"));
        assert!(t.fixed("/src/index.ts", "deposit"));
        assert!(!t.fixed("/src/index.ts", "ledger"));
        assert!(!t.fixed("/src/index.ts", "#secret"));
    }

    #[test]
    fn shapes_reachable_through_types_are_fixed() {
        let t = trace(&[
            ("/src/index.ts", "import { Options } from './options';\nexport function configure(opts: Options) {}"),
            ("/src/options.ts", "export interface Options { retries: Retry }\ninterface Retry { attempts: number }\nexport const unrelated = { knob: 1 };"),
        ]);
        assert!(t.fixed("/src/options.ts", "retries"));
        assert!(t.fixed("/src/options.ts", "attempts"));
        assert!(!t.fixed("/src/options.ts", "unrelated"));
    }

    #[test]
    fn aliased_exports_free_the_local_name() {
        let t = trace(&[("/src/index.ts", "const internalName = 1;\nexport { internalName as publicName };")]);
        assert!(t.fixed("/src/index.ts", "publicName"));
        assert!(!t.fixed("/src/index.ts", "internalName ="));
    }

    #[test]
    fn inferred_initializer_shapes_are_fixed() {
        let t = trace(&[(
            "/src/index.ts",
            "class Builder { build() { return 1 } }\nclass Hidden { tune() {} }\nconst shared = new Builder();\nexport const api = shared;\nnew Hidden().tune();",
        )]);
        assert!(t.fixed("/src/index.ts", "build()"));
        assert!(t.fixed("/src/index.ts", "shared ="));
        assert!(!t.fixed("/src/index.ts", "tune"));
    }

    #[test]
    fn re_exports_through_stars_are_traced() {
        let t = trace(&[
            ("/src/index.ts", "export * from './impl';"),
            ("/src/impl.ts", "export function exposed() { return hidden() }\nfunction hidden() {}"),
        ]);
        assert!(t.fixed("/src/impl.ts", "exposed"));
        assert!(!t.fixed("/src/impl.ts", "hidden()"));
    }

    #[test]
    fn namespace_re_exports_fix_the_target_module() {
        let t = trace(&[
            ("/src/index.ts", "export * as tools from './tools';"),
            ("/src/tools.ts", "export function sharpen() {}"),
        ]);
        assert!(t.fixed("/src/index.ts", "tools"));
        assert!(t.fixed("/src/tools.ts", "sharpen"));
    }
}
