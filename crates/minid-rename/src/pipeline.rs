//! The rename pipeline: discover, build, trace, allocate, plan, emit.
//!
//! All analysis finishes before the first byte is written, so a project
//! that fails to parse leaves the destination untouched.

use std::path::{Path, PathBuf};

use minid_graph::{
    build_reference_graph, trace_public_surface, BuildOptions, NativeProvider, Project,
    ProjectOptions, RefGraph, SourceProvider,
};
use path_clean::PathClean;
use serde::Serialize;

use crate::allocator::{allocate_names, Allocation, AllocatorOptions};
use crate::emit::emit_file;
use crate::error::{RenameError, Result};
use crate::plan::RenamePlan;
use crate::sink::{FsSink, OutputSink};

/// Inputs of one rename run.
#[derive(Debug, Clone, Default)]
pub struct RenameOptions {
    pub src_dir: PathBuf,
    pub out_dir: PathBuf,
    /// Interface files, relative to `src_dir`.
    pub interfaces: Vec<PathBuf>,
    pub source_map: bool,
    pub obfuscate: bool,
    /// Extension search order for module resolution; empty keeps the default.
    pub extensions: Vec<String>,
    /// Names never renamed.
    pub preserve: Vec<String>,
}

impl RenameOptions {
    pub fn new<I, P>(src_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>, interfaces: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            src_dir: src_dir.into(),
            out_dir: out_dir.into(),
            interfaces: interfaces.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_source_map(mut self, enabled: bool) -> Self {
        self.source_map = enabled;
        self
    }

    pub fn with_obfuscate(mut self, enabled: bool) -> Self {
        self.obfuscate = enabled;
        self
    }

    pub fn with_preserve<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preserve.extend(names.into_iter().map(Into::into));
        self
    }
}

/// Counts describing one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenameReport {
    pub files_rewritten: usize,
    pub files_copied: usize,
    pub classes_total: usize,
    pub classes_fixed: usize,
    pub classes_renamed: usize,
    pub occurrences_substituted: usize,
}

/// A fully analysed project, ready to emit.
#[derive(Debug)]
pub struct Analysis {
    pub project: Project,
    pub graph: RefGraph,
    pub allocation: Allocation,
    pub plan: RenamePlan,
}

impl Analysis {
    /// What emitting this analysis writes.
    pub fn report(&self) -> RenameReport {
        RenameReport {
            files_rewritten: self.project.registry.rewritable().count(),
            files_copied: self.project.registry.copy_only().count(),
            classes_total: self.allocation.classes,
            classes_fixed: self.allocation.fixed,
            classes_renamed: self.allocation.renamed(),
            occurrences_substituted: self.plan.len(),
        }
    }

    /// Hand every file to `sink`. Map paths are computed against `out_dir`.
    #[tracing::instrument(level = "debug", skip_all, fields(out_dir = %out_dir.display()))]
    pub fn emit(&self, out_dir: &Path, source_map: bool, sink: &mut dyn OutputSink) -> Result<RenameReport> {
        let out_dir = out_dir.clean();
        for file in self.project.registry.iter() {
            if !file.is_rewritable {
                sink.copy_through(&file.path, &file.relative, &file.source)?;
                continue;
            }
            let output = out_dir.join(&file.relative);
            let emitted = emit_file(
                &file.source,
                self.plan.for_file(file.id),
                &file.path,
                source_map.then_some(output.as_path()),
            );
            sink.write_rewritten(&file.path, &file.relative, &emitted.content, emitted.map.as_deref())?;
        }

        let report = self.report();
        tracing::info!(
            rewritten = report.files_rewritten,
            copied = report.files_copied,
            renamed = report.classes_renamed,
            substitutions = report.occurrences_substituted,
            "output emitted"
        );
        Ok(report)
    }
}

/// Run every analysis stage without writing anything.
#[tracing::instrument(skip_all, fields(src_dir = %options.src_dir.display()))]
pub fn analyze(options: &RenameOptions, provider: &dyn SourceProvider) -> Result<Analysis> {
    let project_options = ProjectOptions::new(&options.src_dir, options.interfaces.iter().cloned())
        .with_extensions(options.extensions.iter().cloned());
    let project = Project::load(&project_options, provider)?;

    let build_options = BuildOptions {
        preserve: options.preserve.clone(),
    };
    let mut build = build_reference_graph(&project, &build_options);
    let surface = trace_public_surface(&project, &mut build.graph);
    tracing::debug!(
        surface = surface.len(),
        fixed = surface.fixed_classes(),
        "public surface fixed"
    );

    let allocation = allocate_names(
        &mut build.graph,
        &build.external,
        AllocatorOptions {
            obfuscate: options.obfuscate,
        },
    );
    let plan = RenamePlan::build(&build.graph, &allocation, &project.registry);

    Ok(Analysis {
        project,
        graph: build.graph,
        allocation,
        plan,
    })
}

/// Analyse with `provider` and emit into `sink`.
pub fn run_with(options: &RenameOptions, provider: &dyn SourceProvider, sink: &mut dyn OutputSink) -> Result<RenameReport> {
    let analysis = analyze(options, provider)?;
    analysis.emit(&options.out_dir, options.source_map, sink)
}

/// Rename the project on disk, mirroring it under `options.out_dir`.
pub fn run(options: &RenameOptions) -> Result<RenameReport> {
    let src = options.src_dir.clean();
    let out = options.out_dir.clean();
    if src == out {
        return Err(RenameError::OutputOverlapsSource(out));
    }
    let mut sink = FsSink::new(&out);
    run_with(options, &NativeProvider, &mut sink)
}

#[cfg(test)]
mod tests {
    use minid_graph::MemoryProvider;

    use super::*;
    use crate::sink::MemorySink;

    #[test]
    fn renames_private_helpers_only() {
        let provider = MemoryProvider::new().with_file(
            "/src/index.ts",
            "function helperFunction(input: number) { return input + 1 }\nexport function api(count: number): number { return helperFunction(count) }\n",
        );
        let options = RenameOptions::new("/src", "/out", ["index.ts"]).with_obfuscate(true);
        let mut sink = MemorySink::new();
        let report = run_with(&options, &provider, &mut sink).unwrap();

        let out = &sink.get("index.ts").unwrap().content;
        assert!(out.contains("export function api(count: number): number"));
        assert!(!out.contains("helperFunction"));
        assert!(!out.contains("input"));
        assert_eq!(report.files_rewritten, 1);
        assert!(report.classes_renamed >= 2);
        assert_eq!(report.classes_total, report.classes_fixed + report.classes_renamed);
    }

    #[test]
    fn declaration_files_are_copied_verbatim() {
        let dts = "declare const BUILD_ID: string;\n";
        let provider = MemoryProvider::new()
            .with_file("/src/index.ts", "export const id = BUILD_ID;\n")
            .with_file("/src/env.d.ts", dts);
        let options = RenameOptions::new("/src", "/out", ["index.ts"]).with_source_map(true);
        let mut sink = MemorySink::new();
        let report = run_with(&options, &provider, &mut sink).unwrap();

        let copied = sink.get("env.d.ts").unwrap();
        assert_eq!(copied.content, dts);
        assert!(copied.map.is_none());
        assert!(sink.get("index.ts").unwrap().map.is_some());
        assert_eq!(report.files_copied, 1);
    }

    #[test]
    fn output_must_differ_from_source() {
        let options = RenameOptions::new("/src/app", "/src/app/.", ["index.ts"]);
        assert!(matches!(run(&options), Err(RenameError::OutputOverlapsSource(_))));
    }

    #[test]
    fn parse_errors_abort_before_writing() {
        let provider = MemoryProvider::new().with_file("/src/index.ts", "export function (");
        let options = RenameOptions::new("/src", "/out", ["index.ts"]);
        let mut sink = MemorySink::new();
        let err = run_with(&options, &provider, &mut sink).unwrap_err();
        assert!(matches!(err, RenameError::Graph(minid_graph::GraphError::Syntax { .. })));
        assert!(sink.is_empty());
    }
}
