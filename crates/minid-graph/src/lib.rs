//! # minid-graph
//!
//! Whole-project identifier analysis for TypeScript sources.
//!
//! This crate owns everything that happens before a single name is chosen:
//!
//! - **Registry**: discovers the project's files starting from its interface
//!   files and partitions them into rewritable sources and copy-only ambient
//!   declaration files.
//! - **Index**: parses every file with oxc, resolves scopes with
//!   `oxc_semantic`, and lowers the result into an owned [`FileIndex`] so no
//!   arena outlives its file.
//! - **Oracle**: [`ProjectIndex`] answers the semantic queries the graph
//!   needs (occurrences, members, base types, exports) through the
//!   [`SemanticOracle`] trait.
//! - **Reference graph**: a union-find arena of [`RefNode`] equivalence
//!   classes, one per renamable entity.
//! - **Tracer**: marks every class reachable from the public surface as
//!   fixed.
//!
//! ## Architecture
//!
//! ```text
//!   interface files
//!         │
//!         ▼
//!  ┌──────────────┐   parse + semantic   ┌──────────────┐
//!  │ FileRegistry │ ───────────────────▶ │ ProjectIndex │ (SemanticOracle)
//!  └──────────────┘                      └──────┬───────┘
//!                                               │
//!                          ┌────────────────────┼──────────────┐
//!                          ▼                                   ▼
//!                   ┌──────────────┐                  ┌────────────────┐
//!                   │ GraphBuilder │ ───── RefGraph ─▶│ SurfaceTracer  │
//!                   └──────────────┘                  └────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use minid_graph::{build_reference_graph, trace_public_surface, MemoryProvider, Project, ProjectOptions};
//!
//! # fn main() -> minid_graph::Result<()> {
//! let provider = MemoryProvider::new()
//!     .with_file("/src/index.ts", "export function greet(who: string) { return helper(who) }\nfunction helper(v: string) { return v }");
//! let project = Project::load(&ProjectOptions::new("/src", ["index.ts"]), &provider)?;
//!
//! let mut build = build_reference_graph(&project, &Default::default());
//! let surface = trace_public_surface(&project, &mut build.graph);
//! assert!(!surface.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod graph;
pub mod index;
pub mod oracle;
pub mod project;
pub mod provider;
pub mod registry;
pub mod resolve;
pub mod tracer;

pub use builder::{build_reference_graph, BuildOptions, BuildOutput, ExternalNames, GraphBuilder};
pub use graph::{RefFlags, RefGraph, RefId, RefNode};
pub use index::{
    DeclFlags, DeclKind, Declaration, ExportEntry, ExportTarget, FileIndex, ImportBinding,
    ImportedName, MemberRoot, MemberUse, OccurrenceKey, SymbolEntry, TypeEdge,
};
pub use oracle::{AliasTarget, ExportBinding, ExportKind, Occurrence, ProjectIndex, SemanticOracle};
pub use project::{Project, ProjectOptions};
pub use provider::{MemoryProvider, NativeProvider, SourceProvider};
pub use registry::{FileId, FileRegistry, SourceFile};
pub use resolve::{ModuleResolver, ModuleTarget, DEFAULT_EXTENSIONS};
pub use tracer::{trace_public_surface, PublicSurface, SurfaceTracer};

/// OXC foundation types re-exported for workspace consistency.
///
/// Downstream crates use `minid_graph::oxc::*` instead of depending on the
/// oxc crates directly.
pub mod oxc {
    /// Arena allocator for AST nodes
    pub use oxc_allocator::Allocator;

    /// Span types for source location tracking
    pub use oxc_span::{GetSpan, SourceType, Span};

    /// Parser entry point
    pub use oxc_parser::{Parser, ParserReturn};

    /// Semantic analysis
    pub use oxc_semantic::{Scoping, SemanticBuilder, SymbolFlags, SymbolId};
}

use std::path::PathBuf;

/// Error types for project loading and indexing.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// An interface file given on input does not exist under the source root.
    #[error("interface file not found: {}", .0.display())]
    InterfaceNotFound(PathBuf),

    /// A source file failed to parse.
    #[error("failed to parse {}: {message}", path.display())]
    Syntax { path: PathBuf, message: String },

    /// A file contains a construct the indexer cannot model.
    #[error("unsupported construct in {}: {construct}", path.display())]
    Unsupported { path: PathBuf, construct: String },

    /// The file extension is not a JavaScript or TypeScript dialect.
    #[error("unsupported file type: {}", .0.display())]
    UnsupportedFile(PathBuf),

    /// I/O error while reading a source file.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
