//! # minid-rename
//!
//! Name allocation and output emission for whole-project identifier
//! renaming.
//!
//! Given the reference graph from `minid-graph`, this crate picks the
//! shortest safe name for every free class, turns the choice into a
//! per-file [`RenamePlan`], and writes renamed sources (optionally with
//! source maps) through an [`OutputSink`].
//!
//! ```rust,no_run
//! use minid_rename::{run, RenameOptions};
//!
//! # fn main() -> minid_rename::Result<()> {
//! let options = RenameOptions::new("src", "dist", ["index.ts"]).with_source_map(true);
//! let report = run(&options)?;
//! println!("{} identifiers renamed", report.classes_renamed);
//! # Ok(())
//! # }
//! ```

pub mod allocator;
pub mod emit;
pub mod error;
pub mod names;
pub mod pipeline;
pub mod plan;
pub mod sink;
pub mod table;

pub use allocator::{allocate_names, Allocation, AllocatorOptions, ExclusionSets, NameAllocator};
pub use emit::{apply, emit_file, EmittedFile};
pub use error::{RenameError, Result};
pub use names::{candidate, is_reserved, NameClass};
pub use pipeline::{analyze, run, run_with, Analysis, RenameOptions, RenameReport};
pub use plan::{RenamePlan, Substitution};
pub use sink::{FsSink, MemorySink, OutputFile, OutputSink};
pub use table::RenameTable;
