//! # minid-sourcemap
//!
//! Chained source-map composition.
//!
//! A renamed file carries a map back to its input, and that input may itself
//! be generated (compiled TypeScript, a bundle) with a map of its own.
//! [`SourceMapMerger`] walks an output tree, follows every
//! `//# sourceMappingURL` link and rewrites each map so that it points at the
//! original sources directly.
//!
//! ```rust,no_run
//! use minid_sourcemap::SourceMapMerger;
//!
//! # fn main() -> minid_sourcemap::Result<()> {
//! let summary = SourceMapMerger::new([".js", ".map"], true).merge("dist")?;
//! println!("{} of {} maps rewritten", summary.rewritten, summary.maps);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod link;
pub mod merger;
pub mod paths;

pub use error::{MergeError, Result};
pub use link::{append_mapping_url, mapping_url};
pub use merger::{MergeSummary, SourceMapMerger};
pub use paths::relative_path;
