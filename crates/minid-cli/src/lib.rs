//! minid CLI.
//!
//! Command-line front end for `minid-rename` and `minid-sourcemap`:
//!
//! - [`cli`] - clap argument definitions
//! - [`commands`] - `rename` and `merge-maps`
//! - [`error`] - [`CliError`] with hints, rendered through miette
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines and run summaries
//!
//! # Example
//!
//! ```rust,no_run
//! use minid_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result, ResultExt};
