//! Command-line interface definition for minid.
//!
//! - `minid rename` - rename a project into an output directory
//! - `minid merge-maps` - compose chained source maps in an output tree

mod commands;

use clap::Parser;

pub use commands::{Command, MergeMapsArgs, RenameArgs};

/// minid - shorten private identifiers across a TypeScript project
#[derive(Parser, Debug)]
#[command(
    name = "minid",
    version,
    about = "Shorten private identifiers across a TypeScript project",
    long_about = "minid renames every identifier that is not reachable from the project's\n\
                  public interface files to the shortest safe name, mirroring the project\n\
                  into an output directory with optional source maps."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}
