use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Available minid subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rename a project into an output directory
    ///
    /// Everything reachable from the interface files keeps its name. Every
    /// other identifier is renamed to the shortest name that cannot collide.
    Rename(RenameArgs),

    /// Compose chained source maps under a directory
    ///
    /// Rewrites every map whose sources carry maps of their own so that it
    /// points at the original sources directly.
    MergeMaps(MergeMapsArgs),
}

/// Arguments for the rename command
#[derive(Args, Debug, Default)]
pub struct RenameArgs {
    /// Source directory (defaults to the config file, then `src`)
    #[arg(value_name = "SRC_DIR")]
    pub src_dir: Option<PathBuf>,

    /// Output directory (defaults to the config file, then `dist`)
    #[arg(value_name = "OUT_DIR")]
    pub out_dir: Option<PathBuf>,

    /// Public interface files, relative to the source directory
    ///
    /// Examples:
    ///   minid rename src dist index.ts
    ///   minid rename src dist index.ts cli.ts
    #[arg(value_name = "INTERFACE")]
    pub interfaces: Vec<PathBuf>,

    /// Write a `.map` file next to every renamed file
    #[arg(short = 's', long)]
    pub source_map: bool,

    /// Allocate names per reference class instead of sharing names between
    /// same-spelled locals
    #[arg(short = 'o', long)]
    pub obfuscate: bool,

    /// Config file (TOML or JSON); `minid.toml` is used when present
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Identifiers that are never renamed
    ///
    /// Examples:
    ///   --preserve $ --preserve jQuery
    ///   --preserve $,jQuery
    #[arg(long, value_name = "NAME", value_delimiter = ',')]
    pub preserve: Vec<String>,

    /// Analyse and report without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the merge-maps command
#[derive(Args, Debug)]
pub struct MergeMapsArgs {
    /// Directory holding the generated files
    #[arg(value_name = "OUT_DIR")]
    pub out_dir: PathBuf,

    /// File-name suffixes to scan, such as `.js` or `.map`
    #[arg(required = true, value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,
}
