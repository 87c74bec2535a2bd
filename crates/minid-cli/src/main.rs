//! minid - whole-project identifier renaming for TypeScript.
//!
//! Parses arguments, installs logging and dispatches to a command.

use clap::Parser;
use minid_cli::{cli, commands, error, logger, ui};
use miette::Result;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // The config file may name a log level, so it is consulted before the
    // subscriber is installed.
    let level = commands::configured_log_level(&args.command);
    logger::init_logger_with_level(args.verbose, args.quiet, args.no_color, level.as_deref());
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Rename(rename_args) => commands::rename_execute(rename_args),
        cli::Command::MergeMaps(merge_args) => commands::merge_maps_execute(merge_args),
    };

    result.map_err(error::cli_error_to_miette)
}
