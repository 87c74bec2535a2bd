//! Command implementations.
//!
//! - [`rename`] - rename a project
//! - [`merge_maps`] - compose chained source maps

pub mod merge_maps;
pub mod rename;

use crate::cli::Command;

pub use merge_maps::execute as merge_maps_execute;
pub use rename::execute as rename_execute;

/// The `log_level` named by the configuration a command will load.
///
/// Errors are ignored here; the command reports them once logging is up.
pub fn configured_log_level(command: &Command) -> Option<String> {
    match command {
        Command::Rename(args) => rename::load_config(args).ok()?.log_level,
        Command::MergeMaps(_) => None,
    }
}
