//! Miette rendering for CLI errors.

use miette::Report;

use crate::error::CliError;

/// Convert a [`CliError`] into a miette report, carrying its hint as help.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err.hint() {
        Some(hint) => miette::miette!(help = hint, "{}", err),
        None => miette::miette!("{}", err),
    }
}
