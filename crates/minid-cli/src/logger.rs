//! Logging setup for the minid CLI.
//!
//! Log lines go to stderr so that `--json` output on stdout stays parseable.
//!
//! ```rust,no_run
//! use minid_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("renaming");
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CRATES: &[&str] = &[
    "minid",
    "minid_cli",
    "minid_config",
    "minid_graph",
    "minid_rename",
    "minid_sourcemap",
];

/// Filter directive enabling `level` for every minid crate.
pub fn crate_directives(level: &str) -> String {
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Picks the filter from the flags, in this order:
/// 1. `--verbose`: debug for minid crates
/// 2. `--quiet`: errors only
/// 3. `RUST_LOG`
/// 4. `level` from the config file
/// 5. warn for minid crates
pub fn build_filter(verbose: bool, quiet: bool, level: Option<&str>) -> EnvFilter {
    if verbose {
        EnvFilter::new(crate_directives("debug"))
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(crate_directives(level.unwrap_or("warn"))))
    }
}

/// Install the global subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_level(verbose, quiet, no_color, None);
}

/// [`init_logger`] with a default level taken from configuration.
pub fn init_logger_with_level(verbose: bool, quiet: bool, no_color: bool, level: Option<&str>) {
    init_logger_with_filter(build_filter(verbose, quiet, level), no_color);
}

pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .compact();

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_every_crate() {
        let directives = crate_directives("debug");
        assert!(directives.contains("minid_rename=debug"));
        assert!(directives.contains("minid_graph=debug"));
        assert_eq!(directives.split(',').count(), CRATES.len());
    }

    #[test]
    fn verbose_and_quiet_filters_build() {
        assert!(build_filter(true, false, None).to_string().contains("minid_cli=debug"));
        assert!(build_filter(false, true, None).to_string().contains("error"));
    }
}
