//! Terminal output: status lines and run summaries.
//!
//! Everything here writes to stderr; stdout is reserved for `--json`.

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, print_merge_summary, print_rename_summary, rename_summary_lines};
pub use messages::{info, success, warning};

static COLOR: AtomicBool = AtomicBool::new(true);

/// Whether color should be used, from `NO_COLOR`, `FORCE_COLOR` and the
/// terminal.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

/// Decide once whether styled output is used. `no_color` wins.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && should_use_color();
    COLOR.store(enabled, Ordering::Relaxed);
    console::set_colors_enabled_stderr(enabled);
}

pub(crate) fn colors_enabled() -> bool {
    COLOR.load(Ordering::Relaxed)
}
