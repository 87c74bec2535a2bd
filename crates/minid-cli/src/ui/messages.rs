//! Status message functions for terminal output.

use owo_colors::OwoColorize;

use super::colors_enabled;

fn emit(symbol: &str, message: &str, paint: impl Fn(&str, &str) -> String) {
    if colors_enabled() {
        eprintln!("{}", paint(symbol, message));
    } else {
        eprintln!("{symbol} {message}");
    }
}

/// ```no_run
/// minid_cli::ui::success("Renamed 12 files");
/// ```
pub fn success(message: &str) {
    emit("✓", message, |s, m| format!("{} {}", s.green().bold(), m));
}

pub fn info(message: &str) {
    emit("ℹ", message, |s, m| format!("{} {}", s.blue().bold(), m));
}

pub fn warning(message: &str) {
    emit("⚠", message, |s, m| format!("{} {}", s.yellow().bold(), m.yellow()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_messages_do_not_panic() {
        success("Success message");
        info("Info message");
        warning("Warning message");
    }
}
