//! Run summaries.

use std::time::Duration;

use minid_rename::RenameReport;
use minid_sourcemap::MergeSummary;
use owo_colors::OwoColorize;

use super::{colors_enabled, success};

/// Format duration in human-readable format.
///
/// ```
/// use minid_cli::ui::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{millis}ms")
    } else if millis < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Label and value rows of a rename summary.
pub fn rename_summary_lines(report: &RenameReport) -> Vec<(&'static str, usize)> {
    vec![
        ("Files rewritten", report.files_rewritten),
        ("Files copied", report.files_copied),
        ("Identifiers renamed", report.classes_renamed),
        ("Identifiers kept", report.classes_fixed),
        ("Occurrences substituted", report.occurrences_substituted),
    ]
}

fn print_rows(rows: &[(&str, usize)]) {
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in rows {
        let label = format!("{label:<width$}");
        if colors_enabled() {
            eprintln!("  {}  {}", label.dimmed(), value.bold());
        } else {
            eprintln!("  {label}  {value}");
        }
    }
}

pub fn print_rename_summary(report: &RenameReport, duration: Duration, dry_run: bool) {
    let verb = if dry_run { "Analysed" } else { "Renamed" };
    success(&format!("{verb} project in {}", format_duration(duration)));
    print_rows(&rename_summary_lines(report));
    if dry_run {
        eprintln!("  (dry run, nothing written)");
    }
}

pub fn print_merge_summary(summary: &MergeSummary, duration: Duration) {
    success(&format!("Merged source maps in {}", format_duration(duration)));
    print_rows(&[
        ("Files scanned", summary.scanned),
        ("Maps reached", summary.maps),
        ("Maps rewritten", summary.rewritten),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_the_report_counts() {
        let report = RenameReport {
            files_rewritten: 3,
            files_copied: 1,
            classes_total: 10,
            classes_fixed: 4,
            classes_renamed: 6,
            occurrences_substituted: 21,
        };
        let lines = rename_summary_lines(&report);
        assert!(lines.contains(&("Files rewritten", 3)));
        assert!(lines.contains(&("Files copied", 1)));
        assert!(lines.contains(&("Identifiers renamed", 6)));
    }

    #[test]
    fn durations_pick_a_unit() {
        assert_eq!(format_duration(Duration::from_millis(0)), "0ms");
        assert_eq!(format_duration(Duration::from_secs(61)), "1m 1s");
    }
}
