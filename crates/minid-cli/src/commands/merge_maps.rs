//! Merge-maps command implementation.

use std::env;
use std::time::Instant;

use minid_sourcemap::SourceMapMerger;

use crate::cli::MergeMapsArgs;
use crate::error::{CliError, Result, ResultExt};
use crate::ui;

/// Execute the merge-maps command.
pub fn execute(args: MergeMapsArgs) -> Result<()> {
    if args.extensions.iter().any(|ext| ext.trim_start_matches('.').is_empty()) {
        return Err(CliError::InvalidArgument("extensions cannot be empty".to_string()));
    }

    let cwd = env::current_dir().with_hint("Run minid from an existing directory")?;
    let root = cwd.join(&args.out_dir);

    ui::info(&format!("Merging source maps under {}", root.display()));
    let started = Instant::now();
    let summary = SourceMapMerger::new(&args.extensions, args.recursive)
        .merge(&root)?;

    if summary.scanned == 0 {
        ui::warning(&format!(
            "No files ending in {} under {}",
            args.extensions.join(", "),
            root.display()
        ));
    }
    ui::print_merge_summary(&summary, started.elapsed());
    Ok(())
}
