//! Rename command implementation.

use std::env;
use std::path::Path;
use std::time::Instant;

use minid_config::{validate_fs, ConfigOverrides, MinidConfig};
use minid_graph::NativeProvider;
use minid_rename::{analyze, run, RenameOptions, RenameReport};

use crate::cli::RenameArgs;
use crate::error::{Result, ResultExt};
use crate::ui;

/// Merge command-line arguments over the config file and environment.
pub fn load_config(args: &RenameArgs) -> Result<MinidConfig> {
    let cwd = env::current_dir().context("Failed to read the working directory")?;
    load_config_in(&cwd, args)
}

fn load_config_in(cwd: &Path, args: &RenameArgs) -> Result<MinidConfig> {
    let overrides = ConfigOverrides {
        src_dir: args.src_dir.clone(),
        out_dir: args.out_dir.clone(),
        interfaces: (!args.interfaces.is_empty()).then(|| args.interfaces.clone()),
        source_map: args.source_map.then_some(true),
        obfuscate: args.obfuscate.then_some(true),
        preserve: (!args.preserve.is_empty()).then(|| args.preserve.clone()),
        log_level: None,
    };
    Ok(MinidConfig::load(cwd, args.config.as_deref(), &overrides)?)
}

pub fn rename_options(config: MinidConfig) -> RenameOptions {
    RenameOptions {
        src_dir: config.src_dir,
        out_dir: config.out_dir,
        interfaces: config.interfaces,
        source_map: config.source_map,
        obfuscate: config.obfuscate,
        extensions: config.extensions,
        preserve: config.preserve,
    }
}

/// Execute the rename command.
///
/// 1. Load and validate configuration
/// 2. Analyse the project (nothing is written if this fails)
/// 3. Emit into the output directory unless `--dry-run`
/// 4. Print the report
pub fn execute(args: RenameArgs) -> Result<()> {
    let cwd = env::current_dir().context("Failed to read the working directory")?;
    let config = load_config_in(&cwd, &args)?;
    validate_fs(&config, &cwd)?;

    let started = Instant::now();
    let options = rename_options(config);
    tracing::debug!(
        src_dir = %options.src_dir.display(),
        out_dir = %options.out_dir.display(),
        interfaces = options.interfaces.len(),
        "starting rename"
    );

    if !args.json {
        ui::info(&format!(
            "Renaming {} into {}",
            options.src_dir.display(),
            options.out_dir.display()
        ));
    }
    let report: RenameReport = if args.dry_run {
        analyze(&options, &NativeProvider)?.report()
    } else {
        run(&options)?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        ui::print_rename_summary(&report, started.elapsed(), args.dry_run);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn arguments_override_the_config_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("minid.toml"),
            "src_dir = \"lib\"\ninterfaces = [\"main.ts\"]\nsource_map = true\n",
        )
        .unwrap();

        let args = RenameArgs {
            out_dir: Some(PathBuf::from("build")),
            obfuscate: true,
            ..RenameArgs::default()
        };
        let config = load_config_in(dir.path(), &args).unwrap();
        assert_eq!(config.src_dir, dir.path().join("lib"));
        assert_eq!(config.out_dir, dir.path().join("build"));
        assert_eq!(config.interfaces, vec![PathBuf::from("main.ts")]);
        assert!(config.source_map, "an unset flag keeps the file value");
        assert!(config.obfuscate);
    }

    #[test]
    fn options_follow_the_config() {
        let config = MinidConfig {
            interfaces: vec![PathBuf::from("index.ts")],
            preserve: vec!["$".to_string()],
            obfuscate: true,
            ..MinidConfig::default()
        };
        let options = rename_options(config);
        assert_eq!(options.interfaces, vec![PathBuf::from("index.ts")]);
        assert_eq!(options.preserve, vec!["$".to_string()]);
        assert!(options.obfuscate);
        assert!(!options.source_map);
    }
}
