//! Pluggable config validation strategies.
//!
//! Separates schema checks (no filesystem access) from filesystem checks
//! (CLI use, after paths have been resolved).

use std::path::Path;

use path_clean::PathClean;

use crate::config::MinidConfig;
use crate::error::{ConfigError, Result};

pub trait ConfigValidator {
    fn validate(&self, config: &MinidConfig) -> Result<()>;
}

/// Schema-only validation.
///
/// ```
/// use minid_config::{ConfigValidator, MinidConfig, SchemaValidator};
///
/// let mut config = MinidConfig::default();
/// config.interfaces = vec!["index.ts".into()];
/// SchemaValidator.validate(&config).unwrap();
/// ```
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, config: &MinidConfig) -> Result<()> {
        if config.interfaces.is_empty() {
            return Err(ConfigError::NoInterfaces);
        }

        if config.src_dir.clean() == config.out_dir.clean() {
            return Err(ConfigError::SchemaValidation {
                message: format!(
                    "out_dir must differ from src_dir ({})",
                    config.src_dir.display()
                ),
                hint: Some("Write the renamed project to a separate directory".to_string()),
            });
        }

        for interface in &config.interfaces {
            if interface.is_absolute() {
                return Err(ConfigError::SchemaValidation {
                    message: format!("interface {} must be relative to src_dir", interface.display()),
                    hint: Some("List interface files relative to the source directory".to_string()),
                });
            }
        }

        if config.preserve.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::SchemaValidation {
                message: "preserved names cannot be empty".to_string(),
                hint: Some("Remove empty strings from the 'preserve' array".to_string()),
            });
        }

        if config.extensions.iter().any(|ext| ext.trim_start_matches('.').is_empty()) {
            return Err(ConfigError::SchemaValidation {
                message: "extensions cannot be empty".to_string(),
                hint: Some("Use entries such as \".ts\" or \"tsx\"".to_string()),
            });
        }

        Ok(())
    }
}

/// Schema validation plus existence checks for the source tree.
pub struct FsValidator;

impl ConfigValidator for FsValidator {
    fn validate(&self, config: &MinidConfig) -> Result<()> {
        SchemaValidator.validate(config)?;

        if !config.src_dir.is_dir() {
            return Err(ConfigError::SourceDirNotFound {
                path: config.src_dir.clone(),
            });
        }

        for interface in &config.interfaces {
            let path = config.src_dir.join(interface);
            if !path.is_file() {
                return Err(ConfigError::InterfaceNotFound { path });
            }
        }

        Ok(())
    }
}

pub fn validate_schema(config: &MinidConfig) -> Result<()> {
    SchemaValidator.validate(config)
}

/// Filesystem validation after resolving `config`'s paths against `root`.
pub fn validate_fs(config: &MinidConfig, root: impl AsRef<Path>) -> Result<()> {
    FsValidator.validate(&config.clone().resolve_paths(root.as_ref()))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    fn config(interfaces: &[&str]) -> MinidConfig {
        MinidConfig {
            interfaces: interfaces.iter().map(PathBuf::from).collect(),
            ..MinidConfig::default()
        }
    }

    #[test]
    fn schema_validator_rejects_missing_interfaces() {
        let result = SchemaValidator.validate(&config(&[]));
        assert!(matches!(result, Err(ConfigError::NoInterfaces)));
    }

    #[test]
    fn schema_validator_rejects_in_place_output() {
        let mut same = config(&["index.ts"]);
        same.out_dir = PathBuf::from("./src");
        let err = SchemaValidator.validate(&same).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
        assert!(err.hint().is_some());
    }

    #[test]
    fn schema_validator_rejects_empty_preserve_names() {
        let mut bad = config(&["index.ts"]);
        bad.preserve = vec!["keep".into(), " ".into()];
        assert!(SchemaValidator.validate(&bad).is_err());
    }

    #[test]
    fn schema_validator_accepts_valid_config() {
        assert!(validate_schema(&config(&["index.ts"])).is_ok());
    }

    #[test]
    fn fs_validator_checks_interfaces_exist() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/index.ts"), "export {}").unwrap();

        assert!(validate_fs(&config(&["index.ts"]), dir.path()).is_ok());
        assert!(matches!(
            validate_fs(&config(&["missing.ts"]), dir.path()),
            Err(ConfigError::InterfaceNotFound { .. })
        ));
    }

    #[test]
    fn fs_validator_checks_source_dir() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            validate_fs(&config(&["index.ts"]), dir.path()),
            Err(ConfigError::SourceDirNotFound { .. })
        ));
    }
}
