//! File-based config discovery.
//!
//! Finds the configuration file for a working directory and classifies it so
//! the loader knows how to read it.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{ConfigError, Result};

/// Name of the TOML config file looked up in the working directory.
pub const CONFIG_FILE: &str = "minid.toml";

/// Field of `package.json` holding the configuration.
pub const PACKAGE_FIELD: &str = "minid";

/// A located configuration source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Toml(PathBuf),
    Json(PathBuf),
    /// The `minid` field of a `package.json`.
    PackageJson(PathBuf),
}

impl ConfigSource {
    /// Classify an explicitly named config file.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(ConfigError::NotFound { path });
        }
        if path.file_name().is_some_and(|name| name == "package.json") {
            return Ok(Self::PackageJson(path));
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml(path)),
            Some("json") => Ok(Self::Json(path)),
            other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("<none>").to_string())),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Toml(path) | Self::Json(path) | Self::PackageJson(path) => path,
        }
    }
}

/// Searches a directory for minid configuration.
///
/// # Example
///
/// ```no_run
/// use minid_config::ConfigDiscovery;
///
/// if let Some(source) = ConfigDiscovery::new(".").find() {
///     println!("using {}", source.path().display());
/// }
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Searches in this order:
    /// 1. `minid.toml`
    /// 2. `package.json` with a non-null `minid` field
    pub fn find(&self) -> Option<ConfigSource> {
        let toml_path = self.root.join(CONFIG_FILE);
        if toml_path.is_file() {
            return Some(ConfigSource::Toml(toml_path));
        }

        let pkg_path = self.root.join("package.json");
        if pkg_path.is_file() {
            if let Ok(content) = fs::read_to_string(&pkg_path) {
                if let Ok(parsed) = serde_json::from_str::<Value>(&content) {
                    if parsed.get(PACKAGE_FIELD).is_some_and(|field| !field.is_null()) {
                        return Some(ConfigSource::PackageJson(pkg_path));
                    }
                }
            }
        }

        None
    }
}

/// The `minid` field of a `package.json`.
pub(crate) fn package_field(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    let parsed: Value = serde_json::from_str(&content).map_err(|e| ConfigError::InvalidValue {
        field: "package.json".to_string(),
        hint: Some(format!("Invalid JSON: {e}")),
    })?;

    match parsed.get(PACKAGE_FIELD) {
        Some(value) if !value.is_null() => Ok(value.clone()),
        _ => Err(ConfigError::InvalidValue {
            field: PACKAGE_FIELD.to_string(),
            hint: Some("Add a 'minid' object to your package.json".to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn find_returns_none_when_no_config() {
        let dir = TempDir::new().unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());
    }

    #[test]
    fn toml_wins_over_package_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("minid.toml"), "interfaces = [\"index.ts\"]\n").unwrap();
        fs::write(dir.path().join("package.json"), r#"{"minid": {}}"#).unwrap();

        let found = ConfigDiscovery::new(dir.path()).find().unwrap();
        assert_eq!(found, ConfigSource::Toml(dir.path().join("minid.toml")));
    }

    #[test]
    fn package_json_needs_the_field() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"name": "app", "minid": null}"#).unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());

        fs::write(dir.path().join("package.json"), r#"{"name": "app", "minid": {"obfuscate": true}}"#).unwrap();
        let found = ConfigDiscovery::new(dir.path()).find().unwrap();
        assert!(matches!(found, ConfigSource::PackageJson(_)));
        assert_eq!(package_field(found.path()).unwrap()["obfuscate"], Value::Bool(true));
    }

    #[test]
    fn explicit_paths_are_classified_by_extension() {
        let dir = TempDir::new().unwrap();
        let json = dir.path().join("rename.json");
        let yaml = dir.path().join("rename.yaml");
        fs::write(&json, "{}").unwrap();
        fs::write(&yaml, "").unwrap();

        assert_eq!(ConfigSource::from_path(&json).unwrap(), ConfigSource::Json(json.clone()));
        assert!(matches!(ConfigSource::from_path(&yaml), Err(ConfigError::UnsupportedFormat(_))));
        assert!(matches!(
            ConfigSource::from_path(dir.path().join("absent.toml")),
            Err(ConfigError::NotFound { .. })
        ));
    }
}
