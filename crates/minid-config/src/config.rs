//! Layered configuration for a rename run.
//!
//! Sources are merged with figment, later layers winning:
//!
//! 1. built-in defaults;
//! 2. `minid.toml`, the `minid` field of `package.json`, or an explicit file;
//! 3. `MINID_*` environment variables;
//! 4. command-line overrides.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format as _, Json, Serialized, Toml};
use figment::Figment;
use path_clean::PathClean;
use serde::{Deserialize, Serialize};

use crate::discovery::{package_field, ConfigDiscovery, ConfigSource};
use crate::error::{ConfigError, Result};

/// Prefix of the environment variables read by [`MinidConfig::load`].
pub const ENV_PREFIX: &str = "MINID_";

/// Extension search order used when none is configured.
pub fn default_extensions() -> Vec<String> {
    [".ts", ".tsx", ".d.ts", ".mts", ".cts", ".js", ".jsx", ".mjs", ".cjs"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinidConfig {
    pub src_dir: PathBuf,
    pub out_dir: PathBuf,
    /// Public entry files, relative to `src_dir`.
    pub interfaces: Vec<PathBuf>,
    pub source_map: bool,
    pub obfuscate: bool,
    pub extensions: Vec<String>,
    /// Identifiers that are never renamed.
    pub preserve: Vec<String>,
    pub log_level: Option<String>,
}

impl Default for MinidConfig {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::from("src"),
            out_dir: PathBuf::from("dist"),
            interfaces: Vec::new(),
            source_map: false,
            obfuscate: false,
            extensions: default_extensions(),
            preserve: Vec::new(),
            log_level: None,
        }
    }
}

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interfaces: Option<Vec<PathBuf>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_map: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obfuscate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl MinidConfig {
    /// Load configuration for the working directory `cwd`.
    ///
    /// `config_path` names an explicit file; otherwise `cwd` is searched.
    /// Relative paths in the result are resolved against `cwd`.
    #[tracing::instrument(level = "debug", skip(overrides), fields(cwd = %cwd.display()))]
    pub fn load(cwd: &Path, config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let source = match config_path {
            Some(path) => Some(ConfigSource::from_path(cwd.join(path))?),
            None => ConfigDiscovery::new(cwd).find(),
        };
        Self::load_layers(cwd, source.as_ref(), Env::prefixed(ENV_PREFIX), overrides)
    }

    fn load_layers(cwd: &Path, source: Option<&ConfigSource>, env: Env, overrides: &ConfigOverrides) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(source) = source {
            tracing::debug!(path = %source.path().display(), "config file found");
            figment = match source {
                ConfigSource::Toml(path) => figment.merge(Toml::file(path)),
                ConfigSource::Json(path) => figment.merge(Json::file(path)),
                ConfigSource::PackageJson(path) => figment.merge(Serialized::defaults(package_field(path)?)),
            };
        }

        figment = figment
            .merge(env)
            .merge(Serialized::defaults(overrides));

        let config: Self = figment.extract().map_err(|e| ConfigError::InvalidValue {
            field: e.path.join("."),
            hint: Some(e.to_string()),
        })?;
        Ok(config.resolve_paths(cwd))
    }

    /// Make `src_dir` and `out_dir` absolute against `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        self.src_dir = base.join(&self.src_dir).clean();
        self.out_dir = base.join(&self.out_dir).clean();
        self
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn load(dir: &Path, overrides: &ConfigOverrides) -> Result<MinidConfig> {
        let source = ConfigDiscovery::new(dir).find();
        // An unused prefix keeps the test independent of the process environment.
        MinidConfig::load_layers(dir, source.as_ref(), Env::prefixed("MINID_TEST_UNSET_"), overrides)
    }

    #[test]
    fn defaults_apply_without_a_file() {
        let dir = TempDir::new().unwrap();
        let config = load(dir.path(), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.src_dir, dir.path().join("src"));
        assert_eq!(config.out_dir, dir.path().join("dist"));
        assert!(config.interfaces.is_empty());
        assert!(!config.obfuscate);
        assert_eq!(config.extensions[0], ".ts");
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("minid.toml"),
            "src_dir = \"lib\"\ninterfaces = [\"index.ts\", \"cli.ts\"]\nsource_map = true\npreserve = [\"$$\"]\n",
        )
        .unwrap();

        let config = load(dir.path(), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.src_dir, dir.path().join("lib"));
        assert_eq!(config.interfaces, vec![PathBuf::from("index.ts"), PathBuf::from("cli.ts")]);
        assert!(config.source_map);
        assert_eq!(config.preserve, vec!["$$".to_string()]);
    }

    #[test]
    fn package_json_field_is_read() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"name": "app", "minid": {"out_dir": "build", "obfuscate": true}}"#,
        )
        .unwrap();

        let config = load(dir.path(), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.out_dir, dir.path().join("build"));
        assert!(config.obfuscate);
    }

    #[test]
    fn overrides_win_over_the_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("minid.toml"), "obfuscate = true\nout_dir = \"a\"\n").unwrap();

        let overrides = ConfigOverrides {
            out_dir: Some(PathBuf::from("b")),
            interfaces: Some(vec![PathBuf::from("main.ts")]),
            ..ConfigOverrides::default()
        };
        let config = load(dir.path(), &overrides).unwrap();
        assert_eq!(config.out_dir, dir.path().join("b"));
        assert_eq!(config.interfaces, vec![PathBuf::from("main.ts")]);
        assert!(config.obfuscate, "unset overrides keep the file value");
    }

    #[test]
    fn explicit_json_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("custom.json"), r#"{"interfaces": ["api.ts"]}"#).unwrap();
        let config = MinidConfig::load(dir.path(), Some(Path::new("custom.json")), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.interfaces, vec![PathBuf::from("api.ts")]);
    }

    #[test]
    fn wrong_types_are_reported_with_the_field() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("minid.toml"), "obfuscate = \"sometimes\"\n").unwrap();
        let err = load(dir.path(), &ConfigOverrides::default()).unwrap_err();
        match err {
            ConfigError::InvalidValue { field, hint } => {
                assert_eq!(field, "obfuscate");
                assert!(hint.is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
