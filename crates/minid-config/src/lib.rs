//! # minid-config
//!
//! Configuration for minid runs: the [`MinidConfig`] model, layered loading
//! through figment, config-file discovery and validation.

pub mod config;
pub mod discovery;
pub mod error;
pub mod validation;

pub use config::{default_extensions, ConfigOverrides, MinidConfig, ENV_PREFIX};
pub use discovery::{ConfigDiscovery, ConfigSource, CONFIG_FILE, PACKAGE_FIELD};
pub use error::{ConfigError, Result};
pub use validation::{validate_fs, validate_schema, ConfigValidator, FsValidator, SchemaValidator};
