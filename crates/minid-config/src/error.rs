//! Error types for configuration loading and validation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Filesystem validation errors
    #[error("source directory not found: {}", path.display())]
    SourceDirNotFound { path: PathBuf },

    #[error("interface file not found: {}", path.display())]
    InterfaceNotFound { path: PathBuf },

    // Loading errors
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid config value for '{field}'")]
    InvalidValue { field: String, hint: Option<String> },

    // Schema validation errors
    #[error("no interface files specified")]
    NoInterfaces,

    #[error("schema validation failed: {message}")]
    SchemaValidation { message: String, hint: Option<String> },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Suggested fix, when one is known.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::InvalidValue { hint, .. } | Self::SchemaValidation { hint, .. } => hint.as_deref(),
            Self::NoInterfaces => Some("Pass interface files on the command line or set 'interfaces' in minid.toml"),
            Self::UnsupportedFormat(_) => Some("Use a .toml or .json config file"),
            _ => None,
        }
    }
}
