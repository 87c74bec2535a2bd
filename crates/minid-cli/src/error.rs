//! Error handling for the minid CLI.
//!
//! [`CliError`] wraps the library errors and adds hints where the fix is
//! known. `main` renders it through [`cli_error_to_miette`].

mod report;

use std::path::PathBuf;

use minid_config::ConfigError;
use minid_graph::GraphError;
use minid_rename::RenameError;
use minid_sourcemap::MergeError;
use thiserror::Error;

pub use report::cli_error_to_miette;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Rename(#[from] RenameError),

    #[error("Source map merge failed: {0}")]
    Merge(#[from] MergeError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error with a hint attached by [`ResultExt::with_hint`].
    #[error("{message}")]
    Hinted { message: String, hint: String },

    #[error("{0}")]
    Custom(String),
}

impl CliError {
    /// Suggested fix, when one is known.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Config(err) => err.hint().map(str::to_string),
            Self::Rename(RenameError::OutputOverlapsSource(_)) => {
                Some("Choose an output directory outside the source tree".to_string())
            }
            Self::Rename(RenameError::Graph(GraphError::InterfaceNotFound(_))) => {
                Some("Interface paths are relative to the source directory".to_string())
            }
            Self::Rename(RenameError::Graph(GraphError::Syntax { .. })) => {
                Some("Nothing was written; fix the syntax error and run again".to_string())
            }
            Self::Merge(MergeError::NotADirectory(_)) => {
                Some("Pass the directory that holds the generated files".to_string())
            }
            Self::Hinted { hint, .. } => Some(hint.clone()),
            _ => None,
        }
    }

    /// File the error is about, when there is one.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Config(ConfigError::SourceDirNotFound { path })
            | Self::Config(ConfigError::InterfaceNotFound { path })
            | Self::Config(ConfigError::NotFound { path }) => Some(path),
            Self::Rename(RenameError::Io { path, .. })
            | Self::Rename(RenameError::Graph(GraphError::Syntax { path, .. }))
            | Self::Rename(RenameError::Graph(GraphError::Io { path, .. }))
            | Self::Merge(MergeError::Io { path, .. })
            | Self::Merge(MergeError::InvalidMap { path, .. }) => Some(path),
            _ => None,
        }
    }
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Attach a hint shown below the error.
    ///
    /// ```rust
    /// # use minid_cli::error::{CliError, ResultExt};
    /// let result: Result<(), CliError> = Err(CliError::Custom("no files".into()));
    /// let err = result.with_hint("Check the extension list").unwrap_err();
    /// assert_eq!(err.hint().as_deref(), Some("Check the extension list"));
    /// ```
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Hinted {
                message: err.to_string(),
                hint: hint.to_string(),
            }
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{msg}: {err}"))
        })
    }
}
