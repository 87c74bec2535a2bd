use std::path::PathBuf;

/// Errors raised while composing source maps.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid source map {}: {message}", path.display())]
    InvalidMap { path: PathBuf, message: String },

    #[error("merge root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

impl MergeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MergeError>;
