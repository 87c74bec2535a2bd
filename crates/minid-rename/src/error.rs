use std::path::PathBuf;

use minid_graph::GraphError;

/// Errors raised by the rename pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RenameError {
    /// Project discovery or indexing failed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Writing an output file failed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The destination overlaps the source tree.
    #[error("output directory {} must differ from the source directory", .0.display())]
    OutputOverlapsSource(PathBuf),

    /// A cached rename table failed on its first run; later queries see this.
    #[error("rename table unavailable: {0}")]
    Unavailable(String),
}

impl RenameError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for rename operations.
pub type Result<T> = std::result::Result<T, RenameError>;
