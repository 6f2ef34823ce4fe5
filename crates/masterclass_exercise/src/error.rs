//! Content loading errors

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid frontmatter in {path}: {message}")]
    Frontmatter { path: PathBuf, message: String },

    /// Ids name directories, so anything outside `[a-z0-9-]` is rejected
    #[error("invalid exercise id {0:?}: expected lowercase words joined by '-'")]
    InvalidId(String),

    #[error("unknown locale {0:?}: expected \"en\" or \"ja\"")]
    UnknownLocale(String),
}

pub type Result<T> = std::result::Result<T, ContentError>;

impl ContentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
