//! Content loading errors

use std::path::PathBuf;
use thiserror::Error;

/// Failures while turning content files into posts.
///
/// A missing post is not an error: lookups return `Ok(None)` for that.
#[derive(Error, Debug)]
pub enum ContentError {
    /// Neither the requested locale directory nor the fallback exists
    #[error("content source not found: neither {requested:?} nor fallback {fallback:?} exists")]
    SourceNotFound { requested: PathBuf, fallback: PathBuf },

    /// A post file whose front-matter cannot produce a complete post
    #[error("malformed post {path:?}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
