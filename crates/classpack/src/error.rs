//! Pipeline error types.

use std::path::PathBuf;

use crate::cache::CacheError;
use crate::manifest::ManifestError;

/// Errors that abort a collection run.
///
/// Missing roots, unidentifiable files and dependency cycles are recovered
/// inside the pipeline and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// A source file could not be read
    #[error("Failed to read source file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Cache artifact could not be stored or loaded
    #[error(transparent)]
    Cache(#[from] CacheError),
}
