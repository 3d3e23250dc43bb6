//! Cache artifact persistence
//!
//! The artifact is written to a temporary file next to the target and then
//! renamed over it, so a failed write never leaves a partial artifact and
//! never disturbs a previous one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while storing or loading the artifact
#[derive(Debug, Error)]
pub enum CacheError {
    /// Parent directory could not be created
    #[error("Unable to create cache dir {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact could not be written or moved into place
    #[error("Failed to write cache file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Existing artifact could not be read
    #[error("Failed to read cache file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Existing artifact could not be deleted
    #[error("Failed to remove cache file {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Location of the merged cache artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheFile {
    path: PathBuf,
}

impl CacheFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the artifact as-is.
    pub fn load(&self) -> Result<String, CacheError> {
        let content = fs::read_to_string(&self.path).map_err(|source| CacheError::Read {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), bytes = content.len(), "loaded cache artifact");
        Ok(content)
    }

    /// Atomically replace the artifact with `content`.
    pub fn write(&self, content: &str) -> Result<(), CacheError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        fs::create_dir_all(&dir).map_err(|source| CacheError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let write_err = |source| CacheError::Write {
            path: self.path.clone(),
            source,
        };

        let mut temp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        temp.write_all(content.as_bytes()).map_err(write_err)?;
        temp.flush().map_err(write_err)?;
        temp.persist(&self.path).map_err(|e| write_err(e.error))?;

        info!(path = %self.path.display(), bytes = content.len(), "wrote cache artifact");
        Ok(())
    }

    /// Delete the artifact. Returns whether a file was removed.
    pub fn remove(&self) -> Result<bool, CacheError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "removed cache artifact");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CacheError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
