//! Bundle manifest parsing (classpack.toml)
//!
//! ```toml
//! [cache]
//! path = "var/cache/classes.php"
//! reload = false
//! strip-comments = true
//!
//! [sources]
//! paths = ["src", "lib"]
//! extensions = ["php"]
//!
//! [types]
//! declared = ["Vendor\\Preloaded"]
//! internal = ["MyExtClass"]
//! retry-budget = 3
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::graph::{DeclaredRegistry, DEFAULT_RETRY_BUDGET};
use crate::loader::LoaderConfig;

/// Manifest file name looked up by [`find_manifest`].
pub const MANIFEST_FILE: &str = "classpack.toml";

/// Errors that can occur during manifest parsing
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Failed to read manifest file
    #[error("Failed to read manifest file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse manifest: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid manifest: {0}")]
    ValidationError(String),
}

/// Bundle manifest (classpack.toml)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleManifest {
    pub cache: CacheSection,

    #[serde(default)]
    pub sources: SourcesSection,

    #[serde(default)]
    pub types: TypesSection,
}

/// `[cache]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct CacheSection {
    /// Artifact location, relative to the manifest directory
    pub path: PathBuf,

    /// Rebuild even when the artifact exists
    #[serde(default)]
    pub reload: bool,

    #[serde(default = "default_true")]
    pub strip_comments: bool,
}

/// `[sources]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourcesSection {
    #[serde(default)]
    pub paths: Vec<PathBuf>,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for SourcesSection {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            extensions: default_extensions(),
        }
    }
}

/// `[types]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct TypesSection {
    /// Identities already known to the host
    #[serde(default)]
    pub declared: Vec<String>,

    /// Runtime-provided type names beyond the builtin list
    #[serde(default)]
    pub internal: Vec<String>,

    #[serde(default = "default_retry_budget")]
    pub retry_budget: u32,
}

impl Default for TypesSection {
    fn default() -> Self {
        Self {
            declared: Vec::new(),
            internal: Vec::new(),
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    vec!["php".to_string()]
}

fn default_retry_budget() -> u32 {
    DEFAULT_RETRY_BUDGET
}

impl BundleManifest {
    /// Load a manifest from a file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a manifest from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ManifestError> {
        let manifest: BundleManifest = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate the manifest
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.cache.path.as_os_str().is_empty() {
            return Err(ManifestError::ValidationError(
                "cache.path cannot be empty".to_string(),
            ));
        }

        if self.sources.extensions.is_empty() {
            return Err(ManifestError::ValidationError(
                "sources.extensions must list at least one extension".to_string(),
            ));
        }

        for ext in &self.sources.extensions {
            let bare = ext.trim_start_matches('.');
            if bare.is_empty() || bare.contains(|c| c == '/' || c == '\\') {
                return Err(ManifestError::ValidationError(format!(
                    "Invalid file extension: {:?}",
                    ext
                )));
            }
        }

        for name in &self.types.declared {
            if name.trim().trim_start_matches('\\').is_empty() {
                return Err(ManifestError::ValidationError(
                    "types.declared cannot contain empty names".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Loader settings with relative paths resolved against `base_dir`.
    pub fn config(&self, base_dir: &Path) -> LoaderConfig {
        LoaderConfig {
            cache_path: base_dir.join(&self.cache.path),
            reload: self.cache.reload,
            strip_comments: self.cache.strip_comments,
            roots: self.sources.paths.iter().map(|p| base_dir.join(p)).collect(),
            extensions: self
                .sources
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect(),
            internal: self.types.internal.clone(),
            retry_budget: self.types.retry_budget,
        }
    }

    /// Snapshot of the configured already-declared identities.
    pub fn declared(&self) -> DeclaredRegistry {
        DeclaredRegistry::new(&self.types.declared)
    }
}

/// Find `classpack.toml` in `start` or any of its ancestors.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(MANIFEST_FILE))
        .find(|candidate| candidate.is_file())
}
