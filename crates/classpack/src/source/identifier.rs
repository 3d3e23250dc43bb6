//! Unit identification
//!
//! Decides whether a filesystem entry declares a bundleable type, reading
//! only a bounded window at the start of the file.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::grammar;
use super::unit::Identity;
use crate::error::CollectError;

/// Number of leading bytes inspected for a declaration header.
pub const HEADER_WINDOW: u64 = 1024;

/// Extracts the declared identity of candidate source files.
#[derive(Debug, Clone)]
pub struct UnitIdentifier {
    extensions: Vec<String>,
    window: u64,
}

impl Default for UnitIdentifier {
    fn default() -> Self {
        Self::new(vec!["php".to_string()])
    }
}

impl UnitIdentifier {
    pub fn new(extensions: Vec<String>) -> Self {
        Self {
            extensions,
            window: HEADER_WINDOW,
        }
    }

    /// Override the leading-content window.
    pub fn with_window(mut self, window: u64) -> Self {
        self.window = window;
        self
    }

    /// Identify the type declared in `path`.
    ///
    /// Returns `Ok(None)` for non-files, other extensions, and files with no
    /// recognizable header in the window.
    pub fn identify(&self, path: &Path) -> Result<Option<Identity>, CollectError> {
        if !path.is_file() || !self.has_extension(path) {
            return Ok(None);
        }

        let mut head = Vec::new();
        File::open(path)
            .and_then(|file| file.take(self.window).read_to_end(&mut head))
            .map_err(|source| CollectError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(identify_text(&String::from_utf8_lossy(&head)))
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

/// Identity declared by the given leading text.
pub fn identify_text(head: &str) -> Option<Identity> {
    let name = grammar::declared_name(head)?;
    Some(match grammar::namespace_prefix(head) {
        Some(prefix) => Identity::qualified(prefix, name),
        None => Identity::new(name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_identify_namespaced_class() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Router.php");
        fs::write(&path, "<?php\nnamespace lib\\http;\n\nclass Router\n{\n}\n").unwrap();

        let id = UnitIdentifier::default().identify(&path).unwrap();
        assert_eq!(id, Some(Identity::new("lib\\http\\Router")));
    }

    #[test]
    fn test_identify_global_abstract_class() {
        assert_eq!(
            identify_text("<?php\nabstract class Model {}\n"),
            Some(Identity::new("Model"))
        );
    }

    #[test]
    fn test_wrong_extension_skipped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Router.inc");
        fs::write(&path, "<?php\nclass Router {}\n").unwrap();

        assert_eq!(UnitIdentifier::default().identify(&path).unwrap(), None);
    }

    #[test]
    fn test_directory_skipped() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("Nested.php");
        fs::create_dir(&dir).unwrap();

        assert_eq!(UnitIdentifier::default().identify(&dir).unwrap(), None);
    }

    #[test]
    fn test_header_outside_window() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Late.php");
        let padding = "// padding\n".repeat(20);
        fs::write(&path, format!("<?php\n{}class Late {{}}\n", padding)).unwrap();

        let identifier = UnitIdentifier::default().with_window(64);
        assert_eq!(identifier.identify(&path).unwrap(), None);
        assert!(UnitIdentifier::default().identify(&path).unwrap().is_some());
    }

    #[test]
    fn test_plain_script_has_no_identity() {
        assert_eq!(identify_text("<?php\nrequire 'bootstrap.php';\n"), None);
    }
}
