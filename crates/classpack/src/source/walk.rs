//! Recursive enumeration of source roots.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

/// Enumerates candidate entries under a root directory.
pub trait EntryWalker {
    /// All entries below `root`, in a stable order.
    ///
    /// A missing or unreadable root yields no entries.
    fn walk(&self, root: &Path) -> Vec<PathBuf>;
}

/// Filesystem walker, sorted by file name at each level.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWalker {
    pub follow_links: bool,
}

impl EntryWalker for FsWalker {
    fn walk(&self, root: &Path) -> Vec<PathBuf> {
        let mut entries = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(self.follow_links)
            .sort_by_file_name();

        for entry in walker {
            match entry {
                Ok(entry) => entries.push(entry.into_path()),
                Err(err) => {
                    warn!(root = %root.display(), error = %err, "skipping unreadable entry");
                }
            }
        }

        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_walk_is_sorted_and_recursive() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("b/Two.php"), "").unwrap();
        fs::write(root.join("a.php"), "").unwrap();

        let entries = FsWalker::default().walk(root);
        let names: Vec<_> = entries
            .iter()
            .filter_map(|p| p.strip_prefix(root).ok())
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(names, vec!["", "a.php", "b", "b/Two.php"]);
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let temp = TempDir::new().unwrap();
        let entries = FsWalker::default().walk(&temp.path().join("absent"));
        assert!(entries.is_empty());
    }
}
