//! Subcommand implementations and shared configuration resolution.

pub mod build;
pub mod clean;
pub mod order;

use anyhow::{bail, Context};
use classpack::{find_manifest, BundleManifest, DeclaredRegistry, LoaderConfig};
use clap::Args;
use std::path::{Path, PathBuf};

/// Command-line overrides applied on top of the manifest.
#[derive(Args, Debug, Clone, Default)]
pub struct Overrides {
    /// Artifact path
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Source root (repeatable; replaces the manifest's roots)
    #[arg(short, long = "path")]
    pub paths: Vec<PathBuf>,

    /// Rebuild even if the artifact exists
    #[arg(long)]
    pub reload: bool,

    /// Keep comments in the artifact
    #[arg(long)]
    pub keep_comments: bool,

    /// Identity already known to the host (repeatable)
    #[arg(long)]
    pub declared: Vec<String>,
}

/// Manifest to use: the explicit one, or the nearest `classpack.toml`.
pub fn locate_manifest(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_manifest(cwd),
    }
}

/// Merge manifest settings and overrides into loader settings.
///
/// `manifest` is used as given; see [`locate_manifest`] for the lookup.
/// Without a manifest, `--cache` is required and relative paths resolve
/// against `cwd`.
pub fn resolve_config(
    manifest: Option<&Path>,
    overrides: &Overrides,
    cwd: &Path,
) -> anyhow::Result<(LoaderConfig, DeclaredRegistry)> {
    let (mut config, mut declared) = match manifest {
        Some(path) => {
            let manifest = BundleManifest::from_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            let base = path.parent().unwrap_or(cwd);
            (manifest.config(base), manifest.types.declared)
        }
        None => match &overrides.cache {
            Some(cache) => (LoaderConfig::new(cwd.join(cache)), Vec::new()),
            None => bail!("No classpack.toml found; pass --config or --cache"),
        },
    };

    if let Some(cache) = &overrides.cache {
        config.cache_path = cwd.join(cache);
    }
    if !overrides.paths.is_empty() {
        config.roots = overrides.paths.iter().map(|p| cwd.join(p)).collect();
    }
    if overrides.reload {
        config.reload = true;
    }
    if overrides.keep_comments {
        config.strip_comments = false;
    }
    declared.extend(overrides.declared.iter().cloned());

    Ok((config, DeclaredRegistry::new(declared)))
}

/// Like [`resolve_config`], starting from the process working directory.
pub fn resolve_from_cwd(
    manifest: Option<&Path>,
    overrides: &Overrides,
) -> anyhow::Result<(LoaderConfig, DeclaredRegistry)> {
    let cwd = std::env::current_dir().context("Cannot determine current directory")?;
    let located = locate_manifest(manifest, &cwd);
    resolve_config(located.as_deref(), overrides, &cwd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use classpack::{Identity, MANIFEST_FILE};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_overrides_apply_on_manifest() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(MANIFEST_FILE),
            "[cache]\npath = \"var/classes.php\"\n[sources]\npaths = [\"src\"]\n[types]\ndeclared = [\"A\\\\Known\"]\n",
        )
        .unwrap();

        let overrides = Overrides {
            paths: vec![PathBuf::from("lib")],
            reload: true,
            keep_comments: true,
            declared: vec!["B\\Extra".to_string()],
            ..Default::default()
        };
        let manifest = locate_manifest(None, temp.path()).unwrap();
        assert_eq!(manifest, temp.path().join(MANIFEST_FILE));
        let (config, declared) = resolve_config(Some(manifest.as_path()), &overrides, temp.path()).unwrap();

        assert_eq!(config.cache_path, temp.path().join("var/classes.php"));
        assert_eq!(config.roots, vec![temp.path().join("lib")]);
        assert!(config.reload);
        assert!(!config.strip_comments);
        assert!(declared.contains(&Identity::new("A\\Known")));
        assert!(declared.contains(&Identity::new("B\\Extra")));
    }

    #[test]
    fn test_explicit_manifest_wins_over_lookup() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(MANIFEST_FILE), "[cache]\npath = \"near.php\"\n").unwrap();
        let other = temp.path().join("other.toml");
        fs::write(&other, "[cache]\npath = \"far.php\"\n").unwrap();

        assert_eq!(locate_manifest(Some(other.as_path()), temp.path()), Some(other.clone()));
        let (config, _) = resolve_config(Some(other.as_path()), &Overrides::default(), temp.path()).unwrap();
        assert_eq!(config.cache_path, temp.path().join("far.php"));
    }

    #[test]
    fn test_cache_flag_without_manifest() {
        let temp = TempDir::new().unwrap();
        let overrides = Overrides {
            cache: Some(PathBuf::from("out/classes.php")),
            ..Default::default()
        };

        let missing = temp.path().join("absent.toml");
        assert!(resolve_config(Some(missing.as_path()), &overrides, temp.path()).is_err());

        let (config, declared) = resolve_config(None, &overrides, temp.path()).unwrap();
        assert_eq!(config.cache_path, temp.path().join("out/classes.php"));
        assert!(config.roots.is_empty());
        assert!(declared.is_empty());

        assert!(resolve_config(None, &Overrides::default(), temp.path()).is_err());
    }
}
