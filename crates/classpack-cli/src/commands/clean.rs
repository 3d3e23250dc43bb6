//! `classpack clean`: Delete the cache artifact.

use super::{resolve_from_cwd, Overrides};
use crate::output::StyledOutput;
use classpack::CacheFile;
use std::path::{Path, PathBuf};
use termcolor::ColorChoice;

pub fn execute(manifest: Option<&Path>, cache: Option<PathBuf>, color: ColorChoice) -> anyhow::Result<()> {
    let overrides = Overrides {
        cache,
        ..Default::default()
    };
    let (config, _) = resolve_from_cwd(manifest, &overrides)?;
    let artifact = CacheFile::new(&config.cache_path);
    let mut out = StyledOutput::new(color);

    if artifact.remove()? {
        out.success("Removed ");
        out.plain(&artifact.path().display().to_string());
    } else {
        out.dim("No cache artifact at ");
        out.plain(&artifact.path().display().to_string());
    }
    out.newline();
    out.flush();
    Ok(())
}
