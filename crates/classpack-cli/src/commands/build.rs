//! `classpack build`: Load the cache artifact or build it.

use super::{resolve_from_cwd, Overrides};
use crate::output::StyledOutput;
use classpack::{BuildReport, CollectionLoader, Outcome};
use std::path::Path;
use termcolor::ColorChoice;

pub fn execute(manifest: Option<&Path>, overrides: &Overrides, color: ColorChoice) -> anyhow::Result<()> {
    let (config, declared) = resolve_from_cwd(manifest, overrides)?;
    let loader = CollectionLoader::new(config, declared);
    let mut out = StyledOutput::new(color);

    match loader.handle()? {
        Outcome::Loaded { path, content } => {
            out.info("Using existing cache ");
            out.bold(&path.display().to_string());
            out.dim(&format!(" ({} bytes)", content.len()));
            out.newline();
        }
        Outcome::Built(report) => print_report(&mut out, &report),
    }

    out.flush();
    Ok(())
}

fn print_report(out: &mut StyledOutput, report: &BuildReport) {
    out.success("Built ");
    out.bold(&report.path.display().to_string());
    out.newline();
    out.plain(&format!(
        "  {} units in {} namespace blocks, {} requeues\n",
        report.units,
        report.blocks,
        report.requeues()
    ));

    for identity in report.circular() {
        out.warning("  circular ");
        out.plain(&format!("{} (emitted with guard)\n", identity));
    }

    for collision in &report.collisions {
        out.warning("  collision ");
        out.plain(&format!(
            "{}: {} replaced {}\n",
            collision.identity,
            collision.kept.display(),
            collision.replaced.display()
        ));
    }
}
