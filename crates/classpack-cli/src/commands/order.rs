//! `classpack order`: Print the emission order.

use super::{resolve_from_cwd, Overrides};
use crate::output::StyledOutput;
use classpack::CollectionLoader;
use std::path::Path;
use termcolor::ColorChoice;

pub fn execute(manifest: Option<&Path>, overrides: &Overrides, color: ColorChoice) -> anyhow::Result<()> {
    let (config, declared) = resolve_from_cwd(manifest, overrides)?;
    let plan = CollectionLoader::new(config, declared).order()?;
    let mut out = StyledOutput::new(color);

    let width = plan.sequence.order.len().to_string().len();
    for (i, identity) in plan.sequence.order.iter().enumerate() {
        out.dim(&format!("{:>width$} ", i + 1, width = width));
        out.plain(identity.as_str());
        if plan.sequence.is_circular(identity) {
            out.warning(" (circular)");
        }
        out.newline();
    }

    out.newline();
    out.bold(&format!("{} units", plan.sequence.order.len()));
    out.plain(&format!(
        ", {} circular, {} requeues\n",
        plan.sequence.circular.len(),
        plan.sequence.requeues
    ));
    out.flush();
    Ok(())
}
