use super::{load_document, output_prefix, write_output};
use anyhow::{Context, Result};
use dbdiff::config::Config;
use dbdiff::diff_databases;
use dbdiff::output::OutputFiles;
use dbdiff::report::ReportFormat;
use std::path::Path;
use tracing::{info, warn};

/// Generate upgrade scripts taking `old` to `new`, staged or single-file per config.
pub fn cmd_diff(config: &Config, old: &Path, new: &Path, format: ReportFormat) -> Result<()> {
    let prefix = output_prefix(&config.output, new);
    let directory = &config.output.directory;
    let files = if config.output.single_stage {
        OutputFiles::open_single(directory, &prefix, None)
    } else {
        OutputFiles::open_staged(directory, &prefix)
    }
    .context("Failed to create upgrade output files")?;

    let old_db = load_document(old)?;
    let new_db = load_document(new)?;
    let router = diff_databases(&old_db, &new_db, config)
        .with_context(|| format!("Failed to diff {} against {}", old.display(), new.display()))?;

    if router.destructive_count() > 0 {
        warn!(
            "Upgrade contains {} destructive statement(s)",
            router.destructive_count()
        );
    }
    let written = write_output("diff", config, files, &router, format)?;
    info!("Upgrade written to {} file(s)", written.len());
    Ok(())
}
