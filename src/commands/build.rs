use super::{load_document, output_prefix, write_output};
use anyhow::{Context, Result};
use dbdiff::build_database;
use dbdiff::config::Config;
use dbdiff::constants::BUILD_FILE_SUFFIX;
use dbdiff::output::OutputFiles;
use dbdiff::report::ReportFormat;
use std::path::Path;
use tracing::info;

/// Generate a full creation script for `document` as one `<prefix>_build.sql` file.
pub fn cmd_build(config: &Config, document: &Path, format: ReportFormat) -> Result<()> {
    let prefix = output_prefix(&config.output, document);
    // open before diffing so an unwritable directory fails fast
    let files = OutputFiles::open_single(&config.output.directory, &prefix, Some(BUILD_FILE_SUFFIX))
        .context("Failed to create build output file")?;

    let database = load_document(document)?;
    let router = build_database(&database, config)
        .with_context(|| format!("Failed to build {}", document.display()))?;

    for path in write_output("build", config, files, &router, format)? {
        info!("Build written to {}", path.display());
    }
    Ok(())
}
