pub mod build;
pub mod config;
pub mod diff;
pub mod order;

pub use build::cmd_build;
pub use config::cmd_config;
pub use diff::cmd_diff;
pub use order::cmd_order;

use anyhow::{Context, Result};
use dbdiff::catalog::Database;
use dbdiff::config::{Config, OutputOptions};
use dbdiff::loader::load_file;
use dbdiff::output::{OutputFiles, StageRouter};
use dbdiff::render::dialect_for;
use dbdiff::report::{ReportFormat, RunSummary};
use std::path::{Path, PathBuf};
use tracing::info;

pub(crate) fn load_document(path: &Path) -> Result<Database> {
    info!("Loading {}", path.display());
    load_file(path).with_context(|| format!("Failed to load schema document {}", path.display()))
}

/// Configured prefix, or the file stem of the document being generated for.
pub(crate) fn output_prefix(output: &OutputOptions, document: &Path) -> String {
    output.prefix.clone().unwrap_or_else(|| {
        document
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dbdiff".to_string())
    })
}

/// Write the routed SQL and print the run summary.
pub(crate) fn write_output(
    command: &str,
    config: &Config,
    files: OutputFiles,
    router: &StageRouter,
    format: ReportFormat,
) -> Result<Vec<PathBuf>> {
    let dialect = dialect_for(config.dialect, &config.quoting);
    let markers = config
        .output
        .transactional
        .then(|| dialect.transaction_markers());
    let written = files
        .write(router, markers, config.output.header)
        .context("Failed to write SQL output")?;

    let summary = RunSummary::new(command, dialect.name(), router, written.clone());
    println!("{}", summary.render(format)?);
    Ok(written)
}
