use super::load_document;
use anyhow::Result;
use dbdiff::diff::order::{dependency_order, document_order};
use dbdiff::report::ReportFormat;
use std::path::Path;

/// Print the tables of `document`, one `schema.table` per line or as a JSON array.
pub fn cmd_order(document: &Path, follow_keys: bool, format: ReportFormat) -> Result<()> {
    let database = load_document(document)?;
    let entries = if follow_keys {
        dependency_order(&database)
    } else {
        document_order(&database)
    };
    let names: Vec<String> = entries
        .iter()
        .filter(|e| !e.is_schema_marker())
        .map(|e| format!("{}.{}", e.schema, e.table))
        .collect();

    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
        ReportFormat::Text => {
            for name in names {
                println!("{name}");
            }
        }
    }
    Ok(())
}
