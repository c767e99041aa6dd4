//! Run summary printed after a build or diff.

use crate::output::{StageRouter, Stream};
use console::style;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Statement count of one output stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSummary {
    pub stream: String,
    pub statements: usize,
}

/// JSON shape of a run summary (CI integration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// "build" or "diff"
    pub command: String,
    pub dialect: String,
    pub streams: Vec<StreamSummary>,
    /// Statements that drop objects or delete rows.
    pub destructive: usize,
    pub files: Vec<PathBuf>,
}

impl RunSummary {
    pub fn new(command: &str, dialect: &str, router: &StageRouter, files: Vec<PathBuf>) -> Self {
        Self {
            command: command.to_string(),
            dialect: dialect.to_string(),
            streams: Stream::ALL
                .iter()
                .map(|s| StreamSummary {
                    stream: s.name().to_string(),
                    statements: router.statement_count(*s),
                })
                .collect(),
            destructive: router.destructive_count(),
            files,
        }
    }

    pub fn total(&self) -> usize {
        self.streams.iter().map(|s| s.statements).sum()
    }

    pub fn render(&self, format: ReportFormat) -> serde_json::Result<String> {
        match format {
            ReportFormat::Json => serde_json::to_string_pretty(self),
            ReportFormat::Text => Ok(self.render_text()),
        }
    }

    fn render_text(&self) -> String {
        let mut out = format!(
            "{} {} ({})\n",
            style("dbdiff").bold(),
            self.command,
            style(&self.dialect).cyan()
        );
        if self.total() == 0 {
            out.push_str(&format!("  {}\n", style("No changes").green()));
        }
        for stream in &self.streams {
            let count = if stream.statements == 0 {
                style(stream.statements.to_string()).dim()
            } else {
                style(stream.statements.to_string()).bold()
            };
            out.push_str(&format!("  {:<14} {}\n", stream.stream, count));
        }
        if self.destructive > 0 {
            out.push_str(&format!(
                "  {} {} destructive statement(s)\n",
                style("⚠").yellow(),
                self.destructive
            ));
        }
        for file in &self.files {
            out.push_str(&format!("  {} {}\n", style("→").dim(), file.display()));
        }
        out
    }
}
