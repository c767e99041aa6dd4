//! Stage routing for generated SQL.
//!
//! Every statement is tagged with a [`Stage`]. The stage decides which of the
//! four physical [`Stream`]s receives it and where it sits in that stream.
//! Declaration order of both enums is the order statements are applied in.

use crate::error::{DiffError, Result};
use crate::render::RenderedSql;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub mod writer;

pub use writer::OutputFiles;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Stage {
    Schema0,
    Before1,
    One,
    After1,
    Schema1,
    Data0,
    DataDelete,
    DataUpsert,
    Data1,
    Before3,
    Three,
    After3,
    Schema2,
    Data2,
}

impl Stage {
    pub const ALL: [Stage; 14] = [
        Stage::Schema0,
        Stage::Before1,
        Stage::One,
        Stage::After1,
        Stage::Schema1,
        Stage::Data0,
        Stage::DataDelete,
        Stage::DataUpsert,
        Stage::Data1,
        Stage::Before3,
        Stage::Three,
        Stage::After3,
        Stage::Schema2,
        Stage::Data2,
    ];

    pub fn stream(&self) -> Stream {
        match self {
            Stage::Schema0 | Stage::Before1 | Stage::One | Stage::After1 | Stage::Schema1 => {
                Stream::SchemaStage1
            }
            Stage::Data0 | Stage::DataDelete | Stage::DataUpsert | Stage::Data1 => {
                Stream::DataStage1
            }
            Stage::Before3 | Stage::Three | Stage::After3 | Stage::Schema2 => Stream::SchemaStage2,
            Stage::Data2 => Stream::DataStage2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Schema0 => "SCHEMA0",
            Stage::Before1 => "BEFORE1",
            Stage::One => "1",
            Stage::After1 => "AFTER1",
            Stage::Schema1 => "SCHEMA1",
            Stage::Data0 => "DATA0",
            Stage::DataDelete => "DATA_DELETE",
            Stage::DataUpsert => "DATA_UPSERT",
            Stage::Data1 => "DATA1",
            Stage::Before3 => "BEFORE3",
            Stage::Three => "3",
            Stage::After3 => "AFTER3",
            Stage::Schema2 => "SCHEMA2",
            Stage::Data2 => "DATA2",
        }
    }
}

/// Parses the stage names a document may put on a `<sql>` block. The row
/// delete/upsert stages are internal and cannot be named.
impl FromStr for Stage {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "SCHEMA0" => Ok(Stage::Schema0),
            "BEFORE1" => Ok(Stage::Before1),
            "1" | "STAGE1" => Ok(Stage::One),
            "AFTER1" => Ok(Stage::After1),
            "SCHEMA1" => Ok(Stage::Schema1),
            "DATA0" => Ok(Stage::Data0),
            "DATA1" => Ok(Stage::Data1),
            "BEFORE3" => Ok(Stage::Before3),
            "3" | "STAGE3" => Ok(Stage::Three),
            "AFTER3" => Ok(Stage::After3),
            "SCHEMA2" => Ok(Stage::Schema2),
            "DATA2" => Ok(Stage::Data2),
            _ => Err(DiffError::unknown("stage", s)),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stream {
    SchemaStage1,
    DataStage1,
    SchemaStage2,
    DataStage2,
}

impl Stream {
    pub const ALL: [Stream; 4] = [
        Stream::SchemaStage1,
        Stream::DataStage1,
        Stream::SchemaStage2,
        Stream::DataStage2,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stream::SchemaStage1 => "schema_stage1",
            Stream::DataStage1 => "data_stage1",
            Stream::SchemaStage2 => "schema_stage2",
            Stream::DataStage2 => "data_stage2",
        }
    }

    /// File name suffix; the number is the position in the apply sequence.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Stream::SchemaStage1 => "upgrade_stage1_schema1",
            Stream::DataStage1 => "upgrade_stage2_data1",
            Stream::SchemaStage2 => "upgrade_stage3_schema2",
            Stream::DataStage2 => "upgrade_stage4_data2",
        }
    }

    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        Stage::ALL.into_iter().filter(move |s| s.stream() == *self)
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Text wrapped around each non-empty stream when output is transactional.
#[derive(Debug, Clone, Copy)]
pub struct TransactionMarkers {
    pub begin: &'static str,
    pub commit: &'static str,
}

/// Collects rendered statements per stage, keeping emission order inside a stage.
#[derive(Debug, Clone, Default)]
pub struct StageRouter {
    buckets: BTreeMap<Stage, Vec<RenderedSql>>,
}

impl StageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stage: Stage, sql: RenderedSql) {
        self.buckets.entry(stage).or_default().push(sql);
    }

    pub fn extend(&mut self, stage: Stage, sql: impl IntoIterator<Item = RenderedSql>) {
        self.buckets.entry(stage).or_default().extend(sql);
    }

    pub fn stage(&self, stage: Stage) -> &[RenderedSql] {
        self.buckets.get(&stage).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Statements of one stream in stage order.
    pub fn stream(&self, stream: Stream) -> Vec<&RenderedSql> {
        stream.stages().flat_map(|s| self.stage(s)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }

    pub fn stream_is_empty(&self, stream: Stream) -> bool {
        stream.stages().all(|s| self.stage(s).is_empty())
    }

    /// Executable statements in a stream, excluding comments and batch separators.
    pub fn statement_count(&self, stream: Stream) -> usize {
        self.stream(stream)
            .into_iter()
            .filter(|s| s.is_statement())
            .count()
    }

    pub fn destructive_count(&self) -> usize {
        self.buckets
            .values()
            .flatten()
            .filter(|s| s.is_destructive())
            .count()
    }

    /// Text of one stream, wrapped in a single transaction when `markers` is given.
    pub fn render_stream(&self, stream: Stream, markers: Option<TransactionMarkers>) -> String {
        self.render_streams(&[stream], markers)
    }

    /// All four streams concatenated in apply order, as one physical stream.
    pub fn render_single_stage(&self, markers: Option<TransactionMarkers>) -> String {
        self.render_streams(&Stream::ALL, markers)
    }

    fn render_streams(&self, streams: &[Stream], markers: Option<TransactionMarkers>) -> String {
        let statements: Vec<&RenderedSql> =
            streams.iter().flat_map(|s| self.stream(*s)).collect();
        if statements.is_empty() {
            return String::new();
        }

        let mut out = String::new();
        if let Some(m) = markers {
            out.push_str(m.begin);
            out.push('\n');
        }
        for statement in statements {
            out.push_str(&statement.sql);
            out.push('\n');
        }
        if let Some(m) = markers {
            out.push_str(m.commit);
            out.push('\n');
        }
        out
    }
}
