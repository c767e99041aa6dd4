use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Raw configuration input - all fields Optional for merging
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigInput {
    pub dialect: Option<DialectKind>,
    pub quoting: Option<QuotingInput>,
    pub diff: Option<DiffInput>,
    pub output: Option<OutputInput>,
}

/// Resolved configuration with all defaults applied
#[derive(Debug, Clone, Default, Serialize)]
pub struct Config {
    pub dialect: DialectKind,
    pub quoting: Quoting,
    pub diff: DiffOptions,
    pub output: OutputOptions,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[default]
    #[serde(alias = "pgsql8", alias = "postgres")]
    Pgsql,
    #[serde(alias = "mssql10", alias = "sqlserver")]
    Mssql,
}

impl FromStr for DialectKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pgsql" | "pgsql8" | "postgres" => Ok(DialectKind::Pgsql),
            "mssql" | "mssql10" | "sqlserver" => Ok(DialectKind::Mssql),
            other => Err(anyhow::anyhow!(
                "Unknown dialect '{}'. Expected 'pgsql' or 'mssql'",
                other
            )),
        }
    }
}

// Identifier quoting
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QuotingInput {
    pub schema_names: Option<bool>,
    pub table_names: Option<bool>,
    pub column_names: Option<bool>,
    pub object_names: Option<bool>,
    pub all_names: Option<bool>,
    pub illegal_identifiers: Option<bool>,
    pub reserved_words: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quoting {
    pub schema_names: bool,
    pub table_names: bool,
    pub column_names: bool,
    pub object_names: bool,
    pub all_names: bool,
    pub illegal_identifiers: bool,
    pub reserved_words: bool,
}

// Diff behavior
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiffInput {
    pub ignore_old_names: Option<bool>,
    pub ignore_function_whitespace: Option<bool>,
    pub always_recreate_views: Option<bool>,
    pub add_missing_defaults: Option<bool>,
    pub ignore_sequence_start: Option<bool>,
    pub use_dependency_order: Option<bool>,
    pub strict_dialect: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffOptions {
    pub ignore_old_names: bool,
    pub ignore_function_whitespace: bool,
    pub always_recreate_views: bool,
    pub add_missing_defaults: bool,
    pub ignore_sequence_start: bool,
    pub use_dependency_order: bool,
    pub strict_dialect: bool,
}

// Output files
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputInput {
    pub single_stage: Option<bool>,
    pub transactional: Option<bool>,
    pub directory: Option<PathBuf>,
    pub prefix: Option<String>,
    pub header: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputOptions {
    pub single_stage: bool,
    pub transactional: bool,
    pub directory: PathBuf,
    /// `None` means derive it from the new document's file stem.
    pub prefix: Option<String>,
    pub header: bool,
}

// CLI argument groups for command-specific options
#[derive(Debug, Clone, Default, Args)]
pub struct QuotingArgs {
    #[arg(long, help = "Quote every identifier")]
    pub quote_all_names: bool,

    #[arg(long, help = "Quote schema names")]
    pub quote_schema_names: bool,

    #[arg(long, help = "Quote table names")]
    pub quote_table_names: bool,

    #[arg(long, help = "Quote column names")]
    pub quote_column_names: bool,

    #[arg(long, help = "Quote index, constraint, sequence and function names")]
    pub quote_object_names: bool,

    #[arg(long, help = "Do not quote reserved words unless another rule applies")]
    pub no_quote_reserved_words: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct DiffArgs {
    #[arg(long, help = "Treat oldTableName/oldColumnName/oldSchemaName markers as absent")]
    pub ignore_old_names: bool,

    #[arg(long, help = "Compare function bodies exactly, including whitespace")]
    pub strict_function_whitespace: bool,

    #[arg(long, help = "Drop and recreate every view even when unchanged")]
    pub always_recreate_views: bool,

    #[arg(long, help = "Backfill new NOT NULL columns without a default using the type's zero value")]
    pub add_missing_defaults: bool,

    #[arg(long, help = "Diff sequence start values")]
    pub diff_sequence_start: bool,

    #[arg(long, help = "Iterate tables in document order instead of dependency order")]
    pub no_dependency_order: bool,

    #[arg(long, help = "Fail instead of commenting when the dialect cannot express a change")]
    pub strict_dialect: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    #[arg(long, help = "Write one file instead of four staged files")]
    pub single_stage: bool,

    #[arg(long, help = "Do not wrap output in BEGIN/COMMIT")]
    pub no_transaction: bool,

    #[arg(long, help = "Directory for generated files")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, help = "File name prefix for generated files")]
    pub output_prefix: Option<String>,

    #[arg(long, help = "Omit the generated-at header comment")]
    pub no_header: bool,
}

fn flag(value: bool) -> Option<bool> {
    if value { Some(true) } else { None }
}

fn negated_flag(value: bool) -> Option<bool> {
    if value { Some(false) } else { None }
}

// Conversion functions from CLI args to config input
impl From<QuotingArgs> for QuotingInput {
    fn from(args: QuotingArgs) -> Self {
        Self {
            schema_names: flag(args.quote_schema_names),
            table_names: flag(args.quote_table_names),
            column_names: flag(args.quote_column_names),
            object_names: flag(args.quote_object_names),
            all_names: flag(args.quote_all_names),
            illegal_identifiers: None,
            reserved_words: negated_flag(args.no_quote_reserved_words),
        }
    }
}

impl From<DiffArgs> for DiffInput {
    fn from(args: DiffArgs) -> Self {
        Self {
            ignore_old_names: flag(args.ignore_old_names),
            ignore_function_whitespace: negated_flag(args.strict_function_whitespace),
            always_recreate_views: flag(args.always_recreate_views),
            add_missing_defaults: flag(args.add_missing_defaults),
            ignore_sequence_start: negated_flag(args.diff_sequence_start),
            use_dependency_order: negated_flag(args.no_dependency_order),
            strict_dialect: flag(args.strict_dialect),
        }
    }
}

impl From<OutputArgs> for OutputInput {
    fn from(args: OutputArgs) -> Self {
        Self {
            single_stage: flag(args.single_stage),
            transactional: negated_flag(args.no_transaction),
            directory: args.output_dir,
            prefix: args.output_prefix,
            header: negated_flag(args.no_header),
        }
    }
}
