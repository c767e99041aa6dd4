use crate::config::{merge::Merge, types::*};
use crate::constants::DIALECT_ENV_VAR;
use anyhow::{Context, Result};

pub struct ConfigBuilder {
    config_input: ConfigInput,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config_input: ConfigInput::default(),
        }
    }

    pub fn with_file(mut self, file_input: ConfigInput) -> Self {
        self.config_input = self.config_input.merge(file_input);
        self
    }

    pub fn with_cli_args(mut self, cli_input: ConfigInput) -> Self {
        self.config_input = self.config_input.merge(cli_input);
        self
    }

    pub fn resolve(self) -> Result<Config> {
        let defaults = Config::default();

        Ok(Config {
            dialect: self.resolve_dialect(defaults.dialect)?,
            quoting: self.resolve_quoting(&defaults.quoting),
            diff: self.resolve_diff(&defaults.diff),
            output: self.resolve_output(&defaults.output),
        })
    }

    fn resolve_dialect(&self, default: DialectKind) -> Result<DialectKind> {
        if let Some(dialect) = self.config_input.dialect {
            return Ok(dialect);
        }
        match std::env::var(DIALECT_ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => value
                .parse()
                .with_context(|| format!("Invalid {} environment variable", DIALECT_ENV_VAR)),
            _ => Ok(default),
        }
    }

    fn resolve_quoting(&self, defaults: &Quoting) -> Quoting {
        let q = self.config_input.quoting.as_ref();

        Quoting {
            schema_names: q.and_then(|q| q.schema_names).unwrap_or(defaults.schema_names),
            table_names: q.and_then(|q| q.table_names).unwrap_or(defaults.table_names),
            column_names: q.and_then(|q| q.column_names).unwrap_or(defaults.column_names),
            object_names: q.and_then(|q| q.object_names).unwrap_or(defaults.object_names),
            all_names: q.and_then(|q| q.all_names).unwrap_or(defaults.all_names),
            illegal_identifiers: q
                .and_then(|q| q.illegal_identifiers)
                .unwrap_or(defaults.illegal_identifiers),
            reserved_words: q
                .and_then(|q| q.reserved_words)
                .unwrap_or(defaults.reserved_words),
        }
    }

    fn resolve_diff(&self, defaults: &DiffOptions) -> DiffOptions {
        let d = self.config_input.diff.as_ref();

        DiffOptions {
            ignore_old_names: d
                .and_then(|d| d.ignore_old_names)
                .unwrap_or(defaults.ignore_old_names),
            ignore_function_whitespace: d
                .and_then(|d| d.ignore_function_whitespace)
                .unwrap_or(defaults.ignore_function_whitespace),
            always_recreate_views: d
                .and_then(|d| d.always_recreate_views)
                .unwrap_or(defaults.always_recreate_views),
            add_missing_defaults: d
                .and_then(|d| d.add_missing_defaults)
                .unwrap_or(defaults.add_missing_defaults),
            ignore_sequence_start: d
                .and_then(|d| d.ignore_sequence_start)
                .unwrap_or(defaults.ignore_sequence_start),
            use_dependency_order: d
                .and_then(|d| d.use_dependency_order)
                .unwrap_or(defaults.use_dependency_order),
            strict_dialect: d
                .and_then(|d| d.strict_dialect)
                .unwrap_or(defaults.strict_dialect),
        }
    }

    fn resolve_output(&self, defaults: &OutputOptions) -> OutputOptions {
        let o = self.config_input.output.as_ref();

        OutputOptions {
            single_stage: o.and_then(|o| o.single_stage).unwrap_or(defaults.single_stage),
            transactional: o
                .and_then(|o| o.transactional)
                .unwrap_or(defaults.transactional),
            directory: o
                .and_then(|o| o.directory.as_ref())
                .cloned()
                .unwrap_or_else(|| defaults.directory.clone()),
            prefix: o
                .and_then(|o| o.prefix.as_ref())
                .cloned()
                .or_else(|| defaults.prefix.clone()),
            header: o.and_then(|o| o.header).unwrap_or(defaults.header),
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
