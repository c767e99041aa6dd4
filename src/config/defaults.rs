use crate::config::types::*;
use std::path::PathBuf;

// Config derives Default from the sections below

impl Default for Quoting {
    fn default() -> Self {
        Self {
            schema_names: false,
            table_names: false,
            column_names: false,
            object_names: false,
            all_names: false,
            illegal_identifiers: true,
            reserved_words: true,
        }
    }
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            ignore_old_names: false,
            ignore_function_whitespace: true,
            // recreating unchanged views would make a self-diff non-empty
            always_recreate_views: false,
            add_missing_defaults: false,
            ignore_sequence_start: true,
            use_dependency_order: true,
            strict_dialect: false,
        }
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            single_stage: false,
            transactional: true,
            directory: PathBuf::from("."),
            prefix: None,
            header: true,
        }
    }
}
