use crate::config::types::*;

/// Trait for merging optional configuration values
pub trait Merge<T> {
    fn merge(self, other: T) -> T;
}

impl<T> Merge<Option<T>> for Option<T> {
    fn merge(self, other: Option<T>) -> Option<T> {
        other.or(self)
    }
}

fn merge_section<T>(a: Option<T>, b: Option<T>, merge_with: impl FnOnce(T, T) -> T) -> Option<T> {
    match (a, b) {
        (None, None) => None,
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (Some(a), Some(b)) => Some(merge_with(a, b)),
    }
}

impl Merge<ConfigInput> for ConfigInput {
    fn merge(self, other: ConfigInput) -> ConfigInput {
        ConfigInput {
            dialect: self.dialect.merge(other.dialect),
            quoting: merge_section(self.quoting, other.quoting, QuotingInput::merge_with),
            diff: merge_section(self.diff, other.diff, DiffInput::merge_with),
            output: merge_section(self.output, other.output, OutputInput::merge_with),
        }
    }
}

// Custom merge implementations for sections
impl QuotingInput {
    pub fn merge_with(self, other: QuotingInput) -> QuotingInput {
        QuotingInput {
            schema_names: self.schema_names.merge(other.schema_names),
            table_names: self.table_names.merge(other.table_names),
            column_names: self.column_names.merge(other.column_names),
            object_names: self.object_names.merge(other.object_names),
            all_names: self.all_names.merge(other.all_names),
            illegal_identifiers: self.illegal_identifiers.merge(other.illegal_identifiers),
            reserved_words: self.reserved_words.merge(other.reserved_words),
        }
    }
}

impl DiffInput {
    pub fn merge_with(self, other: DiffInput) -> DiffInput {
        DiffInput {
            ignore_old_names: self.ignore_old_names.merge(other.ignore_old_names),
            ignore_function_whitespace: self
                .ignore_function_whitespace
                .merge(other.ignore_function_whitespace),
            always_recreate_views: self.always_recreate_views.merge(other.always_recreate_views),
            add_missing_defaults: self.add_missing_defaults.merge(other.add_missing_defaults),
            ignore_sequence_start: self.ignore_sequence_start.merge(other.ignore_sequence_start),
            use_dependency_order: self.use_dependency_order.merge(other.use_dependency_order),
            strict_dialect: self.strict_dialect.merge(other.strict_dialect),
        }
    }
}

impl OutputInput {
    pub fn merge_with(self, other: OutputInput) -> OutputInput {
        OutputInput {
            single_stage: self.single_stage.merge(other.single_stage),
            transactional: self.transactional.merge(other.transactional),
            directory: self.directory.merge(other.directory),
            prefix: self.prefix.merge(other.prefix),
            header: self.header.merge(other.header),
        }
    }
}
