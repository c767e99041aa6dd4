// Configuration file name
pub const CONFIG_FILENAME: &str = "dbdiff.yaml";

// Environment fallback for the dialect selector
pub const DIALECT_ENV_VAR: &str = "DIFF_DIALECT";

/// Synthetic table name used for the per-schema ordering node. Per-table
/// loops skip it; schema-level passes (types, functions, sequences) run on it.
pub const TABLE_DEPENDENCY_IGNORABLE_NAME: &str = "__schema_objects__";

// Macro roles resolved against the document's role configuration
pub const ROLE_OWNER: &str = "ROLE_OWNER";
pub const ROLE_APPLICATION: &str = "ROLE_APPLICATION";
pub const ROLE_REPLICATION: &str = "ROLE_SLONY";
pub const ROLE_READONLY: &str = "ROLE_READONLY";
pub const ROLE_PUBLIC: &str = "PUBLIC";

// Output file naming
pub const BUILD_FILE_SUFFIX: &str = "build";
pub const SINGLE_STAGE_FILE_SUFFIX: &str = "upgrade_single_stage";

/// Type enum-typed columns are relaxed to while their type is recreated.
pub const ENUM_PLACEHOLDER_TYPE: &str = "text";

/// Width of the string column that stands in for enum types on dialects without them.
pub const ENUM_VARCHAR_LENGTH: usize = 255;

/// Backing table for emulated sequences.
pub const SEQUENCE_TABLE: &str = "__sequences";
pub const SEQUENCE_TABLE_SCHEMA: &str = "dbo";

/// Suffix of the shadow table used during table rebuilds.
pub const REBUILD_TABLE_SUFFIX: &str = "_dbdiff_rebuild";

/// Words that are always quoted when `quoting.reserved_words` is on.
pub const RESERVED_WORDS: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric", "both", "case",
    "cast", "check", "collate", "column", "constraint", "create", "current_date", "current_role",
    "current_time", "current_timestamp", "current_user", "default", "deferrable", "desc",
    "distinct", "do", "else", "end", "except", "false", "fetch", "for", "foreign", "from", "grant",
    "group", "having", "in", "index", "initially", "intersect", "into", "key", "leading", "limit",
    "localtime", "localtimestamp", "not", "null", "offset", "on", "only", "or", "order", "placing",
    "primary", "references", "returning", "select", "session_user", "some", "symmetric", "table",
    "then", "to", "trailing", "true", "union", "unique", "user", "using", "variadic", "when",
    "where", "window", "with",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_words_are_lowercase() {
        assert!(RESERVED_WORDS.iter().all(|w| w.to_lowercase() == *w));
    }

    #[test]
    fn test_sentinel_is_not_a_legal_document_name() {
        assert!(TABLE_DEPENDENCY_IGNORABLE_NAME.starts_with("__"));
    }
}
