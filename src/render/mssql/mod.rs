//! SQL Server rendering.
//!
//! SQL Server has no enum types, no sequences in the supported version, no
//! `CREATE OR REPLACE` and no BEFORE triggers. Enums become varchar columns
//! guarded by CHECK constraints, sequences live in a bookkeeping table driven
//! by stored procedures, and expression index dimensions are materialized as
//! computed columns.

use super::{Capabilities, Dialect, Quoter, RenderResult, RenderedSql, SchemaSql, escape_string};
use crate::config::Quoting;
use crate::output::TransactionMarkers;

mod constraint;
mod data;
mod grant;
mod routine;
mod sequence;
mod table;

pub const BATCH_SEPARATOR: &str = "GO";

pub struct SqlServer {
    quoter: Quoter,
}

impl SqlServer {
    pub fn new(quoting: Quoting) -> Self {
        Self {
            quoter: Quoter::new(quoting, '[', ']'),
        }
    }

    /// Wrap a statement that must be alone in its batch.
    fn own_batch(sql: String) -> Vec<RenderedSql> {
        vec![
            RenderedSql::new(BATCH_SEPARATOR.to_string()),
            RenderedSql::new(sql),
            RenderedSql::new(BATCH_SEPARATOR.to_string()),
        ]
    }
}

impl Capabilities for SqlServer {
    fn has_enum_types(&self) -> bool {
        false
    }

    fn has_native_sequences(&self) -> bool {
        false
    }

    fn create_or_replace_functions(&self) -> bool {
        false
    }

    fn expression_indexes(&self) -> bool {
        false
    }

    fn unique_allows_multiple_nulls(&self) -> bool {
        false
    }

    fn alter_column_blocked_by_constraints(&self) -> bool {
        true
    }

    fn drops_identity_in_place(&self) -> bool {
        false
    }

    fn alterable_table_option(&self, _name: &str) -> bool {
        false
    }

    fn supports_inheritance(&self) -> bool {
        false
    }

    fn supports_before_triggers(&self) -> bool {
        false
    }

    fn combined_trigger_events(&self) -> bool {
        true
    }

    fn needs_identity_insert(&self) -> bool {
        true
    }
}

impl SchemaSql for SqlServer {
    fn create_schema(&self, name: &str) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "IF SCHEMA_ID({}) IS NULL EXEC('CREATE SCHEMA {}');",
            escape_string(name),
            self.quoter.schema(name)
        ))])
    }

    fn drop_schema(&self, name: &str) -> RenderResult {
        Ok(vec![RenderedSql::destructive(format!(
            "DROP SCHEMA IF EXISTS {};",
            self.quoter.schema(name)
        ))])
    }

    fn set_config_parameter(&self, name: &str, value: &str) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "ALTER DATABASE SCOPED CONFIGURATION SET {} = {};",
            name.to_uppercase(),
            value
        ))])
    }
}

impl Dialect for SqlServer {
    fn name(&self) -> &'static str {
        "mssql"
    }

    fn sql_format(&self) -> &'static str {
        "mssql10"
    }

    fn quoter(&self) -> &Quoter {
        &self.quoter
    }

    fn transaction_markers(&self) -> TransactionMarkers {
        TransactionMarkers {
            begin: "BEGIN TRANSACTION;",
            commit: "COMMIT TRANSACTION;",
        }
    }
}

#[cfg(test)]
pub(crate) fn create_test_dialect() -> SqlServer {
    SqlServer::new(Quoting::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_schema_is_guarded() {
        let ms = create_test_dialect();
        let sql = ms.create_schema("app").unwrap();
        assert_eq!(
            sql[0].sql,
            "IF SCHEMA_ID('app') IS NULL EXEC('CREATE SCHEMA app');"
        );
    }

    #[test]
    fn test_brackets_for_mixed_case() {
        let ms = create_test_dialect();
        assert_eq!(ms.quoter().table("app", "UserLog"), "app.[UserLog]");
    }

    #[test]
    fn test_markers() {
        let ms = create_test_dialect();
        assert_eq!(ms.transaction_markers().begin, "BEGIN TRANSACTION;");
    }
}
