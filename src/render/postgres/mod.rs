//! PostgreSQL rendering.

use super::{Capabilities, Dialect, Quoter, RenderResult, RenderedSql, SchemaSql, escape_string};
use crate::config::Quoting;
use crate::output::TransactionMarkers;

mod constraint;
mod data;
mod grant;
mod routine;
mod sequence;
mod table;

pub struct Postgres {
    quoter: Quoter,
}

impl Postgres {
    pub fn new(quoting: Quoting) -> Self {
        Self {
            quoter: Quoter::new(quoting, '"', '"'),
        }
    }
}

impl Capabilities for Postgres {
    fn has_enum_types(&self) -> bool {
        true
    }

    fn has_native_sequences(&self) -> bool {
        true
    }

    fn create_or_replace_functions(&self) -> bool {
        true
    }

    fn expression_indexes(&self) -> bool {
        true
    }

    fn unique_allows_multiple_nulls(&self) -> bool {
        true
    }

    fn alter_column_blocked_by_constraints(&self) -> bool {
        false
    }

    fn drops_identity_in_place(&self) -> bool {
        true
    }

    fn alterable_table_option(&self, name: &str) -> bool {
        matches!(name.to_lowercase().as_str(), "with" | "tablespace")
    }

    fn supports_inheritance(&self) -> bool {
        true
    }

    fn supports_before_triggers(&self) -> bool {
        true
    }

    fn combined_trigger_events(&self) -> bool {
        true
    }

    fn needs_identity_insert(&self) -> bool {
        false
    }
}

impl SchemaSql for Postgres {
    fn create_schema(&self, name: &str) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "CREATE SCHEMA IF NOT EXISTS {};",
            self.quoter.schema(name)
        ))])
    }

    fn drop_schema(&self, name: &str) -> RenderResult {
        Ok(vec![RenderedSql::destructive(format!(
            "DROP SCHEMA IF EXISTS {} CASCADE;",
            self.quoter.schema(name)
        ))])
    }

    fn set_config_parameter(&self, name: &str, value: &str) -> RenderResult {
        // the database name is only known at apply time
        Ok(vec![RenderedSql::new(format!(
            "DO $$\nBEGIN\n  EXECUTE format('ALTER DATABASE %I SET {} = %L', current_database(), {});\nEND\n$$;",
            name,
            escape_string(value)
        ))])
    }
}

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "pgsql"
    }

    fn sql_format(&self) -> &'static str {
        "pgsql8"
    }

    fn quoter(&self) -> &Quoter {
        &self.quoter
    }

    fn transaction_markers(&self) -> TransactionMarkers {
        TransactionMarkers {
            begin: "BEGIN;",
            commit: "COMMIT;",
        }
    }
}

#[cfg(test)]
pub(crate) fn create_test_dialect() -> Postgres {
    Postgres::new(Quoting::default())
}
