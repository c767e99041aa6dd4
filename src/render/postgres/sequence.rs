use super::Postgres;
use crate::catalog::custom_type::EnumType;
use crate::catalog::id::QualifiedName;
use crate::catalog::sequence::Sequence;
use crate::catalog::table::Column;
use crate::constants::ENUM_PLACEHOLDER_TYPE;
use crate::diff::operations::SequenceChanges;
use crate::render::{RenderResult, RenderedSql, SequenceSql, TypeSql, escape_string};
use itertools::Itertools;

fn bound_clause(keyword: &str, value: Option<i64>) -> String {
    match value {
        Some(v) => format!("{keyword} {v}"),
        None => format!("NO {keyword}"),
    }
}

impl SequenceSql for Postgres {
    fn create_sequence(&self, sequence: &Sequence) -> RenderResult {
        let mut sql = format!(
            "CREATE SEQUENCE {}",
            self.quoter
                .qualified_object(&sequence.schema, &sequence.name)
        );
        if let Some(v) = sequence.increment {
            sql.push_str(&format!(" INCREMENT BY {v}"));
        }
        if let Some(v) = sequence.min_value {
            sql.push_str(&format!(" MINVALUE {v}"));
        }
        if let Some(v) = sequence.max_value {
            sql.push_str(&format!(" MAXVALUE {v}"));
        }
        if let Some(v) = sequence.start_value {
            sql.push_str(&format!(" START WITH {v}"));
        }
        if let Some(v) = sequence.cache {
            sql.push_str(&format!(" CACHE {v}"));
        }
        if sequence.cycle {
            sql.push_str(" CYCLE");
        }
        sql.push(';');
        Ok(vec![RenderedSql::new(sql)])
    }

    fn alter_sequence(&self, schema: &str, name: &str, changes: &SequenceChanges) -> RenderResult {
        let mut clauses = Vec::new();
        if let Some(increment) = changes.increment {
            clauses.push(format!("INCREMENT BY {}", increment.unwrap_or(1)));
        }
        if let Some(min) = changes.min_value {
            clauses.push(bound_clause("MINVALUE", min));
        }
        if let Some(max) = changes.max_value {
            clauses.push(bound_clause("MAXVALUE", max));
        }
        if let Some(Some(start)) = changes.start_value {
            clauses.push(format!("START WITH {start}"));
        }
        if let Some(cache) = changes.cache {
            clauses.push(format!("CACHE {}", cache.unwrap_or(1)));
        }
        if let Some(cycle) = changes.cycle {
            clauses.push(if cycle { "CYCLE" } else { "NO CYCLE" }.to_string());
        }
        if clauses.is_empty() {
            return Ok(vec![]);
        }
        Ok(vec![RenderedSql::new(format!(
            "ALTER SEQUENCE {} {};",
            self.quoter.qualified_object(schema, name),
            clauses.join(" ")
        ))])
    }

    fn drop_sequence(&self, schema: &str, name: &str) -> RenderResult {
        Ok(vec![RenderedSql::destructive(format!(
            "DROP SEQUENCE IF EXISTS {};",
            self.quoter.qualified_object(schema, name)
        ))])
    }

    fn install_sequence_support(&self) -> RenderResult {
        Ok(vec![])
    }
}

impl TypeSql for Postgres {
    fn create_type(&self, enum_type: &EnumType) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "CREATE TYPE {} AS ENUM ({});",
            self.quoter
                .qualified_object(&enum_type.schema, &enum_type.name),
            enum_type.values.iter().map(|v| escape_string(v)).join(", ")
        ))])
    }

    fn drop_type(&self, name: &QualifiedName) -> RenderResult {
        Ok(vec![RenderedSql::destructive(format!(
            "DROP TYPE IF EXISTS {};",
            self.quoter.qualified_object(&name.schema, &name.name)
        ))])
    }

    fn relax_column(
        &self,
        schema: &str,
        table: &str,
        column: &str,
        has_default: bool,
    ) -> RenderResult {
        let target = self.quoter.table(schema, table);
        let column = self.quoter.column(column);
        let mut out = Vec::new();
        // a default typed as the enum would keep the type alive
        if has_default {
            out.push(RenderedSql::new(format!(
                "ALTER TABLE {target} ALTER COLUMN {column} DROP DEFAULT;"
            )));
        }
        out.push(RenderedSql::new(format!(
            "ALTER TABLE {target} ALTER COLUMN {column} TYPE {ENUM_PLACEHOLDER_TYPE};"
        )));
        Ok(out)
    }

    fn restore_column(
        &self,
        schema: &str,
        table: &str,
        column: &Column,
        type_name: &QualifiedName,
    ) -> RenderResult {
        let target = self.quoter.table(schema, table);
        let name = self.quoter.column(&column.name);
        let type_name = self
            .quoter
            .qualified_object(&type_name.schema, &type_name.name);
        let mut out = vec![RenderedSql::new(format!(
            "ALTER TABLE {target} ALTER COLUMN {name} TYPE {type_name} USING {name}::{type_name};"
        ))];
        if let Some(default) = &column.default {
            out.push(RenderedSql::new(format!(
                "ALTER TABLE {target} ALTER COLUMN {name} SET DEFAULT {default};"
            )));
        }
        Ok(out)
    }
}
