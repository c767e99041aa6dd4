use super::SqlServer;
use crate::catalog::id::QualifiedName;
use crate::catalog::table::{Column, Table};
use crate::constants::ENUM_VARCHAR_LENGTH;
use crate::diff::operations::ColumnAction;
use crate::render::{RenderResult, RenderedSql, TableSql, Unsupported, escape_string};
use itertools::Itertools;

/// Portable type names translated to SQL Server equivalents.
pub(super) fn column_type(column: &Column) -> String {
    if column.enum_type.is_some() {
        return format!("varchar({ENUM_VARCHAR_LENGTH})");
    }
    let normalized = column.normalized_type();
    match normalized.as_str() {
        "serial" | "serial4" => "int IDENTITY(1,1)".to_string(),
        "bigserial" | "serial8" => "bigint IDENTITY(1,1)".to_string(),
        "smallserial" | "serial2" => "smallint IDENTITY(1,1)".to_string(),
        "integer" | "int4" => "int".to_string(),
        "int8" => "bigint".to_string(),
        "int2" => "smallint".to_string(),
        "boolean" | "bool" => "bit".to_string(),
        "text" => "varchar(max)".to_string(),
        "bytea" => "varbinary(max)".to_string(),
        "uuid" => "uniqueidentifier".to_string(),
        "double precision" | "float8" => "float".to_string(),
        "timestamp" | "timestamp without time zone" => "datetime2".to_string(),
        "timestamptz" | "timestamp with time zone" => "datetimeoffset".to_string(),
        _ => column.data_type.clone(),
    }
}

/// Type for ALTER COLUMN, where IDENTITY cannot appear.
fn alter_type(column: &Column) -> String {
    let mut probe = column.clone();
    if column.is_identity() {
        probe.data_type = column.identity_base_type();
    }
    column_type(&probe)
}

pub(super) fn default_constraint_name(table: &str, column: &str) -> String {
    format!("DF_{table}_{column}")
}

fn null_keyword(nullable: bool) -> &'static str {
    if nullable { "NULL" } else { "NOT NULL" }
}

impl SqlServer {
    /// `default_owner` names the table the DEFAULT constraint belongs to logically.
    fn column_definition(&self, default_owner: &str, column: &Column, nullable: bool) -> String {
        let mut sql = format!(
            "{} {} {}",
            self.quoter.column(&column.name),
            column_type(column),
            null_keyword(nullable)
        );
        if let Some(default) = &column.default {
            sql.push_str(&format!(
                " CONSTRAINT {} DEFAULT {}",
                self.quoter
                    .object(&default_constraint_name(default_owner, &column.name)),
                default
            ));
        }
        sql
    }

    fn alter_table(&self, schema: &str, table: &str, clause: String) -> String {
        format!("ALTER TABLE {} {};", self.quoter.table(schema, table), clause)
    }

    fn drop_default_if_exists(&self, schema: &str, table: &str, column: &str) -> RenderedSql {
        let name = default_constraint_name(table, column);
        RenderedSql::new(format!(
            "IF OBJECT_ID({}, 'D') IS NOT NULL {}",
            escape_string(&format!("{schema}.{name}")),
            self.alter_table(
                schema,
                table,
                format!("DROP CONSTRAINT {}", self.quoter.object(&name))
            )
        ))
    }

    fn add_default(&self, schema: &str, table: &str, column: &str, default: &str) -> RenderedSql {
        RenderedSql::new(self.alter_table(
            schema,
            table,
            format!(
                "ADD CONSTRAINT {} DEFAULT {} FOR {}",
                self.quoter
                    .object(&default_constraint_name(table, column)),
                default,
                self.quoter.column(column)
            ),
        ))
    }
}

impl TableSql for SqlServer {
    fn create_table_as(&self, table: &Table, physical_name: &str) -> RenderResult {
        let columns = table
            .columns
            .iter()
            .map(|c| format!("  {}", self.column_definition(&table.name, c, c.nullable)))
            .join(",\n");
        let mut sql = format!(
            "CREATE TABLE {} (\n{}\n)",
            self.quoter.table(&table.schema, physical_name),
            columns
        );
        if let Some(filegroup) = table.options_for("mssql10").get("filegroup") {
            sql.push_str(&format!(" ON {}", self.quoter.object(filegroup)));
        }
        sql.push(';');
        Ok(vec![RenderedSql::new(sql)])
    }

    fn drop_table(&self, schema: &str, name: &str) -> RenderResult {
        Ok(vec![RenderedSql::destructive(format!(
            "DROP TABLE {};",
            self.quoter.table(schema, name)
        ))])
    }

    fn rename_table(&self, from: &QualifiedName, to: &QualifiedName) -> RenderResult {
        let mut out = Vec::new();
        if from.schema != to.schema {
            out.push(RenderedSql::new(format!(
                "ALTER SCHEMA {} TRANSFER {};",
                self.quoter.schema(&to.schema),
                self.quoter.table(&from.schema, &from.name)
            )));
        }
        if from.name != to.name {
            out.push(RenderedSql::new(format!(
                "EXEC sp_rename {}, {};",
                escape_string(&format!("{}.{}", to.schema, from.name)),
                escape_string(&to.name)
            )));
        }
        Ok(out)
    }

    fn alter_column(&self, schema: &str, table: &str, action: &ColumnAction) -> RenderResult {
        let q = &self.quoter;
        let alter = |clause: String| self.alter_table(schema, table, clause);
        let out = match action {
            ColumnAction::Add { column } => vec![RenderedSql::new(alter(format!(
                "ADD {}",
                self.column_definition(table, column, true)
            )))],
            ColumnAction::Drop { name } => vec![
                self.drop_default_if_exists(schema, table, name),
                RenderedSql::destructive(alter(format!("DROP COLUMN {}", q.column(name)))),
            ],
            ColumnAction::Rename { from, to } => {
                let old_default = default_constraint_name(table, from);
                vec![
                    RenderedSql::new(format!(
                        "EXEC sp_rename {}, {}, 'COLUMN';",
                        escape_string(&format!("{schema}.{table}.{from}")),
                        escape_string(to)
                    )),
                    RenderedSql::new(format!(
                        "IF OBJECT_ID({}, 'D') IS NOT NULL EXEC sp_rename {}, {}, 'OBJECT';",
                        escape_string(&format!("{schema}.{old_default}")),
                        escape_string(&format!("{schema}.{old_default}")),
                        escape_string(&default_constraint_name(table, to))
                    )),
                ]
            }
            ColumnAction::AlterType { column, nullable } => {
                vec![RenderedSql::destructive(alter(format!(
                    "ALTER COLUMN {} {} {}",
                    q.column(&column.name),
                    alter_type(column),
                    null_keyword(*nullable)
                )))]
            }
            ColumnAction::SetNotNull { column } => vec![RenderedSql::new(alter(format!(
                "ALTER COLUMN {} {} NOT NULL",
                q.column(&column.name),
                alter_type(column)
            )))],
            ColumnAction::DropNotNull { column } => vec![RenderedSql::new(alter(format!(
                "ALTER COLUMN {} {} NULL",
                q.column(&column.name),
                alter_type(column)
            )))],
            ColumnAction::SetDefault { column, replaces } => {
                let Some(default) = &column.default else {
                    return Ok(vec![]);
                };
                let mut out = Vec::new();
                if *replaces {
                    out.push(self.drop_default_if_exists(schema, table, &column.name));
                }
                out.push(self.add_default(schema, table, &column.name, default));
                out
            }
            ColumnAction::DropDefault { column } => {
                vec![self.drop_default_if_exists(schema, table, &column.name)]
            }
            ColumnAction::Backfill { column, value } => vec![RenderedSql::new(format!(
                "UPDATE {} SET {} = {} WHERE {} IS NULL;",
                q.table(schema, table),
                q.column(column),
                value,
                q.column(column)
            ))],
            ColumnAction::DropIdentity { column } => {
                return Err(Unsupported::new(format!(
                    "IDENTITY cannot be removed from {schema}.{table}.{} in place",
                    column.name
                )));
            }
            ColumnAction::SetStatistics { column, .. } => {
                return Err(Unsupported::new(format!(
                    "per-column statistics targets are not supported ({schema}.{table}.{column})"
                )));
            }
        };
        Ok(out)
    }

    fn set_table_option(
        &self,
        schema: &str,
        table: &str,
        name: &str,
        _value: Option<&str>,
        _previous: Option<&str>,
    ) -> RenderResult {
        Err(Unsupported::new(format!(
            "table option '{name}' on {schema}.{table} requires rebuilding the table"
        )))
    }
}
