use super::Postgres;
use crate::catalog::id::QualifiedName;
use crate::catalog::table::{Column, Table};
use crate::diff::operations::ColumnAction;
use crate::render::{IdentKind, RenderResult, RenderedSql, TableSql, Unsupported};
use itertools::Itertools;

impl Postgres {
    pub(super) fn column_definition(&self, column: &Column) -> String {
        let mut sql = format!("{} {}", self.quoter.column(&column.name), column.data_type);
        if !column.nullable {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &column.default {
            sql.push_str(&format!(" DEFAULT {default}"));
        }
        sql
    }

    /// Column type usable in ALTER COLUMN ... TYPE; serial pseudo-types are not.
    fn alter_type_name(column: &Column) -> String {
        if column.normalized_type().ends_with("serial") {
            column.identity_base_type()
        } else {
            column.data_type.clone()
        }
    }

    fn alter_table(&self, schema: &str, table: &str, clause: String) -> String {
        format!("ALTER TABLE {} {};", self.quoter.table(schema, table), clause)
    }
}

/// Option keys of a `WITH (k=v, ...)` list.
fn storage_parameter_keys(value: &str) -> Vec<String> {
    value
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .filter_map(|pair| pair.split('=').next())
        .map(|key| key.trim().to_lowercase())
        .filter(|key| !key.is_empty())
        .collect()
}

fn parenthesized(value: &str) -> String {
    let value = value.trim();
    if value.starts_with('(') {
        value.to_string()
    } else {
        format!("({value})")
    }
}

impl TableSql for Postgres {
    fn create_table_as(&self, table: &Table, physical_name: &str) -> RenderResult {
        let columns = table
            .columns
            .iter()
            .map(|c| format!("  {}", self.column_definition(c)))
            .join(",\n");
        let mut sql = format!(
            "CREATE TABLE {} (\n{}\n)",
            self.quoter.table(&table.schema, physical_name),
            columns
        );
        if let Some(parent) = &table.inherits {
            sql.push_str(&format!(
                " INHERITS ({})",
                self.quoter.table(&parent.schema, &parent.name)
            ));
        }
        let options = table.options_for("pgsql8");
        if let Some(with) = options.get("with") {
            sql.push_str(&format!(" WITH {}", parenthesized(with)));
        }
        if let Some(tablespace) = options.get("tablespace") {
            sql.push_str(&format!(" TABLESPACE {}", self.quoter.object(tablespace)));
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
            out.push(RenderedSql::new(self.alter_table(
                &from.schema,
                &from.name,
                format!("SET SCHEMA {}", self.quoter.schema(&to.schema)),
            )));
        }
        if from.name != to.name {
            out.push(RenderedSql::new(self.alter_table(
                &to.schema,
                &from.name,
                format!(
                    "RENAME TO {}",
                    self.quoter.ident(IdentKind::Table, &to.name)
                ),
            )));
        }
        Ok(out)
    }

    fn alter_column(&self, schema: &str, table: &str, action: &ColumnAction) -> RenderResult {
        let q = &self.quoter;
        let alter = |clause: String| self.alter_table(schema, table, clause);
        let sql = match action {
            ColumnAction::Add { column } => {
                let nullable = Column {
                    nullable: true,
                    ..column.clone()
                };
                RenderedSql::new(alter(format!(
                    "ADD COLUMN {}",
                    self.column_definition(&nullable)
                )))
            }
            ColumnAction::Drop { name } => {
                RenderedSql::destructive(alter(format!("DROP COLUMN {}", q.column(name))))
            }
            ColumnAction::Rename { from, to } => RenderedSql::new(alter(format!(
                "RENAME COLUMN {} TO {}",
                q.column(from),
                q.column(to)
            ))),
            ColumnAction::AlterType { column, .. } => {
                let type_name = Self::alter_type_name(column);
                let using = if column.enum_type.is_some() {
                    format!(" USING {}::{}", q.column(&column.name), type_name)
                } else {
                    String::new()
                };
                RenderedSql::destructive(alter(format!(
                    "ALTER COLUMN {} TYPE {}{}",
                    q.column(&column.name),
                    type_name,
                    using
                )))
            }
            ColumnAction::SetNotNull { column } => RenderedSql::new(alter(format!(
                "ALTER COLUMN {} SET NOT NULL",
                q.column(&column.name)
            ))),
            ColumnAction::DropNotNull { column } => RenderedSql::new(alter(format!(
                "ALTER COLUMN {} DROP NOT NULL",
                q.column(&column.name)
            ))),
            ColumnAction::SetDefault { column, .. } => match &column.default {
                Some(default) => RenderedSql::new(alter(format!(
                    "ALTER COLUMN {} SET DEFAULT {}",
                    q.column(&column.name),
                    default
                ))),
                None => return Ok(vec![]),
            },
            ColumnAction::DropDefault { column } => RenderedSql::new(alter(format!(
                "ALTER COLUMN {} DROP DEFAULT",
                q.column(&column.name)
            ))),
            ColumnAction::Backfill { column, value } => RenderedSql::new(format!(
                "UPDATE {} SET {} = {} WHERE {} IS NULL;",
                q.table(schema, table),
                q.column(column),
                value,
                q.column(column)
            )),
            ColumnAction::DropIdentity { column } => {
                let name = q.column(&column.name);
                if column.normalized_type().ends_with("serial") {
                    let sequence = format!("{}_{}_seq", table, column.name);
                    return Ok(vec![
                        RenderedSql::new(alter(format!("ALTER COLUMN {name} DROP DEFAULT"))),
                        RenderedSql::destructive(format!(
                            "DROP SEQUENCE IF EXISTS {};",
                            q.qualified_object(schema, &sequence)
                        )),
                    ]);
                }
                RenderedSql::new(alter(format!(
                    "ALTER COLUMN {name} DROP IDENTITY IF EXISTS"
                )))
            }
            ColumnAction::SetStatistics { column, value } => RenderedSql::new(alter(format!(
                "ALTER COLUMN {} SET STATISTICS {}",
                q.column(column),
                value
            ))),
        };
        Ok(vec![sql])
    }

    fn set_table_option(
        &self,
        schema: &str,
        table: &str,
        name: &str,
        value: Option<&str>,
        previous: Option<&str>,
    ) -> RenderResult {
        match name.to_lowercase().as_str() {
            "with" => {
                let mut out = Vec::new();
                let kept = value.map(storage_parameter_keys).unwrap_or_default();
                let removed: Vec<String> = previous
                    .map(storage_parameter_keys)
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|key| !kept.contains(key))
                    .collect();
                if !removed.is_empty() {
                    out.push(RenderedSql::new(self.alter_table(
                        schema,
                        table,
                        format!("RESET ({})", removed.join(", ")),
                    )));
                }
                if let Some(value) = value {
                    out.push(RenderedSql::new(self.alter_table(
                        schema,
                        table,
                        format!("SET {}", parenthesized(value)),
                    )));
                }
                Ok(out)
            }
            "tablespace" => {
                let tablespace = value.unwrap_or("pg_default");
                Ok(vec![RenderedSql::new(self.alter_table(
                    schema,
                    table,
                    format!("SET TABLESPACE {}", self.quoter.object(tablespace)),
                ))])
            }
            other => Err(Unsupported::new(format!(
                "table option '{other}' on {schema}.{table} cannot be altered in place"
            ))),
        }
    }
}
