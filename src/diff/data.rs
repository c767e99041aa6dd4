//! Diff static row data.
//!
//! Rows correlate by primary key when every key column is declared in the
//! `<rows>` block, otherwise by the whole row. Matching rows become UPDATEs of
//! just the changed columns, new rows INSERTs and vanished or delete-marked
//! rows DELETEs. Deletes run referrers first, inserts referenced tables first.

use crate::catalog::data::{Row, RowSet, Value};
use crate::catalog::table::Table;
use crate::diff::operations::{DataOperation, MigrationStep, SqlValue};
use crate::diff::DiffContext;
use crate::output::Stage;
use std::collections::HashMap;
use tracing::debug;

fn key_columns(table: &Table, rows: &RowSet) -> Vec<String> {
    if !table.primary_key.is_empty() && table.primary_key.iter().all(|c| rows.position(c).is_some()) {
        table.primary_key.clone()
    } else {
        rows.columns.clone()
    }
}

fn sql_value(table: &Table, column: &str, value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Sql(sql) => SqlValue::Raw(sql.clone()),
        Value::Text(text) => {
            let numeric = table.find_column(column).is_some_and(|c| c.is_numeric());
            if numeric && text.trim().parse::<f64>().is_ok_and(f64::is_finite) {
                SqlValue::Raw(text.trim().to_string())
            } else {
                SqlValue::Quoted(text.clone())
            }
        }
    }
}

fn key_of(table: &Table, rows: &RowSet, row: &Row, keys: &[String]) -> Vec<(String, SqlValue)> {
    keys.iter()
        .filter_map(|k| rows.value(row, k).map(|v| (k.clone(), sql_value(table, k, v))))
        .collect()
}

/// Data steps for one table, split into deletes and upserts.
fn diff_rows(
    ctx: &DiffContext,
    table: &Table,
    rows: &RowSet,
    old_rows: Option<&RowSet>,
) -> (Vec<DataOperation>, Vec<DataOperation>) {
    let keys = key_columns(table, rows);
    let old_index: HashMap<Vec<String>, &Row> = old_rows
        .map(|old| {
            old.rows
                .iter()
                .filter(|r| !r.delete)
                .filter_map(|r| old.key(r, &keys).map(|k| (k, r)))
                .collect()
        })
        .unwrap_or_default();

    let (mut deletes, mut inserts, mut updates) = (Vec::new(), Vec::new(), Vec::new());
    let mut kept = Vec::new();
    for row in &rows.rows {
        let Some(key) = rows.key(row, &keys) else {
            continue;
        };
        let previous = old_index.get(&key).copied();
        if row.delete {
            if previous.is_some() {
                deletes.push(DataOperation::Delete {
                    schema: table.schema.clone(),
                    table: table.name.clone(),
                    key: key_of(table, rows, row, &keys),
                });
            }
            continue;
        }
        kept.push(key);
        match (previous, old_rows) {
            (Some(previous), Some(old)) => {
                let set: Vec<(String, SqlValue)> = rows
                    .columns
                    .iter()
                    .filter(|c| !keys.contains(c))
                    .filter_map(|c| {
                        let value = rows.value(row, c)?;
                        let before = old.value(previous, c)?;
                        (value != before).then(|| (c.clone(), sql_value(table, c, value)))
                    })
                    .collect();
                if !set.is_empty() {
                    updates.push(DataOperation::Update {
                        schema: table.schema.clone(),
                        table: table.name.clone(),
                        set,
                        key: key_of(table, rows, row, &keys),
                    });
                }
            }
            _ => inserts.push(DataOperation::Insert {
                schema: table.schema.clone(),
                table: table.name.clone(),
                columns: rows.columns.clone(),
                values: rows
                    .columns
                    .iter()
                    .zip(&row.values)
                    .map(|(c, v)| sql_value(table, c, v))
                    .collect(),
            }),
        }
    }

    if let Some(old) = old_rows {
        for row in old.rows.iter().filter(|r| !r.delete) {
            let Some(key) = old.key(row, &keys) else {
                continue;
            };
            let marked = rows
                .rows
                .iter()
                .any(|r| r.delete && rows.key(r, &keys).as_ref() == Some(&key));
            if kept.contains(&key) || marked {
                continue;
            }
            deletes.push(DataOperation::Delete {
                schema: table.schema.clone(),
                table: table.name.clone(),
                key: key_of(table, old, row, &keys),
            });
        }
    }

    let identity_insert = ctx.dialect.needs_identity_insert()
        && !inserts.is_empty()
        && table.identity_columns().any(|c| rows.position(&c.name).is_some());
    let mut upserts = updates;
    if identity_insert {
        upserts.push(DataOperation::IdentityInsert {
            schema: table.schema.clone(),
            table: table.name.clone(),
            enable: true,
        });
        upserts.append(&mut inserts);
        upserts.push(DataOperation::IdentityInsert {
            schema: table.schema.clone(),
            table: table.name.clone(),
            enable: false,
        });
    } else {
        upserts.append(&mut inserts);
    }
    (deletes, upserts)
}

pub fn diff_data(ctx: &mut DiffContext) {
    let mut deletes = Vec::new();
    let mut upserts = Vec::new();
    for pair in ctx.table_pairs() {
        let Some(table) = pair.new else {
            continue;
        };
        let old_rows = pair.old.and_then(|t| t.rows.as_ref());
        let Some(rows) = &table.rows else {
            if let Some(old) = old_rows {
                // an emptied <rows> block removes what it used to seed
                let empty = RowSet {
                    columns: old.columns.clone(),
                    rows: Vec::new(),
                };
                let (table_deletes, _) = diff_rows(ctx, table, &empty, Some(old));
                deletes.push(table_deletes);
            }
            continue;
        };
        let (table_deletes, table_upserts) = diff_rows(ctx, table, rows, old_rows);
        debug!(
            "{}: {} deletes, {} upserts",
            table.qualified_name(),
            table_deletes.len(),
            table_upserts.len()
        );
        deletes.push(table_deletes);
        upserts.extend(table_upserts);
    }

    for op in deletes.into_iter().rev().flatten() {
        ctx.emit(Stage::DataDelete, MigrationStep::Data(op));
    }
    for op in upserts {
        ctx.emit(Stage::DataUpsert, MigrationStep::Data(op));
    }
}
