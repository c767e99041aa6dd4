//! Diff enum types.
//!
//! Enum value lists cannot be edited in place. A changed type is dropped and
//! recreated, with every column using it parked on a placeholder type in
//! between. Dialects without enum types enforce values through CHECK
//! constraints, so for them only creation and removal notes are emitted.

use crate::catalog::Database;
use crate::catalog::custom_type::EnumType;
use crate::catalog::id::QualifiedName;
use crate::diff::operations::{MigrationStep, TypeOperation};
use crate::diff::{DiffContext, diff_list};
use crate::output::Stage;
use std::collections::BTreeSet;
use tracing::debug;

fn all_types(db: &Database) -> Vec<EnumType> {
    db.schemas.iter().flat_map(|s| s.types.iter().cloned()).collect()
}

/// Types present on both sides whose value lists differ.
pub fn changed_types(old: &Database, new: &Database) -> BTreeSet<QualifiedName> {
    let (old_types, new_types) = (all_types(old), all_types(new));
    diff_list(&old_types, &new_types, EnumType::qualified_name)
        .into_iter()
        .filter_map(|pair| match pair {
            (Some(o), Some(n)) if o.values != n.values => Some(n.qualified_name()),
            _ => None,
        })
        .collect()
}

pub fn diff_types(ctx: &mut DiffContext) {
    let (old_types, new_types) = (all_types(ctx.old), all_types(ctx.new));
    for pair in diff_list(&old_types, &new_types, EnumType::qualified_name) {
        match pair {
            (None, Some(n)) => ctx.emit(
                Stage::Before1,
                MigrationStep::Type(TypeOperation::Create {
                    enum_type: n.clone(),
                }),
            ),
            (Some(o), None) => ctx.emit(
                Stage::After3,
                MigrationStep::Type(TypeOperation::Drop {
                    name: o.qualified_name(),
                }),
            ),
            (Some(o), Some(n)) if o.values != n.values => {
                if ctx.dialect.has_enum_types() {
                    redefine_type(ctx, n);
                } else {
                    debug!("Enum {} changed; CHECK constraints follow", n.qualified_name());
                }
            }
            _ => {}
        }
    }
}

/// Park dependent columns on the placeholder type, replace the type, then
/// move the columns that still use it back.
fn redefine_type(ctx: &mut DiffContext, enum_type: &EnumType) {
    let name = enum_type.qualified_name();
    debug!("Redefining enum {}", name);

    let relaxed: Vec<(String, String, String, bool)> = ctx
        .old
        .columns_of_type(&name)
        .into_iter()
        .map(|(t, c)| (t.schema.clone(), t.name.clone(), c.name.clone(), c.default.is_some()))
        .collect();
    for (schema, table, column, has_default) in &relaxed {
        ctx.emit(
            Stage::Before1,
            MigrationStep::Type(TypeOperation::RelaxColumn {
                schema: schema.clone(),
                table: table.clone(),
                column: column.clone(),
                has_default: *has_default,
            }),
        );
    }

    ctx.emit(
        Stage::Before1,
        MigrationStep::Type(TypeOperation::Drop { name: name.clone() }),
    );
    ctx.emit(
        Stage::Before1,
        MigrationStep::Type(TypeOperation::Create {
            enum_type: enum_type.clone(),
        }),
    );

    // restore under the names the columns still have at this point in BEFORE1
    let mut restored = Vec::new();
    for (new_table, new_column) in ctx.new.columns_of_type(&name) {
        let Some(old_table) = ctx.old_table_for(new_table) else {
            continue;
        };
        let renamed_from = new_column
            .old_name
            .as_deref()
            .filter(|_| !ctx.options.ignore_old_names);
        let Some(old_column) = old_table
            .find_column(&new_column.name)
            .or_else(|| renamed_from.and_then(|previous| old_table.find_column(previous)))
        else {
            continue;
        };
        if old_column.enum_type.as_ref().is_none_or(|e| e.name != name) {
            continue;
        }
        // the column rename itself runs later in BEFORE1
        let mut column = new_column.clone();
        column.name = old_column.name.clone();
        restored.push((old_table.schema.clone(), old_table.name.clone(), column));
    }
    for (schema, table, column) in restored {
        ctx.emit(
            Stage::Before1,
            MigrationStep::Type(TypeOperation::RestoreColumn {
                schema,
                table,
                column,
                type_name: name.clone(),
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DialectKind};
    use crate::diff::test_support::*;

    fn create_test_document(values: &[&str]) -> String {
        let enums: String = values
            .iter()
            .map(|v| format!(r#"<enum name="{v}"/>"#))
            .collect();
        format!(
            r#"<dbsteward><schema name="app">
                <type name="order_status" type="enum">{enums}</type>
                <table name="orders" primaryKey="id">
                    <column name="id" type="integer" null="false"/>
                    <column name="status" type="order_status" default="'new'"/>
                </table>
            </schema></dbsteward>"#
        )
    }

    #[test]
    fn test_changed_enum_runs_the_full_sequence_in_order() {
        let old = create_test_document(&["new", "paid"]);
        let new = create_test_document(&["new", "paid", "shipped"]);
        let staged = staged_sql(&old, &new, &Config::default());
        let before1 = sql_in(&staged, Stage::Before1);
        assert_eq!(
            before1,
            vec![
                "ALTER TABLE app.orders ALTER COLUMN status DROP DEFAULT;",
                "ALTER TABLE app.orders ALTER COLUMN status TYPE text;",
                "DROP TYPE IF EXISTS app.order_status;",
                "CREATE TYPE app.order_status AS ENUM ('new', 'paid', 'shipped');",
                "ALTER TABLE app.orders ALTER COLUMN status TYPE app.order_status USING status::app.order_status;",
                "ALTER TABLE app.orders ALTER COLUMN status SET DEFAULT 'new';",
            ]
        );
    }

    #[test]
    fn test_changed_enum_restores_a_renamed_column() {
        let doc = |values: &str, column: &str| {
            format!(
                r#"<dbsteward><schema name="app">
                    <type name="st" type="enum">{values}</type>
                    <table name="t" primaryKey="id">
                        <column name="id" type="integer" null="false"/>
                        {column}
                    </table>
                </schema></dbsteward>"#
            )
        };
        let old = doc(r#"<enum name="a"/>"#, r#"<column name="status" type="st"/>"#);
        let new = doc(
            r#"<enum name="a"/><enum name="b"/>"#,
            r#"<column name="state" type="st" oldColumnName="status"/>"#,
        );
        let staged = staged_sql(&old, &new, &Config::default());
        assert_eq!(
            sql_in(&staged, Stage::Before1),
            vec![
                "ALTER TABLE app.t ALTER COLUMN status TYPE text;",
                "DROP TYPE IF EXISTS app.st;",
                "CREATE TYPE app.st AS ENUM ('a', 'b');",
                "ALTER TABLE app.t ALTER COLUMN status TYPE app.st USING status::app.st;",
                "ALTER TABLE app.t RENAME COLUMN status TO state;",
            ]
        );
    }

    #[test]
    fn test_unchanged_enum_is_silent() {
        let doc = create_test_document(&["new", "paid"]);
        assert!(plan(&doc, &doc, &Config::default()).is_empty());
    }

    #[test]
    fn test_mssql_swaps_check_constraint_instead() {
        let config = Config {
            dialect: DialectKind::Mssql,
            ..Config::default()
        };
        let old = create_test_document(&["new", "paid"]);
        let new = create_test_document(&["new", "shipped"]);
        let staged = staged_sql(&old, &new, &config);
        assert!(!staged.iter().any(|(_, sql)| sql.contains("TYPE")));
        assert!(
            sql_in(&staged, Stage::Before1)
                .iter()
                .any(|sql| sql.contains("DROP CONSTRAINT") && sql.contains("orders_status_enum_check"))
        );
        assert!(
            sql_in(&staged, Stage::After1)
                .iter()
                .any(|sql| sql.contains("'shipped'"))
        );
    }

    #[test]
    fn test_changed_types_lists_only_differences() {
        let old = load(&create_test_document(&["a"]));
        let new = load(&create_test_document(&["a", "b"]));
        let changed = changed_types(&old, &new);
        assert!(changed.contains(&QualifiedName::new("app", "order_status")));
        assert!(changed_types(&old, &old).is_empty());
    }
}
