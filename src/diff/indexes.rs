//! Diff table indexes.
//!
//! Indexes pair by name within their table and compare structurally. Changed
//! and removed indexes drop in BEFORE1 under the table's old name; new and
//! changed ones are created in STAGE1 once every column exists.

use crate::catalog::index::Index;
use crate::catalog::table::Table;
use crate::diff::operations::{IndexOperation, MigrationStep};
use crate::diff::DiffContext;
use crate::output::Stage;

fn unchanged_in(index: &Index, table: &Table) -> bool {
    table
        .find_index(&index.name)
        .is_some_and(|other| other.structurally_equal(index))
}

pub fn drop_indexes(ctx: &mut DiffContext) {
    for pair in ctx.table_pairs() {
        let (Some(old), Some(new)) = (pair.old, pair.new) else {
            continue;
        };
        for index in old.indexes.iter().filter(|i| !unchanged_in(i, new)) {
            ctx.emit(
                Stage::Before1,
                MigrationStep::Index(IndexOperation::Drop {
                    schema: old.schema.clone(),
                    table: old.name.clone(),
                    index: index.clone(),
                }),
            );
        }
    }
}

/// Create new and changed indexes, then re-cluster tables whose cluster
/// index changed or was recreated. Rebuilt tables are skipped.
pub fn create_indexes(ctx: &mut DiffContext) {
    let multiple_nulls = ctx.dialect.unique_allows_multiple_nulls();
    for pair in ctx.table_pairs() {
        let Some(new) = pair.new else {
            continue;
        };
        if ctx.rebuilt_tables.contains(&new.qualified_name()) {
            continue;
        }

        let mut created = Vec::new();
        for index in &new.indexes {
            if pair.old.is_some_and(|old| unchanged_in(index, old)) {
                continue;
            }
            let nullable_columns = if index.unique && !multiple_nulls {
                new.nullable_index_columns(index)
            } else {
                Vec::new()
            };
            created.push(index.name.as_str());
            ctx.emit(
                Stage::One,
                MigrationStep::Index(IndexOperation::Create {
                    schema: new.schema.clone(),
                    table: new.name.clone(),
                    index: index.clone(),
                    nullable_columns,
                }),
            );
        }

        let Some(cluster) = &new.cluster_index else {
            continue;
        };
        let recluster = match pair.old {
            None => true,
            Some(old) => {
                old.cluster_index.as_ref() != Some(cluster) || created.contains(&cluster.as_str())
            }
        };
        if recluster {
            ctx.emit(
                Stage::One,
                MigrationStep::Index(IndexOperation::Cluster {
                    schema: new.schema.clone(),
                    table: new.name.clone(),
                    index: cluster.clone(),
                }),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DialectKind};
    use crate::diff::test_support::*;

    fn create_test_document(index: &str) -> String {
        format!(
            r#"<dbsteward><schema name="app">
                <table name="users" primaryKey="id">
                    <column name="id" type="integer" null="false"/>
                    <column name="email" type="text"/>
                    <column name="team" type="integer"/>
                    {index}
                </table>
            </schema></dbsteward>"#
        )
    }

    const EMAIL: &str =
        r#"<index name="users_email_idx"><indexDimension>email</indexDimension></index>"#;

    #[test]
    fn test_unchanged_index_is_silent() {
        let doc = create_test_document(EMAIL);
        assert!(plan(&doc, &doc, &Config::default()).is_empty());
    }

    #[test]
    fn test_dimension_order_change_recreates() {
        let old = create_test_document(
            r#"<index name="users_idx"><indexDimension>email</indexDimension><indexDimension>team</indexDimension></index>"#,
        );
        let new = create_test_document(
            r#"<index name="users_idx"><indexDimension>team</indexDimension><indexDimension>email</indexDimension></index>"#,
        );
        let staged = staged_sql(&old, &new, &Config::default());
        assert_eq!(
            sql_in(&staged, Stage::Before1),
            vec!["DROP INDEX IF EXISTS app.users_idx;"]
        );
        assert_eq!(
            sql_in(&staged, Stage::One),
            vec!["CREATE INDEX users_idx ON app.users (team, email);"]
        );
    }

    #[test]
    fn test_cluster_follows_new_cluster_index() {
        let old = create_test_document(EMAIL);
        let new = old.replace(
            r#"<table name="users" primaryKey="id">"#,
            r#"<table name="users" primaryKey="id" clusterIndex="users_email_idx">"#,
        );
        let staged = staged_sql(&old, &new, &Config::default());
        assert_eq!(
            sql_in(&staged, Stage::One),
            vec!["ALTER TABLE app.users CLUSTER ON users_email_idx;"]
        );
    }

    #[test]
    fn test_unique_index_on_mssql_carries_nullable_columns() {
        let config = Config {
            dialect: DialectKind::Mssql,
            ..Config::default()
        };
        let old = create_test_document("");
        let new = create_test_document(
            r#"<index name="users_email_key" unique="true"><indexDimension>email</indexDimension></index>"#,
        );
        let nullable: Vec<_> = plan(&old, &new, &config)
            .into_iter()
            .filter_map(|p| match p.step {
                MigrationStep::Index(IndexOperation::Create {
                    nullable_columns, ..
                }) => Some(nullable_columns),
                _ => None,
            })
            .collect();
        assert_eq!(nullable, vec![vec!["email".to_string()]]);
    }
}
