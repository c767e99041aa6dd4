use crate::helpers::{all_sql, config_for, diff, load, position_of, stage_of, stage_sql};
use dbdiff::config::{Config, DialectKind};
use dbdiff::output::Stage;
use dbdiff::{DiffError, diff_databases};

const BEFORE: &str = r#"<dbsteward>
    <schema name="legacy">
        <table name="people" primaryKey="id">
            <column name="id" type="integer" null="false"/>
            <column name="full_name" type="text"/>
        </table>
    </schema>
    <schema name="app">
        <table name="customers" primaryKey="id">
            <column name="id" type="integer" null="false"/>
        </table>
        <table name="orders" primaryKey="id">
            <column name="id" type="integer" null="false"/>
            <column name="customer_id" foreignTable="customers" foreignColumn="id"/>
        </table>
    </schema>
</dbsteward>"#;

const AFTER: &str = r#"<dbsteward>
    <schema name="app">
        <table name="clients" primaryKey="id" oldTableName="customers">
            <column name="id" type="integer" null="false"/>
        </table>
        <table name="orders" primaryKey="id">
            <column name="id" type="integer" null="false"/>
            <column name="customer_id" foreignTable="clients" foreignColumn="id"/>
        </table>
    </schema>
    <schema name="crm">
        <table name="people" primaryKey="id" oldSchemaName="legacy">
            <column name="id" type="integer" null="false"/>
            <column name="display_name" type="text" oldColumnName="full_name"/>
        </table>
    </schema>
</dbsteward>"#;

fn statements(old: &str, new: &str, config: &Config) -> Vec<String> {
    all_sql(&diff(old, new, config)).into_iter().map(|(_, s)| s).collect()
}

#[test]
fn test_renames_preserve_tables() {
    let sql = statements(BEFORE, AFTER, &Config::default());
    assert!(sql.contains(&"ALTER TABLE app.customers RENAME TO clients;".to_string()));
    assert!(sql.contains(&"ALTER TABLE legacy.people SET SCHEMA crm;".to_string()));
    assert!(sql.contains(&"ALTER TABLE crm.people RENAME COLUMN full_name TO display_name;".to_string()));
    assert!(!sql.iter().any(|s| s.starts_with("DROP TABLE")));
    assert!(!sql.iter().any(|s| s.starts_with("CREATE TABLE")));
    assert!(!sql.iter().any(|s| s.contains("DROP COLUMN")));
}

#[test]
fn test_schema_move_runs_between_schema_create_and_drop() {
    let router = diff(BEFORE, AFTER, &Config::default());
    assert!(
        position_of(&router, "CREATE SCHEMA IF NOT EXISTS crm;")
            < position_of(&router, "SET SCHEMA crm")
    );
    assert_eq!(stage_of(&router, "SET SCHEMA crm"), Some(Stage::Before1));
    let after3 = stage_sql(&router, Stage::After3);
    assert_eq!(after3.last().map(String::as_str), Some("DROP SCHEMA IF EXISTS legacy CASCADE;"));
    assert!(after3.contains(&"-- legacy.people was renamed to crm.people, so it is not dropped".to_string()));
    assert!(after3.contains(
        &"-- crm.people.full_name was renamed to display_name, so it is not dropped".to_string()
    ));
}

#[test]
fn test_applied_rename_is_a_no_op() {
    let router = diff(AFTER, AFTER, &Config::default());
    assert!(router.is_empty(), "{:?}", all_sql(&router));
}

#[test]
fn test_ignoring_old_names_drops_and_creates() {
    let mut config = config_for(DialectKind::Pgsql);
    config.diff.ignore_old_names = true;
    let sql = statements(BEFORE, AFTER, &config);
    assert!(sql.iter().any(|s| s.starts_with("CREATE TABLE app.clients")));
    assert!(sql.contains(&"DROP TABLE app.customers;".to_string()));
    assert!(!sql.iter().any(|s| s.contains("RENAME")));
}

#[test]
fn test_missing_rename_source_fails() {
    let new = AFTER.replace(r#"oldTableName="customers""#, r#"oldTableName="patrons""#);
    let result = diff_databases(&load(BEFORE), &load(&new), &Config::default());
    assert!(matches!(result, Err(DiffError::NotFound { .. })));
}

#[test]
fn test_rename_source_still_present_conflicts() {
    let new = AFTER.replace(
        "</schema>\n    <schema name=\"crm\">",
        r#"<table name="customers" primaryKey="id">
               <column name="id" type="integer" null="false"/>
           </table></schema>
    <schema name="crm">"#,
    );
    let result = diff_databases(&load(BEFORE), &load(&new), &Config::default());
    assert!(matches!(result, Err(DiffError::RenameConflict(_))));
}
