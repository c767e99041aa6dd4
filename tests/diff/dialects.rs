use crate::fixtures::INVENTORY;
use crate::helpers::{build, config_for, diff, stage_sql};
use dbdiff::config::DialectKind;
use dbdiff::output::Stage;
use dbdiff::render::dialect_for;
use rstest::rstest;

#[rstest]
#[case::pgsql(DialectKind::Pgsql, "CREATE SCHEMA IF NOT EXISTS app;")]
#[case::mssql(DialectKind::Mssql, "IF SCHEMA_ID('app') IS NULL EXEC('CREATE SCHEMA app');")]
fn test_schema_creation(#[case] dialect: DialectKind, #[case] expected: &str) {
    let router = build(INVENTORY, &config_for(dialect));
    assert_eq!(stage_sql(&router, Stage::Before1), vec![expected]);
}

#[rstest]
#[case::pgsql(DialectKind::Pgsql, "BEGIN;", "COMMIT;")]
#[case::mssql(DialectKind::Mssql, "BEGIN TRANSACTION;", "COMMIT TRANSACTION;")]
fn test_transaction_markers_wrap_output(
    #[case] dialect: DialectKind,
    #[case] begin: &str,
    #[case] commit: &str,
) {
    let config = config_for(dialect);
    let markers = dialect_for(dialect, &config.quoting).transaction_markers();
    let text = build(INVENTORY, &config).render_single_stage(Some(markers));
    assert!(text.starts_with(begin), "{text}");
    assert!(text.trim_end().ends_with(commit), "{text}");
}

#[rstest]
#[case::pgsql(
    DialectKind::Pgsql,
    vec!["ALTER TABLE app.warehouses RENAME COLUMN city TO town;"]
)]
#[case::mssql(
    DialectKind::Mssql,
    vec![
        "EXEC sp_rename 'app.warehouses.city', 'town', 'COLUMN';",
        "IF OBJECT_ID('app.DF_warehouses_city', 'D') IS NOT NULL EXEC sp_rename 'app.DF_warehouses_city', 'DF_warehouses_town', 'OBJECT';",
    ]
)]
fn test_column_rename(#[case] dialect: DialectKind, #[case] expected: Vec<&str>) {
    let new = INVENTORY.replace(
        r#"<column name="city" type="varchar(100)" null="false"/>"#,
        r#"<column name="town" type="varchar(100)" null="false" oldColumnName="city"/>"#,
    );
    let router = diff(INVENTORY, &new, &config_for(dialect));
    assert_eq!(stage_sql(&router, Stage::Before1), expected);
    assert!(router.stage(Stage::Three).is_empty());
}

#[rstest]
#[case::pgsql(DialectKind::Pgsql)]
#[case::mssql(DialectKind::Mssql)]
fn test_referenced_table_is_created_first(#[case] dialect: DialectKind) {
    let text = build(INVENTORY, &config_for(dialect)).render_single_stage(None);
    let warehouses = text.find("CREATE TABLE app.warehouses").unwrap();
    let items = text.find("CREATE TABLE app.items").unwrap();
    assert!(warehouses < items);
}

#[test]
fn test_quoting_applies_to_every_identifier() {
    let mut config = config_for(DialectKind::Pgsql);
    config.quoting.all_names = true;
    let text = build(INVENTORY, &config).render_single_stage(None);
    assert!(text.contains(r#"CREATE TABLE "app"."warehouses""#), "{text}");

    let mut config = config_for(DialectKind::Mssql);
    config.quoting.all_names = true;
    let text = build(INVENTORY, &config).render_single_stage(None);
    assert!(text.contains("CREATE TABLE [app].[warehouses]"), "{text}");
}
