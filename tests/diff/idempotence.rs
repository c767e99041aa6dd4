use crate::fixtures::{EMPTY, INVENTORY, SHOP};
use crate::helpers::{all_sql, build, config_for, diff};
use dbdiff::config::DialectKind;
use rstest::rstest;

#[rstest]
#[case::shop_pgsql(SHOP, DialectKind::Pgsql)]
#[case::inventory_pgsql(INVENTORY, DialectKind::Pgsql)]
#[case::inventory_mssql(INVENTORY, DialectKind::Mssql)]
fn test_self_diff_is_empty(#[case] document: &str, #[case] dialect: DialectKind) {
    let router = diff(document, document, &config_for(dialect));
    assert!(router.is_empty(), "unexpected statements: {:?}", all_sql(&router));
}

#[rstest]
#[case::shop_pgsql(SHOP, DialectKind::Pgsql)]
#[case::inventory_mssql(INVENTORY, DialectKind::Mssql)]
fn test_build_matches_diff_from_nothing(#[case] document: &str, #[case] dialect: DialectKind) {
    let config = config_for(dialect);
    assert_eq!(
        all_sql(&build(document, &config)),
        all_sql(&diff(EMPTY, document, &config))
    );
}

#[rstest]
#[case::shop_pgsql(SHOP, DialectKind::Pgsql)]
#[case::inventory_pgsql(INVENTORY, DialectKind::Pgsql)]
#[case::inventory_mssql(INVENTORY, DialectKind::Mssql)]
fn test_build_is_never_destructive(#[case] document: &str, #[case] dialect: DialectKind) {
    let router = build(document, &config_for(dialect));
    assert!(!router.is_empty());
    assert_eq!(router.destructive_count(), 0);
    assert!(
        !all_sql(&router)
            .iter()
            .any(|(_, sql)| sql.starts_with("DROP TABLE"))
    );
}

#[test]
fn test_removing_everything_is_destructive() {
    let router = diff(SHOP, EMPTY, &config_for(DialectKind::Pgsql));
    let sql: Vec<String> = all_sql(&router).into_iter().map(|(_, s)| s).collect();
    assert!(sql.contains(&"DROP TABLE shop.orders;".to_string()));
    assert!(sql.contains(&"DROP SCHEMA IF EXISTS shop CASCADE;".to_string()));
    assert!(router.destructive_count() >= 4);
}
