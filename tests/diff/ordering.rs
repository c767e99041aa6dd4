use crate::helpers::{build, config_for, load};
use dbdiff::config::DialectKind;
use dbdiff::diff::order::{dependency_order, document_order};
use dbdiff::{DiffError, build_database};

const CHAIN: &str = r#"<dbsteward><schema name="app">
    <table name="line_items" primaryKey="id">
        <column name="id" type="integer" null="false"/>
        <column name="order_id" foreignTable="orders" foreignColumn="id"/>
    </table>
    <table name="orders" primaryKey="id">
        <column name="id" type="integer" null="false"/>
        <column name="customer_id" foreignTable="customers" foreignColumn="id"/>
    </table>
    <table name="customers" primaryKey="id">
        <column name="id" type="integer" null="false"/>
    </table>
    <table name="notes" primaryKey="id">
        <column name="id" type="integer" null="false"/>
    </table>
</schema></dbsteward>"#;

fn names(entries: Vec<dbdiff::diff::order::OrderEntry>) -> Vec<String> {
    entries
        .into_iter()
        .filter(|e| !e.is_schema_marker())
        .map(|e| e.table)
        .collect()
}

#[test]
fn test_dependency_order_puts_targets_first() {
    let db = load(CHAIN);
    assert_eq!(
        names(dependency_order(&db)),
        vec!["customers", "orders", "line_items", "notes"]
    );
    assert_eq!(
        names(document_order(&db)),
        vec!["line_items", "orders", "customers", "notes"]
    );
}

#[test]
fn test_foreign_key_cycle_falls_back_to_document_order() {
    let cyclic = CHAIN.replace(
        r#"<table name="customers" primaryKey="id">
        <column name="id" type="integer" null="false"/>"#,
        r#"<table name="customers" primaryKey="id">
        <column name="id" type="integer" null="false"/>
        <column name="last_item_id" foreignTable="line_items" foreignColumn="id"/>"#,
    );
    let db = load(&cyclic);
    assert_eq!(
        names(dependency_order(&db)),
        vec!["line_items", "orders", "customers", "notes"]
    );
    // still buildable
    assert!(!build(&cyclic, &config_for(DialectKind::Pgsql)).is_empty());
}

#[test]
fn test_view_cycle_is_fatal() {
    let doc = r#"<dbsteward><schema name="app">
        <view name="a" dependsOnViews="b"><viewQuery>SELECT * FROM app.b</viewQuery></view>
        <view name="b" dependsOnViews="a"><viewQuery>SELECT * FROM app.a</viewQuery></view>
    </schema></dbsteward>"#;
    let result = build_database(&load(doc), &config_for(DialectKind::Pgsql));
    assert!(matches!(result, Err(DiffError::DependencyCycle(_))));
}
