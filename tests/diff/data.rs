use crate::fixtures::{EMPTY, INVENTORY};
use crate::helpers::{all_sql, config_for, diff, stage_sql};
use dbdiff::config::{Config, DialectKind};
use dbdiff::output::{Stage, Stream};

fn with_rows(warehouses: &str, items: &str) -> String {
    INVENTORY
        .replace(
            r#"<column name="city" type="varchar(100)" null="false"/>"#,
            &format!(
                r#"<column name="city" type="varchar(100)" null="false"/>
                   <rows columns="id, city">{warehouses}</rows>"#
            ),
        )
        .replace(
            r#"<constraint name="items_qty_check" type="CHECK" definition="(qty &gt;= 0)"/>"#,
            &format!(
                r#"<constraint name="items_qty_check" type="CHECK" definition="(qty &gt;= 0)"/>
                   <rows columns="id, warehouse_id, sku, qty">{items}</rows>"#
            ),
        )
}

fn old_document() -> String {
    with_rows(
        "<row><col>1</col><col>Bergen</col></row>
         <row><col>2</col><col>Trondheim</col></row>",
        "<row><col>10</col><col>1</col><col>A-1</col><col>4</col></row>
         <row><col>11</col><col>2</col><col>B-1</col><col>0</col></row>",
    )
}

fn new_document() -> String {
    with_rows(
        "<row><col>1</col><col>Bergen</col></row>
         <row><col>3</col><col>Oslo</col></row>",
        "<row><col>10</col><col>1</col><col>A-1</col><col>5</col></row>
         <row><col>12</col><col>3</col><col>C-1</col><col>7</col></row>",
    )
}

#[test]
fn test_rows_are_correlated_across_tables() {
    let router = diff(&old_document(), &new_document(), &Config::default());

    assert_eq!(
        stage_sql(&router, Stage::DataDelete),
        vec![
            "DELETE FROM app.items WHERE id = 11;",
            "DELETE FROM app.warehouses WHERE id = 2;",
        ]
    );
    assert_eq!(
        stage_sql(&router, Stage::DataUpsert),
        vec![
            "INSERT INTO app.warehouses (id, city) VALUES (3, 'Oslo');",
            "UPDATE app.items SET qty = 5 WHERE id = 10;",
            "INSERT INTO app.items (id, warehouse_id, sku, qty) VALUES (12, 3, 'C-1', 7);",
        ]
    );
    assert!(router.stream_is_empty(Stream::SchemaStage1));
    assert!(router.stream_is_empty(Stream::SchemaStage2));
    assert_eq!(router.statement_count(Stream::DataStage1), 5);
}

#[test]
fn test_unchanged_rows_are_silent() {
    let router = diff(&old_document(), &old_document(), &Config::default());
    assert!(router.is_empty(), "{:?}", all_sql(&router));
}

#[test]
fn test_built_rows_are_inserted_in_dependency_order() {
    let router = diff(EMPTY, &new_document(), &config_for(DialectKind::Pgsql));
    let inserts = stage_sql(&router, Stage::DataUpsert);
    assert_eq!(inserts.len(), 4);
    assert!(inserts[..2].iter().all(|s| s.starts_with("INSERT INTO app.warehouses")));
    assert!(inserts[2..].iter().all(|s| s.starts_with("INSERT INTO app.items")));
    assert!(stage_sql(&router, Stage::DataDelete).is_empty());
}

#[test]
fn test_dropped_table_emits_no_row_deletes() {
    let router = diff(&old_document(), EMPTY, &Config::default());
    assert!(stage_sql(&router, Stage::DataDelete).is_empty());
    assert!(
        stage_sql(&router, Stage::Three).contains(&"DROP TABLE app.items;".to_string())
    );
}
