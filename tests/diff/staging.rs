use crate::fixtures::INVENTORY;
use crate::helpers::{config_for, diff, stage_of, stage_sql};
use dbdiff::config::{Config, DialectKind};
use dbdiff::output::{Stage, Stream};

fn with_items_columns(extra: &str) -> String {
    INVENTORY.replace(
        r#"<column name="qty" type="int" null="false" default="0"/>"#,
        &format!(r#"<column name="qty" type="int" null="false" default="0"/>{extra}"#),
    )
}

#[test]
fn test_column_lifecycle_spans_both_schema_streams() {
    let config = Config::default();
    let old = with_items_columns(r#"<column name="legacy" type="text"/>"#);
    let new = with_items_columns(r#"<column name="active" type="boolean" null="false" default="true"/>"#);
    let router = diff(&old, &new, &config);

    assert_eq!(
        stage_sql(&router, Stage::One),
        vec!["ALTER TABLE app.items ADD COLUMN active boolean DEFAULT true;"]
    );
    assert_eq!(
        stage_sql(&router, Stage::After1),
        vec!["UPDATE app.items SET active = true WHERE active IS NULL;"]
    );
    let stage3 = stage_sql(&router, Stage::Three);
    assert!(stage3.contains(&"ALTER TABLE app.items ALTER COLUMN active SET NOT NULL;".to_string()));
    assert!(stage3.contains(&"ALTER TABLE app.items DROP COLUMN legacy;".to_string()));

    assert_eq!(router.statement_count(Stream::SchemaStage1), 2);
    assert_eq!(router.statement_count(Stream::DataStage1), 0);
    assert_eq!(router.statement_count(Stream::SchemaStage2), 2);
}

#[test]
fn test_new_table_and_index_are_stage_one() {
    let new = INVENTORY.replace(
        "</schema>",
        r#"<table name="bins" primaryKey="id">
               <column name="id" type="int" null="false"/>
               <column name="label" type="varchar(20)"/>
               <index name="bins_label_idx"><indexDimension>label</indexDimension></index>
           </table></schema>"#,
    );
    let router = diff(INVENTORY, &new, &config_for(DialectKind::Pgsql));
    assert_eq!(stage_of(&router, "CREATE TABLE app.bins"), Some(Stage::One));
    assert_eq!(stage_of(&router, "bins_label_idx"), Some(Stage::One));
    assert!(router.stream_is_empty(Stream::SchemaStage2));
}

#[test]
fn test_dropped_index_goes_before_stage_one() {
    let new = INVENTORY.replace(
        r#"<index name="items_sku_idx"><indexDimension>sku</indexDimension></index>"#,
        "",
    );
    let router = diff(INVENTORY, &new, &config_for(DialectKind::Pgsql));
    assert_eq!(
        stage_sql(&router, Stage::Before1),
        vec!["DROP INDEX IF EXISTS app.items_sku_idx;"]
    );
}

#[test]
fn test_changed_check_constraint_is_swapped_around_stage_one() {
    let new = INVENTORY.replace("(qty &gt;= 0)", "(qty &gt;= 1)");
    let router = diff(INVENTORY, &new, &config_for(DialectKind::Pgsql));
    assert_eq!(
        stage_sql(&router, Stage::Before1),
        vec!["ALTER TABLE app.items DROP CONSTRAINT IF EXISTS items_qty_check;"]
    );
    assert_eq!(
        stage_sql(&router, Stage::After1),
        vec!["ALTER TABLE app.items ADD CONSTRAINT items_qty_check CHECK (qty >= 1);"]
    );
}

#[test]
fn test_literal_sql_keeps_its_stage() {
    let new = INVENTORY.replace(
        "<schema name=\"app\">",
        r#"<sql stage="DATA1">UPDATE app.items SET qty = 0;</sql><schema name="app">"#,
    );
    let router = diff(INVENTORY, &new, &Config::default());
    assert_eq!(
        stage_sql(&router, Stage::Data1),
        vec!["UPDATE app.items SET qty = 0;"]
    );
    assert!(router.stream_is_empty(Stream::SchemaStage1));
}
