use crate::helpers::{config_for, diff, position_of, stage_sql};
use dbdiff::config::DialectKind;
use dbdiff::output::Stage;

fn create_test_document(values: &[&str]) -> String {
    let enums: String = values
        .iter()
        .map(|v| format!(r#"<enum name="{v}"/>"#))
        .collect();
    format!(
        r#"<dbsteward><schema name="app">
            <type name="order_status" type="enum">{enums}</type>
            <function name="default_status" returns="order_status">
                <functionDefinition language="sql">SELECT 'new'::app.order_status</functionDefinition>
            </function>
            <table name="orders" primaryKey="id">
                <column name="id" type="integer" null="false"/>
                <column name="status" type="order_status" default="'new'"/>
            </table>
            <table name="returns" primaryKey="id">
                <column name="id" type="integer" null="false"/>
                <column name="status" type="order_status" default="'new'"/>
            </table>
        </schema></dbsteward>"#
    )
}

#[test]
fn test_enum_change_parks_every_dependent_column() {
    let old = create_test_document(&["new", "paid"]);
    let new = create_test_document(&["new", "paid", "refunded"]);
    let router = diff(&old, &new, &config_for(DialectKind::Pgsql));

    let type_steps: Vec<String> = stage_sql(&router, Stage::Before1)
        .into_iter()
        .filter(|s| !s.contains("FUNCTION"))
        .collect();
    assert_eq!(
        type_steps,
        vec![
            "ALTER TABLE app.orders ALTER COLUMN status DROP DEFAULT;",
            "ALTER TABLE app.orders ALTER COLUMN status TYPE text;",
            "ALTER TABLE app.returns ALTER COLUMN status DROP DEFAULT;",
            "ALTER TABLE app.returns ALTER COLUMN status TYPE text;",
            "DROP TYPE IF EXISTS app.order_status;",
            "CREATE TYPE app.order_status AS ENUM ('new', 'paid', 'refunded');",
            "ALTER TABLE app.orders ALTER COLUMN status TYPE app.order_status USING status::app.order_status;",
            "ALTER TABLE app.orders ALTER COLUMN status SET DEFAULT 'new';",
            "ALTER TABLE app.returns ALTER COLUMN status TYPE app.order_status USING status::app.order_status;",
            "ALTER TABLE app.returns ALTER COLUMN status SET DEFAULT 'new';",
        ]
    );
}

#[test]
fn test_functions_using_the_enum_are_recreated_around_it() {
    let old = create_test_document(&["new", "paid"]);
    let new = create_test_document(&["new", "shipped"]);
    let router = diff(&old, &new, &config_for(DialectKind::Pgsql));

    let drop_function = position_of(&router, "DROP FUNCTION IF EXISTS app.default_status");
    let drop_type = position_of(&router, "DROP TYPE IF EXISTS app.order_status");
    let create_type = position_of(&router, "CREATE TYPE app.order_status");
    let create_function = position_of(&router, "FUNCTION app.default_status()");
    assert!(drop_function < drop_type);
    assert!(drop_type < create_type);
    assert!(create_type < create_function);
}

#[test]
fn test_mssql_enum_change_swaps_check_constraints() {
    let old = create_test_document(&["new", "paid"]);
    let new = create_test_document(&["new", "paid", "refunded"]);
    let doc_without_function = |doc: &str| {
        let start = doc.find("<function").unwrap();
        let end = doc.find("</function>").unwrap() + "</function>".len();
        format!("{}{}", &doc[..start], &doc[end..])
    };
    let router = diff(
        &doc_without_function(&old),
        &doc_without_function(&new),
        &config_for(DialectKind::Mssql),
    );

    let before1 = stage_sql(&router, Stage::Before1);
    assert!(before1.iter().any(|s| s.contains("DROP CONSTRAINT IF EXISTS orders_status_enum_check")));
    assert!(before1.iter().any(|s| s.contains("DROP CONSTRAINT IF EXISTS returns_status_enum_check")));
    let after1 = stage_sql(&router, Stage::After1);
    assert!(
        after1
            .iter()
            .any(|s| s.contains("returns_status_enum_check") && s.contains("'refunded'"))
    );
    assert!(!before1.iter().any(|s| s.contains("CREATE TYPE")));
}
