use crate::fixtures::INVENTORY;
use crate::helpers::cli::CliTestHelper;
use anyhow::Result;

#[test]
fn test_order_lists_referenced_tables_first() -> Result<()> {
    let helper = CliTestHelper::new();
    let document = r#"<dbsteward><schema name="app">
        <table name="items" primaryKey="id">
            <column name="id" type="int" null="false"/>
            <column name="warehouse_id" foreignTable="warehouses" foreignColumn="id"/>
        </table>
        <table name="warehouses" primaryKey="id">
            <column name="id" type="int" null="false"/>
        </table>
    </schema></dbsteward>"#;
    helper.write_document("inventory.xml", document)?;

    helper
        .command()
        .args(["order", "inventory.xml"])
        .assert()
        .success()
        .stdout("app.warehouses\napp.items\n");
    Ok(())
}

#[test]
fn test_order_json() -> Result<()> {
    let helper = CliTestHelper::new();
    helper.write_document("inventory.xml", INVENTORY)?;

    let output = helper
        .command()
        .args(["order", "inventory.xml", "--document-order", "--format", "json"])
        .output()?;
    assert!(output.status.success());
    let names: Vec<String> = serde_json::from_slice(&output.stdout)?;
    assert_eq!(names, vec!["app.warehouses", "app.items"]);
    Ok(())
}
