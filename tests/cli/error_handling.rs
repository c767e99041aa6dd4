use crate::fixtures::INVENTORY;
use crate::helpers::cli::CliTestHelper;
use anyhow::Result;
use predicates::prelude::*;

#[test]
fn test_missing_document_fails() {
    let helper = CliTestHelper::new();
    helper
        .command()
        .args(["build", "absent.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.xml"));
}

#[test]
fn test_malformed_document_fails() -> Result<()> {
    let helper = CliTestHelper::new();
    helper.write_document("broken.xml", "<dbsteward><schema name=\"app\">")?;
    helper
        .command()
        .args(["build", "broken.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.xml"));
    Ok(())
}

#[test]
fn test_rename_of_missing_table_fails() -> Result<()> {
    let helper = CliTestHelper::new();
    helper.write_document("v1.xml", INVENTORY)?;
    helper.write_document(
        "v2.xml",
        &INVENTORY.replace(
            r#"<table name="items" primaryKey="id">"#,
            r#"<table name="items" primaryKey="id" oldTableName="products">"#,
        ),
    )?;
    // items already exists on the old side, so the marker is treated as applied
    helper
        .command()
        .args(["diff", "v1.xml", "v2.xml"])
        .assert()
        .success();

    helper.write_document(
        "v3.xml",
        &INVENTORY.replace(
            r#"<table name="items" primaryKey="id">"#,
            r#"<table name="stock" primaryKey="id" oldTableName="products">"#,
        ),
    )?;
    helper
        .command()
        .args(["diff", "v1.xml", "v3.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("products"));
    Ok(())
}

#[test]
fn test_invalid_dialect_flag_is_rejected() -> Result<()> {
    let helper = CliTestHelper::new();
    helper.write_document("inventory.xml", INVENTORY)?;
    helper
        .command()
        .args(["build", "inventory.xml", "--dialect", "oracle"])
        .assert()
        .failure();
    Ok(())
}
