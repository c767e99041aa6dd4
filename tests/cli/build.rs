use crate::fixtures::{INVENTORY, SHOP};
use crate::helpers::cli::CliTestHelper;
use anyhow::Result;
use predicates::prelude::*;

#[test]
fn test_build_writes_one_transactional_file() -> Result<()> {
    let helper = CliTestHelper::new();
    helper.write_document("shop.xml", SHOP)?;

    helper
        .command()
        .args(["build", "shop.xml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("pgsql"))
        .stdout(predicate::str::contains("shop_build.sql"));

    let sql = helper.read_output("shop_build.sql")?;
    assert!(sql.starts_with("-- shop_build.sql generated by dbdiff"));
    assert!(sql.contains("BEGIN;\n"));
    assert!(sql.contains("CREATE SCHEMA IF NOT EXISTS shop;"));
    assert!(sql.contains("CREATE TYPE shop.order_status AS ENUM ('new', 'paid', 'shipped');"));
    assert!(sql.trim_end().ends_with("COMMIT;"));
    Ok(())
}

#[test]
fn test_build_options_from_flags() -> Result<()> {
    let helper = CliTestHelper::new();
    helper.write_document("inventory.xml", INVENTORY)?;

    helper
        .command()
        .args([
            "build",
            "inventory.xml",
            "--dialect",
            "mssql",
            "--output-dir",
            "out",
            "--output-prefix",
            "release",
            "--no-transaction",
            "--no-header",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("mssql"));

    let sql = helper.read_output("out/release_build.sql")?;
    assert!(sql.starts_with("IF SCHEMA_ID('app') IS NULL"));
    assert!(!sql.contains("BEGIN TRANSACTION;"));
    Ok(())
}

#[test]
fn test_build_json_summary() -> Result<()> {
    let helper = CliTestHelper::new();
    helper.write_document("inventory.xml", INVENTORY)?;

    let output = helper
        .command()
        .args(["build", "inventory.xml", "--format", "json"])
        .output()?;
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(summary["command"], "build");
    assert_eq!(summary["dialect"], "pgsql");
    assert_eq!(summary["destructive"], 0);
    assert_eq!(summary["streams"].as_array().map(Vec::len), Some(4));
    assert_eq!(summary["files"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[test]
fn test_dialect_from_config_file() -> Result<()> {
    let helper = CliTestHelper::new();
    helper.write_document("inventory.xml", INVENTORY)?;
    helper.write_config("dialect: mssql\noutput:\n  header: false\n")?;

    helper
        .command()
        .args(["build", "inventory.xml"])
        .assert()
        .success();

    let sql = helper.read_output("inventory_build.sql")?;
    assert!(sql.starts_with("BEGIN TRANSACTION;"));
    Ok(())
}
