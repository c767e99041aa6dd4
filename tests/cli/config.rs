use crate::helpers::cli::CliTestHelper;
use anyhow::Result;
use predicates::prelude::*;

#[test]
fn test_config_get_defaults() -> Result<()> {
    let helper = CliTestHelper::new();
    helper
        .command()
        .args(["config", "get", "dialect"])
        .assert()
        .success()
        .stdout("pgsql\n");
    helper
        .command()
        .args(["config", "get", "output.transactional"])
        .assert()
        .success()
        .stdout("true\n");
    Ok(())
}

#[test]
fn test_config_file_values_are_resolved() -> Result<()> {
    let helper = CliTestHelper::new();
    helper.write_config("dialect: mssql10\nquoting:\n  all_names: true\n")?;

    helper
        .command()
        .args(["config", "get", "dialect"])
        .assert()
        .success()
        .stdout("mssql\n");

    helper
        .command()
        .args(["config", "list", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"all_names\": true"));
    Ok(())
}

#[test]
fn test_config_validate() -> Result<()> {
    let helper = CliTestHelper::new();
    helper
        .command()
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    helper.write_config("output:\n  single_stage: true\n")?;
    helper
        .command()
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));
    Ok(())
}

#[test]
fn test_dialect_environment_variable() -> Result<()> {
    let helper = CliTestHelper::new();
    helper
        .command()
        .env("DIFF_DIALECT", "mssql")
        .args(["config", "get", "dialect"])
        .assert()
        .success()
        .stdout("mssql\n");
    Ok(())
}
