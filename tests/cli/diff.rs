use crate::fixtures::INVENTORY;
use crate::helpers::cli::CliTestHelper;
use anyhow::Result;
use predicates::prelude::*;

fn upgraded() -> String {
    INVENTORY.replace(
        r#"<column name="sku" type="varchar(40)" null="false"/>"#,
        r#"<column name="sku" type="varchar(40)" null="false"/>
           <column name="note" type="text"/>"#,
    )
}

#[test]
fn test_diff_writes_four_staged_files() -> Result<()> {
    let helper = CliTestHelper::new();
    helper.write_document("v1.xml", INVENTORY)?;
    helper.write_document("v2.xml", &upgraded())?;

    helper
        .command()
        .args(["diff", "v1.xml", "v2.xml", "--no-header"])
        .assert()
        .success()
        .stdout(predicate::str::contains("diff"));

    assert_eq!(
        helper.read_output("v2_upgrade_stage1_schema1.sql")?,
        "BEGIN;\nALTER TABLE app.items ADD COLUMN note text;\nCOMMIT;\n"
    );
    for empty in [
        "v2_upgrade_stage2_data1.sql",
        "v2_upgrade_stage3_schema2.sql",
        "v2_upgrade_stage4_data2.sql",
    ] {
        assert_eq!(helper.read_output(empty)?, "", "{empty} should be empty");
    }
    Ok(())
}

#[test]
fn test_diff_single_stage() -> Result<()> {
    let helper = CliTestHelper::new();
    helper.write_document("v1.xml", INVENTORY)?;
    helper.write_document("v2.xml", &upgraded())?;

    helper
        .command()
        .args(["diff", "v1.xml", "v2.xml", "--single-stage", "--no-header"])
        .assert()
        .success();

    assert!(helper.output_exists("v2_upgrade_single_stage.sql"));
    assert!(!helper.output_exists("v2_upgrade_stage1_schema1.sql"));
    Ok(())
}

#[test]
fn test_diff_reports_destructive_statements() -> Result<()> {
    let helper = CliTestHelper::new();
    helper.write_document("v1.xml", &upgraded())?;
    helper.write_document("v2.xml", INVENTORY)?;

    helper
        .command()
        .args(["diff", "v1.xml", "v2.xml", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"destructive\": 1"));

    let stage3 = helper.read_output("v2_upgrade_stage3_schema2.sql")?;
    assert!(stage3.contains("ALTER TABLE app.items DROP COLUMN note;"));
    Ok(())
}

#[test]
fn test_identical_documents_report_no_changes() -> Result<()> {
    let helper = CliTestHelper::new();
    helper.write_document("v1.xml", INVENTORY)?;

    helper
        .command()
        .args(["diff", "v1.xml", "v1.xml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes"));
    Ok(())
}
