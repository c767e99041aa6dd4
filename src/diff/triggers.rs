//! Diff triggers.
//!
//! Triggers are matched by schema, table and name. Old triggers are keyed by
//! the name their table has in the new document, so a table rename alone does
//! not recreate them.

use crate::catalog::id::QualifiedName;
use crate::catalog::triggers::Trigger;
use crate::catalog::Database;
use crate::diff::operations::{MigrationStep, TriggerOperation};
use crate::diff::DiffContext;
use crate::output::Stage;
use std::collections::BTreeMap;

type TriggerKey = (QualifiedName, String);

fn triggers_of(ctx: &DiffContext, db: &Database) -> Vec<Trigger> {
    let format = ctx.dialect.sql_format();
    let split = !ctx.dialect.combined_trigger_events();
    db.schemas
        .iter()
        .flat_map(|s| s.triggers.iter())
        .filter(|t| t.applies_to(format))
        .flat_map(|t| {
            if split {
                t.split_by_event()
            } else {
                vec![t.clone()]
            }
        })
        .collect()
}

fn new_triggers(ctx: &DiffContext) -> BTreeMap<TriggerKey, Trigger> {
    triggers_of(ctx, ctx.new)
        .into_iter()
        .map(|t| ((QualifiedName::new(&t.schema, &t.table), t.name.clone()), t))
        .collect()
}

/// Old triggers keyed by their table's new-side name.
fn old_triggers(ctx: &DiffContext) -> BTreeMap<TriggerKey, Trigger> {
    triggers_of(ctx, ctx.old)
        .into_iter()
        .map(|t| {
            let table = QualifiedName::new(&t.schema, &t.table);
            let table = ctx.renames.new_name_of(&table).cloned().unwrap_or(table);
            ((table, t.name.clone()), t)
        })
        .collect()
}

/// Same trigger apart from where its table lives.
fn same_trigger(old: &Trigger, new: &Trigger) -> bool {
    old.timing == new.timing
        && old.events == new.events
        && old.level == new.level
        && old.function.trim() == new.function.trim()
}

pub fn drop_triggers(ctx: &mut DiffContext) {
    let (old, new) = (old_triggers(ctx), new_triggers(ctx));
    for (key, trigger) in old {
        if new.get(&key).is_some_and(|n| same_trigger(&trigger, n)) {
            continue;
        }
        // a dropped table takes its triggers with it
        let table = QualifiedName::new(&trigger.schema, &trigger.table);
        if !ctx
            .old
            .find_table_by_name(&table)
            .is_some_and(|t| ctx.old_table_survives(t))
        {
            continue;
        }
        ctx.emit(
            Stage::Before1,
            MigrationStep::Trigger(TriggerOperation::Drop { trigger }),
        );
    }
}

/// Create new and changed triggers. Rebuilt tables recreate their own.
pub fn create_triggers(ctx: &mut DiffContext) {
    let (old, new) = (old_triggers(ctx), new_triggers(ctx));
    for ((table, _), trigger) in &new {
        if ctx.rebuilt_tables.contains(table) {
            continue;
        }
        if old
            .get(&(table.clone(), trigger.name.clone()))
            .is_some_and(|o| same_trigger(o, trigger))
        {
            continue;
        }
        ctx.emit(
            Stage::After1,
            MigrationStep::Trigger(TriggerOperation::Create {
                trigger: trigger.clone(),
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DialectKind};
    use crate::diff::test_support::*;

    fn create_test_document(table: &str, old_name: &str, event: &str) -> String {
        format!(
            r#"<dbsteward><schema name="app">
                <function name="touch" returns="trigger">
                    <functionDefinition language="plpgsql">BEGIN RETURN NEW; END</functionDefinition>
                </function>
                <table name="{table}" primaryKey="id" {old_name}>
                    <column name="id" type="integer" null="false"/>
                </table>
                <trigger name="touch_trg" table="{table}" when="BEFORE" event="{event}" function="app.touch"/>
            </schema></dbsteward>"#
        )
    }

    fn trigger_steps(old: &str, new: &str, config: &Config) -> Vec<(Stage, String)> {
        plan(old, new, config)
            .into_iter()
            .filter_map(|p| match p.step {
                MigrationStep::Trigger(TriggerOperation::Create { trigger }) => {
                    Some((p.stage, format!("create {}", trigger.name)))
                }
                MigrationStep::Trigger(TriggerOperation::Drop { trigger }) => {
                    Some((p.stage, format!("drop {}", trigger.name)))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_event_change_recreates() {
        let old = create_test_document("items", "", "INSERT");
        let new = create_test_document("items", "", "INSERT, UPDATE");
        assert_eq!(
            trigger_steps(&old, &new, &Config::default()),
            vec![
                (Stage::Before1, "drop touch_trg".to_string()),
                (Stage::After1, "create touch_trg".to_string()),
            ]
        );
    }

    #[test]
    fn test_table_rename_keeps_trigger() {
        let old = create_test_document("items", "", "INSERT");
        let new = create_test_document("products", r#"oldTableName="items""#, "INSERT");
        assert!(trigger_steps(&old, &new, &Config::default()).is_empty());
    }

    #[test]
    fn test_dropped_table_takes_triggers() {
        let old = create_test_document("items", "", "INSERT");
        let new = r#"<dbsteward><schema name="app">
            <function name="touch" returns="trigger">
                <functionDefinition language="plpgsql">BEGIN RETURN NEW; END</functionDefinition>
            </function>
        </schema></dbsteward>"#;
        assert!(trigger_steps(&old, new, &Config::default()).is_empty());
    }

    #[test]
    fn test_mssql_keeps_combined_events() {
        let config = Config {
            dialect: DialectKind::Mssql,
            ..Config::default()
        };
        let empty = r#"<dbsteward><schema name="app"/></dbsteward>"#;
        let doc = create_test_document("items", "", "INSERT, UPDATE");
        assert_eq!(
            trigger_steps(empty, &doc, &config),
            vec![(Stage::After1, "create touch_trg".to_string())]
        );
    }
}
