//! Diff tables: create, rename, alter and drop.
//!
//! Renames run first so every later statement can address a table by its new
//! name. A table whose change the dialect cannot express in place (identity
//! removal, an unalterable option) is rebuilt in BEFORE3 from its new
//! definition.

use crate::catalog::constraint::ConstraintKind;
use crate::catalog::id::QualifiedName;
use crate::catalog::table::Table;
use crate::diff::columns::{self, pair_columns};
use crate::diff::operations::{ConstraintOperation, MigrationStep, TableOperation, TableRebuild};
use crate::diff::DiffContext;
use crate::error::Result;
use crate::output::Stage;
use crate::render::Unsupported;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Whether the shape of a table (its name or column set) differs between sides.
pub fn structure_changed(old: &Table, new: &Table) -> bool {
    old.qualified_name() != new.qualified_name()
        || old.columns.len() != new.columns.len()
        || old.columns.iter().zip(&new.columns).any(|(o, n)| {
            o.name != n.name || o.normalized_type() != n.normalized_type() || o.nullable != n.nullable
        })
}

fn create_table(ctx: &mut DiffContext, table: &Table) {
    if table.inherits.is_some() && !ctx.dialect.supports_inheritance() {
        ctx.emit(
            Stage::One,
            MigrationStep::Unsupported(Unsupported::new(format!(
                "{} inherits from another table; created without inheritance",
                table.qualified_name()
            ))),
        );
    }
    ctx.emit(
        Stage::One,
        MigrationStep::Table(TableOperation::Create {
            table: table.clone(),
        }),
    );
}

/// Option changes: alterable ones as SET statements, or `None` when any
/// change needs the table rebuilt.
fn option_changes(ctx: &DiffContext, old: &Table, new: &Table) -> Option<Vec<MigrationStep>> {
    let format = ctx.dialect.sql_format();
    let (old_options, new_options) = (old.options_for(format), new.options_for(format));
    let names: BTreeSet<&String> = old_options.keys().chain(new_options.keys()).collect();

    let mut steps = Vec::new();
    for name in names {
        let (previous, value) = (old_options.get(name), new_options.get(name));
        if previous == value {
            continue;
        }
        if !ctx.dialect.alterable_table_option(name) {
            debug!("Option {} of {} cannot be altered in place", name, new.name);
            return None;
        }
        steps.push(MigrationStep::Table(TableOperation::SetOption {
            schema: new.schema.clone(),
            table: new.name.clone(),
            name: name.clone(),
            value: value.cloned(),
            previous: previous.cloned(),
        }));
    }
    Some(steps)
}

fn rebuild(ctx: &DiffContext, table: &Table) -> TableRebuild {
    let enum_checks = ctx.enum_checks();
    let target = table.qualified_name();
    let referencing = ctx
        .new
        .tables()
        .filter(|(_, t)| t.qualified_name() != target)
        .flat_map(|(_, t)| {
            t.all_constraints(enum_checks)
                .into_iter()
                .filter(|c| c.kind == ConstraintKind::ForeignKey && c.references.as_ref() == Some(&target))
                .map(|c| (t.qualified_name(), c))
                .collect::<Vec<_>>()
        })
        .collect();
    let format = ctx.dialect.sql_format();
    let triggers = ctx
        .new
        .find_schema(&table.schema)
        .map(|s| {
            s.triggers_for(&table.name)
                .filter(|t| t.applies_to(format))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    TableRebuild {
        table: table.clone(),
        copy_columns: table.columns.iter().map(|c| c.name.clone()).collect(),
        constraints: table.all_constraints(enum_checks),
        referencing,
        triggers,
        identity_insert: ctx.dialect.needs_identity_insert() && table.identity_columns().next().is_some(),
    }
}

fn alter_table<'a>(ctx: &mut DiffContext<'a>, old: &'a Table, new: &'a Table) -> Result<()> {
    let pairs = pair_columns(old, new, ctx.options.ignore_old_names)?;
    let identity_rebuild =
        !ctx.dialect.drops_identity_in_place() && pairs.iter().any(|p| p.drops_identity());
    let options = option_changes(ctx, old, new);
    let rebuilt = identity_rebuild || options.is_none();

    if rebuilt {
        info!("Rebuilding {}", new.qualified_name());
        ctx.rebuilt_tables.insert(new.qualified_name());
    }
    columns::diff_columns(ctx, old, new, rebuilt)?;
    for step in options.unwrap_or_default() {
        ctx.emit(Stage::One, step);
    }
    if rebuilt {
        let rebuild = rebuild(ctx, new);
        ctx.emit(Stage::Before3, MigrationStep::Table(TableOperation::Rebuild(rebuild)));
    }
    Ok(())
}

/// Renames, creates and alters, in dependency order.
pub fn diff_tables(ctx: &mut DiffContext) -> Result<()> {
    let renames: Vec<(QualifiedName, QualifiedName)> = ctx
        .renames
        .renames()
        .map(|(from, to)| (from.clone(), to.clone()))
        .collect();
    for (from, to) in renames {
        ctx.comment(
            Stage::After3,
            format!("{from} was renamed to {to}, so it is not dropped"),
        );
        ctx.emit(
            Stage::Before1,
            MigrationStep::Table(TableOperation::Rename { from, to }),
        );
    }

    for pair in ctx.table_pairs() {
        match (pair.old, pair.new) {
            (None, Some(new)) => create_table(ctx, new),
            (Some(old), Some(new)) => alter_table(ctx, old, new)?,
            _ => {}
        }
    }
    Ok(())
}

/// Drop tables missing from the new document, referrers first. Their foreign
/// keys go before any table so drop order never trips over a reference.
pub fn drop_tables(ctx: &mut DiffContext) {
    let dropped: Vec<&Table> = ctx
        .table_pairs()
        .into_iter()
        .filter_map(|p| match (p.old, p.new) {
            (Some(old), None) => Some(old),
            _ => None,
        })
        .collect();

    for table in &dropped {
        for constraint in table
            .all_constraints(false)
            .into_iter()
            .filter(|c| c.kind == ConstraintKind::ForeignKey)
            .filter(|c| {
                !ctx.detached_foreign_keys
                    .contains(&(table.qualified_name(), c.name.clone()))
            })
            .collect::<Vec<_>>()
        {
            ctx.emit(
                Stage::Three,
                MigrationStep::Constraint(ConstraintOperation::Drop {
                    schema: table.schema.clone(),
                    table: table.name.clone(),
                    constraint,
                }),
            );
        }
    }
    for table in dropped {
        ctx.emit(
            Stage::Three,
            MigrationStep::Table(TableOperation::Drop {
                schema: table.schema.clone(),
                name: table.name.clone(),
            }),
        );
    }
}
