//! Diff table constraints: primary keys, inline and declared foreign keys,
//! unique and check constraints, and the CHECKs that stand in for enum types.
//!
//! Constraints pair by name and compare structurally. Drops happen in BEFORE1
//! (foreign keys first, primary keys last), adds in AFTER1 in the opposite
//! order, so no key is ever missing while something still references it.

use crate::catalog::constraint::{Constraint, ConstraintKind};
use crate::catalog::id::QualifiedName;
use crate::catalog::table::Table;
use crate::diff::operations::{ConstraintOperation, MigrationStep};
use crate::diff::DiffContext;
use crate::output::Stage;
use std::collections::BTreeSet;
use tracing::debug;

/// Drop pass position: foreign keys, then the rest, then primary keys.
fn drop_rank(constraint: &Constraint) -> u8 {
    match constraint.kind {
        ConstraintKind::ForeignKey => 0,
        ConstraintKind::PrimaryKey => 2,
        _ => 1,
    }
}

/// Add pass position: the reverse of [`drop_rank`].
fn add_rank(constraint: &Constraint) -> u8 {
    2 - drop_rank(constraint)
}

/// Constraints of `from` with no same-named, same-definition counterpart in `against`.
fn missing_from(from: &[Constraint], against: &[Constraint]) -> Vec<Constraint> {
    from.iter()
        .filter(|c| {
            !against
                .iter()
                .any(|o| o.name == c.name && o.same_definition(c))
        })
        .cloned()
        .collect()
}

fn emit_ranked(
    ctx: &mut DiffContext,
    stage: Stage,
    mut found: Vec<(u8, &Table, Constraint)>,
    add: bool,
) {
    // stable: tables keep their order inside each rank
    found.sort_by_key(|(rank, _, _)| *rank);
    for (_, table, constraint) in found {
        let (schema, table) = (table.schema.clone(), table.name.clone());
        let op = if add {
            ConstraintOperation::Add {
                schema,
                table,
                constraint,
            }
        } else {
            ConstraintOperation::Drop {
                schema,
                table,
                constraint,
            }
        };
        ctx.emit(stage, MigrationStep::Constraint(op));
    }
}

/// Drop changed and removed constraints of surviving tables. A renamed
/// table loses every constraint under its old name; they return under the new one.
///
/// A primary or unique key can't be dropped while a foreign key still
/// references its table, so those foreign keys are detached here too and
/// added back in AFTER1.
pub fn drop_constraints(ctx: &mut DiffContext) {
    let enum_checks = ctx.enum_checks();
    let pairs = ctx.table_pairs();
    let mut found = Vec::new();
    for pair in &pairs {
        let (Some(old), Some(new)) = (pair.old, pair.new) else {
            continue;
        };
        let old_constraints = old.all_constraints(enum_checks);
        let dropped = if old.qualified_name() != new.qualified_name() {
            old_constraints
        } else {
            missing_from(&old_constraints, &new.all_constraints(enum_checks))
        };
        found.extend(dropped.into_iter().map(|c| (drop_rank(&c), old, c)));
    }

    let rekeyed: BTreeSet<QualifiedName> = found
        .iter()
        .filter(|(_, _, c)| matches!(c.kind, ConstraintKind::PrimaryKey | ConstraintKind::Unique))
        .map(|(_, table, _)| table.qualified_name())
        .collect();
    if !rekeyed.is_empty() {
        let mut detached = Vec::new();
        for old in pairs.iter().filter_map(|p| p.old) {
            for constraint in old.all_constraints(enum_checks) {
                let references_rekeyed = constraint.kind == ConstraintKind::ForeignKey
                    && constraint.references.as_ref().is_some_and(|r| rekeyed.contains(r));
                let already_dropped = found
                    .iter()
                    .any(|(_, t, c)| t.qualified_name() == old.qualified_name() && c.name == constraint.name);
                if references_rekeyed && !already_dropped {
                    debug!("Detaching {} from {}", constraint.name, old.qualified_name());
                    ctx.detached_foreign_keys
                        .insert((old.qualified_name(), constraint.name.clone()));
                    detached.push((drop_rank(&constraint), old, constraint));
                }
            }
        }
        found.extend(detached);
    }
    emit_ranked(ctx, Stage::Before1, found, false);
}

/// Add new and changed constraints, and foreign keys detached by
/// [`drop_constraints`]. Rebuilt tables get theirs from the rebuild.
pub fn add_constraints(ctx: &mut DiffContext) {
    let enum_checks = ctx.enum_checks();
    let mut found = Vec::new();
    for pair in ctx.table_pairs() {
        let Some(new) = pair.new else {
            continue;
        };
        if ctx.rebuilt_tables.contains(&new.qualified_name()) {
            continue;
        }
        let new_constraints = new.all_constraints(enum_checks);
        let added = match pair.old {
            Some(old) if old.qualified_name() == new.qualified_name() => {
                let old_constraints = old.all_constraints(enum_checks);
                new_constraints
                    .into_iter()
                    .filter(|c| {
                        let unchanged = old_constraints
                            .iter()
                            .any(|o| o.name == c.name && o.same_definition(c));
                        !unchanged
                            || ctx
                                .detached_foreign_keys
                                .contains(&(old.qualified_name(), c.name.clone()))
                    })
                    .collect()
            }
            _ => new_constraints,
        };
        found.extend(added.into_iter().map(|c| (add_rank(&c), new, c)));
    }
    emit_ranked(ctx, Stage::After1, found, true);
}
