//! Diff columns of a table present on both sides.
//!
//! Additions land nullable in stage 1 and are tightened to NOT NULL in stage 3
//! once AFTER1 has backfilled them. Drops wait for stage 3 as well, so code
//! still reading a column keeps working through the first half of an upgrade.

use crate::catalog::constraint::Constraint;
use crate::catalog::table::{Column, Table};
use crate::diff::DiffContext;
use crate::diff::operations::{
    ColumnAction, ConstraintOperation, MigrationStep, TableOperation,
};
use crate::error::{DiffError, Result};
use crate::output::Stage;
use crate::render::Unsupported;
use tracing::debug;

/// A column on either side; both present means the same column, possibly renamed.
#[derive(Debug, Clone, Copy)]
pub struct ColumnPair<'t> {
    pub old: Option<&'t Column>,
    pub new: Option<&'t Column>,
}

impl ColumnPair<'_> {
    /// Identity property removed while the column survives.
    pub fn drops_identity(&self) -> bool {
        matches!((self.old, self.new), (Some(o), Some(n)) if o.is_identity() && !n.is_identity())
    }
}

/// Pair new columns with their old counterparts, honoring `oldColumnName`.
pub fn pair_columns<'t>(
    old: &'t Table,
    new: &'t Table,
    ignore_old_names: bool,
) -> Result<Vec<ColumnPair<'t>>> {
    let mut pairs = Vec::with_capacity(new.columns.len());
    let mut claimed: Vec<&str> = Vec::new();

    for column in &new.columns {
        if let Some(same) = old.find_column(&column.name) {
            claimed.push(&same.name);
            pairs.push(ColumnPair {
                old: Some(same),
                new: Some(column),
            });
            continue;
        }

        if !ignore_old_names && let Some(previous) = column.old_name.as_deref() {
            if new.has_column(previous) {
                return Err(DiffError::RenameConflict(format!(
                    "{}.{} is renamed from {}, which still exists",
                    new.qualified_name(),
                    column.name,
                    previous
                )));
            }
            let source = old.find_column(previous).ok_or_else(|| {
                DiffError::not_found(
                    "column",
                    format!("{}.{} (renamed to {})", old.qualified_name(), previous, column.name),
                )
            })?;
            claimed.push(&source.name);
            pairs.push(ColumnPair {
                old: Some(source),
                new: Some(column),
            });
            continue;
        }

        if let Some(other) = old.columns.iter().find(|c| {
            c.name.eq_ignore_ascii_case(&column.name) && !new.has_column(&c.name)
        }) {
            return Err(DiffError::AmbiguousRename {
                table: new.qualified_name().to_string(),
                old: other.name.clone(),
                new: column.name.clone(),
            });
        }

        pairs.push(ColumnPair {
            old: None,
            new: Some(column),
        });
    }

    pairs.extend(
        old.columns
            .iter()
            .filter(|c| !claimed.contains(&c.name.as_str()))
            .map(|c| ColumnPair {
                old: Some(c),
                new: None,
            }),
    );
    Ok(pairs)
}

/// Per-table column emission state.
struct ColumnDiff<'c, 'a> {
    ctx: &'c mut DiffContext<'a>,
    old_table: &'a Table,
    table: &'a Table,
    rebuilt: bool,
}

impl ColumnDiff<'_, '_> {
    fn alter(&mut self, stage: Stage, action: ColumnAction) {
        self.ctx.emit(
            stage,
            MigrationStep::Table(TableOperation::Alter {
                schema: self.table.schema.clone(),
                table: self.table.name.clone(),
                action,
            }),
        );
    }

    fn literal(&mut self, stage: Stage, sql: &Option<String>) {
        if let Some(sql) = sql {
            self.ctx.emit(stage, MigrationStep::Literal(sql.clone()));
        }
    }

    /// Drop `constraints` at `drop_stage` and restore them at `add_stage`.
    fn suspend_constraints(&mut self, constraints: Vec<Constraint>, drop_stage: Stage, add_stage: Stage) {
        for constraint in constraints {
            debug!(
                "Suspending {} on {} around a column change",
                constraint.name, self.table.name
            );
            self.ctx.emit(
                drop_stage,
                MigrationStep::Constraint(ConstraintOperation::Drop {
                    schema: self.table.schema.clone(),
                    table: self.table.name.clone(),
                    constraint: constraint.clone(),
                }),
            );
            self.ctx.emit(
                add_stage,
                MigrationStep::Constraint(ConstraintOperation::Add {
                    schema: self.table.schema.clone(),
                    table: self.table.name.clone(),
                    constraint,
                }),
            );
        }
    }

    fn backfill_value(&self, column: &Column) -> Option<String> {
        if column.is_identity() {
            return None;
        }
        column.default.clone().or_else(|| {
            self.ctx
                .options
                .add_missing_defaults
                .then(|| column.zero_value())
                .flatten()
        })
    }

    /// Backfill in AFTER1, tighten in stage 3.
    fn tighten(&mut self, column: &Column) {
        if let Some(value) = self.backfill_value(column) {
            self.alter(
                Stage::After1,
                ColumnAction::Backfill {
                    column: column.name.clone(),
                    value,
                },
            );
        }
        if self.rebuilt {
            return;
        }
        if self.ctx.dialect.alter_column_blocked_by_constraints() {
            let blocking: Vec<Constraint> = self
                .table
                .all_constraints(self.ctx.enum_checks())
                .into_iter()
                .filter(|c| c.references_column(&column.name))
                .collect();
            self.suspend_constraints(blocking, Stage::Before3, Stage::After3);
        }
        self.alter(
            Stage::Three,
            ColumnAction::SetNotNull {
                column: column.clone(),
            },
        );
    }

    fn add(&mut self, column: &Column) {
        self.literal(Stage::Before1, &column.hooks.before_add_stage1);
        self.alter(
            Stage::One,
            ColumnAction::Add {
                column: column.clone(),
            },
        );
        self.literal(Stage::After1, &column.hooks.after_add_stage1);
        if !column.nullable {
            self.tighten(column);
        }
        self.literal(Stage::Before3, &column.hooks.before_add_stage3);
        self.literal(Stage::After3, &column.hooks.after_add_stage3);
    }

    fn change(&mut self, old: &Column, new: &Column) {
        if old.name != new.name {
            self.alter(
                Stage::Before1,
                ColumnAction::Rename {
                    from: old.name.clone(),
                    to: new.name.clone(),
                },
            );
            self.ctx.comment(
                Stage::After3,
                format!(
                    "{}.{} was renamed to {}, so it is not dropped",
                    self.table.qualified_name(),
                    old.name,
                    new.name
                ),
            );
        }

        let identity_removed = old.is_identity() && !new.is_identity();
        if !old.is_identity() && new.is_identity() {
            self.ctx.emit(
                Stage::One,
                MigrationStep::Unsupported(Unsupported::new(format!(
                    "cannot add an identity property to existing column {}.{}",
                    self.table.qualified_name(),
                    new.name
                ))),
            );
        }

        let type_changed = old.normalized_type() != new.normalized_type()
            && !(identity_removed && old.identity_base_type() == new.normalized_type());
        if type_changed && !self.rebuilt {
            let wrap = self.ctx.dialect.alter_column_blocked_by_constraints();
            if wrap {
                let unchanged: Vec<Constraint> = unchanged_constraints(self.ctx, self.old_table, self.table)
                    .into_iter()
                    .filter(|c| c.references_column(&new.name))
                    .collect();
                self.suspend_constraints(unchanged, Stage::Before1, Stage::After1);
            }
            self.alter(
                Stage::One,
                ColumnAction::AlterType {
                    column: new.clone(),
                    nullable: old.nullable,
                },
            );
        }

        if old.default != new.default {
            match &new.default {
                Some(_) => self.alter(
                    Stage::One,
                    ColumnAction::SetDefault {
                        column: new.clone(),
                        replaces: old.default.is_some(),
                    },
                ),
                None => self.ctx.defer(
                    Stage::One,
                    MigrationStep::Table(TableOperation::Alter {
                        schema: self.table.schema.clone(),
                        table: self.table.name.clone(),
                        action: ColumnAction::DropDefault {
                            column: Column {
                                name: new.name.clone(),
                                ..old.clone()
                            },
                        },
                    }),
                ),
            }
        }

        if old.nullable && !new.nullable {
            self.tighten(new);
        } else if !old.nullable && new.nullable {
            self.alter(
                Stage::One,
                ColumnAction::DropNotNull {
                    column: new.clone(),
                },
            );
        }

        if let Some(value) = new.statistics
            && old.statistics != new.statistics
        {
            self.alter(
                Stage::One,
                ColumnAction::SetStatistics {
                    column: new.name.clone(),
                    value,
                },
            );
        }

        if identity_removed && !self.rebuilt {
            self.alter(
                Stage::Before3,
                ColumnAction::DropIdentity {
                    column: old.clone(),
                },
            );
        }
    }
}

/// Constraints with the same name and definition on both sides.
pub fn unchanged_constraints(ctx: &DiffContext, old: &Table, new: &Table) -> Vec<Constraint> {
    let enum_checks = ctx.enum_checks();
    let old_constraints = old.all_constraints(enum_checks);
    new.all_constraints(enum_checks)
        .into_iter()
        .filter(|n| {
            old_constraints
                .iter()
                .any(|o| o.name == n.name && o.same_definition(n))
        })
        .collect()
}

/// Emit column changes between `old` and `new`. A `rebuilt` table leaves its
/// stage 3 structure to the rebuild.
pub fn diff_columns<'a>(
    ctx: &mut DiffContext<'a>,
    old: &'a Table,
    new: &'a Table,
    rebuilt: bool,
) -> Result<()> {
    let pairs = pair_columns(old, new, ctx.options.ignore_old_names)?;
    let mut diff = ColumnDiff {
        ctx,
        old_table: old,
        table: new,
        rebuilt,
    };
    for pair in &pairs {
        match (pair.old, pair.new) {
            (None, Some(n)) => diff.add(n),
            (Some(o), Some(n)) => diff.change(o, n),
            (Some(o), None) if !rebuilt => diff.alter(
                Stage::Three,
                ColumnAction::Drop {
                    name: o.name.clone(),
                },
            ),
            _ => {}
        }
    }
    Ok(())
}
