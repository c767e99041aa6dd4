//! Diff standalone sequences.

use crate::catalog::Database;
use crate::catalog::sequence::Sequence;
use crate::config::DiffOptions;
use crate::diff::operations::{MigrationStep, SequenceChanges, SequenceOperation};
use crate::diff::{DiffContext, diff_list};
use crate::output::Stage;

fn all_sequences(db: &Database) -> Vec<Sequence> {
    db.schemas
        .iter()
        .flat_map(|s| s.sequences.iter().cloned())
        .collect()
}

fn delta<T: PartialEq + Copy>(old: T, new: T) -> Option<T> {
    (old != new).then_some(new)
}

/// Only the attributes that differ; START WITH is skipped when configured.
pub fn sequence_changes(old: &Sequence, new: &Sequence, options: &DiffOptions) -> SequenceChanges {
    SequenceChanges {
        increment: delta(old.increment, new.increment),
        min_value: delta(old.min_value, new.min_value),
        max_value: delta(old.max_value, new.max_value),
        start_value: if options.ignore_sequence_start {
            None
        } else {
            delta(old.start_value, new.start_value)
        },
        cache: delta(old.cache, new.cache),
        cycle: delta(old.cycle, new.cycle),
    }
}

pub fn diff_sequences(ctx: &mut DiffContext) {
    let (old_sequences, new_sequences) = (all_sequences(ctx.old), all_sequences(ctx.new));

    if !ctx.dialect.has_native_sequences() && old_sequences.is_empty() && !new_sequences.is_empty() {
        ctx.emit(
            Stage::Before1,
            MigrationStep::Sequence(SequenceOperation::InstallSupport),
        );
    }

    for pair in diff_list(&old_sequences, &new_sequences, Sequence::qualified_name) {
        match pair {
            (None, Some(n)) => ctx.emit(
                Stage::Before1,
                MigrationStep::Sequence(SequenceOperation::Create { sequence: n.clone() }),
            ),
            (Some(o), None) => ctx.emit(
                Stage::After3,
                MigrationStep::Sequence(SequenceOperation::Drop {
                    schema: o.schema.clone(),
                    name: o.name.clone(),
                }),
            ),
            (Some(o), Some(n)) => {
                let changes = sequence_changes(o, n, ctx.options);
                if !changes.is_empty() {
                    ctx.emit(
                        Stage::One,
                        MigrationStep::Sequence(SequenceOperation::Alter {
                            schema: n.schema.clone(),
                            name: n.name.clone(),
                            changes,
                        }),
                    );
                }
            }
            (None, None) => {}
        }
    }
}
