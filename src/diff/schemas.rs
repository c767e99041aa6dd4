//! Diff schemas: CREATE any new, DROP any missing. Database-level settings
//! and literal SQL blocks ride along here since they are not owned by any
//! schema object.

use crate::diff::DiffContext;
use crate::diff::operations::{MigrationStep, SchemaOperation};
use crate::output::Stage;

/// Schemas every database already has.
const BUILTIN_SCHEMAS: &[&str] = &["public", "dbo"];

fn is_builtin(name: &str) -> bool {
    BUILTIN_SCHEMAS.contains(&name)
}

pub fn diff_schemas(ctx: &mut DiffContext) {
    let created: Vec<String> = ctx
        .new_schema_names()
        .into_iter()
        .filter(|name| !is_builtin(name) && ctx.old.find_schema(name).is_none())
        .map(str::to_string)
        .collect();
    for name in created {
        ctx.emit(
            Stage::Before1,
            MigrationStep::Schema(SchemaOperation::Create { name }),
        );
    }
}

/// Schemas gone from the new document are dropped once everything in them is.
pub fn drop_schemas(ctx: &mut DiffContext) {
    let dropped: Vec<String> = ctx
        .old
        .schemas
        .iter()
        .filter(|s| !is_builtin(&s.name) && ctx.new.find_schema(&s.name).is_none())
        .map(|s| s.name.clone())
        .collect();
    for name in dropped {
        ctx.emit(
            Stage::After3,
            MigrationStep::Schema(SchemaOperation::Drop { name }),
        );
    }
}

/// New or changed `configurationParameter`s. Removed ones are left alone.
pub fn diff_config_parameters(ctx: &mut DiffContext) {
    let changed: Vec<_> = ctx
        .new
        .config_parameters
        .iter()
        .filter(|p| {
            !ctx.old
                .config_parameters
                .iter()
                .any(|o| o.name == p.name && o.value == p.value)
        })
        .cloned()
        .collect();
    for parameter in changed {
        ctx.emit(
            Stage::After1,
            MigrationStep::Schema(SchemaOperation::SetParameter {
                name: parameter.name,
                value: parameter.value,
            }),
        );
    }
}

/// Literal SQL blocks the old document did not already carry at the same stage.
pub fn diff_literal_sql(ctx: &mut DiffContext) {
    let added: Vec<_> = ctx
        .new
        .literal_sql
        .iter()
        .filter(|block| {
            !ctx.old
                .literal_sql_for(block.stage)
                .any(|o| o.sql.trim() == block.sql.trim())
        })
        .cloned()
        .collect();
    for block in added {
        ctx.emit(block.stage, MigrationStep::Literal(block.sql));
    }
}
