//! Diff functions and procedures.
//!
//! Functions are identified by name plus argument types, so overloads pair up
//! independently. Redefinition uses CREATE OR REPLACE where the dialect has it
//! and the return type is unchanged; otherwise the old declaration is dropped
//! first. Drops run before the enum type pass so a function depending on a
//! redefined type never blocks the type's DROP.

use crate::catalog::Database;
use crate::catalog::function::Function;
use crate::catalog::id::{DbObjectId, QualifiedName};
use crate::catalog::table::normalize_type;
use crate::diff::custom_types::changed_types;
use crate::diff::operations::{FunctionOperation, MigrationStep};
use crate::diff::{DiffContext, diff_list};
use crate::output::Stage;
use std::collections::BTreeSet;
use tracing::debug;

fn all_functions(db: &Database) -> Vec<Function> {
    db.schemas
        .iter()
        .flat_map(|s| s.functions.iter().cloned())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Redefinition {
    Unchanged,
    Replace,
    DropAndCreate,
}

fn collapse_whitespace(body: &str) -> String {
    body.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn uses_changed_type(function: &Function, changed: &BTreeSet<QualifiedName>) -> bool {
    function.referenced_types().any(|t| {
        let t = t.trim();
        let name = match t.split_once('.') {
            Some((schema, name)) => QualifiedName::new(schema, name),
            None => QualifiedName::new(&function.schema, t),
        };
        changed.contains(&name)
    })
}

fn redefinition(
    ctx: &DiffContext,
    old: &Function,
    new: &Function,
    changed: &BTreeSet<QualifiedName>,
) -> Redefinition {
    if uses_changed_type(new, changed) {
        return Redefinition::DropAndCreate;
    }
    if normalize_type(&old.returns) != normalize_type(&new.returns)
        || old.procedure != new.procedure
    {
        return Redefinition::DropAndCreate;
    }

    let format = ctx.dialect.sql_format();
    let body_of = |f: &Function| f.definition_for(format).map(|d| d.body.clone());
    let bodies_differ = match (body_of(old), body_of(new)) {
        (Some(a), Some(b)) if ctx.options.ignore_function_whitespace => {
            collapse_whitespace(&a) != collapse_whitespace(&b)
        }
        (a, b) => a != b,
    };
    let declaration_differs = old.language_for(format) != new.language_for(format)
        || old.cache_policy != new.cache_policy
        || old.security_definer != new.security_definer
        || old.owner != new.owner
        || old
            .parameters
            .iter()
            .map(|p| (&p.name, p.direction))
            .ne(new.parameters.iter().map(|p| (&p.name, p.direction)));

    if !(new.force_redefine || bodies_differ || declaration_differs) {
        Redefinition::Unchanged
    } else if ctx.dialect.create_or_replace_functions() {
        Redefinition::Replace
    } else {
        Redefinition::DropAndCreate
    }
}

fn function_id(f: &Function) -> DbObjectId {
    f.id()
}

/// Drop removed functions and those whose redefinition cannot replace in place.
pub fn drop_functions(ctx: &mut DiffContext) {
    let (old_functions, new_functions) = (all_functions(ctx.old), all_functions(ctx.new));
    let changed = changed_types(ctx.old, ctx.new);
    for pair in diff_list(&old_functions, &new_functions, function_id) {
        match pair {
            (Some(o), None) => {
                // an overload of the same name must go before its replacement appears
                let name = o.qualified_name();
                let stage = if new_functions.iter().any(|n| n.qualified_name() == name) {
                    Stage::Before1
                } else {
                    Stage::After3
                };
                ctx.emit(
                    stage,
                    MigrationStep::Function(FunctionOperation::Drop { function: o.clone() }),
                );
            }
            (Some(o), Some(n)) if redefinition(ctx, o, n, &changed) == Redefinition::DropAndCreate => {
                ctx.recreated_functions.insert(o.id());
                ctx.emit(
                    Stage::Before1,
                    MigrationStep::Function(FunctionOperation::Drop { function: o.clone() }),
                );
            }
            _ => {}
        }
    }
}

/// Create new functions and redefine changed ones.
pub fn create_functions(ctx: &mut DiffContext) {
    let (old_functions, new_functions) = (all_functions(ctx.old), all_functions(ctx.new));
    let changed = changed_types(ctx.old, ctx.new);
    let format = ctx.dialect.sql_format();
    for pair in diff_list(&old_functions, &new_functions, function_id) {
        let (replace, function) = match pair {
            (None, Some(n)) => (false, n),
            (Some(o), Some(n)) => match redefinition(ctx, o, n, &changed) {
                Redefinition::Unchanged => continue,
                Redefinition::Replace => (true, n),
                Redefinition::DropAndCreate => (false, n),
            },
            _ => continue,
        };
        if function.definition_for(format).is_none() {
            debug!("{} has no {} definition; skipped", function.id(), format);
            continue;
        }
        ctx.emit(
            Stage::Before1,
            MigrationStep::Function(FunctionOperation::Create {
                function: function.clone(),
                replace,
            }),
        );
    }
}
