//! Diff views.
//!
//! Views are dropped in BEFORE1, dependents before what they select from, and
//! created in AFTER3 once every table change has landed. A view is recreated
//! when its definition changes, when a view it depends on is recreated, or when
//! its query names a table that is renamed, dropped or reshaped in this diff.

use crate::catalog::constraint::contains_word;
use crate::catalog::id::QualifiedName;
use crate::catalog::view::View;
use crate::diff::custom_types::changed_types;
use crate::diff::operations::{MigrationStep, ViewOperation};
use crate::diff::order::view_order;
use crate::diff::tables::structure_changed;
use crate::diff::DiffContext;
use crate::error::Result;
use crate::output::Stage;
use std::collections::BTreeSet;
use tracing::debug;

/// Old-side names of tables whose shape a view could have captured.
fn touched_tables(ctx: &DiffContext) -> BTreeSet<String> {
    let mut touched: BTreeSet<String> = ctx
        .table_pairs()
        .into_iter()
        .filter_map(|pair| match (pair.old, pair.new) {
            (Some(old), None) => Some(old.name.clone()),
            (Some(old), Some(new)) if structure_changed(old, new) => Some(old.name.clone()),
            _ => None,
        })
        .collect();
    for type_name in changed_types(ctx.old, ctx.new) {
        touched.extend(
            ctx.old
                .columns_of_type(&type_name)
                .into_iter()
                .map(|(table, _)| table.name.clone()),
        );
    }
    touched
}

fn definition_changed(ctx: &DiffContext, old: &View, new: &View) -> bool {
    let format = ctx.dialect.sql_format();
    let query = |v: &View| v.query_for(format).map(str::trim).map(str::to_string);
    query(old) != query(new) || old.depends_on != new.depends_on
}

pub fn drop_views(ctx: &mut DiffContext) -> Result<()> {
    let format = ctx.dialect.sql_format();
    let touched = touched_tables(ctx);
    let old_views = view_order(ctx.old)?;

    let mut dropped: BTreeSet<QualifiedName> = BTreeSet::new();
    let mut drops = Vec::new();
    for view in old_views {
        let name = view.qualified_name();
        let replacement = ctx.new.find_view(&name);
        let reason = match replacement {
            None => Some("removed"),
            Some(_) if ctx.options.always_recreate_views => Some("always recreated"),
            Some(new) if definition_changed(ctx, view, new) => Some("definition changed"),
            Some(_) if view.depends_on.iter().any(|d| dropped.contains(d)) => {
                Some("depends on a recreated view")
            }
            Some(_)
                if view
                    .query_for(format)
                    .is_some_and(|q| touched.iter().any(|t| contains_word(q, t))) =>
            {
                Some("selects from a changed table")
            }
            Some(_) => None,
        };
        let Some(reason) = reason else {
            continue;
        };
        debug!("Dropping view {}: {}", name, reason);
        if replacement.is_some() {
            ctx.recreated_views.insert(name.clone());
        }
        dropped.insert(name);
        drops.push(view.clone());
    }

    for view in drops.into_iter().rev() {
        ctx.emit(Stage::Before1, MigrationStep::View(ViewOperation::Drop { view }));
    }
    Ok(())
}

/// Create new views and those dropped for recreation, dependencies first.
pub fn create_views(ctx: &mut DiffContext) -> Result<()> {
    let new: Vec<View> = view_order(ctx.new)?
        .into_iter()
        .filter(|v| {
            let name = v.qualified_name();
            ctx.old.find_view(&name).is_none() || ctx.recreated_views.contains(&name)
        })
        .cloned()
        .collect();
    for view in new {
        ctx.emit(Stage::After3, MigrationStep::View(ViewOperation::Create { view }));
    }
    Ok(())
}
