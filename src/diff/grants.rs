//! Diff ownership and privileges.
//!
//! Each securable object's grants are resolved to a set of (role, privilege)
//! entries on both sides and the difference becomes REVOKE and GRANT
//! statements. Objects created or recreated in this diff start from an empty
//! set. Privileges land in AFTER1, except on views, which only exist again
//! after AFTER3 recreates them.

use crate::catalog::Database;
use crate::catalog::function::Function;
use crate::catalog::grant::{Grant, GrantEntry, RoleSet, effective_grants};
use crate::catalog::id::DbObjectId;
use crate::diff::operations::{GrantOperation, GrantTarget, MigrationStep};
use crate::diff::DiffContext;
use crate::error::Result;
use crate::output::Stage;
use std::collections::{BTreeMap, BTreeSet};

/// Owner and grants of one object on one side.
struct Securable<'g> {
    owner: Option<&'g str>,
    grants: &'g [Grant],
}

impl<'g> Securable<'g> {
    fn new(owner: &'g Option<String>, grants: &'g [Grant]) -> Self {
        Self {
            owner: owner.as_deref(),
            grants,
        }
    }

    fn resolve(&self, roles: &RoleSet) -> Result<(Option<String>, BTreeSet<GrantEntry>)> {
        let owner = self.owner.map(|o| roles.resolve(o)).transpose()?;
        Ok((owner, effective_grants(self.grants, roles)?))
    }
}

fn diff_securable(
    ctx: &mut DiffContext,
    stage: Stage,
    target: GrantTarget,
    new: Securable,
    old: Option<Securable>,
) -> Result<()> {
    let (new_owner, new_grants) = new.resolve(&ctx.new.roles)?;
    let (old_owner, old_grants) = match old {
        Some(old) => old.resolve(&ctx.old.roles)?,
        None => (None, BTreeSet::new()),
    };

    if let Some(owner) = new_owner
        && old_owner.as_ref() != Some(&owner)
    {
        ctx.emit(
            stage,
            MigrationStep::Grant(GrantOperation::SetOwner {
                target: target.clone(),
                owner,
            }),
        );
    }

    let mut revokes: BTreeMap<String, Vec<_>> = BTreeMap::new();
    for entry in old_grants.difference(&new_grants) {
        revokes.entry(entry.role.clone()).or_default().push(entry.privilege);
    }
    for (role, privileges) in revokes {
        ctx.emit(
            stage,
            MigrationStep::Grant(GrantOperation::Revoke {
                target: target.clone(),
                roles: vec![role],
                privileges,
            }),
        );
    }

    let mut grants: BTreeMap<(String, bool), Vec<_>> = BTreeMap::new();
    for entry in new_grants.difference(&old_grants) {
        grants
            .entry((entry.role.clone(), entry.with_grant_option))
            .or_default()
            .push(entry.privilege);
    }
    for ((role, with_grant_option), privileges) in grants {
        ctx.emit(
            stage,
            MigrationStep::Grant(GrantOperation::Grant {
                target: target.clone(),
                roles: vec![role],
                privileges,
                with_grant_option,
            }),
        );
    }
    Ok(())
}

fn find_function<'d>(db: &'d Database, id: &DbObjectId) -> Option<&'d Function> {
    db.schemas
        .iter()
        .flat_map(|s| s.functions.iter())
        .find(|f| &f.id() == id)
}

pub fn diff_grants(ctx: &mut DiffContext) -> Result<()> {
    let (old_db, new_db): (&Database, &Database) = (ctx.old, ctx.new);

    for schema in &new_db.schemas {
        let old = old_db
            .find_schema(&schema.name)
            .map(|s| Securable::new(&s.owner, &s.grants));
        diff_securable(
            ctx,
            Stage::After1,
            GrantTarget::Schema {
                name: schema.name.clone(),
            },
            Securable::new(&schema.owner, &schema.grants),
            old,
        )?;
    }

    for pair in ctx.table_pairs() {
        let Some(table) = pair.new else {
            continue;
        };
        let old = pair
            .old
            .filter(|_| !ctx.rebuilt_tables.contains(&table.qualified_name()))
            .map(|t| Securable::new(&t.owner, &t.grants));
        let serial_columns = table
            .columns
            .iter()
            .filter(|c| c.normalized_type().ends_with("serial"))
            .map(|c| c.name.clone())
            .collect();
        diff_securable(
            ctx,
            Stage::After1,
            GrantTarget::Table {
                schema: table.schema.clone(),
                name: table.name.clone(),
                serial_columns,
            },
            Securable::new(&table.owner, &table.grants),
            old,
        )?;
    }

    for sequence in new_db.schemas.iter().flat_map(|s| s.sequences.iter()) {
        let old = old_db
            .find_sequence(&sequence.schema, &sequence.name)
            .map(|s| Securable::new(&s.owner, &s.grants));
        diff_securable(
            ctx,
            Stage::After1,
            GrantTarget::Sequence {
                schema: sequence.schema.clone(),
                name: sequence.name.clone(),
            },
            Securable::new(&sequence.owner, &sequence.grants),
            old,
        )?;
    }

    for function in new_db.schemas.iter().flat_map(|s| s.functions.iter()) {
        let id = function.id();
        let old = find_function(old_db, &id)
            .filter(|_| !ctx.recreated_functions.contains(&id))
            .map(|f| Securable::new(&f.owner, &f.grants));
        diff_securable(
            ctx,
            Stage::After1,
            GrantTarget::Function {
                schema: function.schema.clone(),
                name: function.name.clone(),
                arguments: function.argument_types(),
                procedure: function.procedure,
            },
            Securable::new(&function.owner, &function.grants),
            old,
        )?;
    }

    for view in new_db.views() {
        let name = view.qualified_name();
        let old = old_db
            .find_view(&name)
            .filter(|_| !ctx.recreated_views.contains(&name))
            .map(|v| Securable::new(&v.owner, &v.grants));
        diff_securable(
            ctx,
            Stage::After3,
            GrantTarget::View {
                schema: view.schema.clone(),
                name: view.name.clone(),
            },
            Securable::new(&view.owner, &view.grants),
            old,
        )?;
    }
    Ok(())
}
