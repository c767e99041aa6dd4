//! Migration Orchestrator.
//!
//! Differs compare an old and a new [`Database`] and push staged
//! [`MigrationStep`]s into a [`DiffContext`]. The orchestrator runs them in a
//! fixed sequence; emission order only matters inside a stage, because the
//! [`StageRouter`] sorts by stage when the plan is rendered.

pub mod columns;
pub mod constraints;
pub mod custom_types;
pub mod data;
pub mod functions;
pub mod grants;
pub mod indexes;
pub mod operations;
pub mod order;
pub mod rename;
pub mod schemas;
pub mod sequences;
pub mod tables;
pub mod triggers;
pub mod views;

use crate::catalog::Database;
use crate::catalog::id::{DbObjectId, QualifiedName};
use crate::catalog::table::Table;
use crate::config::{Config, DiffOptions};
use crate::error::{DiffError, Result};
use crate::output::{Stage, StageRouter};
use crate::render::{Dialect, dialect_for};
use operations::MigrationStep;
use order::OrderEntry;
use rename::RenameIndex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use tracing::{debug, info, warn};

/// A step and the stage it runs in.
#[derive(Debug, Clone)]
pub struct PlannedStep {
    pub stage: Stage,
    pub step: MigrationStep,
}

/// Old/new pair of one table, either side possibly absent.
#[derive(Debug, Clone, Copy)]
pub struct TablePair<'a> {
    pub old: Option<&'a Table>,
    pub new: Option<&'a Table>,
}

/// Everything one diff pass reads, plus the plan it writes.
pub struct DiffContext<'a> {
    pub old: &'a Database,
    pub new: &'a Database,
    pub options: &'a DiffOptions,
    pub dialect: &'a dyn Dialect,
    pub renames: RenameIndex,
    new_order: Vec<OrderEntry>,
    old_order: Vec<OrderEntry>,
    /// Tables recreated by a BEFORE3 rebuild; later passes leave their
    /// indexes and triggers to the rebuild.
    pub(crate) rebuilt_tables: BTreeSet<QualifiedName>,
    /// Views dropped and recreated in this pass.
    pub(crate) recreated_views: BTreeSet<QualifiedName>,
    /// Functions dropped and created again rather than replaced.
    pub(crate) recreated_functions: BTreeSet<DbObjectId>,
    /// Unchanged foreign keys dropped in BEFORE1 because the key they
    /// reference is replaced, by (old table, constraint name).
    pub(crate) detached_foreign_keys: BTreeSet<(QualifiedName, String)>,
    deferred: Vec<PlannedStep>,
    steps: Vec<PlannedStep>,
}

impl<'a> DiffContext<'a> {
    pub fn new(
        old: &'a Database,
        new: &'a Database,
        options: &'a DiffOptions,
        dialect: &'a dyn Dialect,
    ) -> Result<Self> {
        let renames = RenameIndex::build(old, new, options.ignore_old_names)?;
        let (new_order, old_order) = if options.use_dependency_order {
            (order::dependency_order(new), order::dependency_order(old))
        } else {
            (order::document_order(new), order::document_order(old))
        };
        Ok(Self {
            old,
            new,
            options,
            dialect,
            renames,
            new_order,
            old_order,
            rebuilt_tables: BTreeSet::new(),
            recreated_views: BTreeSet::new(),
            recreated_functions: BTreeSet::new(),
            detached_foreign_keys: BTreeSet::new(),
            deferred: Vec::new(),
            steps: Vec::new(),
        })
    }

    pub fn emit(&mut self, stage: Stage, step: MigrationStep) {
        debug!("[{}] {}", stage, step.describe());
        self.steps.push(PlannedStep { stage, step });
    }

    pub fn comment(&mut self, stage: Stage, text: impl Into<String>) {
        self.emit(stage, MigrationStep::Comment(text.into()));
    }

    /// Hold a step back until [`DiffContext::flush_deferred`].
    pub fn defer(&mut self, stage: Stage, step: MigrationStep) {
        self.deferred.push(PlannedStep { stage, step });
    }

    pub fn flush_deferred(&mut self) {
        let deferred = std::mem::take(&mut self.deferred);
        for planned in deferred {
            self.emit(planned.stage, planned.step);
        }
    }

    pub fn steps(&self) -> &[PlannedStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<PlannedStep> {
        self.steps
    }

    /// Old counterpart of a new-side table: its rename source, or the same name.
    pub fn old_table_for(&self, new: &Table) -> Option<&'a Table> {
        let old: &'a Database = self.old;
        match self.renames.old_name_of(&new.qualified_name()) {
            Some(previous) => old.find_table_by_name(previous),
            None => old.find_table(&new.schema, &new.name),
        }
    }

    /// Whether an old-side table survives, under its own or a new name.
    pub fn old_table_survives(&self, old_table: &Table) -> bool {
        let name = old_table.qualified_name();
        self.renames.new_name_of(&name).is_some()
            || (self.new.find_table_by_name(&name).is_some() && !self.renames.is_renamed(&name))
    }

    /// Every table pair: new tables in dependency order, then dropped old
    /// tables in reverse dependency order.
    pub fn table_pairs(&self) -> Vec<TablePair<'a>> {
        let new: &'a Database = self.new;
        let old: &'a Database = self.old;
        let mut pairs: Vec<TablePair<'a>> = self
            .new_order
            .iter()
            .filter(|e| !e.is_schema_marker())
            .filter_map(|e| new.find_table(&e.schema, &e.table))
            .map(|t| TablePair {
                old: self.old_table_for(t),
                new: Some(t),
            })
            .collect();
        pairs.extend(
            self.old_order
                .iter()
                .rev()
                .filter(|e| !e.is_schema_marker())
                .filter_map(|e| old.find_table(&e.schema, &e.table))
                .filter(|t| !self.old_table_survives(t))
                .map(|t| TablePair {
                    old: Some(t),
                    new: None,
                }),
        );
        pairs
    }

    /// Schema names in new-document order, as given by the order's schema markers.
    pub fn new_schema_names(&self) -> Vec<&str> {
        self.new_order
            .iter()
            .filter(|e| e.is_schema_marker())
            .map(|e| e.schema.as_str())
            .collect()
    }

    pub fn new_order(&self) -> &[OrderEntry] {
        &self.new_order
    }

    /// Tables the dialect needs CHECK constraints for, in place of enum types.
    pub fn enum_checks(&self) -> bool {
        !self.dialect.has_enum_types()
    }
}

/// Pair items of two lists by identity: new items in document order, then
/// old-only items in theirs.
pub fn diff_list<'t, T, I: Eq + Hash>(
    old: &'t [T],
    new: &'t [T],
    id_of: impl Fn(&T) -> I,
) -> Vec<(Option<&'t T>, Option<&'t T>)> {
    let old_map: HashMap<I, &T> = old.iter().map(|o| (id_of(o), o)).collect();
    let mut seen = HashSet::with_capacity(new.len());
    let mut out: Vec<(Option<&T>, Option<&T>)> = new
        .iter()
        .map(|n| {
            let id = id_of(n);
            let o = old_map.get(&id).copied();
            seen.insert(id);
            (o, Some(n))
        })
        .collect();
    out.extend(
        old.iter()
            .filter(|o| !seen.contains(&id_of(o)))
            .map(|o| (Some(o), None)),
    );
    out
}

/// Compute every staged step that turns `old` into `new`.
pub fn plan_migration(
    old: &Database,
    new: &Database,
    options: &DiffOptions,
    dialect: &dyn Dialect,
) -> Result<Vec<PlannedStep>> {
    info!("Diffing schema documents for {}", dialect.name());
    let mut ctx = DiffContext::new(old, new, options, dialect)?;

    // drops that must precede every structural change
    views::drop_views(&mut ctx)?;
    triggers::drop_triggers(&mut ctx);
    constraints::drop_constraints(&mut ctx);
    indexes::drop_indexes(&mut ctx);

    schemas::diff_schemas(&mut ctx);
    functions::drop_functions(&mut ctx);
    custom_types::diff_types(&mut ctx);
    functions::create_functions(&mut ctx);
    sequences::diff_sequences(&mut ctx);

    tables::diff_tables(&mut ctx)?;
    ctx.flush_deferred();

    indexes::create_indexes(&mut ctx);
    constraints::add_constraints(&mut ctx);
    triggers::create_triggers(&mut ctx);
    tables::drop_tables(&mut ctx);
    views::create_views(&mut ctx)?;

    grants::diff_grants(&mut ctx)?;
    schemas::diff_config_parameters(&mut ctx);
    schemas::drop_schemas(&mut ctx);

    data::diff_data(&mut ctx);
    schemas::diff_literal_sql(&mut ctx);

    info!("Planned {} steps", ctx.steps().len());
    Ok(ctx.into_steps())
}

/// Render a plan into staged SQL. Unsupported changes become comments, or
/// errors when `strict` is set.
pub fn render_plan(
    steps: &[PlannedStep],
    dialect: &dyn Dialect,
    strict: bool,
) -> Result<StageRouter> {
    let mut router = StageRouter::new();
    for planned in steps {
        match dialect.render(&planned.step) {
            Ok(sql) => router.extend(planned.stage, sql),
            Err(unsupported) if strict => {
                return Err(DiffError::Unsupported {
                    dialect: dialect.name(),
                    reason: unsupported.reason,
                });
            }
            Err(unsupported) => {
                warn!("{}: {}", dialect.name(), unsupported.reason);
                router.push(planned.stage, dialect.comment(&unsupported.reason));
            }
        }
    }
    Ok(router)
}

/// Full upgrade from `old` to `new` as staged SQL.
pub fn diff_databases(old: &Database, new: &Database, config: &Config) -> Result<StageRouter> {
    let dialect = dialect_for(config.dialect, &config.quoting);
    let steps = plan_migration(old, new, &config.diff, dialect.as_ref())?;
    render_plan(&steps, dialect.as_ref(), config.diff.strict_dialect)
}

/// Creation script for `new`: a diff from the empty database.
pub fn build_database(new: &Database, config: &Config) -> Result<StageRouter> {
    info!("Building full definition");
    let options = DiffOptions {
        ignore_old_names: true,
        ..config.diff.clone()
    };
    let dialect = dialect_for(config.dialect, &config.quoting);
    let empty = Database::empty();
    let steps = plan_migration(&empty, new, &options, dialect.as_ref())?;
    render_plan(&steps, dialect.as_ref(), options.strict_dialect)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    const DOC: &str = r#"<dbsteward>
        <database><role><owner>deployer</owner><application>app_user</application></role></database>
        <schema name="app">
            <table name="customers" primaryKey="id">
                <column name="id" type="serial" null="false"/>
                <column name="name" type="text"/>
                <grant role="ROLE_APPLICATION" operation="SELECT"/>
            </table>
            <table name="orders" primaryKey="id">
                <column name="id" type="integer" null="false"/>
                <column name="customer_id" foreignTable="customers" foreignColumn="id"/>
            </table>
        </schema>
    </dbsteward>"#;

    #[test]
    fn test_identical_documents_produce_nothing() {
        let config = Config::default();
        assert!(plan(DOC, DOC, &config).is_empty());
    }

    #[test]
    fn test_diff_list_keeps_document_order() {
        let old = vec![("b", 1), ("a", 1)];
        let new = vec![("c", 1), ("a", 2)];
        let pairs = diff_list(&old, &new, |(name, _)| *name);
        let names: Vec<_> = pairs
            .iter()
            .map(|(o, n)| (o.map(|x| x.0), n.map(|x| x.0)))
            .collect();
        assert_eq!(
            names,
            vec![(None, Some("c")), (Some("a"), Some("a")), (Some("b"), None)]
        );
    }

    #[test]
    fn test_build_only_creates() {
        let config = Config::default();
        let router = build_database(&load(DOC), &config).unwrap();
        let sql = router.render_single_stage(None);
        assert!(sql.contains("CREATE SCHEMA IF NOT EXISTS app;"));
        assert!(sql.contains("CREATE TABLE app.customers"));
        assert!(!sql.contains("DROP "));
        // referenced table is created first
        let customers = sql.find("CREATE TABLE app.customers").unwrap();
        let orders = sql.find("CREATE TABLE app.orders").unwrap();
        assert!(customers < orders);
    }

    #[test]
    fn test_strict_dialect_escalates_unsupported() {
        let doc = r#"<dbsteward><schema name="app">
            <table name="t" primaryKey="id">
                <column name="id" type="integer"/>
                <index name="t_gin" using="gin"><indexDimension>id</indexDimension></index>
            </table>
        </schema></dbsteward>"#;
        let mut config = Config {
            dialect: crate::config::DialectKind::Mssql,
            ..Config::default()
        };
        assert!(build_database(&load(doc), &config).is_ok());
        config.diff.strict_dialect = true;
        assert!(matches!(
            build_database(&load(doc), &config).unwrap_err(),
            DiffError::Unsupported { .. }
        ));
    }
}
