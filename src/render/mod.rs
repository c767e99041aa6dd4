//! SQL rendering.
//!
//! A [`Dialect`] turns [`MigrationStep`]s into SQL text. Each object kind has
//! its own rendering trait so a dialect can be read one concern at a time;
//! `Dialect` ties them together and dispatches steps to them.
//!
//! Changes a dialect cannot express come back as [`Unsupported`] rather than
//! as errors. The orchestrator decides whether to comment them out or fail.

use crate::catalog::constraint::{Constraint, ConstraintBody};
use crate::catalog::custom_type::EnumType;
use crate::catalog::function::Function;
use crate::catalog::grant::Privilege;
use crate::catalog::id::QualifiedName;
use crate::catalog::index::Index;
use crate::catalog::sequence::Sequence;
use crate::catalog::table::{Column, Table};
use crate::catalog::triggers::Trigger;
use crate::catalog::view::View;
use crate::config::{DialectKind, Quoting};
use crate::constants::{REBUILD_TABLE_SUFFIX, RESERVED_WORDS};
use crate::diff::operations::*;
use crate::output::TransactionMarkers;
use itertools::Itertools;
use std::fmt;
use tracing::warn;

pub mod mssql;
pub mod postgres;

pub use mssql::SqlServer;
pub use postgres::Postgres;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    Safe,
    Destructive,
}

#[derive(Debug, Clone)]
pub struct RenderedSql {
    pub safety: Safety,
    pub sql: String,
}

impl RenderedSql {
    pub fn new(sql: String) -> Self {
        Self {
            sql,
            safety: Safety::Safe,
        }
    }

    pub fn destructive(sql: String) -> Self {
        Self {
            sql,
            safety: Safety::Destructive,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.safety == Safety::Destructive
    }

    /// False for comments and batch separators.
    pub fn is_statement(&self) -> bool {
        let text = self.sql.trim();
        !(text.is_empty() || text.starts_with("--") || text.eq_ignore_ascii_case("GO"))
    }
}

/// A change the dialect has no way to express.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsupported {
    pub reason: String,
}

impl Unsupported {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

pub type RenderResult = Result<Vec<RenderedSql>, Unsupported>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentKind {
    Schema,
    Table,
    Column,
    /// Indexes, constraints, sequences, types, functions, triggers, views.
    Object,
}

/// Identifier quoting according to the configured policy.
#[derive(Debug, Clone)]
pub struct Quoter {
    policy: Quoting,
    open: char,
    close: char,
}

impl Quoter {
    pub fn new(policy: Quoting, open: char, close: char) -> Self {
        Self {
            policy,
            open,
            close,
        }
    }

    pub fn ident(&self, kind: IdentKind, name: &str) -> String {
        if self.needs_quotes(kind, name) {
            let close = self.close.to_string();
            format!(
                "{}{}{}",
                self.open,
                name.replace(self.close, &format!("{close}{close}")),
                self.close
            )
        } else {
            name.to_string()
        }
    }

    pub fn schema(&self, name: &str) -> String {
        self.ident(IdentKind::Schema, name)
    }

    pub fn table(&self, schema: &str, name: &str) -> String {
        format!("{}.{}", self.schema(schema), self.ident(IdentKind::Table, name))
    }

    pub fn column(&self, name: &str) -> String {
        self.ident(IdentKind::Column, name)
    }

    pub fn object(&self, name: &str) -> String {
        self.ident(IdentKind::Object, name)
    }

    pub fn qualified_object(&self, schema: &str, name: &str) -> String {
        format!("{}.{}", self.schema(schema), self.object(name))
    }

    pub fn columns<'a>(&self, names: impl IntoIterator<Item = &'a String>) -> String {
        names.into_iter().map(|c| self.column(c)).join(", ")
    }

    fn needs_quotes(&self, kind: IdentKind, name: &str) -> bool {
        let by_kind = match kind {
            IdentKind::Schema => self.policy.schema_names,
            IdentKind::Table => self.policy.table_names,
            IdentKind::Column => self.policy.column_names,
            IdentKind::Object => self.policy.object_names,
        };
        self.policy.all_names
            || by_kind
            || (self.policy.illegal_identifiers && !is_plain_identifier(name))
            || (self.policy.reserved_words && RESERVED_WORDS.contains(&name.to_lowercase().as_str()))
    }
}

/// Lowercase identifier that never needs quoting to keep its spelling.
fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

pub fn escape_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

pub fn render_value(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Quoted(s) => escape_string(s),
        SqlValue::Raw(s) => s.clone(),
    }
}

/// `a = 1 AND b IS NULL`
pub fn render_key(quoter: &Quoter, key: &[(String, SqlValue)]) -> String {
    key.iter()
        .map(|(column, value)| match value {
            SqlValue::Null => format!("{} IS NULL", quoter.column(column)),
            v => format!("{} = {}", quoter.column(column), render_value(v)),
        })
        .join(" AND ")
}

/// Constraint definition following `CONSTRAINT name`.
pub fn render_constraint_body(quoter: &Quoter, constraint: &Constraint) -> String {
    let mut sql = match &constraint.body {
        ConstraintBody::Columns(columns) => {
            format!("{} ({})", constraint.kind.keyword(), quoter.columns(columns))
        }
        ConstraintBody::ForeignKey {
            columns,
            target_columns,
        } => {
            let target = constraint
                .references
                .as_ref()
                .map(|t| quoter.table(&t.schema, &t.name))
                .unwrap_or_default();
            format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                quoter.columns(columns),
                target,
                quoter.columns(target_columns)
            )
        }
        ConstraintBody::EnumCheck { column, values } => format!(
            "CHECK ({} IN ({}))",
            quoter.column(column),
            values.iter().map(|v| escape_string(v)).join(", ")
        ),
        ConstraintBody::Raw(definition) => {
            format!("{} {}", constraint.kind.keyword(), definition.trim())
        }
    };
    let upper = sql.to_uppercase();
    if let Some(action) = constraint.on_delete
        && !upper.contains("ON DELETE")
    {
        sql.push_str(&format!(" ON DELETE {action}"));
    }
    if let Some(action) = constraint.on_update
        && !upper.contains("ON UPDATE")
    {
        sql.push_str(&format!(" ON UPDATE {action}"));
    }
    sql
}

/// Statement text without a trailing semicolon.
pub fn strip_terminator(sql: &str) -> &str {
    sql.trim().trim_end_matches(';').trim_end()
}

pub fn privilege_list(privileges: &[Privilege]) -> String {
    privileges.iter().map(Privilege::keyword).join(", ")
}

/// Capability queries the differs consult before choosing a strategy.
pub trait Capabilities {
    fn has_enum_types(&self) -> bool;
    fn has_native_sequences(&self) -> bool;
    fn create_or_replace_functions(&self) -> bool;
    fn expression_indexes(&self) -> bool;
    fn unique_allows_multiple_nulls(&self) -> bool;
    /// Altering a column fails while a constraint references it.
    fn alter_column_blocked_by_constraints(&self) -> bool;
    fn drops_identity_in_place(&self) -> bool;
    fn alterable_table_option(&self, name: &str) -> bool;
    fn supports_inheritance(&self) -> bool;
    fn supports_before_triggers(&self) -> bool;
    fn combined_trigger_events(&self) -> bool;
    fn needs_identity_insert(&self) -> bool;
}

pub trait SchemaSql {
    fn create_schema(&self, name: &str) -> RenderResult;
    fn drop_schema(&self, name: &str) -> RenderResult;
    fn set_config_parameter(&self, name: &str, value: &str) -> RenderResult;
}

pub trait TableSql {
    /// CREATE TABLE for `table`, physically named `physical_name`.
    fn create_table_as(&self, table: &Table, physical_name: &str) -> RenderResult;
    fn drop_table(&self, schema: &str, name: &str) -> RenderResult;
    fn rename_table(&self, from: &QualifiedName, to: &QualifiedName) -> RenderResult;
    fn alter_column(&self, schema: &str, table: &str, action: &ColumnAction) -> RenderResult;
    fn set_table_option(
        &self,
        schema: &str,
        table: &str,
        name: &str,
        value: Option<&str>,
        previous: Option<&str>,
    ) -> RenderResult;

    fn create_table(&self, table: &Table) -> RenderResult {
        self.create_table_as(table, &table.name)
    }
}

pub trait ConstraintSql {
    fn add_constraint(&self, schema: &str, table: &str, constraint: &Constraint) -> RenderResult;
    fn drop_constraint(&self, schema: &str, table: &str, constraint: &Constraint) -> RenderResult;
}

pub trait IndexSql {
    fn create_index(
        &self,
        schema: &str,
        table: &str,
        index: &Index,
        nullable_columns: &[String],
    ) -> RenderResult;
    fn drop_index(&self, schema: &str, table: &str, index: &Index) -> RenderResult;
    fn cluster_table(&self, schema: &str, table: &str, index: &str) -> RenderResult;
}

pub trait SequenceSql {
    fn create_sequence(&self, sequence: &Sequence) -> RenderResult;
    fn alter_sequence(&self, schema: &str, name: &str, changes: &SequenceChanges) -> RenderResult;
    fn drop_sequence(&self, schema: &str, name: &str) -> RenderResult;
    fn install_sequence_support(&self) -> RenderResult;
}

pub trait TypeSql {
    fn create_type(&self, enum_type: &EnumType) -> RenderResult;
    fn drop_type(&self, name: &QualifiedName) -> RenderResult;
    fn relax_column(
        &self,
        schema: &str,
        table: &str,
        column: &str,
        has_default: bool,
    ) -> RenderResult;
    fn restore_column(
        &self,
        schema: &str,
        table: &str,
        column: &Column,
        type_name: &QualifiedName,
    ) -> RenderResult;
}

pub trait FunctionSql {
    fn create_function(&self, function: &Function, replace: bool) -> RenderResult;
    fn drop_function(&self, function: &Function) -> RenderResult;
}

pub trait TriggerSql {
    fn create_trigger(&self, trigger: &Trigger) -> RenderResult;
    fn drop_trigger(&self, trigger: &Trigger) -> RenderResult;
}

pub trait ViewSql {
    fn create_view(&self, view: &View) -> RenderResult;
    fn drop_view(&self, view: &View) -> RenderResult;
}

pub trait GrantSql {
    fn grant(
        &self,
        target: &GrantTarget,
        roles: &[String],
        privileges: &[Privilege],
        with_grant_option: bool,
    ) -> RenderResult;
    fn revoke(&self, target: &GrantTarget, roles: &[String], privileges: &[Privilege])
    -> RenderResult;
    fn set_owner(&self, target: &GrantTarget, owner: &str) -> RenderResult;
}

pub trait DataSql {
    fn insert(
        &self,
        schema: &str,
        table: &str,
        columns: &[String],
        values: &[SqlValue],
    ) -> RenderResult;
    fn update(
        &self,
        schema: &str,
        table: &str,
        set: &[(String, SqlValue)],
        key: &[(String, SqlValue)],
    ) -> RenderResult;
    fn delete(&self, schema: &str, table: &str, key: &[(String, SqlValue)]) -> RenderResult;
    fn identity_insert(&self, schema: &str, table: &str, enable: bool) -> RenderResult;
}

pub trait Dialect:
    Capabilities
    + SchemaSql
    + TableSql
    + ConstraintSql
    + IndexSql
    + SequenceSql
    + TypeSql
    + FunctionSql
    + TriggerSql
    + ViewSql
    + GrantSql
    + DataSql
{
    fn name(&self) -> &'static str;

    /// The `sqlFormat` tag this dialect selects in documents.
    fn sql_format(&self) -> &'static str;

    fn quoter(&self) -> &Quoter;

    fn transaction_markers(&self) -> TransactionMarkers;

    fn comment(&self, text: &str) -> RenderedSql {
        RenderedSql::new(text.lines().map(|l| format!("-- {l}")).join("\n"))
    }

    fn render(&self, step: &MigrationStep) -> RenderResult {
        match step {
            MigrationStep::Schema(op) => match op {
                SchemaOperation::Create { name } => self.create_schema(name),
                SchemaOperation::Drop { name } => self.drop_schema(name),
                SchemaOperation::SetParameter { name, value } => {
                    self.set_config_parameter(name, value)
                }
            },
            MigrationStep::Table(op) => match op {
                TableOperation::Create { table } => self.create_table(table),
                TableOperation::Drop { schema, name } => self.drop_table(schema, name),
                TableOperation::Rename { from, to } => self.rename_table(from, to),
                TableOperation::Alter {
                    schema,
                    table,
                    action,
                } => self.alter_column(schema, table, action),
                TableOperation::SetOption {
                    schema,
                    table,
                    name,
                    value,
                    previous,
                } => self.set_table_option(
                    schema,
                    table,
                    name,
                    value.as_deref(),
                    previous.as_deref(),
                ),
                TableOperation::Rebuild(rebuild) => self.rebuild_table(rebuild),
            },
            MigrationStep::Constraint(op) => match op {
                ConstraintOperation::Add {
                    schema,
                    table,
                    constraint,
                } => self.add_constraint(schema, table, constraint),
                ConstraintOperation::Drop {
                    schema,
                    table,
                    constraint,
                } => self.drop_constraint(schema, table, constraint),
            },
            MigrationStep::Index(op) => match op {
                IndexOperation::Create {
                    schema,
                    table,
                    index,
                    nullable_columns,
                } => self.create_index(schema, table, index, nullable_columns),
                IndexOperation::Drop {
                    schema,
                    table,
                    index,
                } => self.drop_index(schema, table, index),
                IndexOperation::Cluster {
                    schema,
                    table,
                    index,
                } => self.cluster_table(schema, table, index),
            },
            MigrationStep::Sequence(op) => match op {
                SequenceOperation::Create { sequence } => self.create_sequence(sequence),
                SequenceOperation::Alter {
                    schema,
                    name,
                    changes,
                } => self.alter_sequence(schema, name, changes),
                SequenceOperation::Drop { schema, name } => self.drop_sequence(schema, name),
                SequenceOperation::InstallSupport => self.install_sequence_support(),
            },
            MigrationStep::Type(op) => match op {
                TypeOperation::Create { enum_type } => self.create_type(enum_type),
                TypeOperation::Drop { name } => self.drop_type(name),
                TypeOperation::RelaxColumn {
                    schema,
                    table,
                    column,
                    has_default,
                } => self.relax_column(schema, table, column, *has_default),
                TypeOperation::RestoreColumn {
                    schema,
                    table,
                    column,
                    type_name,
                } => self.restore_column(schema, table, column, type_name),
            },
            MigrationStep::Function(op) => match op {
                FunctionOperation::Create { function, replace } => {
                    self.create_function(function, *replace)
                }
                FunctionOperation::Drop { function } => self.drop_function(function),
            },
            MigrationStep::Trigger(op) => match op {
                TriggerOperation::Create { trigger } => self.create_trigger(trigger),
                TriggerOperation::Drop { trigger } => self.drop_trigger(trigger),
            },
            MigrationStep::View(op) => match op {
                ViewOperation::Create { view } => self.create_view(view),
                ViewOperation::Drop { view } => self.drop_view(view),
            },
            MigrationStep::Grant(op) => match op {
                GrantOperation::Grant {
                    target,
                    roles,
                    privileges,
                    with_grant_option,
                } => self.grant(target, roles, privileges, *with_grant_option),
                GrantOperation::Revoke {
                    target,
                    roles,
                    privileges,
                } => self.revoke(target, roles, privileges),
                GrantOperation::SetOwner { target, owner } => self.set_owner(target, owner),
            },
            MigrationStep::Data(op) => match op {
                DataOperation::Insert {
                    schema,
                    table,
                    columns,
                    values,
                } => self.insert(schema, table, columns, values),
                DataOperation::Update {
                    schema,
                    table,
                    set,
                    key,
                } => self.update(schema, table, set, key),
                DataOperation::Delete { schema, table, key } => self.delete(schema, table, key),
                DataOperation::IdentityInsert {
                    schema,
                    table,
                    enable,
                } => self.identity_insert(schema, table, *enable),
            },
            MigrationStep::Comment(text) => Ok(vec![self.comment(text)]),
            MigrationStep::Literal(sql) => Ok(vec![RenderedSql::new(sql.clone())]),
            MigrationStep::Unsupported(unsupported) => Err(unsupported.clone()),
        }
    }

    /// Recreate-and-copy: build a shadow table, copy rows, swap it in, then
    /// restore defaults, constraints, indexes, triggers and inbound foreign keys.
    fn rebuild_table(&self, rebuild: &TableRebuild) -> RenderResult {
        let table = &rebuild.table;
        let shadow_name = format!("{}{}", table.name, REBUILD_TABLE_SUFFIX);
        let q = self.quoter();

        // defaults are named objects on some dialects; add them after the swap
        let mut shadow = table.clone();
        for column in &mut shadow.columns {
            column.default = None;
        }

        let mut out = Vec::new();
        for (referrer, fk) in &rebuild.referencing {
            out.extend(self.drop_constraint(&referrer.schema, &referrer.name, fk)?);
        }
        out.extend(self.create_table_as(&shadow, &shadow_name)?);
        if rebuild.identity_insert {
            out.extend(self.identity_insert(&table.schema, &shadow_name, true)?);
        }
        out.push(RenderedSql::new(format!(
            "INSERT INTO {} ({}) SELECT {} FROM {};",
            q.table(&table.schema, &shadow_name),
            q.columns(&rebuild.copy_columns),
            q.columns(&rebuild.copy_columns),
            q.table(&table.schema, &table.name)
        )));
        if rebuild.identity_insert {
            out.extend(self.identity_insert(&table.schema, &shadow_name, false)?);
        }
        out.extend(self.drop_table(&table.schema, &table.name)?);
        out.extend(self.rename_table(
            &QualifiedName::new(&table.schema, &shadow_name),
            &table.qualified_name(),
        )?);

        for column in table.columns.iter().filter(|c| c.default.is_some()) {
            out.extend(self.alter_column(
                &table.schema,
                &table.name,
                &ColumnAction::SetDefault {
                    column: column.clone(),
                    replaces: false,
                },
            )?);
        }
        for constraint in &rebuild.constraints {
            out.extend(self.add_constraint(&table.schema, &table.name, constraint)?);
        }
        for index in &table.indexes {
            let nullable = table.nullable_index_columns(index);
            out.extend(or_comment(
                self,
                self.create_index(&table.schema, &table.name, index, &nullable),
            ));
        }
        for trigger in &rebuild.triggers {
            out.extend(or_comment(self, self.create_trigger(trigger)));
        }
        for (referrer, fk) in &rebuild.referencing {
            out.extend(self.add_constraint(&referrer.schema, &referrer.name, fk)?);
        }
        Ok(out)
    }
}

/// Inside a composite rendering, an unsupported piece becomes a comment.
fn or_comment<D: Dialect + ?Sized>(dialect: &D, result: RenderResult) -> Vec<RenderedSql> {
    match result {
        Ok(sql) => sql,
        Err(unsupported) => {
            warn!("{}: {}", dialect.name(), unsupported.reason);
            vec![dialect.comment(&unsupported.reason)]
        }
    }
}

pub fn dialect_for(kind: DialectKind, quoting: &Quoting) -> Box<dyn Dialect> {
    match kind {
        DialectKind::Pgsql => Box::new(Postgres::new(quoting.clone())),
        DialectKind::Mssql => Box::new(SqlServer::new(quoting.clone())),
    }
}
