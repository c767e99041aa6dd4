//! Table operations

use super::OperationInfo;
use crate::catalog::constraint::Constraint;
use crate::catalog::id::{DbObjectId, QualifiedName};
use crate::catalog::table::{Column, Table};
use crate::catalog::triggers::Trigger;

#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum TableOperation {
    /// Columns only; keys, constraints and indexes are separate steps.
    Create { table: Table },
    Drop { schema: String, name: String },
    /// Rename and/or move to another schema.
    Rename {
        from: QualifiedName,
        to: QualifiedName,
    },
    Alter {
        schema: String,
        table: String,
        action: ColumnAction,
    },
    /// `value: None` resets the option; `previous` is the value being replaced.
    SetOption {
        schema: String,
        table: String,
        name: String,
        value: Option<String>,
        previous: Option<String>,
    },
    Rebuild(TableRebuild),
}

/// Recreate-and-copy of a table whose change cannot be made in place.
#[derive(Debug, Clone)]
pub struct TableRebuild {
    /// Target definition.
    pub table: Table,
    /// Columns copied from the existing table.
    pub copy_columns: Vec<String>,
    /// Constraints recreated on the rebuilt table, primary key first.
    pub constraints: Vec<Constraint>,
    /// Foreign keys on other tables that point at this one, as (table, constraint).
    pub referencing: Vec<(QualifiedName, Constraint)>,
    pub triggers: Vec<Trigger>,
    /// Explicit values must be allowed into identity columns while copying.
    pub identity_insert: bool,
}

/// Column-level actions within ALTER TABLE
#[derive(Debug, Clone)]
pub enum ColumnAction {
    /// Always added nullable; NOT NULL is applied by a later `SetNotNull`.
    Add { column: Column },
    Drop { name: String },
    Rename { from: String, to: String },
    /// `nullable` is the nullability in force while the type changes.
    AlterType { column: Column, nullable: bool },
    SetNotNull { column: Column },
    DropNotNull { column: Column },
    /// `replaces` is set when an existing default is being changed.
    SetDefault { column: Column, replaces: bool },
    DropDefault { column: Column },
    /// `UPDATE ... SET column = value WHERE column IS NULL`.
    Backfill { column: String, value: String },
    DropIdentity { column: Column },
    SetStatistics { column: String, value: i32 },
}

impl TableOperation {
    fn table_id(schema: &str, name: &str) -> DbObjectId {
        DbObjectId::Table {
            schema: schema.to_string(),
            name: name.to_string(),
        }
    }
}

impl OperationInfo for TableOperation {
    fn db_object_id(&self) -> Option<DbObjectId> {
        Some(match self {
            TableOperation::Create { table } => table.id(),
            TableOperation::Rebuild(rebuild) => rebuild.table.id(),
            TableOperation::Drop { schema, name } => Self::table_id(schema, name),
            TableOperation::Rename { to, .. } => Self::table_id(&to.schema, &to.name),
            TableOperation::SetOption { schema, table, .. } => Self::table_id(schema, table),
            TableOperation::Alter {
                schema,
                table,
                action,
            } => DbObjectId::Column {
                schema: schema.clone(),
                table: table.clone(),
                name: action.column_name().to_string(),
            },
        })
    }

    fn is_destructive(&self) -> bool {
        match self {
            TableOperation::Drop { .. } | TableOperation::Rebuild(_) => true,
            TableOperation::Alter { action, .. } => matches!(
                action,
                ColumnAction::Drop { .. } | ColumnAction::AlterType { .. }
            ),
            _ => false,
        }
    }
}

impl ColumnAction {
    pub fn column_name(&self) -> &str {
        match self {
            ColumnAction::Add { column }
            | ColumnAction::AlterType { column, .. }
            | ColumnAction::SetNotNull { column }
            | ColumnAction::DropNotNull { column }
            | ColumnAction::SetDefault { column, .. }
            | ColumnAction::DropDefault { column }
            | ColumnAction::DropIdentity { column } => &column.name,
            ColumnAction::Drop { name } => name,
            ColumnAction::Rename { to, .. } => to,
            ColumnAction::Backfill { column, .. } | ColumnAction::SetStatistics { column, .. } => {
                column
            }
        }
    }
}
