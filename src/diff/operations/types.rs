//! Enum type operations

use super::OperationInfo;
use crate::catalog::custom_type::EnumType;
use crate::catalog::id::{DbObjectId, QualifiedName};
use crate::catalog::table::Column;

#[derive(Debug, Clone)]
pub enum TypeOperation {
    Create { enum_type: EnumType },
    Drop { name: QualifiedName },
    /// Move a column off an enum type onto the placeholder type so the type can be dropped.
    RelaxColumn {
        schema: String,
        table: String,
        column: String,
        has_default: bool,
    },
    /// Put a relaxed column back onto the (recreated) enum type.
    RestoreColumn {
        schema: String,
        table: String,
        column: Column,
        type_name: QualifiedName,
    },
}

impl OperationInfo for TypeOperation {
    fn db_object_id(&self) -> Option<DbObjectId> {
        Some(match self {
            TypeOperation::Create { enum_type } => enum_type.id(),
            TypeOperation::Drop { name } => DbObjectId::Type {
                schema: name.schema.clone(),
                name: name.name.clone(),
            },
            TypeOperation::RelaxColumn {
                schema,
                table,
                column,
                ..
            } => DbObjectId::Column {
                schema: schema.clone(),
                table: table.clone(),
                name: column.clone(),
            },
            TypeOperation::RestoreColumn {
                schema,
                table,
                column,
                ..
            } => DbObjectId::Column {
                schema: schema.clone(),
                table: table.clone(),
                name: column.name.clone(),
            },
        })
    }

    fn is_destructive(&self) -> bool {
        matches!(self, TypeOperation::Drop { .. })
    }
}
