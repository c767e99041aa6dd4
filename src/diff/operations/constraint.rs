//! Constraint operations

use super::OperationInfo;
use crate::catalog::constraint::Constraint;
use crate::catalog::id::DbObjectId;

#[derive(Debug, Clone)]
pub enum ConstraintOperation {
    Add {
        schema: String,
        table: String,
        constraint: Constraint,
    },
    Drop {
        schema: String,
        table: String,
        constraint: Constraint,
    },
}

impl OperationInfo for ConstraintOperation {
    fn db_object_id(&self) -> Option<DbObjectId> {
        let (ConstraintOperation::Add {
            schema,
            table,
            constraint,
        }
        | ConstraintOperation::Drop {
            schema,
            table,
            constraint,
        }) = self;
        Some(DbObjectId::Constraint {
            schema: schema.clone(),
            table: table.clone(),
            name: constraint.name.clone(),
        })
    }

    fn is_destructive(&self) -> bool {
        matches!(self, ConstraintOperation::Drop { .. })
    }
}
