//! Schema and database-level operations

use super::OperationInfo;
use crate::catalog::id::DbObjectId;

#[derive(Debug, Clone)]
pub enum SchemaOperation {
    Create { name: String },
    Drop { name: String },
    /// Database-level configuration parameter.
    SetParameter { name: String, value: String },
}

impl OperationInfo for SchemaOperation {
    fn db_object_id(&self) -> Option<DbObjectId> {
        match self {
            SchemaOperation::Create { name } | SchemaOperation::Drop { name } => {
                Some(DbObjectId::Schema { name: name.clone() })
            }
            SchemaOperation::SetParameter { .. } => None,
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, SchemaOperation::Drop { .. })
    }
}
