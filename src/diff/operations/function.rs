//! Function operations

use super::OperationInfo;
use crate::catalog::function::Function;
use crate::catalog::id::DbObjectId;

#[derive(Debug, Clone)]
pub enum FunctionOperation {
    /// `replace` asks for CREATE OR REPLACE where the dialect has it.
    Create { function: Function, replace: bool },
    Drop { function: Function },
}

impl OperationInfo for FunctionOperation {
    fn db_object_id(&self) -> Option<DbObjectId> {
        match self {
            FunctionOperation::Create { function, .. } | FunctionOperation::Drop { function } => {
                Some(function.id())
            }
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, FunctionOperation::Drop { .. })
    }
}
