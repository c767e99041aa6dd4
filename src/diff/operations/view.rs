//! View operations

use super::OperationInfo;
use crate::catalog::id::DbObjectId;
use crate::catalog::view::View;

#[derive(Debug, Clone)]
pub enum ViewOperation {
    Create { view: View },
    Drop { view: View },
}

impl OperationInfo for ViewOperation {
    fn db_object_id(&self) -> Option<DbObjectId> {
        match self {
            ViewOperation::Create { view } | ViewOperation::Drop { view } => Some(view.id()),
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, ViewOperation::Drop { .. })
    }
}
