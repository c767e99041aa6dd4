use super::OperationInfo;
use crate::catalog::id::DbObjectId;
use crate::catalog::triggers::Trigger;

#[derive(Debug, Clone)]
pub enum TriggerOperation {
    Create { trigger: Trigger },
    Drop { trigger: Trigger },
}

impl OperationInfo for TriggerOperation {
    fn db_object_id(&self) -> Option<DbObjectId> {
        match self {
            TriggerOperation::Create { trigger } | TriggerOperation::Drop { trigger } => {
                Some(trigger.id())
            }
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, TriggerOperation::Drop { .. })
    }
}
