//! Sequence operations

use super::OperationInfo;
use crate::catalog::id::DbObjectId;
use crate::catalog::sequence::Sequence;

#[derive(Debug, Clone)]
pub enum SequenceOperation {
    Create { sequence: Sequence },
    Alter {
        schema: String,
        name: String,
        changes: SequenceChanges,
    },
    Drop { schema: String, name: String },
    /// Objects backing sequences on dialects without native ones.
    InstallSupport,
}

/// Attribute delta for ALTER SEQUENCE. The outer `Option` marks a changed
/// attribute; the inner one is its new value, `None` meaning "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceChanges {
    pub increment: Option<Option<i64>>,
    pub min_value: Option<Option<i64>>,
    pub max_value: Option<Option<i64>>,
    pub start_value: Option<Option<i64>>,
    pub cache: Option<Option<i64>>,
    pub cycle: Option<bool>,
}

impl SequenceChanges {
    pub fn is_empty(&self) -> bool {
        *self == SequenceChanges::default()
    }
}

impl OperationInfo for SequenceOperation {
    fn db_object_id(&self) -> Option<DbObjectId> {
        match self {
            SequenceOperation::Create { sequence } => Some(sequence.id()),
            SequenceOperation::Alter { schema, name, .. }
            | SequenceOperation::Drop { schema, name } => Some(DbObjectId::Sequence {
                schema: schema.clone(),
                name: name.clone(),
            }),
            SequenceOperation::InstallSupport => None,
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, SequenceOperation::Drop { .. })
    }
}
