//! Grant operations

use super::OperationInfo;
use crate::catalog::grant::Privilege;
use crate::catalog::id::DbObjectId;

/// Object a privilege or ownership change applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantTarget {
    Schema {
        name: String,
    },
    Table {
        schema: String,
        name: String,
        /// Serial columns whose implicit sequences follow the table's grants.
        serial_columns: Vec<String>,
    },
    Sequence {
        schema: String,
        name: String,
    },
    View {
        schema: String,
        name: String,
    },
    Function {
        schema: String,
        name: String,
        arguments: String,
        procedure: bool,
    },
}

impl GrantTarget {
    pub fn db_object_id(&self) -> DbObjectId {
        match self {
            GrantTarget::Schema { name } => DbObjectId::Schema { name: name.clone() },
            GrantTarget::Table { schema, name, .. } => DbObjectId::Table {
                schema: schema.clone(),
                name: name.clone(),
            },
            GrantTarget::Sequence { schema, name } => DbObjectId::Sequence {
                schema: schema.clone(),
                name: name.clone(),
            },
            GrantTarget::View { schema, name } => DbObjectId::View {
                schema: schema.clone(),
                name: name.clone(),
            },
            GrantTarget::Function {
                schema,
                name,
                arguments,
                ..
            } => DbObjectId::Function {
                schema: schema.clone(),
                name: name.clone(),
                arguments: arguments.clone(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub enum GrantOperation {
    Grant {
        target: GrantTarget,
        roles: Vec<String>,
        privileges: Vec<Privilege>,
        with_grant_option: bool,
    },
    Revoke {
        target: GrantTarget,
        roles: Vec<String>,
        privileges: Vec<Privilege>,
    },
    SetOwner {
        target: GrantTarget,
        owner: String,
    },
}

impl OperationInfo for GrantOperation {
    fn db_object_id(&self) -> Option<DbObjectId> {
        match self {
            GrantOperation::Grant { target, .. }
            | GrantOperation::Revoke { target, .. }
            | GrantOperation::SetOwner { target, .. } => Some(target.db_object_id()),
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, GrantOperation::Revoke { .. })
    }
}
