//! Row data operations

use super::OperationInfo;
use crate::catalog::id::DbObjectId;

/// A value as it will appear in generated DML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Null,
    /// String literal; quoted and escaped when rendered.
    Quoted(String),
    /// Emitted as-is (numbers, SQL expressions).
    Raw(String),
}

#[derive(Debug, Clone)]
pub enum DataOperation {
    Insert {
        schema: String,
        table: String,
        columns: Vec<String>,
        values: Vec<SqlValue>,
    },
    Update {
        schema: String,
        table: String,
        set: Vec<(String, SqlValue)>,
        key: Vec<(String, SqlValue)>,
    },
    Delete {
        schema: String,
        table: String,
        key: Vec<(String, SqlValue)>,
    },
    /// Allow or forbid explicit values in identity columns.
    IdentityInsert {
        schema: String,
        table: String,
        enable: bool,
    },
}

impl OperationInfo for DataOperation {
    fn db_object_id(&self) -> Option<DbObjectId> {
        let (DataOperation::Insert { schema, table, .. }
        | DataOperation::Update { schema, table, .. }
        | DataOperation::Delete { schema, table, .. }
        | DataOperation::IdentityInsert { schema, table, .. }) = self;
        Some(DbObjectId::Table {
            schema: schema.clone(),
            name: table.clone(),
        })
    }

    fn is_destructive(&self) -> bool {
        matches!(self, DataOperation::Delete { .. })
    }
}
