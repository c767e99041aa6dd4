use crate::catalog::id::DbObjectId;
use crate::catalog::index::Index;
use crate::diff::operations::OperationInfo;

#[derive(Debug, Clone)]
pub enum IndexOperation {
    Create {
        schema: String,
        table: String,
        index: Index,
        /// Indexed columns that allow NULL on the target table.
        nullable_columns: Vec<String>,
    },
    Drop {
        schema: String,
        table: String,
        index: Index,
    },
    /// Mark the table as clustered on an index (CLUSTER ON)
    Cluster {
        schema: String,
        table: String,
        index: String,
    },
}

impl OperationInfo for IndexOperation {
    fn db_object_id(&self) -> Option<DbObjectId> {
        let (schema, table, name) = match self {
            IndexOperation::Create {
                schema,
                table,
                index,
                ..
            }
            | IndexOperation::Drop {
                schema,
                table,
                index,
            } => (schema, table, &index.name),
            IndexOperation::Cluster {
                schema,
                table,
                index,
            } => (schema, table, index),
        };
        Some(DbObjectId::Index {
            schema: schema.clone(),
            table: table.clone(),
            name: name.clone(),
        })
    }

    fn is_destructive(&self) -> bool {
        matches!(self, IndexOperation::Drop { .. })
    }
}
