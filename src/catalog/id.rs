use std::fmt;

/// Schema-qualified object name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub schema: String,
    pub name: String,
}

impl QualifiedName {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// A unique identifier for any object described by a schema document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DbObjectId {
    Schema {
        name: String,
    },
    Table {
        schema: String,
        name: String,
    },
    Column {
        schema: String,
        table: String,
        name: String,
    },
    View {
        schema: String,
        name: String,
    },
    Type {
        schema: String,
        name: String,
    },
    Function {
        schema: String,
        name: String,
        arguments: String,
    },
    Sequence {
        schema: String,
        name: String,
    },
    Index {
        schema: String,
        table: String,
        name: String,
    },
    Constraint {
        schema: String,
        table: String,
        name: String,
    },
    Trigger {
        schema: String,
        table: String,
        name: String,
    },
}

impl DbObjectId {
    pub fn schema(&self) -> &str {
        match self {
            Self::Schema { name } => name,
            Self::Table { schema, .. }
            | Self::Column { schema, .. }
            | Self::View { schema, .. }
            | Self::Type { schema, .. }
            | Self::Function { schema, .. }
            | Self::Sequence { schema, .. }
            | Self::Index { schema, .. }
            | Self::Constraint { schema, .. }
            | Self::Trigger { schema, .. } => schema,
        }
    }
}

impl fmt::Display for DbObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema { name } => write!(f, "schema {name}"),
            Self::Table { schema, name } => write!(f, "table {schema}.{name}"),
            Self::Column {
                schema,
                table,
                name,
            } => write!(f, "column {schema}.{table}.{name}"),
            Self::View { schema, name } => write!(f, "view {schema}.{name}"),
            Self::Type { schema, name } => write!(f, "type {schema}.{name}"),
            Self::Function {
                schema,
                name,
                arguments,
            } => write!(f, "function {schema}.{name}({arguments})"),
            Self::Sequence { schema, name } => write!(f, "sequence {schema}.{name}"),
            Self::Index {
                schema,
                table,
                name,
            } => write!(f, "index {schema}.{table}.{name}"),
            Self::Constraint {
                schema,
                table,
                name,
            } => write!(f, "constraint {schema}.{table}.{name}"),
            Self::Trigger {
                schema,
                table,
                name,
            } => write!(f, "trigger {schema}.{table}.{name}"),
        }
    }
}
