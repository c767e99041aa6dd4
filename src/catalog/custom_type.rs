use super::id::{DbObjectId, QualifiedName};

/// Enum type; the only user-defined type kind documents can declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub schema: String,
    pub name: String,
    pub values: Vec<String>,
}

impl EnumType {
    pub fn id(&self) -> DbObjectId {
        DbObjectId::Type {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(&self.schema, &self.name)
    }

    /// Whether `data_type` (as written on a column in `context_schema`) names this type.
    pub fn matches_type_name(&self, data_type: &str, context_schema: &str) -> bool {
        let t = data_type.trim();
        match t.split_once('.') {
            Some((schema, name)) => schema == self.schema && name == self.name,
            None => t == self.name && context_schema == self.schema,
        }
    }
}
