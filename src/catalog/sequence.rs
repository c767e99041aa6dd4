use super::grant::Grant;
use super::id::{DbObjectId, QualifiedName};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub schema: String,
    pub name: String,
    pub owner: Option<String>,
    pub increment: Option<i64>,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
    pub start_value: Option<i64>,
    pub cache: Option<i64>,
    pub cycle: bool,
    pub grants: Vec<Grant>,
}

impl Sequence {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            owner: None,
            increment: None,
            min_value: None,
            max_value: None,
            start_value: None,
            cache: None,
            cycle: false,
            grants: Vec::new(),
        }
    }

    pub fn id(&self) -> DbObjectId {
        DbObjectId::Sequence {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(&self.schema, &self.name)
    }
}
