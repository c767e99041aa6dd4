use super::grant::Grant;
use super::id::{DbObjectId, QualifiedName};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewQuery {
    pub sql_format: Option<String>,
    pub sql: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub schema: String,
    pub name: String,
    pub owner: Option<String>,
    pub queries: Vec<ViewQuery>,
    pub depends_on: Vec<QualifiedName>,
    pub grants: Vec<Grant>,
}

impl View {
    pub fn id(&self) -> DbObjectId {
        DbObjectId::View {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(&self.schema, &self.name)
    }

    /// Query tagged for `sql_format`, falling back to an untagged one.
    pub fn query_for(&self, sql_format: &str) -> Option<&str> {
        self.queries
            .iter()
            .find(|q| q.sql_format.as_deref() == Some(sql_format))
            .or_else(|| self.queries.iter().find(|q| q.sql_format.is_none()))
            .map(|q| q.sql.as_str())
    }
}
