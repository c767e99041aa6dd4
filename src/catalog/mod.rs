//! Typed view of a schema document.
//!
//! A [`Database`] is built once per input document by the loader and is
//! read-only afterwards. Differs look objects up through the helpers here,
//! which report missing objects as [`DiffError::NotFound`].

use crate::error::{DiffError, Result};
use crate::output::Stage;
use id::QualifiedName;

pub mod constraint;
pub mod custom_type;
pub mod data;
pub mod function;
pub mod grant;
pub mod id;
pub mod index;
pub mod schema;
pub mod sequence;
pub mod table;
pub mod triggers;
pub mod view;

pub use grant::RoleSet;

/// Database-level `name = value` setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigParameter {
    pub name: String,
    pub value: String,
}

/// A `<sql stage="...">` block copied verbatim into its stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralSql {
    pub stage: Stage,
    pub sql: String,
}

#[derive(Debug, Clone, Default)]
pub struct Database {
    pub name: Option<String>,
    pub roles: RoleSet,
    pub config_parameters: Vec<ConfigParameter>,
    pub literal_sql: Vec<LiteralSql>,
    pub schemas: Vec<schema::Schema>,
}

impl Database {
    /// The state every build starts from.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn find_schema(&self, name: &str) -> Option<&schema::Schema> {
        self.schemas.iter().find(|s| s.name == name)
    }

    pub fn schema(&self, name: &str) -> Result<&schema::Schema> {
        self.find_schema(name)
            .ok_or_else(|| DiffError::not_found("schema", name))
    }

    pub fn find_table(&self, schema: &str, name: &str) -> Option<&table::Table> {
        self.find_schema(schema).and_then(|s| s.find_table(name))
    }

    pub fn table(&self, schema: &str, name: &str) -> Result<&table::Table> {
        self.find_table(schema, name)
            .ok_or_else(|| DiffError::not_found("table", format!("{schema}.{name}")))
    }

    pub fn find_table_by_name(&self, name: &QualifiedName) -> Option<&table::Table> {
        self.find_table(&name.schema, &name.name)
    }

    /// Every table in document order, with its schema.
    pub fn tables(&self) -> impl Iterator<Item = (&schema::Schema, &table::Table)> {
        self.schemas
            .iter()
            .flat_map(|s| s.tables.iter().map(move |t| (s, t)))
    }

    pub fn views(&self) -> impl Iterator<Item = &view::View> {
        self.schemas.iter().flat_map(|s| s.views.iter())
    }

    pub fn find_view(&self, name: &QualifiedName) -> Option<&view::View> {
        self.find_schema(&name.schema)
            .and_then(|s| s.find_view(&name.name))
    }

    pub fn find_type(&self, name: &QualifiedName) -> Option<&custom_type::EnumType> {
        self.find_schema(&name.schema)
            .and_then(|s| s.find_type(&name.name))
    }

    pub fn find_sequence(&self, schema: &str, name: &str) -> Option<&sequence::Sequence> {
        self.find_schema(schema).and_then(|s| s.find_sequence(name))
    }

    /// Columns whose type is the enum `type_name`, as (table, column) pairs.
    pub fn columns_of_type(&self, type_name: &QualifiedName) -> Vec<(&table::Table, &table::Column)> {
        self.tables()
            .flat_map(|(_, t)| {
                t.columns
                    .iter()
                    .filter(|c| c.enum_type.as_ref().is_some_and(|e| &e.name == type_name))
                    .map(move |c| (t, c))
            })
            .collect()
    }

    pub fn literal_sql_for(&self, stage: Stage) -> impl Iterator<Item = &LiteralSql> {
        self.literal_sql.iter().filter(move |l| l.stage == stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::table::{Column, EnumRef, Table};

    fn create_test_database() -> Database {
        let mut app = schema::Schema::new("app");
        let mut column = Column::new("status", "order_status");
        column.enum_type = Some(EnumRef {
            name: QualifiedName::new("app", "order_status"),
            values: vec!["new".to_string()],
        });
        app.tables
            .push(Table::new("app", "orders", vec![Column::new("id", "integer"), column]));
        Database {
            schemas: vec![app],
            ..Database::empty()
        }
    }

    #[test]
    fn test_table_lookup_reports_qualified_name() {
        let db = create_test_database();
        assert!(db.table("app", "orders").is_ok());
        let err = db.table("app", "missing").unwrap_err();
        assert_eq!(err.to_string(), "table not found: app.missing");
    }

    #[test]
    fn test_columns_of_type() {
        let db = create_test_database();
        let users = db.columns_of_type(&QualifiedName::new("app", "order_status"));
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].1.name, "status");
    }
}
