//! Rename index built once per diff.
//!
//! A new-side table carrying `oldTableName`/`oldSchemaName` replaces an
//! old-side table of another name. The index maps both directions so the
//! differs never rescan documents for markers.

use crate::catalog::Database;
use crate::catalog::id::QualifiedName;
use crate::catalog::table::Table;
use crate::error::{DiffError, Result};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct RenameIndex {
    /// new name -> old name
    to_old: BTreeMap<QualifiedName, QualifiedName>,
    /// old name -> new name
    to_new: BTreeMap<QualifiedName, QualifiedName>,
}

impl RenameIndex {
    pub fn build(old: &Database, new: &Database, ignore_old_names: bool) -> Result<Self> {
        let mut index = Self::default();
        if ignore_old_names {
            return Ok(index);
        }

        for (_, table) in new.tables() {
            let Some(previous) = previous_name(table) else {
                continue;
            };
            let current = table.qualified_name();
            // already applied: the old document knows the table by its new name
            if old.find_table_by_name(&current).is_some() {
                continue;
            }
            if old.find_table_by_name(&previous).is_none() {
                return Err(DiffError::not_found(
                    "table",
                    format!("{previous} (renamed to {current})"),
                ));
            }
            if new.find_table_by_name(&previous).is_some() {
                return Err(DiffError::RenameConflict(format!(
                    "{current} is renamed from {previous}, which still exists in the new document"
                )));
            }
            if let Some(other) = index.to_new.get(&previous) {
                return Err(DiffError::RenameConflict(format!(
                    "{previous} is renamed to both {other} and {current}"
                )));
            }
            debug!("Table {} renamed to {}", previous, current);
            index.to_new.insert(previous.clone(), current.clone());
            index.to_old.insert(current, previous);
        }
        Ok(index)
    }

    /// Old name of a renamed new-side table.
    pub fn old_name_of(&self, new: &QualifiedName) -> Option<&QualifiedName> {
        self.to_old.get(new)
    }

    /// New name of a renamed old-side table.
    pub fn new_name_of(&self, old: &QualifiedName) -> Option<&QualifiedName> {
        self.to_new.get(old)
    }

    pub fn is_renamed(&self, new: &QualifiedName) -> bool {
        self.to_old.contains_key(new)
    }

    pub fn renames(&self) -> impl Iterator<Item = (&QualifiedName, &QualifiedName)> {
        self.to_new.iter()
    }
}

fn previous_name(table: &Table) -> Option<QualifiedName> {
    if table.old_name.is_none() && table.old_schema.is_none() {
        return None;
    }
    let name = QualifiedName::new(
        table.old_schema.as_deref().unwrap_or(&table.schema),
        table.old_name.as_deref().unwrap_or(&table.name),
    );
    (name != table.qualified_name()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::schema::Schema;
    use crate::catalog::table::Column;

    fn create_test_database(tables: Vec<Table>) -> Database {
        let mut schema = Schema::new("app");
        schema.tables = tables;
        Database {
            schemas: vec![schema],
            ..Database::empty()
        }
    }

    fn create_test_table(name: &str, old_name: Option<&str>) -> Table {
        let mut table = Table::new("app", name, vec![Column::new("id", "integer")]);
        table.old_name = old_name.map(str::to_string);
        table
    }

    #[test]
    fn test_rename_is_indexed_both_ways() {
        let old = create_test_database(vec![create_test_table("people", None)]);
        let new = create_test_database(vec![create_test_table("persons", Some("people"))]);
        let index = RenameIndex::build(&old, &new, false).unwrap();
        let people = QualifiedName::new("app", "people");
        let persons = QualifiedName::new("app", "persons");
        assert_eq!(index.old_name_of(&persons), Some(&people));
        assert_eq!(index.new_name_of(&people), Some(&persons));
    }

    #[test]
    fn test_applied_rename_is_ignored() {
        let old = create_test_database(vec![create_test_table("persons", Some("people"))]);
        let new = create_test_database(vec![create_test_table("persons", Some("people"))]);
        let index = RenameIndex::build(&old, &new, false).unwrap();
        assert!(!index.is_renamed(&QualifiedName::new("app", "persons")));
    }

    #[test]
    fn test_ignore_old_names() {
        let old = create_test_database(vec![create_test_table("people", None)]);
        let new = create_test_database(vec![create_test_table("persons", Some("people"))]);
        let index = RenameIndex::build(&old, &new, true).unwrap();
        assert_eq!(index.renames().count(), 0);
    }

    #[test]
    fn test_rename_source_still_present_conflicts() {
        let old = create_test_database(vec![create_test_table("people", None)]);
        let new = create_test_database(vec![
            create_test_table("people", None),
            create_test_table("persons", Some("people")),
        ]);
        assert!(matches!(
            RenameIndex::build(&old, &new, false).unwrap_err(),
            DiffError::RenameConflict(_)
        ));
    }

    #[test]
    fn test_missing_rename_source_is_not_found() {
        let old = create_test_database(vec![]);
        let new = create_test_database(vec![create_test_table("persons", Some("people"))]);
        assert!(matches!(
            RenameIndex::build(&old, &new, false).unwrap_err(),
            DiffError::NotFound { .. }
        ));
    }
}
