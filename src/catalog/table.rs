use super::constraint::{Constraint, ConstraintBody, ConstraintKind, ReferentialAction};
use super::data::RowSet;
use super::grant::Grant;
use super::id::{DbObjectId, QualifiedName};
use super::index::Index;
use std::collections::BTreeMap;

/// Foreign key declared inline on a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRef {
    pub schema: String,
    pub table: String,
    pub column: String,
    pub name: Option<String>,
    pub on_delete: Option<ReferentialAction>,
    pub on_update: Option<ReferentialAction>,
}

impl ForeignKeyRef {
    pub fn target(&self) -> QualifiedName {
        QualifiedName::new(&self.schema, &self.table)
    }
}

/// Literal SQL attached to a column, emitted only when the column is added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnHooks {
    pub before_add_stage1: Option<String>,
    pub after_add_stage1: Option<String>,
    pub before_add_stage3: Option<String>,
    pub after_add_stage3: Option<String>,
}

/// Enum type a column resolved to at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumRef {
    pub name: QualifiedName,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
    pub old_name: Option<String>,
    pub foreign_key: Option<ForeignKeyRef>,
    pub statistics: Option<i32>,
    pub hooks: ColumnHooks,
    pub enum_type: Option<EnumRef>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            default: None,
            old_name: None,
            foreign_key: None,
            statistics: None,
            hooks: ColumnHooks::default(),
            enum_type: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Lowercased type with collapsed whitespace, used for equality checks.
    pub fn normalized_type(&self) -> String {
        normalize_type(&self.data_type)
    }

    /// True for serial, IDENTITY and auto_increment columns.
    pub fn is_identity(&self) -> bool {
        let t = self.normalized_type();
        t.ends_with("serial") || t.contains("identity") || t.contains("auto_increment")
    }

    /// The type the column keeps once its identity property is removed.
    pub fn identity_base_type(&self) -> String {
        let t = self.normalized_type();
        match t.as_str() {
            "serial" | "serial4" => "integer".to_string(),
            "bigserial" | "serial8" => "bigint".to_string(),
            "smallserial" | "serial2" => "smallint".to_string(),
            _ => {
                let cut = ["generated", "identity", "auto_increment"]
                    .iter()
                    .filter_map(|marker| t.find(marker))
                    .min()
                    .unwrap_or(t.len());
                t[..cut].trim().to_string()
            }
        }
    }

    pub fn is_numeric(&self) -> bool {
        let t = self.normalized_type();
        let base = t.split('(').next().unwrap_or("").trim();
        matches!(
            base,
            "int"
                | "integer"
                | "int2"
                | "int4"
                | "int8"
                | "smallint"
                | "bigint"
                | "tinyint"
                | "numeric"
                | "decimal"
                | "real"
                | "float"
                | "float4"
                | "float8"
                | "double precision"
                | "money"
        ) || self.is_identity()
    }

    /// Zero value used to backfill NOT NULL columns that declare no default.
    pub fn zero_value(&self) -> Option<String> {
        if self.is_numeric() {
            return Some("0".to_string());
        }
        let t = self.normalized_type();
        if t == "boolean" || t == "bool" || t == "bit" {
            Some("false".to_string())
        } else if t.contains("char") || t == "text" {
            Some("''".to_string())
        } else {
            None
        }
    }
}

pub fn normalize_type(data_type: &str) -> String {
    data_type
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOption {
    pub sql_format: Option<String>,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct Table {
    pub schema: String,
    pub name: String,
    pub owner: Option<String>,
    pub columns: Vec<Column>,
    pub primary_key: Vec<String>,
    pub primary_key_name: Option<String>,
    pub constraints: Vec<Constraint>,
    pub indexes: Vec<Index>,
    pub cluster_index: Option<String>,
    pub inherits: Option<QualifiedName>,
    pub options: Vec<TableOption>,
    pub old_name: Option<String>,
    pub old_schema: Option<String>,
    pub grants: Vec<Grant>,
    pub rows: Option<RowSet>,
}

impl Table {
    pub fn new(schema: impl Into<String>, name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            owner: None,
            columns,
            primary_key: Vec::new(),
            primary_key_name: None,
            constraints: Vec::new(),
            indexes: Vec::new(),
            cluster_index: None,
            inherits: None,
            options: Vec::new(),
            old_name: None,
            old_schema: None,
            grants: Vec::new(),
            rows: None,
        }
    }

    pub fn id(&self) -> DbObjectId {
        DbObjectId::Table {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(&self.schema, &self.name)
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.find_column(name).is_some()
    }

    pub fn find_index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Indexed columns that accept NULL. Primary key columns never do.
    pub fn nullable_index_columns(&self, index: &Index) -> Vec<String> {
        index
            .columns()
            .filter(|c| !self.primary_key.iter().any(|pk| pk == c))
            .filter(|c| self.find_column(c).is_some_and(|col| col.nullable))
            .map(str::to_string)
            .collect()
    }

    pub fn identity_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_identity())
    }

    pub fn primary_key_constraint_name(&self) -> String {
        self.primary_key_name
            .clone()
            .unwrap_or_else(|| format!("{}_pkey", self.name))
    }

    /// Options that apply to the given dialect: untagged ones plus those tagged for it.
    pub fn options_for(&self, sql_format: &str) -> BTreeMap<String, String> {
        self.options
            .iter()
            .filter(|o| o.sql_format.as_deref().is_none_or(|f| f == sql_format))
            .map(|o| (o.name.clone(), o.value.clone()))
            .collect()
    }

    /// Every constraint on the table: the primary key, inline column foreign keys,
    /// declared constraints, and (when `enum_checks` is set) the CHECK constraints
    /// that emulate enum-typed columns.
    pub fn all_constraints(&self, enum_checks: bool) -> Vec<Constraint> {
        let mut out = Vec::new();

        if !self.primary_key.is_empty() {
            out.push(Constraint {
                name: self.primary_key_constraint_name(),
                kind: ConstraintKind::PrimaryKey,
                body: ConstraintBody::Columns(self.primary_key.clone()),
                references: None,
                on_delete: None,
                on_update: None,
            });
        }

        for column in &self.columns {
            if let Some(fk) = &column.foreign_key {
                out.push(Constraint {
                    name: fk
                        .name
                        .clone()
                        .unwrap_or_else(|| format!("{}_{}_fkey", self.name, column.name)),
                    kind: ConstraintKind::ForeignKey,
                    body: ConstraintBody::ForeignKey {
                        columns: vec![column.name.clone()],
                        target_columns: vec![fk.column.clone()],
                    },
                    references: Some(fk.target()),
                    on_delete: fk.on_delete,
                    on_update: fk.on_update,
                });
            }
        }

        out.extend(self.constraints.iter().cloned());

        if enum_checks {
            for column in &self.columns {
                if let Some(enum_ref) = &column.enum_type {
                    out.push(Constraint {
                        name: format!("{}_{}_enum_check", self.name, column.name),
                        kind: ConstraintKind::Check,
                        body: ConstraintBody::EnumCheck {
                            column: column.name.clone(),
                            values: enum_ref.values.clone(),
                        },
                        references: None,
                        on_delete: None,
                        on_update: None,
                    });
                }
            }
        }

        out
    }

    /// Tables this table must follow in dependency order.
    pub fn referenced_tables(&self) -> Vec<QualifiedName> {
        let mut out: Vec<QualifiedName> = self
            .all_constraints(false)
            .into_iter()
            .filter_map(|c| c.references)
            .collect();
        if let Some(parent) = &self.inherits {
            out.push(parent.clone());
        }
        out
    }
}
