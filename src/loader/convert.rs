//! Conversion of the generic element tree into catalog entities.

use super::Element;
use crate::catalog::constraint::{Constraint, ConstraintBody, ConstraintKind, ReferentialAction};
use crate::catalog::custom_type::EnumType;
use crate::catalog::data::{Row, RowSet, Value};
use crate::catalog::function::{Function, FunctionDefinition, Parameter, ParameterDirection};
use crate::catalog::grant::{Grant, GrantAction, Privilege};
use crate::catalog::id::QualifiedName;
use crate::catalog::index::{Index, IndexDimension, IndexMethod};
use crate::catalog::schema::Schema;
use crate::catalog::sequence::Sequence;
use crate::catalog::table::{Column, ColumnHooks, EnumRef, ForeignKeyRef, Table, TableOption};
use crate::catalog::triggers::{Trigger, TriggerEvent, TriggerLevel, TriggerTiming};
use crate::catalog::view::{View, ViewQuery};
use crate::catalog::{ConfigParameter, Database, LiteralSql, RoleSet};
use crate::error::{DiffError, Result};
use crate::output::Stage;
use std::collections::HashSet;
use std::str::FromStr;
use tracing::debug;

const ROOT_NAMES: [&str; 2] = ["dbsteward", "schemaDocument"];

pub(super) fn convert_document(root: &Element, source_name: &str) -> Result<Database> {
    let converter = Converter { source: source_name };
    converter.document(root)
}

struct Converter<'a> {
    source: &'a str,
}

impl Converter<'_> {
    fn invalid(&self, element: &Element, message: impl AsRef<str>) -> DiffError {
        DiffError::invalid(
            self.source,
            format!(
                "<{}> at line {}: {}",
                element.name,
                element.line,
                message.as_ref()
            ),
        )
    }

    fn required<'e>(&self, element: &'e Element, attr: &str) -> Result<&'e str> {
        element
            .attr_trimmed(attr)
            .ok_or_else(|| self.invalid(element, format!("missing attribute '{attr}'")))
    }

    fn flag(&self, element: &Element, attr: &str) -> Result<bool> {
        match element.attr_trimmed(attr) {
            None => Ok(false),
            Some(v) => parse_bool(v).ok_or_else(|| {
                self.invalid(element, format!("attribute '{attr}' is not a boolean: '{v}'"))
            }),
        }
    }

    fn number<T: FromStr>(&self, element: &Element, attr: &str) -> Result<Option<T>> {
        element
            .attr_trimmed(attr)
            .map(|v| {
                v.parse::<T>().map_err(|_| {
                    self.invalid(element, format!("attribute '{attr}' is not a number: '{v}'"))
                })
            })
            .transpose()
    }

    fn document(&self, root: &Element) -> Result<Database> {
        if !ROOT_NAMES.contains(&root.name.as_str()) {
            return Err(self.invalid(root, "expected <dbsteward> root element"));
        }

        let mut database = Database::empty();
        let mut schema_names = HashSet::new();

        for child in &root.children {
            match child.name.as_str() {
                "database" => self.database_settings(child, &mut database)?,
                "sql" => database.literal_sql.push(self.literal_sql(child)?),
                "schema" => {
                    let schema = self.schema(child, &mut database.literal_sql)?;
                    if !schema_names.insert(schema.name.clone()) {
                        return Err(self.invalid(child, format!("duplicate schema '{}'", schema.name)));
                    }
                    database.schemas.push(schema);
                }
                other => debug!("Ignoring <{}> at line {}", other, child.line),
            }
        }

        resolve_foreign_key_types(&mut database, self.source)?;
        resolve_enum_types(&mut database, self.source)?;
        Ok(database)
    }

    fn database_settings(&self, element: &Element, database: &mut Database) -> Result<()> {
        database.name = element.attr_trimmed("name").map(str::to_string);
        for child in &element.children {
            match child.name.as_str() {
                "role" => database.roles = self.roles(child),
                "configurationParameter" => database.config_parameters.push(ConfigParameter {
                    name: self.required(child, "name")?.to_string(),
                    value: child.attr("value").unwrap_or_default().to_string(),
                }),
                _ => {}
            }
        }
        Ok(())
    }

    fn roles(&self, element: &Element) -> RoleSet {
        let text_of = |name: &str| {
            element
                .child(name)
                .map(|c| c.text().to_string())
                .filter(|t| !t.is_empty())
        };
        RoleSet {
            owner: text_of("owner"),
            application: text_of("application"),
            replication: text_of("replication"),
            readonly: text_of("readonly"),
            custom: element
                .children_named("customRole")
                .flat_map(|c| split_list(c.text()))
                .collect(),
        }
    }

    fn literal_sql(&self, element: &Element) -> Result<LiteralSql> {
        let stage = Stage::from_str(self.required(element, "stage")?)?;
        Ok(LiteralSql {
            stage,
            sql: element.text().to_string(),
        })
    }

    fn schema(&self, element: &Element, literal_sql: &mut Vec<LiteralSql>) -> Result<Schema> {
        let mut schema = Schema::new(self.required(element, "name")?);
        schema.owner = element.attr_trimmed("owner").map(str::to_string);

        let mut names = HashSet::new();
        let mut function_ids = HashSet::new();
        let mut trigger_names = HashSet::new();

        for child in &element.children {
            match child.name.as_str() {
                "table" => {
                    let table = self.table(child, &schema.name)?;
                    self.claim(&mut names, child, "relation", &table.name)?;
                    schema.tables.push(table);
                }
                "sequence" => {
                    let sequence = self.sequence(child, &schema.name)?;
                    self.claim(&mut names, child, "relation", &sequence.name)?;
                    schema.sequences.push(sequence);
                }
                "view" => {
                    let view = self.view(child, &schema.name)?;
                    self.claim(&mut names, child, "relation", &view.name)?;
                    schema.views.push(view);
                }
                "type" => {
                    let enum_type = self.enum_type(child, &schema.name)?;
                    self.claim(&mut names, child, "type", &enum_type.name)?;
                    schema.types.push(enum_type);
                }
                "function" => {
                    let function = self.function(child, &schema.name)?;
                    let id = function.id().to_string();
                    self.claim(&mut function_ids, child, "function", &id)?;
                    schema.functions.push(function);
                }
                "trigger" => {
                    let trigger = self.trigger(child, &schema.name)?;
                    // same name may exist once per dialect
                    let key = format!("{}/{}", trigger.name, trigger.sql_format.as_deref().unwrap_or(""));
                    self.claim(&mut trigger_names, child, "trigger", &key)?;
                    schema.triggers.push(trigger);
                }
                "grant" | "revoke" => schema.grants.push(self.grant(child)?),
                "sql" => literal_sql.push(self.literal_sql(child)?),
                other => debug!("Ignoring <{}> in schema {}", other, schema.name),
            }
        }

        for trigger in &schema.triggers {
            if schema.find_table(&trigger.table).is_none() {
                return Err(DiffError::not_found(
                    "table",
                    format!("{}.{} (trigger {})", schema.name, trigger.table, trigger.name),
                ));
            }
        }
        Ok(schema)
    }

    fn claim(
        &self,
        seen: &mut HashSet<String>,
        element: &Element,
        kind: &str,
        name: &str,
    ) -> Result<()> {
        if seen.insert(name.to_string()) {
            Ok(())
        } else {
            Err(self.invalid(element, format!("duplicate {kind} name '{name}'")))
        }
    }

    fn table(&self, element: &Element, schema: &str) -> Result<Table> {
        let name = self.required(element, "name")?;
        let mut table = Table::new(schema, name, Vec::new());
        table.owner = element.attr_trimmed("owner").map(str::to_string);
        table.primary_key = element
            .attr("primaryKey")
            .map(split_list)
            .unwrap_or_default();
        table.primary_key_name = element.attr_trimmed("primaryKeyName").map(str::to_string);
        table.old_name = element.attr_trimmed("oldTableName").map(str::to_string);
        table.old_schema = element.attr_trimmed("oldSchemaName").map(str::to_string);
        table.cluster_index = element.attr_trimmed("clusterIndex").map(str::to_string);
        table.inherits = element.attr_trimmed("inheritsTable").map(|parent| {
            QualifiedName::new(element.attr_trimmed("inheritsSchema").unwrap_or(schema), parent)
        });

        let mut column_names = HashSet::new();
        let mut table_object_names = HashSet::new();

        for child in &element.children {
            match child.name.as_str() {
                "column" => {
                    let column = self.column(child, schema)?;
                    self.claim(&mut column_names, child, "column", &column.name)?;
                    table.columns.push(column);
                }
                "index" => {
                    let index = self.index(child)?;
                    self.claim(&mut table_object_names, child, "index", &index.name)?;
                    table.indexes.push(index);
                }
                "constraint" => {
                    let constraint = self.constraint(child, schema)?;
                    self.claim(&mut table_object_names, child, "constraint", &constraint.name)?;
                    table.constraints.push(constraint);
                }
                "tableOption" => table.options.push(TableOption {
                    sql_format: child.attr_trimmed("sqlFormat").map(str::to_string),
                    name: self.required(child, "name")?.to_string(),
                    value: child.attr("value").unwrap_or_default().to_string(),
                }),
                "grant" | "revoke" => table.grants.push(self.grant(child)?),
                "rows" => table.rows = Some(self.rows(child)?),
                other => debug!("Ignoring <{}> in table {}.{}", other, schema, name),
            }
        }

        for pk in &table.primary_key {
            if !table.has_column(pk) {
                return Err(self.invalid(
                    element,
                    format!("primary key column '{pk}' does not exist on {schema}.{name}"),
                ));
            }
        }
        if let Some(rows) = &table.rows {
            for column in &rows.columns {
                if !table.has_column(column) {
                    return Err(self.invalid(
                        element,
                        format!("rows declare unknown column '{column}' on {schema}.{name}"),
                    ));
                }
            }
        }
        Ok(table)
    }

    fn column(&self, element: &Element, schema: &str) -> Result<Column> {
        let name = self.required(element, "name")?;
        let mut column = Column::new(name, element.attr_trimmed("type").unwrap_or_default());
        if let Some(null) = element.attr_trimmed("null") {
            column.nullable = parse_bool(null).ok_or_else(|| {
                self.invalid(element, format!("attribute 'null' is not a boolean: '{null}'"))
            })?;
        }
        column.default = element.attr("default").map(str::to_string);
        column.old_name = element.attr_trimmed("oldColumnName").map(str::to_string);
        column.statistics = self.number(element, "statistics")?;
        column.hooks = ColumnHooks {
            before_add_stage1: element.attr_trimmed("beforeAddStage1").map(str::to_string),
            after_add_stage1: element.attr_trimmed("afterAddStage1").map(str::to_string),
            before_add_stage3: element.attr_trimmed("beforeAddStage3").map(str::to_string),
            after_add_stage3: element.attr_trimmed("afterAddStage3").map(str::to_string),
        };

        if let Some(foreign_table) = element.attr_trimmed("foreignTable") {
            column.foreign_key = Some(ForeignKeyRef {
                schema: element
                    .attr_trimmed("foreignSchema")
                    .unwrap_or(schema)
                    .to_string(),
                table: foreign_table.to_string(),
                column: element
                    .attr_trimmed("foreignColumn")
                    .unwrap_or(name)
                    .to_string(),
                name: element.attr_trimmed("foreignKeyName").map(str::to_string),
                on_delete: self.action(element, "foreignOnDelete")?,
                on_update: self.action(element, "foreignOnUpdate")?,
            });
        } else if column.data_type.is_empty() {
            return Err(self.invalid(element, format!("column '{name}' has no type")));
        }
        Ok(column)
    }

    fn action(&self, element: &Element, attr: &str) -> Result<Option<ReferentialAction>> {
        element
            .attr_trimmed(attr)
            .map(ReferentialAction::from_str)
            .transpose()
    }

    fn index(&self, element: &Element) -> Result<Index> {
        let dimensions: Vec<IndexDimension> = element
            .children_named("indexDimension")
            .map(|d| IndexDimension::parse(d.text()))
            .collect();
        if dimensions.is_empty() {
            return Err(self.invalid(element, "index has no dimensions"));
        }
        Ok(Index {
            name: self.required(element, "name")?.to_string(),
            unique: self.flag(element, "unique")?,
            method: element
                .attr_trimmed("using")
                .map(IndexMethod::from_str)
                .transpose()?,
            dimensions,
        })
    }

    fn constraint(&self, element: &Element, schema: &str) -> Result<Constraint> {
        let kind = ConstraintKind::from_str(self.required(element, "type")?)?;
        let definition = element.attr("definition").unwrap_or_default().trim().to_string();
        if definition.is_empty() {
            return Err(self.invalid(element, "constraint has no definition"));
        }
        let references = match (kind, element.attr_trimmed("foreignTable")) {
            (ConstraintKind::ForeignKey, Some(table)) => Some(QualifiedName::new(
                element.attr_trimmed("foreignSchema").unwrap_or(schema),
                table,
            )),
            (ConstraintKind::ForeignKey, None) => parse_references(&definition, schema),
            _ => None,
        };
        Ok(Constraint {
            name: self.required(element, "name")?.to_string(),
            kind,
            body: ConstraintBody::Raw(definition),
            references,
            on_delete: self.action(element, "foreignOnDelete")?,
            on_update: self.action(element, "foreignOnUpdate")?,
        })
    }

    fn rows(&self, element: &Element) -> Result<RowSet> {
        let columns = split_list(self.required(element, "columns")?);
        let mut rows = Vec::new();
        for row in element.children_named("row") {
            let values = row
                .children_named("col")
                .map(|col| {
                    Ok(if self.flag(col, "null")? {
                        Value::Null
                    } else if self.flag(col, "sql")? {
                        Value::Sql(col.text().to_string())
                    } else {
                        Value::Text(col.text().to_string())
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            if values.len() != columns.len() {
                return Err(self.invalid(
                    row,
                    format!(
                        "row has {} values for {} declared columns",
                        values.len(),
                        columns.len()
                    ),
                ));
            }
            rows.push(Row {
                values,
                delete: self.flag(row, "delete")?,
            });
        }
        Ok(RowSet { columns, rows })
    }

    fn grant(&self, element: &Element) -> Result<Grant> {
        let action = if element.name == "revoke" {
            GrantAction::Revoke
        } else {
            GrantAction::Grant
        };
        let privileges = split_list(self.required(element, "operation")?)
            .iter()
            .map(|op| Privilege::from_str(op))
            .collect::<Result<Vec<_>>>()?;
        Ok(Grant {
            action,
            roles: split_list(self.required(element, "role")?),
            privileges,
            with_grant_option: element
                .attr_trimmed("with")
                .is_some_and(|w| w.eq_ignore_ascii_case("GRANT")),
        })
    }

    fn sequence(&self, element: &Element, schema: &str) -> Result<Sequence> {
        let mut sequence = Sequence::new(schema, self.required(element, "name")?);
        sequence.owner = element.attr_trimmed("owner").map(str::to_string);
        sequence.increment = self.number(element, "inc")?;
        sequence.min_value = self.number(element, "min")?;
        sequence.max_value = self.number(element, "max")?;
        sequence.start_value = self.number(element, "start")?;
        sequence.cache = self.number(element, "cache")?;
        sequence.cycle = self.flag(element, "cycle")?;
        for child in &element.children {
            if matches!(child.name.as_str(), "grant" | "revoke") {
                sequence.grants.push(self.grant(child)?);
            }
        }
        Ok(sequence)
    }

    fn enum_type(&self, element: &Element, schema: &str) -> Result<EnumType> {
        let kind = self.required(element, "type")?;
        if !kind.eq_ignore_ascii_case("enum") {
            return Err(DiffError::unknown("type kind", kind));
        }
        let values = element
            .children_named("enum")
            .map(|e| self.required(e, "name").map(str::to_string))
            .collect::<Result<Vec<_>>>()?;
        Ok(EnumType {
            schema: schema.to_string(),
            name: self.required(element, "name")?.to_string(),
            values,
        })
    }

    fn function(&self, element: &Element, schema: &str) -> Result<Function> {
        let parameters = element
            .children_named("functionParameter")
            .map(|p| {
                Ok(Parameter {
                    name: p.attr_trimmed("name").map(str::to_string),
                    data_type: self.required(p, "type")?.to_string(),
                    direction: p
                        .attr_trimmed("direction")
                        .map(ParameterDirection::from_str)
                        .transpose()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let definitions: Vec<FunctionDefinition> = element
            .children_named("functionDefinition")
            .map(|d| FunctionDefinition {
                sql_format: d.attr_trimmed("sqlFormat").map(str::to_string),
                language: d.attr_trimmed("language").map(str::to_string),
                body: d.text().to_string(),
            })
            .collect();
        if definitions.is_empty() {
            return Err(self.invalid(element, "function has no functionDefinition"));
        }
        let grants = element
            .children
            .iter()
            .filter(|c| matches!(c.name.as_str(), "grant" | "revoke"))
            .map(|c| self.grant(c))
            .collect::<Result<Vec<_>>>()?;
        let procedure = self.flag(element, "procedure")?;
        Ok(Function {
            schema: schema.to_string(),
            name: self.required(element, "name")?.to_string(),
            owner: element.attr_trimmed("owner").map(str::to_string),
            returns: if procedure {
                element.attr_trimmed("returns").unwrap_or_default().to_string()
            } else {
                self.required(element, "returns")?.to_string()
            },
            parameters,
            definitions,
            language: element.attr_trimmed("language").map(str::to_string),
            cache_policy: element.attr_trimmed("cachePolicy").map(str::to_string),
            security_definer: self.flag(element, "securityDefiner")?,
            force_redefine: self.flag(element, "forceRedefine")?,
            procedure,
            grants,
        })
    }

    fn trigger(&self, element: &Element, schema: &str) -> Result<Trigger> {
        let events = split_list(self.required(element, "event")?)
            .iter()
            .map(|e| TriggerEvent::from_str(e))
            .collect::<Result<Vec<_>>>()?;
        let level = match element.attr_trimmed("forEach") {
            None => TriggerLevel::Row,
            Some(v) if v.eq_ignore_ascii_case("row") => TriggerLevel::Row,
            Some(v) if v.eq_ignore_ascii_case("statement") => TriggerLevel::Statement,
            Some(v) => return Err(DiffError::unknown("trigger level", v)),
        };
        Ok(Trigger {
            schema: schema.to_string(),
            name: self.required(element, "name")?.to_string(),
            table: self.required(element, "table")?.to_string(),
            timing: TriggerTiming::from_str(self.required(element, "when")?)?,
            events,
            level,
            function: self.required(element, "function")?.to_string(),
            sql_format: element.attr_trimmed("sqlFormat").map(str::to_string),
        })
    }

    fn view(&self, element: &Element, schema: &str) -> Result<View> {
        let queries: Vec<ViewQuery> = element
            .children_named("viewQuery")
            .map(|q| ViewQuery {
                sql_format: q.attr_trimmed("sqlFormat").map(str::to_string),
                sql: q.text().to_string(),
            })
            .collect();
        if queries.is_empty() {
            return Err(self.invalid(element, "view has no viewQuery"));
        }
        let depends_on = element
            .attr("dependsOnViews")
            .map(split_list)
            .unwrap_or_default()
            .into_iter()
            .map(|v| match v.split_once('.') {
                Some((s, n)) => QualifiedName::new(s, n),
                None => QualifiedName::new(schema, v),
            })
            .collect();
        let grants = element
            .children
            .iter()
            .filter(|c| matches!(c.name.as_str(), "grant" | "revoke"))
            .map(|c| self.grant(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(View {
            schema: schema.to_string(),
            name: self.required(element, "name")?.to_string(),
            owner: element.attr_trimmed("owner").map(str::to_string),
            queries,
            depends_on,
            grants,
        })
    }
}

/// Columns declared only by their foreign key take the referenced column's type.
fn resolve_foreign_key_types(database: &mut Database, source_name: &str) -> Result<()> {
    let mut resolved = Vec::new();
    for (schema_idx, schema) in database.schemas.iter().enumerate() {
        for (table_idx, table) in schema.tables.iter().enumerate() {
            for (column_idx, column) in table.columns.iter().enumerate() {
                let Some(fk) = &column.foreign_key else {
                    continue;
                };
                let target = database.find_table(&fk.schema, &fk.table).ok_or_else(|| {
                    DiffError::not_found("table", format!("{}.{}", fk.schema, fk.table))
                })?;
                let target_column = target.find_column(&fk.column).ok_or_else(|| {
                    DiffError::not_found(
                        "column",
                        format!("{}.{}.{}", fk.schema, fk.table, fk.column),
                    )
                })?;
                if !column.data_type.is_empty() {
                    continue;
                }
                if target_column.data_type.is_empty() {
                    return Err(DiffError::invalid(
                        source_name,
                        format!(
                            "column {}.{}.{} takes its type from {}.{}.{}, which has none",
                            schema.name, table.name, column.name, fk.schema, fk.table, fk.column
                        ),
                    ));
                }
                let data_type = if target_column.is_identity() {
                    target_column.identity_base_type()
                } else {
                    target_column.data_type.clone()
                };
                resolved.push((schema_idx, table_idx, column_idx, data_type));
            }
        }
    }
    for (s, t, c, data_type) in resolved {
        database.schemas[s].tables[t].columns[c].data_type = data_type;
    }
    Ok(())
}

/// Attach enum definitions to the columns typed by them. A qualified type
/// naming a document schema must resolve to a type declared there.
fn resolve_enum_types(database: &mut Database, source_name: &str) -> Result<()> {
    let types: Vec<EnumType> = database
        .schemas
        .iter()
        .flat_map(|s| s.types.iter().cloned())
        .collect();
    let schema_names: HashSet<String> = database.schemas.iter().map(|s| s.name.clone()).collect();

    for schema in &mut database.schemas {
        let schema_name = schema.name.clone();
        for table in &mut schema.tables {
            for column in &mut table.columns {
                if let Some(found) = types
                    .iter()
                    .find(|t| t.matches_type_name(&column.data_type, &schema_name))
                {
                    column.enum_type = Some(EnumRef {
                        name: found.qualified_name(),
                        values: found.values.clone(),
                    });
                } else if let Some((type_schema, _)) = column.data_type.trim().split_once('.')
                    && schema_names.contains(type_schema)
                {
                    return Err(DiffError::invalid(
                        source_name,
                        format!(
                            "column {}.{}.{} uses undeclared type '{}'",
                            schema_name, table.name, column.name, column.data_type
                        ),
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Comma or whitespace separated list; empty entries dropped.
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "t" | "yes" | "1" => Some(true),
        "false" | "f" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Target table of a `... REFERENCES schema.table (cols)` definition.
fn parse_references(definition: &str, default_schema: &str) -> Option<QualifiedName> {
    let upper = definition.to_uppercase();
    let pos = upper.find("REFERENCES")?;
    let rest = definition[pos + "REFERENCES".len()..].trim_start();
    let target: String = rest
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '(')
        .filter(|c| !matches!(c, '"' | '[' | ']'))
        .collect();
    if target.is_empty() {
        return None;
    }
    Some(match target.split_once('.') {
        Some((schema, table)) => QualifiedName::new(schema, table),
        None => QualifiedName::new(default_schema, target),
    })
}
