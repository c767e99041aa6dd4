use super::grant::Grant;
use super::id::{DbObjectId, QualifiedName};
use crate::error::{DiffError, Result};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterDirection {
    In,
    Out,
    InOut,
}

impl ParameterDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            ParameterDirection::In => "IN",
            ParameterDirection::Out => "OUT",
            ParameterDirection::InOut => "INOUT",
        }
    }
}

impl FromStr for ParameterDirection {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "IN" => Ok(ParameterDirection::In),
            "OUT" => Ok(ParameterDirection::Out),
            "INOUT" | "IN OUT" => Ok(ParameterDirection::InOut),
            _ => Err(DiffError::unknown("parameter direction", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: Option<String>,
    pub data_type: String,
    pub direction: Option<ParameterDirection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDefinition {
    pub sql_format: Option<String>,
    pub language: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub schema: String,
    pub name: String,
    pub owner: Option<String>,
    pub returns: String,
    pub parameters: Vec<Parameter>,
    pub definitions: Vec<FunctionDefinition>,
    pub language: Option<String>,
    pub cache_policy: Option<String>,
    pub security_definer: bool,
    pub force_redefine: bool,
    pub procedure: bool,
    pub grants: Vec<Grant>,
}

impl Function {
    /// Ordered parameter types; together with the name this identifies an overload.
    /// OUT parameters are not part of the declaration.
    pub fn argument_types(&self) -> String {
        self.parameters
            .iter()
            .filter(|p| p.direction != Some(ParameterDirection::Out))
            .map(|p| crate::catalog::table::normalize_type(&p.data_type))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn id(&self) -> DbObjectId {
        DbObjectId::Function {
            schema: self.schema.clone(),
            name: self.name.clone(),
            arguments: self.argument_types(),
        }
    }

    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(&self.schema, &self.name)
    }

    /// Definition tagged for `sql_format`, falling back to an untagged one.
    pub fn definition_for(&self, sql_format: &str) -> Option<&FunctionDefinition> {
        self.definitions
            .iter()
            .find(|d| d.sql_format.as_deref() == Some(sql_format))
            .or_else(|| self.definitions.iter().find(|d| d.sql_format.is_none()))
    }

    pub fn language_for(&self, sql_format: &str) -> Option<&str> {
        self.definition_for(sql_format)
            .and_then(|d| d.language.as_deref())
            .or(self.language.as_deref())
    }

    /// Type names the function's declaration refers to (return and parameters).
    pub fn referenced_types(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.returns.as_str())
            .chain(self.parameters.iter().map(|p| p.data_type.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_function() -> Function {
        Function {
            schema: "app".to_string(),
            name: "add".to_string(),
            owner: None,
            returns: "integer".to_string(),
            parameters: vec![
                Parameter {
                    name: Some("a".to_string()),
                    data_type: "INTEGER".to_string(),
                    direction: None,
                },
                Parameter {
                    name: Some("b".to_string()),
                    data_type: "integer".to_string(),
                    direction: Some(ParameterDirection::In),
                },
                Parameter {
                    name: Some("total".to_string()),
                    data_type: "integer".to_string(),
                    direction: Some(ParameterDirection::Out),
                },
            ],
            definitions: vec![FunctionDefinition {
                sql_format: Some("pgsql8".to_string()),
                language: Some("sql".to_string()),
                body: "SELECT a + b".to_string(),
            }],
            language: None,
            cache_policy: None,
            security_definer: false,
            force_redefine: false,
            procedure: false,
            grants: vec![],
        }
    }

    #[test]
    fn test_identity_uses_input_argument_types() {
        let f = create_test_function();
        assert_eq!(f.argument_types(), "integer, integer");
        assert_eq!(f.id().to_string(), "function app.add(integer, integer)");
    }

    #[test]
    fn test_definition_lookup_by_format() {
        let f = create_test_function();
        assert!(f.definition_for("pgsql8").is_some());
        assert!(f.definition_for("mssql10").is_none());
        assert_eq!(f.language_for("pgsql8"), Some("sql"));
    }
}
