use crate::error::{DiffError, Result};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMethod {
    Btree,
    Hash,
    Gin,
    Gist,
    SpGist,
    Brin,
}

impl IndexMethod {
    pub fn keyword(&self) -> &'static str {
        match self {
            IndexMethod::Btree => "btree",
            IndexMethod::Hash => "hash",
            IndexMethod::Gin => "gin",
            IndexMethod::Gist => "gist",
            IndexMethod::SpGist => "spgist",
            IndexMethod::Brin => "brin",
        }
    }
}

impl FromStr for IndexMethod {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "btree" => Ok(IndexMethod::Btree),
            "hash" => Ok(IndexMethod::Hash),
            "gin" => Ok(IndexMethod::Gin),
            "gist" => Ok(IndexMethod::Gist),
            "spgist" => Ok(IndexMethod::SpGist),
            "brin" => Ok(IndexMethod::Brin),
            _ => Err(DiffError::unknown("index method", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexDimension {
    Column(String),
    Expression(String),
}

impl IndexDimension {
    /// Plain identifiers are column references; anything else is an expression.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let mut chars = text.chars();
        let is_ident = chars
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_')
            && chars.all(|c| c.is_alphanumeric() || c == '_');
        if is_ident {
            IndexDimension::Column(text.to_string())
        } else {
            IndexDimension::Expression(text.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub unique: bool,
    pub method: Option<IndexMethod>,
    pub dimensions: Vec<IndexDimension>,
}

impl Index {
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.dimensions.iter().filter_map(|d| match d {
            IndexDimension::Column(c) => Some(c.as_str()),
            IndexDimension::Expression(_) => None,
        })
    }

    /// Uniqueness, method and the ordered dimension list all take part.
    /// An absent method means the default btree.
    pub fn structurally_equal(&self, other: &Index) -> bool {
        self.unique == other.unique
            && self.method.unwrap_or(IndexMethod::Btree) == other.method.unwrap_or(IndexMethod::Btree)
            && self.dimensions == other.dimensions
    }

    /// Name of the computed column that materializes expression dimension `position`.
    pub fn computed_column_name(&self, position: usize) -> String {
        format!("{}_expr{}", self.name, position + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_index(dims: &[&str]) -> Index {
        Index {
            name: "users_email_idx".to_string(),
            unique: false,
            method: None,
            dimensions: dims.iter().map(|d| IndexDimension::parse(d)).collect(),
        }
    }

    #[test]
    fn test_dimension_parsing() {
        assert_eq!(
            IndexDimension::parse("email"),
            IndexDimension::Column("email".to_string())
        );
        assert_eq!(
            IndexDimension::parse("lower(email)"),
            IndexDimension::Expression("lower(email)".to_string())
        );
    }

    #[test]
    fn test_order_sensitive_equality() {
        let a = create_test_index(&["a", "b"]);
        let b = create_test_index(&["b", "a"]);
        assert!(!a.structurally_equal(&b));
        assert!(a.structurally_equal(&create_test_index(&["a", "b"])));
    }

    #[test]
    fn test_default_method_equals_btree() {
        let a = create_test_index(&["a"]);
        let mut b = create_test_index(&["a"]);
        b.method = Some(IndexMethod::Btree);
        assert!(a.structurally_equal(&b));
        b.method = Some(IndexMethod::Hash);
        assert!(!a.structurally_equal(&b));
    }
}
