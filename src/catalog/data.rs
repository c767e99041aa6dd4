/// A literal cell value in a `<rows>` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Text(String),
    /// Raw SQL expression (`<col sql="true">`), emitted unquoted.
    Sql(String),
}

impl Value {
    /// Canonical form used to correlate rows by key.
    pub fn key_string(&self) -> String {
        match self {
            Value::Null => "\0NULL".to_string(),
            Value::Text(s) => format!("t:{s}"),
            Value::Sql(s) => format!("s:{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub values: Vec<Value>,
    pub delete: bool,
}

/// Rows positionally correlated with a shared column declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl RowSet {
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn value<'a>(&self, row: &'a Row, column: &str) -> Option<&'a Value> {
        self.position(column).and_then(|i| row.values.get(i))
    }

    /// Key of `row` over `key_columns`, or `None` if any key column is missing.
    pub fn key(&self, row: &Row, key_columns: &[String]) -> Option<Vec<String>> {
        key_columns
            .iter()
            .map(|c| self.value(row, c).map(Value::key_string))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_positional() {
        let rows = RowSet {
            columns: vec!["id".to_string(), "name".to_string()],
            rows: vec![Row {
                values: vec![Value::Text("1".to_string()), Value::Text("a".to_string())],
                delete: false,
            }],
        };
        let key = rows.key(&rows.rows[0], &["id".to_string()]).unwrap();
        assert_eq!(key, vec!["t:1".to_string()]);
        assert!(rows.key(&rows.rows[0], &["missing".to_string()]).is_none());
    }

    #[test]
    fn test_null_key_differs_from_text_null() {
        assert_ne!(
            Value::Null.key_string(),
            Value::Text("NULL".to_string()).key_string()
        );
    }
}
