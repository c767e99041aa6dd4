use super::SqlServer;
use crate::catalog::constraint::{Constraint, ReferentialAction};
use crate::catalog::index::{Index, IndexDimension, IndexMethod};
use crate::render::{
    ConstraintSql, Dialect, IndexSql, RenderResult, RenderedSql, Unsupported,
    render_constraint_body,
};
use itertools::Itertools;

impl ConstraintSql for SqlServer {
    fn add_constraint(&self, schema: &str, table: &str, constraint: &Constraint) -> RenderResult {
        // RESTRICT is spelled NO ACTION here
        let mut constraint = constraint.clone();
        for action in [&mut constraint.on_delete, &mut constraint.on_update] {
            if *action == Some(ReferentialAction::Restrict) {
                *action = Some(ReferentialAction::NoAction);
            }
        }
        Ok(vec![RenderedSql::new(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} {};",
            self.quoter.table(schema, table),
            self.quoter.object(&constraint.name),
            render_constraint_body(&self.quoter, &constraint)
        ))])
    }

    fn drop_constraint(&self, schema: &str, table: &str, constraint: &Constraint) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "ALTER TABLE {} DROP CONSTRAINT IF EXISTS {};",
            self.quoter.table(schema, table),
            self.quoter.object(&constraint.name)
        ))])
    }
}

impl SqlServer {
    fn expression_columns<'a>(index: &'a Index) -> impl Iterator<Item = (String, &'a str)> {
        index
            .dimensions
            .iter()
            .enumerate()
            .filter_map(|(position, d)| match d {
                IndexDimension::Expression(e) => {
                    Some((index.computed_column_name(position), e.as_str()))
                }
                IndexDimension::Column(_) => None,
            })
    }
}

impl IndexSql for SqlServer {
    fn create_index(
        &self,
        schema: &str,
        table: &str,
        index: &Index,
        nullable_columns: &[String],
    ) -> RenderResult {
        if let Some(method) = index.method
            && method != IndexMethod::Btree
        {
            return Err(Unsupported::new(format!(
                "index {} uses method {}, only btree is available",
                index.name,
                method.keyword()
            )));
        }
        let target = self.quoter.table(schema, table);
        let mut out = Vec::new();
        for (column, expression) in Self::expression_columns(index) {
            out.push(RenderedSql::new(format!(
                "ALTER TABLE {target} ADD {} AS ({expression});",
                self.quoter.column(&column)
            )));
        }
        let dimensions = index
            .dimensions
            .iter()
            .enumerate()
            .map(|(position, d)| match d {
                IndexDimension::Column(c) => self.quoter.column(c),
                IndexDimension::Expression(_) => {
                    self.quoter.column(&index.computed_column_name(position))
                }
            })
            .join(", ");
        let mut sql = format!(
            "CREATE {}INDEX {} ON {target} ({dimensions})",
            if index.unique { "UNIQUE " } else { "" },
            self.quoter.object(&index.name)
        );
        // unique indexes admit a single NULL unless filtered
        if index.unique && !nullable_columns.is_empty() {
            out.push(self.comment(&format!(
                "unique index {} covers nullable columns; filtered to rows where they are set",
                index.name
            )));
            sql.push_str(&format!(
                " WHERE {}",
                nullable_columns
                    .iter()
                    .map(|c| format!("{} IS NOT NULL", self.quoter.column(c)))
                    .join(" AND ")
            ));
        }
        sql.push(';');
        out.push(RenderedSql::new(sql));
        Ok(out)
    }

    fn drop_index(&self, schema: &str, table: &str, index: &Index) -> RenderResult {
        let target = self.quoter.table(schema, table);
        let mut out = vec![RenderedSql::new(format!(
            "DROP INDEX IF EXISTS {} ON {target};",
            self.quoter.object(&index.name)
        ))];
        for (column, _) in Self::expression_columns(index) {
            out.push(RenderedSql::new(format!(
                "ALTER TABLE {target} DROP COLUMN IF EXISTS {};",
                self.quoter.column(&column)
            )));
        }
        Ok(out)
    }

    fn cluster_table(&self, schema: &str, table: &str, index: &str) -> RenderResult {
        Err(Unsupported::new(format!(
            "clustering {schema}.{table} on {index} after creation is not supported"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::super::create_test_dialect;
    use super::*;
    use crate::catalog::constraint::{ConstraintBody, ConstraintKind};
    use crate::catalog::id::QualifiedName;

    fn create_test_index(unique: bool, dims: &[&str]) -> Index {
        Index {
            name: "users_email_idx".to_string(),
            unique,
            method: None,
            dimensions: dims.iter().map(|d| IndexDimension::parse(d)).collect(),
        }
    }

    #[test]
    fn test_expression_dimension_becomes_computed_column() {
        let ms = create_test_dialect();
        let index = create_test_index(false, &["lower(email)"]);
        let sql = ms.create_index("app", "users", &index, &[]).unwrap();
        assert_eq!(
            sql[0].sql,
            "ALTER TABLE app.users ADD users_email_idx_expr1 AS (lower(email));"
        );
        assert_eq!(
            sql[1].sql,
            "CREATE INDEX users_email_idx ON app.users (users_email_idx_expr1);"
        );
        let drop = ms.drop_index("app", "users", &index).unwrap();
        assert_eq!(drop.len(), 2);
    }

    #[test]
    fn test_unique_over_nullable_columns_is_filtered() {
        let ms = create_test_dialect();
        let index = create_test_index(true, &["email"]);
        let sql = ms
            .create_index("app", "users", &index, &["email".to_string()])
            .unwrap();
        assert!(!sql[0].is_statement());
        assert_eq!(
            sql[1].sql,
            "CREATE UNIQUE INDEX users_email_idx ON app.users (email) WHERE email IS NOT NULL;"
        );
    }

    #[test]
    fn test_non_btree_is_unsupported() {
        let ms = create_test_dialect();
        let mut index = create_test_index(false, &["tags"]);
        index.method = Some(IndexMethod::Gin);
        assert!(ms.create_index("app", "users", &index, &[]).is_err());
    }

    #[test]
    fn test_restrict_becomes_no_action() {
        let ms = create_test_dialect();
        let fk = Constraint {
            name: "orders_user_fkey".to_string(),
            kind: ConstraintKind::ForeignKey,
            body: ConstraintBody::ForeignKey {
                columns: vec!["user_id".to_string()],
                target_columns: vec!["id".to_string()],
            },
            references: Some(QualifiedName::new("app", "users")),
            on_delete: Some(ReferentialAction::Restrict),
            on_update: None,
        };
        let sql = ms.add_constraint("app", "orders", &fk).unwrap();
        assert!(sql[0].sql.ends_with("ON DELETE NO ACTION;"));
    }
}
