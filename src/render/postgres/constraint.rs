use super::Postgres;
use crate::catalog::constraint::Constraint;
use crate::catalog::index::{Index, IndexDimension};
use crate::render::{
    ConstraintSql, IndexSql, RenderResult, RenderedSql, render_constraint_body,
};
use itertools::Itertools;

impl ConstraintSql for Postgres {
    fn add_constraint(&self, schema: &str, table: &str, constraint: &Constraint) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} {};",
            self.quoter.table(schema, table),
            self.quoter.object(&constraint.name),
            render_constraint_body(&self.quoter, constraint)
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

impl IndexSql for Postgres {
    fn create_index(
        &self,
        schema: &str,
        table: &str,
        index: &Index,
        _nullable_columns: &[String],
    ) -> RenderResult {
        let dimensions = index
            .dimensions
            .iter()
            .map(|d| match d {
                IndexDimension::Column(c) => self.quoter.column(c),
                IndexDimension::Expression(e) => format!("({e})"),
            })
            .join(", ");
        let using = index
            .method
            .map(|m| format!(" USING {}", m.keyword()))
            .unwrap_or_default();
        Ok(vec![RenderedSql::new(format!(
            "CREATE {}INDEX {} ON {}{} ({});",
            if index.unique { "UNIQUE " } else { "" },
            self.quoter.object(&index.name),
            self.quoter.table(schema, table),
            using,
            dimensions
        ))])
    }

    fn drop_index(&self, schema: &str, _table: &str, index: &Index) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "DROP INDEX IF EXISTS {};",
            self.quoter.qualified_object(schema, &index.name)
        ))])
    }

    fn cluster_table(&self, schema: &str, table: &str, index: &str) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "ALTER TABLE {} CLUSTER ON {};",
            self.quoter.table(schema, table),
            self.quoter.object(index)
        ))])
    }
}
