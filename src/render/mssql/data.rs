use super::SqlServer;
use crate::diff::operations::SqlValue;
use crate::render::{DataSql, RenderResult, RenderedSql, render_key, render_value};
use itertools::Itertools;

impl DataSql for SqlServer {
    fn insert(
        &self,
        schema: &str,
        table: &str,
        columns: &[String],
        values: &[SqlValue],
    ) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "INSERT INTO {} ({}) VALUES ({});",
            self.quoter.table(schema, table),
            self.quoter.columns(columns),
            values.iter().map(render_value).join(", ")
        ))])
    }

    fn update(
        &self,
        schema: &str,
        table: &str,
        set: &[(String, SqlValue)],
        key: &[(String, SqlValue)],
    ) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "UPDATE {} SET {} WHERE {};",
            self.quoter.table(schema, table),
            set.iter()
                .map(|(c, v)| format!("{} = {}", self.quoter.column(c), render_value(v)))
                .join(", "),
            render_key(&self.quoter, key)
        ))])
    }

    fn delete(&self, schema: &str, table: &str, key: &[(String, SqlValue)]) -> RenderResult {
        Ok(vec![RenderedSql::destructive(format!(
            "DELETE FROM {} WHERE {};",
            self.quoter.table(schema, table),
            render_key(&self.quoter, key)
        ))])
    }

    fn identity_insert(&self, schema: &str, table: &str, enable: bool) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "SET IDENTITY_INSERT {} {};",
            self.quoter.table(schema, table),
            if enable { "ON" } else { "OFF" }
        ))])
    }
}
