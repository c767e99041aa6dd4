use super::SqlServer;
use crate::catalog::function::{Function, ParameterDirection};
use crate::catalog::triggers::{Trigger, TriggerEvent, TriggerTiming};
use crate::catalog::view::View;
use crate::render::{
    Dialect, FunctionSql, RenderResult, RenderedSql, TriggerSql, Unsupported, ViewSql,
    strip_terminator,
};
use itertools::Itertools;

impl SqlServer {
    fn parameter_list(&self, function: &Function) -> String {
        function
            .parameters
            .iter()
            .enumerate()
            .map(|(position, p)| {
                let name = match &p.name {
                    Some(n) if n.starts_with('@') => n.clone(),
                    Some(n) => format!("@{n}"),
                    None => format!("@p{}", position + 1),
                };
                let output = matches!(
                    p.direction,
                    Some(ParameterDirection::Out | ParameterDirection::InOut)
                );
                format!(
                    "{name} {}{}",
                    p.data_type,
                    if output { " OUTPUT" } else { "" }
                )
            })
            .join(", ")
    }

    fn routine_keyword(function: &Function) -> &'static str {
        if function.procedure {
            "PROCEDURE"
        } else {
            "FUNCTION"
        }
    }

    /// Trigger bodies may name a procedure instead of inline statements.
    fn trigger_body(function: &str) -> String {
        let function = function.trim();
        let is_name = !function.is_empty()
            && function
                .trim_end_matches("()")
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
        if is_name {
            format!("EXEC {};", function.trim_end_matches("()"))
        } else {
            function.to_string()
        }
    }
}

impl FunctionSql for SqlServer {
    fn create_function(&self, function: &Function, _replace: bool) -> RenderResult {
        let definition = function.definition_for(self.sql_format()).ok_or_else(|| {
            Unsupported::new(format!(
                "function {} has no {} definition",
                function.qualified_name(),
                self.sql_format()
            ))
        })?;
        let name = self
            .quoter
            .qualified_object(&function.schema, &function.name);
        let body = definition.body.trim();
        let sql = if function.procedure {
            format!(
                "CREATE PROCEDURE {name} {}\nAS\n{body}",
                self.parameter_list(function)
            )
        } else {
            format!(
                "CREATE FUNCTION {name}({})\nRETURNS {}\nAS\n{body}",
                self.parameter_list(function),
                function.returns
            )
        };
        Ok(Self::own_batch(sql))
    }

    fn drop_function(&self, function: &Function) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "DROP {} IF EXISTS {};",
            Self::routine_keyword(function),
            self.quoter
                .qualified_object(&function.schema, &function.name)
        ))])
    }
}

impl TriggerSql for SqlServer {
    fn create_trigger(&self, trigger: &Trigger) -> RenderResult {
        if trigger.timing == TriggerTiming::Before {
            return Err(Unsupported::new(format!(
                "BEFORE trigger {} on {}.{} has no SQL Server equivalent",
                trigger.name, trigger.schema, trigger.table
            )));
        }
        if trigger.events.contains(&TriggerEvent::Truncate) {
            return Err(Unsupported::new(format!(
                "TRUNCATE trigger {} has no SQL Server equivalent",
                trigger.name
            )));
        }
        Ok(Self::own_batch(format!(
            "CREATE TRIGGER {} ON {} {} {}\nAS\n{}",
            self.quoter
                .qualified_object(&trigger.schema, &trigger.name),
            self.quoter.table(&trigger.schema, &trigger.table),
            trigger.timing.keyword(),
            trigger.events.iter().map(|e| e.keyword()).join(", "),
            Self::trigger_body(&trigger.function)
        )))
    }

    fn drop_trigger(&self, trigger: &Trigger) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "DROP TRIGGER IF EXISTS {};",
            self.quoter
                .qualified_object(&trigger.schema, &trigger.name)
        ))])
    }
}

impl ViewSql for SqlServer {
    fn create_view(&self, view: &View) -> RenderResult {
        let query = view.query_for(self.sql_format()).ok_or_else(|| {
            Unsupported::new(format!(
                "view {} has no {} query",
                view.qualified_name(),
                self.sql_format()
            ))
        })?;
        Ok(Self::own_batch(format!(
            "CREATE VIEW {} AS\n{};",
            self.quoter.qualified_object(&view.schema, &view.name),
            strip_terminator(query)
        )))
    }

    fn drop_view(&self, view: &View) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "DROP VIEW IF EXISTS {};",
            self.quoter.qualified_object(&view.schema, &view.name)
        ))])
    }
}
