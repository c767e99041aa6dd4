use super::Postgres;
use crate::catalog::function::Function;
use crate::catalog::triggers::{Trigger, TriggerLevel};
use crate::catalog::view::View;
use crate::render::{
    Dialect, FunctionSql, RenderResult, RenderedSql, TriggerSql, Unsupported, ViewSql,
    strip_terminator,
};
use itertools::Itertools;

const DEFAULT_LANGUAGE: &str = "plpgsql";

impl Postgres {
    fn parameter_list(&self, function: &Function) -> String {
        function
            .parameters
            .iter()
            .map(|p| {
                let mut parts = Vec::new();
                if let Some(direction) = p.direction {
                    parts.push(direction.keyword().to_string());
                }
                if let Some(name) = &p.name {
                    parts.push(self.quoter.column(name));
                }
                parts.push(p.data_type.clone());
                parts.join(" ")
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
}

impl FunctionSql for Postgres {
    fn create_function(&self, function: &Function, replace: bool) -> RenderResult {
        let definition = function.definition_for(self.sql_format()).ok_or_else(|| {
            Unsupported::new(format!(
                "function {} has no {} definition",
                function.qualified_name(),
                self.sql_format()
            ))
        })?;
        let language = function
            .language_for(self.sql_format())
            .unwrap_or(DEFAULT_LANGUAGE);
        let name = self
            .quoter
            .qualified_object(&function.schema, &function.name);
        let create = if replace {
            "CREATE OR REPLACE"
        } else {
            "CREATE"
        };
        let body = definition.body.trim();

        let sql = if function.procedure {
            format!(
                "{create} PROCEDURE {name}({}) LANGUAGE {language} AS $_$\n{body}\n$_$;",
                self.parameter_list(function)
            )
        } else {
            let mut sql = format!(
                "{create} FUNCTION {name}({}) RETURNS {} AS $_$\n{body}\n$_$ LANGUAGE {language}",
                self.parameter_list(function),
                function.returns
            );
            if let Some(policy) = &function.cache_policy {
                sql.push_str(&format!(" {}", policy.to_uppercase()));
            }
            if function.security_definer {
                sql.push_str(" SECURITY DEFINER");
            }
            sql.push(';');
            sql
        };
        Ok(vec![RenderedSql::new(sql)])
    }

    fn drop_function(&self, function: &Function) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "DROP {} IF EXISTS {}({});",
            Self::routine_keyword(function),
            self.quoter
                .qualified_object(&function.schema, &function.name),
            function.argument_types()
        ))])
    }
}

impl TriggerSql for Postgres {
    fn create_trigger(&self, trigger: &Trigger) -> RenderResult {
        let function = if trigger.function.contains('(') {
            trigger.function.clone()
        } else {
            format!("{}()", trigger.function)
        };
        let level = match trigger.level {
            TriggerLevel::Row => "ROW",
            TriggerLevel::Statement => "STATEMENT",
        };
        Ok(vec![RenderedSql::new(format!(
            "CREATE TRIGGER {} {} {} ON {} FOR EACH {} EXECUTE PROCEDURE {};",
            self.quoter.object(&trigger.name),
            trigger.timing.keyword(),
            trigger.events.iter().map(|e| e.keyword()).join(" OR "),
            self.quoter.table(&trigger.schema, &trigger.table),
            level,
            function
        ))])
    }

    fn drop_trigger(&self, trigger: &Trigger) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "DROP TRIGGER IF EXISTS {} ON {};",
            self.quoter.object(&trigger.name),
            self.quoter.table(&trigger.schema, &trigger.table)
        ))])
    }
}

impl ViewSql for Postgres {
    fn create_view(&self, view: &View) -> RenderResult {
        let query = view.query_for(self.sql_format()).ok_or_else(|| {
            Unsupported::new(format!(
                "view {} has no {} query",
                view.qualified_name(),
                self.sql_format()
            ))
        })?;
        Ok(vec![RenderedSql::new(format!(
            "CREATE VIEW {} AS\n{};",
            self.quoter.qualified_object(&view.schema, &view.name),
            strip_terminator(query)
        ))])
    }

    fn drop_view(&self, view: &View) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "DROP VIEW IF EXISTS {};",
            self.quoter.qualified_object(&view.schema, &view.name)
        ))])
    }
}

#[cfg(test)]
mod tests {
    use super::super::create_test_dialect;
    use super::*;
    use crate::catalog::function::{FunctionDefinition, Parameter};
    use crate::catalog::triggers::{TriggerEvent, TriggerTiming};

    fn create_test_function(format: Option<&str>) -> Function {
        Function {
            schema: "app".to_string(),
            name: "touch".to_string(),
            owner: None,
            returns: "trigger".to_string(),
            parameters: vec![],
            definitions: vec![FunctionDefinition {
                sql_format: format.map(str::to_string),
                language: None,
                body: "BEGIN NEW.updated_at = now(); RETURN NEW; END;".to_string(),
            }],
            language: Some("plpgsql".to_string()),
            cache_policy: None,
            security_definer: true,
            force_redefine: false,
            procedure: false,
            grants: vec![],
        }
    }

    #[test]
    fn test_create_or_replace_function() {
        let pg = create_test_dialect();
        let sql = pg
            .create_function(&create_test_function(Some("pgsql8")), true)
            .unwrap();
        assert!(sql[0].sql.starts_with(
            "CREATE OR REPLACE FUNCTION app.touch() RETURNS trigger AS $_$\nBEGIN"
        ));
        assert!(sql[0].sql.ends_with("$_$ LANGUAGE plpgsql SECURITY DEFINER;"));
    }

    #[test]
    fn test_function_without_definition_is_unsupported() {
        let pg = create_test_dialect();
        let result = pg.create_function(&create_test_function(Some("mssql10")), true);
        assert!(result.is_err());
    }

    #[test]
    fn test_drop_function_uses_argument_types() {
        let pg = create_test_dialect();
        let mut function = create_test_function(None);
        function.parameters.push(Parameter {
            name: Some("n".to_string()),
            data_type: "INTEGER".to_string(),
            direction: None,
        });
        let sql = pg.drop_function(&function).unwrap();
        assert_eq!(sql[0].sql, "DROP FUNCTION IF EXISTS app.touch(integer);");
    }

    #[test]
    fn test_trigger_appends_call_parens() {
        let pg = create_test_dialect();
        let trigger = Trigger {
            schema: "app".to_string(),
            name: "users_touch".to_string(),
            table: "users".to_string(),
            timing: TriggerTiming::Before,
            events: vec![TriggerEvent::Insert, TriggerEvent::Update],
            level: TriggerLevel::Row,
            function: "app.touch".to_string(),
            sql_format: None,
        };
        let sql = pg.create_trigger(&trigger).unwrap();
        assert_eq!(
            sql[0].sql,
            "CREATE TRIGGER users_touch BEFORE INSERT OR UPDATE ON app.users FOR EACH ROW EXECUTE PROCEDURE app.touch();"
        );
    }
}
