use super::{BATCH_SEPARATOR, SqlServer};
use crate::catalog::custom_type::EnumType;
use crate::catalog::id::QualifiedName;
use crate::catalog::sequence::Sequence;
use crate::catalog::table::Column;
use crate::constants::{SEQUENCE_TABLE, SEQUENCE_TABLE_SCHEMA};
use crate::diff::operations::SequenceChanges;
use crate::render::{Dialect, RenderResult, RenderedSql, SequenceSql, TypeSql, Unsupported, escape_string};

const SEQUENCE_TABLE_DDL: &str = "IF OBJECT_ID('{schema}.{table}', 'U') IS NULL
CREATE TABLE {schema}.{table} (
  schema_name varchar(128) NOT NULL,
  sequence_name varchar(128) NOT NULL,
  current_value bigint NULL,
  increment_by bigint NOT NULL DEFAULT 1,
  min_value bigint NULL,
  max_value bigint NULL,
  start_value bigint NOT NULL DEFAULT 1,
  cache_size bigint NULL,
  is_cycled bit NOT NULL DEFAULT 0,
  CONSTRAINT PK_{table} PRIMARY KEY (schema_name, sequence_name)
);";

// Session values live in SESSION_CONTEXT so currval and lastval are per connection.
const NEXTVAL_PROC: &str = "CREATE OR ALTER PROCEDURE {schema}.nextval
  @schema_name varchar(128), @sequence_name varchar(128), @value bigint OUTPUT
AS
BEGIN
  SET NOCOUNT ON;
  SET @value = NULL;
  UPDATE {schema}.{table}
     SET @value = current_value = CASE
           WHEN current_value IS NULL THEN start_value
           WHEN max_value IS NOT NULL AND current_value + increment_by > max_value AND is_cycled = 1
             THEN COALESCE(min_value, 1)
           WHEN min_value IS NOT NULL AND current_value + increment_by < min_value AND is_cycled = 1
             THEN COALESCE(max_value, start_value)
           ELSE current_value + increment_by END
   WHERE schema_name = @schema_name AND sequence_name = @sequence_name;
  IF @value IS NULL THROW 50001, 'sequence does not exist', 1;
  IF EXISTS (SELECT 1 FROM {schema}.{table}
              WHERE schema_name = @schema_name AND sequence_name = @sequence_name
                AND ((max_value IS NOT NULL AND current_value > max_value)
                  OR (min_value IS NOT NULL AND current_value < min_value)))
    THROW 50002, 'sequence reached its limit', 1;
  DECLARE @key sysname = CONCAT(N'currval.', @schema_name, N'.', @sequence_name);
  EXEC sp_set_session_context @key = @key, @value = @value;
  EXEC sp_set_session_context @key = N'lastval', @value = @value;
END";

const CURRVAL_PROC: &str = "CREATE OR ALTER PROCEDURE {schema}.currval
  @schema_name varchar(128), @sequence_name varchar(128), @value bigint OUTPUT
AS
BEGIN
  SET NOCOUNT ON;
  DECLARE @key sysname = CONCAT(N'currval.', @schema_name, N'.', @sequence_name);
  SET @value = CAST(SESSION_CONTEXT(@key) AS bigint);
  IF @value IS NULL THROW 50003, 'currval is not yet defined in this session', 1;
END";

const LASTVAL_PROC: &str = "CREATE OR ALTER PROCEDURE {schema}.lastval
  @value bigint OUTPUT
AS
BEGIN
  SET NOCOUNT ON;
  SET @value = CAST(SESSION_CONTEXT(N'lastval') AS bigint);
  IF @value IS NULL THROW 50004, 'lastval is not yet defined in this session', 1;
END";

const SETVAL_PROC: &str = "CREATE OR ALTER PROCEDURE {schema}.setval
  @schema_name varchar(128), @sequence_name varchar(128), @value bigint
AS
BEGIN
  SET NOCOUNT ON;
  UPDATE {schema}.{table} SET current_value = @value
   WHERE schema_name = @schema_name AND sequence_name = @sequence_name;
  IF @@ROWCOUNT = 0 THROW 50001, 'sequence does not exist', 1;
  DECLARE @key sysname = CONCAT(N'currval.', @schema_name, N'.', @sequence_name);
  EXEC sp_set_session_context @key = @key, @value = @value;
  EXEC sp_set_session_context @key = N'lastval', @value = @value;
END";

fn fill(template: &str) -> String {
    template
        .replace("{schema}", SEQUENCE_TABLE_SCHEMA)
        .replace("{table}", SEQUENCE_TABLE)
}

fn optional(value: Option<i64>) -> String {
    value.map_or_else(|| "NULL".to_string(), |v| v.to_string())
}

impl SqlServer {
    fn sequence_table(&self) -> String {
        self.quoter.table(SEQUENCE_TABLE_SCHEMA, SEQUENCE_TABLE)
    }

    fn sequence_key(schema: &str, name: &str) -> String {
        format!(
            "schema_name = {} AND sequence_name = {}",
            escape_string(schema),
            escape_string(name)
        )
    }
}

impl SequenceSql for SqlServer {
    fn create_sequence(&self, sequence: &Sequence) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "INSERT INTO {} (schema_name, sequence_name, increment_by, min_value, max_value, start_value, cache_size, is_cycled) VALUES ({}, {}, {}, {}, {}, {}, {}, {});",
            self.sequence_table(),
            escape_string(&sequence.schema),
            escape_string(&sequence.name),
            sequence.increment.unwrap_or(1),
            optional(sequence.min_value),
            optional(sequence.max_value),
            sequence.start_value.unwrap_or(1),
            optional(sequence.cache),
            u8::from(sequence.cycle)
        ))])
    }

    fn alter_sequence(&self, schema: &str, name: &str, changes: &SequenceChanges) -> RenderResult {
        let mut assignments = Vec::new();
        if let Some(increment) = changes.increment {
            assignments.push(format!("increment_by = {}", increment.unwrap_or(1)));
        }
        if let Some(min) = changes.min_value {
            assignments.push(format!("min_value = {}", optional(min)));
        }
        if let Some(max) = changes.max_value {
            assignments.push(format!("max_value = {}", optional(max)));
        }
        if let Some(start) = changes.start_value {
            assignments.push(format!("start_value = {}", start.unwrap_or(1)));
        }
        if let Some(cache) = changes.cache {
            assignments.push(format!("cache_size = {}", optional(cache)));
        }
        if let Some(cycle) = changes.cycle {
            assignments.push(format!("is_cycled = {}", u8::from(cycle)));
        }
        if assignments.is_empty() {
            return Ok(vec![]);
        }
        Ok(vec![RenderedSql::new(format!(
            "UPDATE {} SET {} WHERE {};",
            self.sequence_table(),
            assignments.join(", "),
            Self::sequence_key(schema, name)
        ))])
    }

    fn drop_sequence(&self, schema: &str, name: &str) -> RenderResult {
        Ok(vec![RenderedSql::destructive(format!(
            "DELETE FROM {} WHERE {};",
            self.sequence_table(),
            Self::sequence_key(schema, name)
        ))])
    }

    fn install_sequence_support(&self) -> RenderResult {
        let mut out = vec![RenderedSql::new(fill(SEQUENCE_TABLE_DDL))];
        for procedure in [NEXTVAL_PROC, CURRVAL_PROC, LASTVAL_PROC, SETVAL_PROC] {
            out.push(RenderedSql::new(BATCH_SEPARATOR.to_string()));
            out.push(RenderedSql::new(fill(procedure)));
        }
        out.push(RenderedSql::new(BATCH_SEPARATOR.to_string()));
        Ok(out)
    }
}

impl TypeSql for SqlServer {
    fn create_type(&self, enum_type: &EnumType) -> RenderResult {
        Ok(vec![self.comment(&format!(
            "enum {} is enforced by CHECK constraints on its columns",
            enum_type.qualified_name()
        ))])
    }

    fn drop_type(&self, name: &QualifiedName) -> RenderResult {
        Ok(vec![self.comment(&format!(
            "enum {name} removed; its CHECK constraints go with its columns"
        ))])
    }

    fn relax_column(
        &self,
        schema: &str,
        table: &str,
        column: &str,
        _has_default: bool,
    ) -> RenderResult {
        Err(Unsupported::new(format!(
            "{schema}.{table}.{column} is a varchar column; enum changes alter its CHECK constraint"
        )))
    }

    fn restore_column(
        &self,
        schema: &str,
        table: &str,
        column: &Column,
        _type_name: &QualifiedName,
    ) -> RenderResult {
        Err(Unsupported::new(format!(
            "{schema}.{table}.{} is a varchar column; enum changes alter its CHECK constraint",
            column.name
        )))
    }
}
