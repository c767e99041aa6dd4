use super::SqlServer;
use crate::catalog::grant::Privilege;
use crate::diff::operations::GrantTarget;
use crate::render::{Dialect, GrantSql, RenderResult, RenderedSql, Unsupported};
use itertools::Itertools;

const TABLE_PRIVILEGES: [&str; 5] = ["SELECT", "INSERT", "UPDATE", "DELETE", "REFERENCES"];

impl SqlServer {
    fn securable(&self, target: &GrantTarget) -> Option<String> {
        let q = &self.quoter;
        match target {
            GrantTarget::Schema { name } => Some(format!("SCHEMA::{}", q.schema(name))),
            GrantTarget::Table { schema, name, .. } => Some(q.table(schema, name)),
            GrantTarget::View { schema, name } | GrantTarget::Function { schema, name, .. } => {
                Some(q.qualified_object(schema, name))
            }
            // emulated sequences have no securable of their own
            GrantTarget::Sequence { .. } => None,
        }
    }

    fn privilege_keywords(
        target: &GrantTarget,
        privileges: &[Privilege],
    ) -> Result<Vec<&'static str>, Unsupported> {
        let mut out = Vec::new();
        for privilege in privileges {
            let mapped: &[&'static str] = match (target, privilege) {
                (GrantTarget::Schema { .. }, Privilege::Usage) => &["SELECT"],
                (GrantTarget::Schema { .. }, Privilege::Create) => &["ALTER"],
                (GrantTarget::Function { .. }, Privilege::Execute | Privilege::All) => {
                    &["EXECUTE"]
                }
                (GrantTarget::Table { .. } | GrantTarget::View { .. }, Privilege::All) => {
                    &TABLE_PRIVILEGES
                }
                (
                    _,
                    Privilege::Select
                    | Privilege::Insert
                    | Privilege::Update
                    | Privilege::Delete
                    | Privilege::References,
                ) => &[],
                (_, other) => {
                    return Err(Unsupported::new(format!(
                        "privilege {other} on {} has no SQL Server equivalent",
                        target.db_object_id()
                    )));
                }
            };
            if mapped.is_empty() {
                out.push(privilege.keyword());
            } else {
                out.extend_from_slice(mapped);
            }
        }
        Ok(out.into_iter().unique().collect())
    }
}

impl GrantSql for SqlServer {
    fn grant(
        &self,
        target: &GrantTarget,
        roles: &[String],
        privileges: &[Privilege],
        with_grant_option: bool,
    ) -> RenderResult {
        let Some(securable) = self.securable(target) else {
            return Ok(vec![self.comment(&format!(
                "{} is a row in the sequence table; grant on the table instead",
                target.db_object_id()
            ))]);
        };
        Ok(vec![RenderedSql::new(format!(
            "GRANT {} ON {} TO {}{};",
            Self::privilege_keywords(target, privileges)?.join(", "),
            securable,
            roles.join(", "),
            if with_grant_option {
                " WITH GRANT OPTION"
            } else {
                ""
            }
        ))])
    }

    fn revoke(
        &self,
        target: &GrantTarget,
        roles: &[String],
        privileges: &[Privilege],
    ) -> RenderResult {
        let Some(securable) = self.securable(target) else {
            return Ok(vec![]);
        };
        Ok(vec![RenderedSql::new(format!(
            "REVOKE {} ON {} FROM {};",
            Self::privilege_keywords(target, privileges)?.join(", "),
            securable,
            roles.join(", ")
        ))])
    }

    fn set_owner(&self, target: &GrantTarget, owner: &str) -> RenderResult {
        let securable = match target {
            GrantTarget::Schema { name } => format!("SCHEMA::{}", self.quoter.schema(name)),
            GrantTarget::Sequence { .. } => return Ok(vec![]),
            other => format!("OBJECT::{}", self.securable(other).unwrap_or_default()),
        };
        Ok(vec![RenderedSql::new(format!(
            "ALTER AUTHORIZATION ON {securable} TO {owner};"
        ))])
    }
}
