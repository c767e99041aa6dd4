use super::Postgres;
use crate::catalog::grant::Privilege;
use crate::diff::operations::GrantTarget;
use crate::render::{GrantSql, RenderResult, RenderedSql, privilege_list};

impl Postgres {
    fn grant_object(&self, target: &GrantTarget) -> String {
        let q = &self.quoter;
        match target {
            GrantTarget::Schema { name } => format!("SCHEMA {}", q.schema(name)),
            GrantTarget::Table { schema, name, .. } => format!("TABLE {}", q.table(schema, name)),
            GrantTarget::View { schema, name } => {
                format!("TABLE {}", q.qualified_object(schema, name))
            }
            GrantTarget::Sequence { schema, name } => {
                format!("SEQUENCE {}", q.qualified_object(schema, name))
            }
            GrantTarget::Function {
                schema,
                name,
                arguments,
                procedure,
            } => format!(
                "{} {}({})",
                if *procedure { "PROCEDURE" } else { "FUNCTION" },
                q.qualified_object(schema, name),
                arguments
            ),
        }
    }

    fn owner_object(&self, target: &GrantTarget) -> String {
        match target {
            GrantTarget::View { schema, name } => {
                format!("VIEW {}", self.quoter.qualified_object(schema, name))
            }
            other => self.grant_object(other),
        }
    }

    /// Implicit sequences behind serial columns; writers need them too.
    fn serial_sequences(&self, target: &GrantTarget, privileges: &[Privilege]) -> Vec<String> {
        let writes = privileges
            .iter()
            .any(|p| matches!(p, Privilege::Insert | Privilege::Update | Privilege::All));
        match target {
            GrantTarget::Table {
                schema,
                name,
                serial_columns,
            } if writes => serial_columns
                .iter()
                .map(|c| {
                    self.quoter
                        .qualified_object(schema, &format!("{name}_{c}_seq"))
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl GrantSql for Postgres {
    fn grant(
        &self,
        target: &GrantTarget,
        roles: &[String],
        privileges: &[Privilege],
        with_grant_option: bool,
    ) -> RenderResult {
        let suffix = if with_grant_option {
            " WITH GRANT OPTION"
        } else {
            ""
        };
        let roles = roles.join(", ");
        let mut out = vec![RenderedSql::new(format!(
            "GRANT {} ON {} TO {}{};",
            privilege_list(privileges),
            self.grant_object(target),
            roles,
            suffix
        ))];
        for sequence in self.serial_sequences(target, privileges) {
            out.push(RenderedSql::new(format!(
                "GRANT USAGE, SELECT ON SEQUENCE {sequence} TO {roles}{suffix};"
            )));
        }
        Ok(out)
    }

    fn revoke(
        &self,
        target: &GrantTarget,
        roles: &[String],
        privileges: &[Privilege],
    ) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "REVOKE {} ON {} FROM {};",
            privilege_list(privileges),
            self.grant_object(target),
            roles.join(", ")
        ))])
    }

    fn set_owner(&self, target: &GrantTarget, owner: &str) -> RenderResult {
        Ok(vec![RenderedSql::new(format!(
            "ALTER {} OWNER TO {};",
            self.owner_object(target),
            owner
        ))])
    }
}

#[cfg(test)]
mod tests {
    use super::super::create_test_dialect;
    use super::*;

    fn create_test_target() -> GrantTarget {
        GrantTarget::Table {
            schema: "app".to_string(),
            name: "users".to_string(),
            serial_columns: vec!["id".to_string()],
        }
    }

    #[test]
    fn test_grant_cascades_to_serial_sequence() {
        let pg = create_test_dialect();
        let sql = pg
            .grant(
                &create_test_target(),
                &["app_user".to_string()],
                &[Privilege::Select, Privilege::Insert],
                false,
            )
            .unwrap();
        assert_eq!(sql[0].sql, "GRANT SELECT, INSERT ON TABLE app.users TO app_user;");
        assert_eq!(
            sql[1].sql,
            "GRANT USAGE, SELECT ON SEQUENCE app.users_id_seq TO app_user;"
        );
    }

    #[test]
    fn test_read_only_grant_skips_sequences() {
        let pg = create_test_dialect();
        let sql = pg
            .grant(
                &create_test_target(),
                &["reader".to_string()],
                &[Privilege::Select],
                true,
            )
            .unwrap();
        assert_eq!(sql.len(), 1);
        assert_eq!(
            sql[0].sql,
            "GRANT SELECT ON TABLE app.users TO reader WITH GRANT OPTION;"
        );
    }

    #[test]
    fn test_owner_of_view() {
        let pg = create_test_dialect();
        let target = GrantTarget::View {
            schema: "app".to_string(),
            name: "active_users".to_string(),
        };
        let sql = pg.set_owner(&target, "deployer").unwrap();
        assert_eq!(sql[0].sql, "ALTER VIEW app.active_users OWNER TO deployer;");
    }
}
