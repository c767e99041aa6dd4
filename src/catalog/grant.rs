use crate::constants::{ROLE_APPLICATION, ROLE_OWNER, ROLE_PUBLIC, ROLE_READONLY, ROLE_REPLICATION};
use crate::error::{DiffError, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Privilege {
    Select,
    Insert,
    Update,
    Delete,
    Truncate,
    References,
    Trigger,
    Usage,
    Execute,
    Create,
    Connect,
    Temporary,
    All,
}

impl Privilege {
    pub fn keyword(&self) -> &'static str {
        match self {
            Privilege::Select => "SELECT",
            Privilege::Insert => "INSERT",
            Privilege::Update => "UPDATE",
            Privilege::Delete => "DELETE",
            Privilege::Truncate => "TRUNCATE",
            Privilege::References => "REFERENCES",
            Privilege::Trigger => "TRIGGER",
            Privilege::Usage => "USAGE",
            Privilege::Execute => "EXECUTE",
            Privilege::Create => "CREATE",
            Privilege::Connect => "CONNECT",
            Privilege::Temporary => "TEMPORARY",
            Privilege::All => "ALL",
        }
    }
}

impl FromStr for Privilege {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "SELECT" => Ok(Privilege::Select),
            "INSERT" => Ok(Privilege::Insert),
            "UPDATE" => Ok(Privilege::Update),
            "DELETE" => Ok(Privilege::Delete),
            "TRUNCATE" => Ok(Privilege::Truncate),
            "REFERENCES" => Ok(Privilege::References),
            "TRIGGER" => Ok(Privilege::Trigger),
            "USAGE" => Ok(Privilege::Usage),
            "EXECUTE" => Ok(Privilege::Execute),
            "CREATE" => Ok(Privilege::Create),
            "CONNECT" => Ok(Privilege::Connect),
            "TEMP" | "TEMPORARY" => Ok(Privilege::Temporary),
            "ALL" | "ALL PRIVILEGES" => Ok(Privilege::All),
            _ => Err(DiffError::unknown("grant operation", s)),
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantAction {
    Grant,
    Revoke,
}

/// A `<grant>` or `<revoke>` element. Roles may be macro roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub action: GrantAction,
    pub roles: Vec<String>,
    pub privileges: Vec<Privilege>,
    pub with_grant_option: bool,
}

/// One resolved (role, privilege) pair; the unit permission diffs work on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GrantEntry {
    pub role: String,
    pub privilege: Privilege,
    pub with_grant_option: bool,
}

/// Role names that macro roles resolve to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet {
    pub owner: Option<String>,
    pub application: Option<String>,
    pub replication: Option<String>,
    pub readonly: Option<String>,
    pub custom: Vec<String>,
}

impl RoleSet {
    pub fn resolve(&self, role: &str) -> Result<String> {
        let role = role.trim();
        let resolved = match role {
            ROLE_OWNER => self.owner.as_ref(),
            ROLE_APPLICATION => self.application.as_ref(),
            ROLE_REPLICATION => self.replication.as_ref(),
            ROLE_READONLY => self.readonly.as_ref(),
            ROLE_PUBLIC => return Ok(ROLE_PUBLIC.to_string()),
            other => return Ok(other.to_string()),
        };
        resolved
            .cloned()
            .ok_or_else(|| DiffError::not_found("role", role))
    }
}

/// Net set of granted privileges after applying every grant and revoke in order.
pub fn effective_grants(grants: &[Grant], roles: &RoleSet) -> Result<BTreeSet<GrantEntry>> {
    let mut out = BTreeSet::new();
    for grant in grants {
        for role in &grant.roles {
            let role = roles.resolve(role)?;
            for privilege in &grant.privileges {
                match grant.action {
                    GrantAction::Grant => {
                        out.insert(GrantEntry {
                            role: role.clone(),
                            privilege: *privilege,
                            with_grant_option: grant.with_grant_option,
                        });
                    }
                    GrantAction::Revoke => {
                        out.retain(|e| !(e.role == role && e.privilege == *privilege));
                    }
                }
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_roles() -> RoleSet {
        RoleSet {
            owner: Some("deployer".to_string()),
            application: Some("app_user".to_string()),
            replication: None,
            readonly: Some("reporting".to_string()),
            custom: vec![],
        }
    }

    #[test]
    fn test_macro_roles_resolve() {
        let roles = create_test_roles();
        assert_eq!(roles.resolve("ROLE_APPLICATION").unwrap(), "app_user");
        assert_eq!(roles.resolve("PUBLIC").unwrap(), "PUBLIC");
        assert_eq!(roles.resolve("someone").unwrap(), "someone");
        assert!(roles.resolve("ROLE_SLONY").is_err());
    }

    #[test]
    fn test_effective_grants_apply_revokes() {
        let grants = vec![
            Grant {
                action: GrantAction::Grant,
                roles: vec!["ROLE_APPLICATION".to_string()],
                privileges: vec![Privilege::Select, Privilege::Insert],
                with_grant_option: false,
            },
            Grant {
                action: GrantAction::Revoke,
                roles: vec!["ROLE_APPLICATION".to_string()],
                privileges: vec![Privilege::Insert],
                with_grant_option: false,
            },
        ];
        let set = effective_grants(&grants, &create_test_roles()).unwrap();
        assert_eq!(set.len(), 1);
        let entry = set.iter().next().unwrap();
        assert_eq!(entry.role, "app_user");
        assert_eq!(entry.privilege, Privilege::Select);
    }

    #[test]
    fn test_unknown_privilege_is_rejected() {
        assert!("SELECT".parse::<Privilege>().is_ok());
        assert!("all privileges".parse::<Privilege>().is_ok());
        assert!("YODEL".parse::<Privilege>().is_err());
    }
}
