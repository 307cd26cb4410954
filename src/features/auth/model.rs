use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::shared::constants::{ROLE_ADMIN, ROLE_CHEMIST, ROLE_METROLOGIST};

/// Role a user holds in the document system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "administrador")]
    Admin,
    #[serde(alias = "metrologista")]
    Metrologist,
    #[serde(alias = "quimico", alias = "químico")]
    Chemist,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Metrologist => ROLE_METROLOGIST,
            Role::Chemist => ROLE_CHEMIST,
        }
    }

    /// Parse a role name, accepting the Portuguese names stored by older clients
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "admin" | "administrador" => Some(Role::Admin),
            "metrologist" | "metrologista" => Some(Role::Metrologist),
            "chemist" | "quimico" | "químico" => Some(Role::Chemist),
            _ => None,
        }
    }

    /// Landing area of the web client for this role
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Metrologist => "/metrology",
            Role::Chemist => "/fispq",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| format!("Unknown role '{}'", s))
    }
}

/// Home path for users without any recognised role
pub const UNAUTHORIZED_HOME_PATH: &str = "/unauthorized";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    pub roles: Vec<Role>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// Admins and metrologists manage calibration certificates
    pub fn has_metrology_access(&self) -> bool {
        self.is_admin() || self.has_role(Role::Metrologist)
    }

    /// Admins and chemists manage safety and emergency sheets
    pub fn has_chemistry_access(&self) -> bool {
        self.is_admin() || self.has_role(Role::Chemist)
    }

    /// Highest-privilege role held, admin first
    pub fn primary_role(&self) -> Option<Role> {
        [Role::Admin, Role::Metrologist, Role::Chemist]
            .into_iter()
            .find(|role| self.has_role(*role))
    }

    /// Email usable to claim a pre-provisioned profile; only a verified one qualifies
    pub fn linkable_email(&self) -> Option<&str> {
        if self.email_verified {
            self.email.as_deref()
        } else {
            None
        }
    }

    pub fn home_path(&self) -> &'static str {
        self.primary_role()
            .map(|role| role.home_path())
            .unwrap_or(UNAUTHORIZED_HOME_PATH)
    }
}

/// Normalise raw role names, dropping unknown ones and duplicates
pub fn parse_roles<I, S>(raw: I) -> Vec<Role>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut roles = Vec::new();
    for name in raw {
        match Role::parse(name.as_ref()) {
            Some(role) if !roles.contains(&role) => roles.push(role),
            Some(_) => {}
            None => tracing::debug!("Ignoring unknown role '{}'", name.as_ref()),
        }
    }
    roles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: Vec<Role>) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "user-1".to_string(),
            email: None,
            email_verified: false,
            roles,
        }
    }

    #[test]
    fn test_role_parse_accepts_aliases() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse(" Administrador "), Some(Role::Admin));
        assert_eq!(Role::parse("metrologista"), Some(Role::Metrologist));
        assert_eq!(Role::parse("quimico"), Some(Role::Chemist));
        assert_eq!(Role::parse("Químico"), Some(Role::Chemist));
        assert_eq!(Role::parse("citizen"), None);
        assert!("operator".parse::<Role>().is_err());
    }

    #[test]
    fn test_parse_roles_dedupes_and_drops_unknown() {
        let roles = parse_roles(["admin", "administrador", "guest", "quimico"]);
        assert_eq!(roles, vec![Role::Admin, Role::Chemist]);
    }

    #[test]
    fn test_area_access() {
        let admin = user(vec![Role::Admin]);
        assert!(admin.has_metrology_access());
        assert!(admin.has_chemistry_access());

        let metrologist = user(vec![Role::Metrologist]);
        assert!(metrologist.has_metrology_access());
        assert!(!metrologist.has_chemistry_access());

        let chemist = user(vec![Role::Chemist]);
        assert!(!chemist.has_metrology_access());
        assert!(chemist.has_chemistry_access());
    }

    #[test]
    fn test_home_path_follows_primary_role() {
        assert_eq!(user(vec![Role::Chemist, Role::Admin]).home_path(), "/admin");
        assert_eq!(user(vec![Role::Metrologist]).home_path(), "/metrology");
        assert_eq!(user(vec![Role::Chemist]).home_path(), "/fispq");
        assert_eq!(user(vec![]).home_path(), UNAUTHORIZED_HOME_PATH);
    }

    #[test]
    fn test_only_verified_email_is_linkable() {
        let mut unverified = user(vec![]);
        unverified.email = Some("admin@plant.test".to_string());
        assert_eq!(unverified.linkable_email(), None);

        let verified = AuthenticatedUser {
            email_verified: true,
            ..unverified
        };
        assert_eq!(verified.linkable_email(), Some("admin@plant.test"));

        let no_email = AuthenticatedUser {
            email_verified: true,
            ..user(vec![])
        };
        assert_eq!(no_email.linkable_email(), None);
    }

    #[test]
    fn test_role_deserializes_aliases() {
        let role: Role = serde_json::from_str("\"metrologista\"").unwrap();
        assert_eq!(role, Role::Metrologist);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Role::Metrologist).unwrap(),
            "\"metrologist\""
        );
    }
}
