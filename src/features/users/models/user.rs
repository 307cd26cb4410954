use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::auth::model::Role;

/// Database model for a user profile
#[derive(Debug, Clone, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub auth_subject: Option<String>,
    pub email: String,
    pub name: String,
    pub role: String,
    pub registration_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Stored role, `None` when the column holds an unknown value
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: &str) -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            auth_subject: None,
            email: "ana@plant.test".to_string(),
            name: "Ana".to_string(),
            role: role.to_string(),
            registration_number: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_parses_stored_value() {
        assert_eq!(profile("metrologist").role(), Some(Role::Metrologist));
        assert_eq!(profile("quimico").role(), Some(Role::Chemist));
        assert_eq!(profile("auditor").role(), None);
    }
}
