use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::auth::model::Role;
use crate::features::users::models::UserProfile;
use crate::shared::types::{default_page, default_page_size, PaginationQuery};

/// Request DTO for creating a user profile
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(email(message = "Email must be a valid address"))]
    #[schema(example = "ana.souza@plant.example")]
    pub email: String,

    #[validate(length(min = 1, max = 128, message = "Name must be 1-128 characters"))]
    pub name: String,

    /// admin, metrologist or chemist
    pub role: Role,

    #[validate(length(max = 32, message = "Registration number must not exceed 32 characters"))]
    pub registration_number: Option<String>,
}

/// Request DTO for updating a user profile
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, max = 128, message = "Name must be 1-128 characters"))]
    pub name: String,

    pub role: Role,

    #[validate(length(max = 32, message = "Registration number must not exceed 32 characters"))]
    pub registration_number: Option<String>,
}

/// Response DTO for a user profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub registration_number: Option<String>,
    /// Whether the profile is already linked to a login
    pub linked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfile> for UserResponseDto {
    fn from(p: UserProfile) -> Self {
        Self {
            id: p.id,
            linked: p.auth_subject.is_some(),
            email: p.email,
            name: p.name,
            role: p.role,
            registration_number: p.registration_number,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Query params for listing user profiles
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct UserListQuery {
    /// Filter by role
    pub role: Option<Role>,
    /// Substring match on name or email
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl UserListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;
    use serde_json::json;

    #[test]
    fn test_create_user_accepts_role_alias() {
        let email: String = SafeEmail().fake();
        let name: String = Name().fake();
        let dto: CreateUserDto = serde_json::from_value(json!({
            "email": email,
            "name": name,
            "role": "administrador"
        }))
        .unwrap();

        assert_eq!(dto.role, Role::Admin);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_create_user_rejects_bad_email_and_blank_name() {
        let dto = CreateUserDto {
            email: "not-an-email".to_string(),
            name: String::new(),
            role: Role::Chemist,
            registration_number: None,
        };

        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("name"));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let result: std::result::Result<UpdateUserDto, _> =
            serde_json::from_value(json!({ "name": "Ana", "role": "auditor" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_response_reports_link_state() {
        let profile = UserProfile {
            id: Uuid::new_v4(),
            auth_subject: Some("sub-1".to_string()),
            email: "ana@plant.test".to_string(),
            name: "Ana".to_string(),
            role: "chemist".to_string(),
            registration_number: Some("CRQ-123".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let dto = UserResponseDto::from(profile);
        assert!(dto.linked);
        assert_eq!(dto.role, "chemist");
    }
}
