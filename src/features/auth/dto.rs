use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::model::{AuthenticatedUser, Role};

/// DTO for /auth/me response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub sub: String,
    pub email: Option<String>,
    pub roles: Vec<Role>,
    /// Area of the web client this user lands on after login
    #[schema(example = "/fispq")]
    pub home_path: String,
}

impl From<AuthenticatedUser> for MeResponseDto {
    fn from(user: AuthenticatedUser) -> Self {
        let home_path = user.home_path().to_string();
        Self {
            sub: user.sub,
            email: user.email,
            roles: user.roles,
            home_path,
        }
    }
}
