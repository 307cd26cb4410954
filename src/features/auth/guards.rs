//! Role-based authorization guards.
//!
//! Each area of the system has an allowlist of roles:
//! - admin: every area, plus the user directory and batch import
//! - metrologist: calibration certificates and the metrology dashboard
//! - chemist: FISPQ safety sheets, emergency sheets and the chemistry dashboard
//!
//! Guards read the user inserted by the auth middleware and reject with
//! 401 when it is absent and 403 when the role does not match.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

fn current_user(parts: &Parts) -> Result<&AuthenticatedUser, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))
}

/// Guard for admin-only operations.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)?;

        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(RequireAdmin(user.clone()))
    }
}

/// Guard for the metrology area (admin or metrologist).
pub struct RequireMetrology(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireMetrology
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)?;

        if !user.has_metrology_access() {
            return Err(AppError::Forbidden(
                "Metrology access required".to_string(),
            ));
        }

        Ok(RequireMetrology(user.clone()))
    }
}

/// Guard for the chemistry area (admin or chemist).
pub struct RequireChemistry(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireChemistry
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)?;

        if !user.has_chemistry_access() {
            return Err(AppError::Forbidden(
                "Chemistry access required".to_string(),
            ));
        }

        Ok(RequireChemistry(user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;
    use crate::shared::test_helpers::{user_with_roles, with_user};
    use axum::{http::StatusCode, routing::get, Router};
    use axum_test::TestServer;

    async fn admin_only(RequireAdmin(user): RequireAdmin) -> String {
        user.sub
    }

    async fn metrology_only(RequireMetrology(user): RequireMetrology) -> String {
        user.sub
    }

    async fn chemistry_only(RequireChemistry(user): RequireChemistry) -> String {
        user.sub
    }

    fn router() -> Router {
        Router::new()
            .route("/admin", get(admin_only))
            .route("/metrology", get(metrology_only))
            .route("/chemistry", get(chemistry_only))
    }

    fn server_for(roles: &[Role]) -> TestServer {
        TestServer::new(with_user(router(), user_with_roles(roles))).unwrap()
    }

    #[tokio::test]
    async fn test_missing_user_is_unauthorized() {
        let server = TestServer::new(router()).unwrap();

        server
            .get("/admin")
            .expect_failure()
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_reaches_every_area() {
        let server = server_for(&[Role::Admin]);

        for path in ["/admin", "/metrology", "/chemistry"] {
            server.get(path).await.assert_status_ok();
        }
    }

    #[tokio::test]
    async fn test_metrologist_is_limited_to_metrology() {
        let server = server_for(&[Role::Metrologist]);

        server.get("/metrology").await.assert_status_ok();
        server
            .get("/chemistry")
            .expect_failure()
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .get("/admin")
            .expect_failure()
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_chemist_is_limited_to_chemistry() {
        let server = server_for(&[Role::Chemist]);

        server.get("/chemistry").await.assert_status_ok();
        server
            .get("/metrology")
            .expect_failure()
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_user_without_roles_is_forbidden() {
        let server = server_for(&[]);

        server
            .get("/chemistry")
            .expect_failure()
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
