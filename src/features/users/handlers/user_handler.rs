use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::{CreateUserDto, UpdateUserDto, UserListQuery, UserResponseDto};
use crate::features::users::services::UserService;
use crate::shared::types::{ApiResponse, Meta};

/// Get the caller's own profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Own profile", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "No profile exists for this user")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_my_profile(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let profile = service.get_own(&user.sub, user.linkable_email()).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}

/// List user profiles (paginated, ordered by name)
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "users",
    params(UserListQuery),
    responses(
        (status = 200, description = "List of user profiles", body = ApiResponse<Vec<UserResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_users(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<UserService>>,
    Query(params): Query<UserListQuery>,
) -> Result<Json<ApiResponse<Vec<UserResponseDto>>>> {
    let (items, total) = service.list(&params).await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Get a user profile
#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    tag = "users",
    params(
        ("id" = Uuid, Path, description = "User profile ID")
    ),
    responses(
        (status = 200, description = "User profile", body = ApiResponse<UserResponseDto>),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_user(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(user), None, None)))
}

/// Create a user profile
#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User profile created", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 409, description = "Email already registered")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_user(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<CreateUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.create(&dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(user),
            Some("User created".to_string()),
            None,
        )),
    ))
}

/// Update name, role and registration number of a user profile
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    tag = "users",
    params(
        ("id" = Uuid, Path, description = "User profile ID")
    ),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User profile updated", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_user(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateUserDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.update(id, &dto).await?;
    Ok(Json(ApiResponse::success(
        Some(user),
        Some("User updated".to_string()),
        None,
    )))
}

/// Delete a user profile
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "users",
    params(
        ("id" = Uuid, Path, description = "User profile ID")
    ),
    responses(
        (status = 200, description = "User profile deleted"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_user(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("User deleted".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;
    use crate::features::users::routes;
    use crate::shared::test_helpers::{lazy_pool, user_with_roles, with_user};
    use axum_test::TestServer;
    use serde_json::json;

    fn server(roles: &[Role]) -> TestServer {
        let service = Arc::new(UserService::new(lazy_pool()));
        TestServer::new(with_user(routes(service), user_with_roles(roles))).unwrap()
    }

    #[tokio::test]
    async fn test_directory_requires_admin() {
        let server = server(&[Role::Chemist]);

        server
            .get("/api/admin/users")
            .expect_failure()
            .await
            .assert_status(StatusCode::FORBIDDEN);

        server
            .post("/api/admin/users")
            .json(&json!({ "email": "a@b.test", "name": "A", "role": "chemist" }))
            .expect_failure()
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_validates_before_storing() {
        let server = server(&[Role::Admin]);

        let response = server
            .post("/api/admin/users")
            .json(&json!({ "email": "nope", "name": "Ana", "role": "chemist" }))
            .expect_failure()
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_invalid_id_is_rejected() {
        let server = server(&[Role::Admin]);

        server
            .get("/api/admin/users/not-a-uuid")
            .expect_failure()
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
