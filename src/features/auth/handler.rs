use crate::core::error::Result;
use crate::features::auth::dto::MeResponseDto;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::types::ApiResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user retrieved successfully", body = ApiResponse<MeResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(user: AuthenticatedUser) -> Result<Json<ApiResponse<MeResponseDto>>> {
    Ok(Json(ApiResponse::success(Some(user.into()), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;
    use crate::shared::test_helpers::{user_with_roles, with_user};
    use axum::{routing::get, Router};
    use axum_test::TestServer;
    use serde_json::Value;

    #[tokio::test]
    async fn test_get_me_returns_home_path() {
        let app = with_user(
            Router::new().route("/api/auth/me", get(get_me)),
            user_with_roles(&[Role::Metrologist]),
        );
        let server = TestServer::new(app).unwrap();

        let body: Value = server.get("/api/auth/me").await.json();

        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["roles"][0], "metrologist");
        assert_eq!(body["data"]["home_path"], "/metrology");
    }
}
