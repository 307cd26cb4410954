use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::AppError;
use crate::features::auth::guards::{RequireAdmin, RequireChemistry, RequireMetrology};
use crate::features::dashboard::dtos::*;
use crate::features::dashboard::services::DashboardService;
use crate::shared::expiration::ExpirationClassifier;
use crate::shared::types::ApiResponse;

/// Administrator dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard/admin",
    tag = "dashboard",
    responses(
        (status = 200, description = "Administrator dashboard", body = ApiResponse<AdminDashboardDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_admin_dashboard(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<AdminDashboardDto>>, AppError> {
    let data = service.admin(&ExpirationClassifier::today()).await?;
    Ok(Json(ApiResponse::success(Some(data), None, None)))
}

/// Chemistry dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard/chemistry",
    tag = "dashboard",
    responses(
        (status = 200, description = "Chemistry dashboard", body = ApiResponse<ChemistryDashboardDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Chemistry access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_chemistry_dashboard(
    RequireChemistry(_user): RequireChemistry,
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<ChemistryDashboardDto>>, AppError> {
    let data = service.chemistry(&ExpirationClassifier::today()).await?;
    Ok(Json(ApiResponse::success(Some(data), None, None)))
}

/// Metrology dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard/metrology",
    tag = "dashboard",
    responses(
        (status = 200, description = "Metrology dashboard", body = ApiResponse<MetrologyDashboardDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Metrology access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_metrology_dashboard(
    RequireMetrology(_user): RequireMetrology,
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<MetrologyDashboardDto>>, AppError> {
    let data = service.metrology(&ExpirationClassifier::today()).await?;
    Ok(Json(ApiResponse::success(Some(data), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;
    use crate::features::dashboard::routes;
    use crate::features::users::UserService;
    use crate::shared::test_helpers::{lazy_pool, user_with_roles, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;

    fn server(roles: &[Role]) -> TestServer {
        let pool = lazy_pool();
        let users = Arc::new(UserService::new(pool.clone()));
        let service = Arc::new(DashboardService::new(pool, users));
        TestServer::new(with_user(routes(service), user_with_roles(roles))).unwrap()
    }

    #[tokio::test]
    async fn test_each_dashboard_enforces_its_area() {
        let chemist = server(&[Role::Chemist]);
        chemist
            .get("/api/dashboard/admin")
            .expect_failure()
            .await
            .assert_status(StatusCode::FORBIDDEN);
        chemist
            .get("/api/dashboard/metrology")
            .expect_failure()
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let metrologist = server(&[Role::Metrologist]);
        metrologist
            .get("/api/dashboard/chemistry")
            .expect_failure()
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
