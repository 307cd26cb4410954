use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::guards::RequireChemistry;
use crate::features::emergency_sheets::dtos::{
    EmergencySheetFormDto, EmergencySheetFormSchema, EmergencySheetListQuery,
    EmergencySheetResponseDto, EmergencySheetStatisticsDto,
};
use crate::features::emergency_sheets::models::EmergencySheetFields;
use crate::features::emergency_sheets::services::EmergencySheetService;
use crate::features::files::{read_document_form, UploadedFile};
use crate::shared::expiration::ExpirationClassifier;
use crate::shared::types::{ApiResponse, Meta};

async fn read_sheet_form(
    multipart: Multipart,
) -> Result<(EmergencySheetFields, Option<UploadedFile>)> {
    let mut form = read_document_form(multipart).await?;
    let dto: EmergencySheetFormDto = form.deserialize()?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Ok((dto.into_fields()?, form.take_file()))
}

/// List emergency sheets (filtered, paginated, newest first)
#[utoipa::path(
    get,
    path = "/api/emergency-sheets",
    tag = "emergency-sheets",
    params(EmergencySheetListQuery),
    responses(
        (status = 200, description = "List of emergency sheets", body = ApiResponse<Vec<EmergencySheetResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Chemistry access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_emergency_sheets(
    RequireChemistry(_user): RequireChemistry,
    State(service): State<Arc<EmergencySheetService>>,
    Query(query): Query<EmergencySheetListQuery>,
) -> Result<Json<ApiResponse<Vec<EmergencySheetResponseDto>>>> {
    let (items, total) = service
        .list(&query, &ExpirationClassifier::today())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Get an emergency sheet
#[utoipa::path(
    get,
    path = "/api/emergency-sheets/{id}",
    tag = "emergency-sheets",
    params(
        ("id" = Uuid, Path, description = "Emergency sheet ID")
    ),
    responses(
        (status = 200, description = "Emergency sheet found", body = ApiResponse<EmergencySheetResponseDto>),
        (status = 403, description = "Forbidden - Chemistry access required"),
        (status = 404, description = "Emergency sheet not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_emergency_sheet(
    RequireChemistry(_user): RequireChemistry,
    State(service): State<Arc<EmergencySheetService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EmergencySheetResponseDto>>> {
    let sheet = service.get(id, &ExpirationClassifier::today()).await?;
    Ok(Json(ApiResponse::success(Some(sheet), None, None)))
}

/// Create an emergency sheet with its file
#[utoipa::path(
    post,
    path = "/api/emergency-sheets",
    tag = "emergency-sheets",
    request_body(content = EmergencySheetFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Emergency sheet created", body = ApiResponse<EmergencySheetResponseDto>),
        (status = 400, description = "Validation error or missing file"),
        (status = 403, description = "Forbidden - Chemistry access required"),
        (status = 413, description = "File too large")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_emergency_sheet(
    RequireChemistry(user): RequireChemistry,
    State(service): State<Arc<EmergencySheetService>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<EmergencySheetResponseDto>>)> {
    let (fields, file) = read_sheet_form(multipart).await?;
    let file = file.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    let sheet = service
        .create(fields, file, &user.sub, &ExpirationClassifier::today())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(sheet),
            Some("Emergency sheet created".to_string()),
            None,
        )),
    ))
}

/// Replace an emergency sheet's fields and optionally its file
#[utoipa::path(
    put,
    path = "/api/emergency-sheets/{id}",
    tag = "emergency-sheets",
    params(
        ("id" = Uuid, Path, description = "Emergency sheet ID")
    ),
    request_body(content = EmergencySheetFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Emergency sheet updated", body = ApiResponse<EmergencySheetResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Chemistry access required"),
        (status = 404, description = "Emergency sheet not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_emergency_sheet(
    RequireChemistry(_user): RequireChemistry,
    State(service): State<Arc<EmergencySheetService>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<EmergencySheetResponseDto>>> {
    let (fields, file) = read_sheet_form(multipart).await?;

    let sheet = service
        .update(id, fields, file, &ExpirationClassifier::today())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(sheet),
        Some("Emergency sheet updated".to_string()),
        None,
    )))
}

/// Delete an emergency sheet and its file
#[utoipa::path(
    delete,
    path = "/api/emergency-sheets/{id}",
    tag = "emergency-sheets",
    params(
        ("id" = Uuid, Path, description = "Emergency sheet ID")
    ),
    responses(
        (status = 200, description = "Emergency sheet deleted"),
        (status = 403, description = "Forbidden - Chemistry access required"),
        (status = 404, description = "Emergency sheet not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_emergency_sheet(
    RequireChemistry(_user): RequireChemistry,
    State(service): State<Arc<EmergencySheetService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Emergency sheet deleted".to_string()),
        None,
    )))
}

/// Emergency sheet status counts with distinct sectors and risk classes
#[utoipa::path(
    get,
    path = "/api/emergency-sheets/statistics",
    tag = "emergency-sheets",
    responses(
        (status = 200, description = "Emergency sheet statistics", body = ApiResponse<EmergencySheetStatisticsDto>),
        (status = 403, description = "Forbidden - Chemistry access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_emergency_sheet_statistics(
    RequireChemistry(_user): RequireChemistry,
    State(service): State<Arc<EmergencySheetService>>,
) -> Result<Json<ApiResponse<EmergencySheetStatisticsDto>>> {
    let stats = service.statistics(&ExpirationClassifier::today()).await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;
    use crate::features::emergency_sheets::routes;
    use crate::features::files::FileService;
    use crate::shared::test_helpers::{lazy_pool, user_with_roles, with_user, InMemoryStorage};
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;

    fn server(roles: &[Role]) -> (TestServer, Arc<InMemoryStorage>) {
        let storage = Arc::new(InMemoryStorage::default());
        let files = Arc::new(FileService::new(storage.clone()));
        let service = Arc::new(EmergencySheetService::new(lazy_pool(), files));
        let server =
            TestServer::new(with_user(routes(service), user_with_roles(roles))).unwrap();
        (server, storage)
    }

    #[tokio::test]
    async fn test_metrologist_is_forbidden() {
        let (server, _) = server(&[Role::Metrologist]);

        server
            .get("/api/emergency-sheets")
            .expect_failure()
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_invalid_form_stores_nothing() {
        let (server, storage) = server(&[Role::Chemist]);
        let form = MultipartForm::new()
            .add_text("name", "Chlorine")
            .add_text("product", "Chlorine")
            .add_text("un_number", "UN10170")
            .add_text("expiration_date", "2026-03-01")
            .add_part(
                "file",
                Part::bytes(b"%PDF-1.7".to_vec())
                    .file_name("chlorine.pdf")
                    .mime_type("application/pdf"),
            );

        server
            .post("/api/emergency-sheets")
            .multipart(form)
            .expect_failure()
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(storage.object_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_expiration_date_is_rejected() {
        let (server, _) = server(&[Role::Admin]);
        let form = MultipartForm::new()
            .add_text("name", "Chlorine")
            .add_text("product", "Chlorine");

        server
            .post("/api/emergency-sheets")
            .multipart(form)
            .expect_failure()
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
