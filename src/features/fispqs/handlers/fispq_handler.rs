use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::{RequireAdmin, RequireChemistry};
use crate::features::files::{read_document_form, UploadedFile};
use crate::features::fispqs::dtos::{
    FispqFormDto, FispqFormSchema, FispqImportRowDto, FispqListQuery, FispqResponseDto,
    FispqStatisticsDto, ImportResultDto,
};
use crate::features::fispqs::models::FispqFields;
use crate::features::fispqs::services::FispqService;
use crate::shared::constants::MAX_IMPORT_ROWS;
use crate::shared::expiration::ExpirationClassifier;
use crate::shared::types::{ApiResponse, Meta};

/// Read and validate the FISPQ form; the file part is optional here
async fn read_fispq_form(multipart: Multipart) -> Result<(FispqFields, Option<UploadedFile>)> {
    let mut form = read_document_form(multipart).await?;
    let dto: FispqFormDto = form.deserialize()?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Ok((dto.into_fields()?, form.take_file()))
}

/// List FISPQs (filtered, paginated, newest first)
#[utoipa::path(
    get,
    path = "/api/fispqs",
    tag = "fispqs",
    params(FispqListQuery),
    responses(
        (status = 200, description = "List of FISPQs", body = ApiResponse<Vec<FispqResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Chemistry access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_fispqs(
    RequireChemistry(_user): RequireChemistry,
    State(service): State<Arc<FispqService>>,
    Query(query): Query<FispqListQuery>,
) -> Result<Json<ApiResponse<Vec<FispqResponseDto>>>> {
    let (items, total) = service
        .list(&query, &ExpirationClassifier::today())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Get a FISPQ
#[utoipa::path(
    get,
    path = "/api/fispqs/{id}",
    tag = "fispqs",
    params(
        ("id" = Uuid, Path, description = "FISPQ ID")
    ),
    responses(
        (status = 200, description = "FISPQ found", body = ApiResponse<FispqResponseDto>),
        (status = 403, description = "Forbidden - Chemistry access required"),
        (status = 404, description = "FISPQ not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_fispq(
    RequireChemistry(_user): RequireChemistry,
    State(service): State<Arc<FispqService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FispqResponseDto>>> {
    let fispq = service.get(id, &ExpirationClassifier::today()).await?;
    Ok(Json(ApiResponse::success(Some(fispq), None, None)))
}

/// Create a FISPQ with its sheet file
#[utoipa::path(
    post,
    path = "/api/fispqs",
    tag = "fispqs",
    request_body(content = FispqFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "FISPQ created", body = ApiResponse<FispqResponseDto>),
        (status = 400, description = "Validation error or missing file"),
        (status = 403, description = "Forbidden - Chemistry access required"),
        (status = 413, description = "File too large")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_fispq(
    RequireChemistry(user): RequireChemistry,
    State(service): State<Arc<FispqService>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FispqResponseDto>>)> {
    let (fields, file) = read_fispq_form(multipart).await?;
    let file = file.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    let fispq = service
        .create(fields, file, &user.sub, &ExpirationClassifier::today())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(fispq),
            Some("FISPQ created".to_string()),
            None,
        )),
    ))
}

/// Replace a FISPQ's fields and optionally its file
#[utoipa::path(
    put,
    path = "/api/fispqs/{id}",
    tag = "fispqs",
    params(
        ("id" = Uuid, Path, description = "FISPQ ID")
    ),
    request_body(content = FispqFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "FISPQ updated", body = ApiResponse<FispqResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Chemistry access required"),
        (status = 404, description = "FISPQ not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_fispq(
    RequireChemistry(_user): RequireChemistry,
    State(service): State<Arc<FispqService>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<FispqResponseDto>>> {
    let (fields, file) = read_fispq_form(multipart).await?;

    let fispq = service
        .update(id, fields, file, &ExpirationClassifier::today())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(fispq),
        Some("FISPQ updated".to_string()),
        None,
    )))
}

/// Delete a FISPQ and its file
#[utoipa::path(
    delete,
    path = "/api/fispqs/{id}",
    tag = "fispqs",
    params(
        ("id" = Uuid, Path, description = "FISPQ ID")
    ),
    responses(
        (status = 200, description = "FISPQ deleted"),
        (status = 403, description = "Forbidden - Chemistry access required"),
        (status = 404, description = "FISPQ not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_fispq(
    RequireChemistry(_user): RequireChemistry,
    State(service): State<Arc<FispqService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("FISPQ deleted".to_string()),
        None,
    )))
}

/// FISPQ status counts with distinct sectors and manufacturers
#[utoipa::path(
    get,
    path = "/api/fispqs/statistics",
    tag = "fispqs",
    responses(
        (status = 200, description = "FISPQ statistics", body = ApiResponse<FispqStatisticsDto>),
        (status = 403, description = "Forbidden - Chemistry access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_fispq_statistics(
    RequireChemistry(_user): RequireChemistry,
    State(service): State<Arc<FispqService>>,
) -> Result<Json<ApiResponse<FispqStatisticsDto>>> {
    let stats = service.statistics(&ExpirationClassifier::today()).await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

/// Import FISPQ rows in batch
///
/// Blank fields get defaults. Rows that cannot be imported are reported in
/// `errors` without aborting the batch.
#[utoipa::path(
    post,
    path = "/api/fispqs/import",
    tag = "fispqs",
    request_body = Vec<FispqImportRowDto>,
    responses(
        (status = 200, description = "Import finished", body = ApiResponse<ImportResultDto>),
        (status = 400, description = "Empty or oversized batch"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn import_fispqs(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<FispqService>>,
    AppJson(rows): AppJson<Vec<FispqImportRowDto>>,
) -> Result<Json<ApiResponse<ImportResultDto>>> {
    if rows.is_empty() {
        return Err(AppError::BadRequest("No rows to import".to_string()));
    }
    if rows.len() > MAX_IMPORT_ROWS {
        return Err(AppError::BadRequest(format!(
            "Too many rows: {} (maximum {})",
            rows.len(),
            MAX_IMPORT_ROWS
        )));
    }

    let result = service
        .import(rows, &user.sub, &ExpirationClassifier::today())
        .await;
    let message = format!("Imported {} of {} rows", result.imported, result.total);

    Ok(Json(ApiResponse::success(Some(result), Some(message), None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;
    use crate::features::files::FileService;
    use crate::features::fispqs::routes;
    use crate::shared::test_helpers::{lazy_pool, user_with_roles, with_user, InMemoryStorage};
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::json;

    fn server(roles: &[Role]) -> TestServer {
        let files = Arc::new(FileService::new(Arc::new(InMemoryStorage::default())));
        let service = Arc::new(FispqService::new(lazy_pool(), files));
        TestServer::new(with_user(routes(service), user_with_roles(roles))).unwrap()
    }

    fn form() -> MultipartForm {
        MultipartForm::new()
            .add_text("product", "Acetone")
            .add_text("manufacturer", "Quimis")
            .add_text("sector", "Laboratory")
            .add_text("expiration_date", "2026-12-31")
    }

    #[tokio::test]
    async fn test_metrologist_cannot_reach_fispqs() {
        let server = server(&[Role::Metrologist]);

        server
            .get("/api/fispqs")
            .expect_failure()
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .get("/api/fispqs/statistics")
            .expect_failure()
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_requires_file() {
        let server = server(&[Role::Chemist]);

        let response = server
            .post("/api/fispqs")
            .multipart(form())
            .expect_failure()
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "File is required");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_fields() {
        let server = server(&[Role::Chemist]);
        let form = form().add_text("cas_number", "12345").add_part(
            "file",
            Part::bytes(b"%PDF-1.7".to_vec())
                .file_name("acetone.pdf")
                .mime_type("application/pdf"),
        );

        server
            .post("/api/fispqs")
            .multipart(form)
            .expect_failure()
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_import_is_admin_only() {
        let server = server(&[Role::Chemist]);

        server
            .post("/api/fispqs/import")
            .json(&json!([{ "product": "Acetone" }]))
            .expect_failure()
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_import_rejects_empty_batch() {
        let server = server(&[Role::Admin]);

        server
            .post("/api/fispqs/import")
            .json(&json!([]))
            .expect_failure()
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
