use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::guards::RequireMetrology;
use crate::features::certificates::dtos::{
    CertificateFormDto, CertificateFormSchema, CertificateListQuery, CertificateResponseDto,
    CertificateStatisticsDto, NextCertificateNumberDto,
};
use crate::features::certificates::models::CertificateFields;
use crate::features::certificates::services::CertificateService;
use crate::features::files::{read_document_form, UploadedFile};
use crate::shared::expiration::ExpirationClassifier;
use crate::shared::types::{ApiResponse, Meta};

async fn read_certificate_form(
    multipart: Multipart,
) -> Result<(CertificateFields, Option<UploadedFile>)> {
    let mut form = read_document_form(multipart).await?;
    let dto: CertificateFormDto = form.deserialize()?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Ok((dto.into_fields()?, form.take_file()))
}

/// List calibration certificates (filtered, paginated, newest first)
#[utoipa::path(
    get,
    path = "/api/certificates",
    tag = "certificates",
    params(CertificateListQuery),
    responses(
        (status = 200, description = "List of certificates", body = ApiResponse<Vec<CertificateResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Metrology access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_certificates(
    RequireMetrology(_user): RequireMetrology,
    State(service): State<Arc<CertificateService>>,
    Query(query): Query<CertificateListQuery>,
) -> Result<Json<ApiResponse<Vec<CertificateResponseDto>>>> {
    let (items, total) = service
        .list(&query, &ExpirationClassifier::today())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Get a calibration certificate
#[utoipa::path(
    get,
    path = "/api/certificates/{id}",
    tag = "certificates",
    params(
        ("id" = Uuid, Path, description = "Certificate ID")
    ),
    responses(
        (status = 200, description = "Certificate found", body = ApiResponse<CertificateResponseDto>),
        (status = 403, description = "Forbidden - Metrology access required"),
        (status = 404, description = "Certificate not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_certificate(
    RequireMetrology(_user): RequireMetrology,
    State(service): State<Arc<CertificateService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CertificateResponseDto>>> {
    let certificate = service.get(id, &ExpirationClassifier::today()).await?;
    Ok(Json(ApiResponse::success(Some(certificate), None, None)))
}

/// Create a calibration certificate with its file
///
/// When `certificate_number` is empty the next `SSNNNYY` number is issued.
#[utoipa::path(
    post,
    path = "/api/certificates",
    tag = "certificates",
    request_body(content = CertificateFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Certificate created", body = ApiResponse<CertificateResponseDto>),
        (status = 400, description = "Validation error or missing file"),
        (status = 403, description = "Forbidden - Metrology access required"),
        (status = 409, description = "Certificate number already in use"),
        (status = 413, description = "File too large")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_certificate(
    RequireMetrology(user): RequireMetrology,
    State(service): State<Arc<CertificateService>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<CertificateResponseDto>>)> {
    let (fields, file) = read_certificate_form(multipart).await?;
    let file = file.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    let certificate = service
        .create(fields, file, &user.sub, &ExpirationClassifier::today())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(certificate),
            Some("Certificate created".to_string()),
            None,
        )),
    ))
}

/// Replace a certificate's fields and optionally its file
#[utoipa::path(
    put,
    path = "/api/certificates/{id}",
    tag = "certificates",
    params(
        ("id" = Uuid, Path, description = "Certificate ID")
    ),
    request_body(content = CertificateFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Certificate updated", body = ApiResponse<CertificateResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Metrology access required"),
        (status = 404, description = "Certificate not found"),
        (status = 409, description = "Certificate number already in use")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_certificate(
    RequireMetrology(_user): RequireMetrology,
    State(service): State<Arc<CertificateService>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<CertificateResponseDto>>> {
    let (fields, file) = read_certificate_form(multipart).await?;

    let certificate = service
        .update(id, fields, file, &ExpirationClassifier::today())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(certificate),
        Some("Certificate updated".to_string()),
        None,
    )))
}

/// Delete a certificate and its file
#[utoipa::path(
    delete,
    path = "/api/certificates/{id}",
    tag = "certificates",
    params(
        ("id" = Uuid, Path, description = "Certificate ID")
    ),
    responses(
        (status = 200, description = "Certificate deleted"),
        (status = 403, description = "Forbidden - Metrology access required"),
        (status = 404, description = "Certificate not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_certificate(
    RequireMetrology(_user): RequireMetrology,
    State(service): State<Arc<CertificateService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Certificate deleted".to_string()),
        None,
    )))
}

/// Certificate status counts with distinct sectors and equipment
#[utoipa::path(
    get,
    path = "/api/certificates/statistics",
    tag = "certificates",
    responses(
        (status = 200, description = "Certificate statistics", body = ApiResponse<CertificateStatisticsDto>),
        (status = 403, description = "Forbidden - Metrology access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_certificate_statistics(
    RequireMetrology(_user): RequireMetrology,
    State(service): State<Arc<CertificateService>>,
) -> Result<Json<ApiResponse<CertificateStatisticsDto>>> {
    let stats = service.statistics(&ExpirationClassifier::today()).await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

/// Preview the next certificate number without consuming it
#[utoipa::path(
    get,
    path = "/api/certificates/next-number",
    tag = "certificates",
    responses(
        (status = 200, description = "Next certificate number", body = ApiResponse<NextCertificateNumberDto>),
        (status = 403, description = "Forbidden - Metrology access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_next_certificate_number(
    RequireMetrology(_user): RequireMetrology,
    State(service): State<Arc<CertificateService>>,
) -> Result<Json<ApiResponse<NextCertificateNumberDto>>> {
    let today = ExpirationClassifier::today().reference_date();
    let next = service.preview_next_number(today).await?;
    Ok(Json(ApiResponse::success(Some(next), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;
    use crate::features::certificates::routes;
    use crate::features::files::FileService;
    use crate::shared::test_helpers::{lazy_pool, user_with_roles, with_user, InMemoryStorage};
    use axum_test::multipart::MultipartForm;
    use axum_test::TestServer;

    fn server(roles: &[Role]) -> TestServer {
        let files = Arc::new(FileService::new(Arc::new(InMemoryStorage::default())));
        let service = Arc::new(CertificateService::new(lazy_pool(), files));
        TestServer::new(with_user(routes(service), user_with_roles(roles))).unwrap()
    }

    #[tokio::test]
    async fn test_chemist_cannot_reach_certificates() {
        let server = server(&[Role::Chemist]);

        for path in [
            "/api/certificates",
            "/api/certificates/statistics",
            "/api/certificates/next-number",
        ] {
            server
                .get(path)
                .expect_failure()
                .await
                .assert_status(StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn test_create_rejects_inverted_dates() {
        let server = server(&[Role::Metrologist]);
        let form = MultipartForm::new()
            .add_text("equipment_id", "BAL-0042")
            .add_text("equipment_name", "Analytical balance")
            .add_text("issue_date", "2025-03-12")
            .add_text("calibration_date", "2025-03-10")
            .add_text("expiration_date", "2024-03-10");

        let response = server
            .post("/api/certificates")
            .multipart(form)
            .expect_failure()
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(
            body["message"],
            "Expiration date must not be before the calibration date"
        );
    }
}
