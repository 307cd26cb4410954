use axum::{
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{DocumentFolder, FileResponseDto, UploadFileDto, ViewFileQuery};
use crate::features::files::form::read_document_form;
use crate::features::files::services::FileService;
use crate::shared::types::ApiResponse;

/// Check that the user works in the area owning `folder`
fn ensure_folder_access(user: &AuthenticatedUser, folder: DocumentFolder) -> Result<(), AppError> {
    let allowed = match folder {
        DocumentFolder::Fispqs | DocumentFolder::EmergencySheets => user.has_chemistry_access(),
        DocumentFolder::Certificates => user.has_metrology_access(),
    };

    if allowed {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "No access to the '{}' folder",
            folder.as_str()
        )))
    }
}

/// Upload a document file
///
/// Accepts multipart/form-data with:
/// - `file`: The file to upload (required)
/// - `folder`: "fispqs", "emergency-sheets" or "certificates" (required)
#[utoipa::path(
    post,
    path = "/api/files/upload",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "File upload form with the target folder",
    ),
    responses(
        (status = 201, description = "File uploaded successfully", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "Invalid file or folder"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "No access to the folder"),
        (status = 413, description = "File too large")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponseDto>>), AppError> {
    let mut form = read_document_form(multipart).await?;

    let folder: DocumentFolder = form
        .text("folder")
        .ok_or_else(|| AppError::BadRequest("Folder is required".to_string()))?
        .parse()
        .map_err(AppError::BadRequest)?;
    ensure_folder_access(&user, folder)?;

    let file = form
        .take_file()
        .ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    let stored = service.store(folder, file).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(FileResponseDto {
                key: stored.key,
                url: stored.url,
                original_filename: stored.original_filename,
                content_type: stored.content_type,
                file_size: stored.file_size,
            }),
            None,
            None,
        )),
    ))
}

/// View a stored document file inline
#[utoipa::path(
    get,
    path = "/api/files/view",
    tag = "files",
    params(ViewFileQuery),
    responses(
        (status = 200, description = "File content", content_type = "application/pdf"),
        (status = 400, description = "Invalid key"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "No access to the folder"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn view_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Query(query): Query<ViewFileQuery>,
) -> Result<Response, AppError> {
    let folder = service
        .folder_of(&query.key)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid file key '{}'", query.key)))?;
    ensure_folder_access(&user, folder)?;

    let (data, content_type) = service.open(&query.key).await?;
    let file_name = query.key.rsplit('/').next().unwrap_or("document");

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", file_name),
            ),
        ],
        data,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;
    use crate::features::files::routes;
    use crate::shared::test_helpers::{user_with_roles, with_user, InMemoryStorage};
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::Value;

    fn server(roles: &[Role]) -> TestServer {
        let service = Arc::new(FileService::new(Arc::new(InMemoryStorage::default())));
        server_for(service, roles)
    }

    fn server_for(service: Arc<FileService>, roles: &[Role]) -> TestServer {
        TestServer::new(with_user(routes(service), user_with_roles(roles))).unwrap()
    }

    fn pdf_form(folder: &str) -> MultipartForm {
        MultipartForm::new().add_text("folder", folder).add_part(
            "file",
            Part::bytes(b"%PDF-1.7".to_vec())
                .file_name("sheet.pdf")
                .mime_type("application/pdf"),
        )
    }

    #[tokio::test]
    async fn test_upload_then_view_inline() {
        let server = server(&[Role::Chemist]);

        let response = server
            .post("/api/files/upload")
            .multipart(pdf_form("fispqs"))
            .await;
        response.assert_status(StatusCode::CREATED);

        let body: Value = response.json();
        let key = body["data"]["key"].as_str().unwrap().to_string();

        let view = server.get("/api/files/view").add_query_param("key", &key).await;
        view.assert_status_ok();
        assert_eq!(view.header(header::CONTENT_TYPE), "application/pdf");
        assert!(view
            .header(header::CONTENT_DISPOSITION)
            .to_str()
            .unwrap()
            .starts_with("inline"));
    }

    #[tokio::test]
    async fn test_upload_to_foreign_folder_is_forbidden() {
        let server = server(&[Role::Chemist]);

        server
            .post("/api/files/upload")
            .multipart(pdf_form("certificates"))
            .expect_failure()
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_upload_requires_known_folder() {
        let server = server(&[Role::Admin]);

        server
            .post("/api/files/upload")
            .multipart(pdf_form("reports"))
            .expect_failure()
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_view_checks_folder_of_key() {
        let service = Arc::new(FileService::new(Arc::new(InMemoryStorage::default())));
        let key = server_for(Arc::clone(&service), &[Role::Chemist])
            .post("/api/files/upload")
            .multipart(pdf_form("fispqs"))
            .await
            .json::<Value>()["data"]["key"]
            .as_str()
            .unwrap()
            .to_string();

        server_for(Arc::clone(&service), &[Role::Metrologist])
            .get("/api/files/view")
            .add_query_param("key", &key)
            .expect_failure()
            .await
            .assert_status(StatusCode::FORBIDDEN);

        server_for(Arc::clone(&service), &[])
            .get("/api/files/view")
            .add_query_param("key", &key)
            .expect_failure()
            .await
            .assert_status(StatusCode::FORBIDDEN);

        server_for(service, &[Role::Admin])
            .get("/api/files/view")
            .add_query_param("key", &key)
            .await
            .assert_status_ok();
    }
}
