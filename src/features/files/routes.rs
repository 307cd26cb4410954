use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::dtos::MAX_FILE_SIZE;
use crate::features::files::handlers::{upload_file, view_file};
use crate::features::files::services::FileService;

/// Body limit for multipart routes: one file plus form overhead
pub const MULTIPART_BODY_LIMIT: usize = MAX_FILE_SIZE + 1024 * 1024;

/// Create routes for the files feature
pub fn routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route(
            "/api/files/upload",
            post(upload_file).layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT)),
        )
        .route("/api/files/view", get(view_file))
        .with_state(file_service)
}
