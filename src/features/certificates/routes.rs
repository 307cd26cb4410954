use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;

use crate::features::certificates::handlers::{
    create_certificate, delete_certificate, get_certificate, get_certificate_statistics,
    get_next_certificate_number, list_certificates, update_certificate,
};
use crate::features::certificates::services::CertificateService;
use crate::features::files::MULTIPART_BODY_LIMIT;

pub fn routes(service: Arc<CertificateService>) -> Router {
    Router::new()
        .route(
            "/api/certificates",
            get(list_certificates)
                .post(create_certificate)
                .layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT)),
        )
        .route("/api/certificates/statistics", get(get_certificate_statistics))
        .route("/api/certificates/next-number", get(get_next_certificate_number))
        .route(
            "/api/certificates/{id}",
            get(get_certificate)
                .put(update_certificate)
                .delete(delete_certificate)
                .layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT)),
        )
        .with_state(service)
}
