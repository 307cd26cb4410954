use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::MULTIPART_BODY_LIMIT;
use crate::features::fispqs::handlers::{
    create_fispq, delete_fispq, get_fispq, get_fispq_statistics, import_fispqs, list_fispqs,
    update_fispq,
};
use crate::features::fispqs::services::FispqService;

pub fn routes(service: Arc<FispqService>) -> Router {
    Router::new()
        .route(
            "/api/fispqs",
            get(list_fispqs)
                .post(create_fispq)
                .layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT)),
        )
        .route("/api/fispqs/statistics", get(get_fispq_statistics))
        .route("/api/fispqs/import", post(import_fispqs))
        .route(
            "/api/fispqs/{id}",
            get(get_fispq)
                .put(update_fispq)
                .delete(delete_fispq)
                .layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT)),
        )
        .with_state(service)
}
