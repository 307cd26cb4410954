use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;

use crate::features::emergency_sheets::handlers::{
    create_emergency_sheet, delete_emergency_sheet, get_emergency_sheet,
    get_emergency_sheet_statistics, list_emergency_sheets, update_emergency_sheet,
};
use crate::features::emergency_sheets::services::EmergencySheetService;
use crate::features::files::MULTIPART_BODY_LIMIT;

pub fn routes(service: Arc<EmergencySheetService>) -> Router {
    Router::new()
        .route(
            "/api/emergency-sheets",
            get(list_emergency_sheets)
                .post(create_emergency_sheet)
                .layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT)),
        )
        .route(
            "/api/emergency-sheets/statistics",
            get(get_emergency_sheet_statistics),
        )
        .route(
            "/api/emergency-sheets/{id}",
            get(get_emergency_sheet)
                .put(update_emergency_sheet)
                .delete(delete_emergency_sheet)
                .layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT)),
        )
        .with_state(service)
}
