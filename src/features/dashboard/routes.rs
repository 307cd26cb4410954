use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::dashboard::handlers;
use crate::features::dashboard::services::DashboardService;

/// Create dashboard routes (each guarded by its area)
pub fn routes(dashboard_service: Arc<DashboardService>) -> Router {
    Router::new()
        .route("/api/dashboard/admin", get(handlers::get_admin_dashboard))
        .route("/api/dashboard/chemistry", get(handlers::get_chemistry_dashboard))
        .route("/api/dashboard/metrology", get(handlers::get_metrology_dashboard))
        .with_state(dashboard_service)
}
