use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::equipment::handlers::{
    create_equipment, delete_equipment, get_equipment, get_equipment_statistics, list_equipment,
    update_equipment,
};
use crate::features::equipment::services::EquipmentService;

pub fn routes(service: Arc<EquipmentService>) -> Router {
    Router::new()
        .route("/api/equipment", get(list_equipment).post(create_equipment))
        .route("/api/equipment/statistics", get(get_equipment_statistics))
        .route(
            "/api/equipment/{id}",
            get(get_equipment)
                .put(update_equipment)
                .delete(delete_equipment),
        )
        .with_state(service)
}
