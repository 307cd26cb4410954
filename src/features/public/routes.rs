use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::emergency_sheets::EmergencySheetService;
use crate::features::equipment::EquipmentService;
use crate::features::fispqs::FispqService;
use crate::features::public::handler::{
    get_public_statistics, list_public_emergency_sheets, list_public_equipment,
    list_public_fispqs,
};

/// Services behind the public consultation routes
#[derive(Clone)]
pub struct PublicState {
    pub fispqs: Arc<FispqService>,
    pub emergency_sheets: Arc<EmergencySheetService>,
    pub equipment: Arc<EquipmentService>,
}

/// Create public routes (no authentication)
pub fn routes(state: PublicState) -> Router {
    Router::new()
        .route("/api/public/fispqs", get(list_public_fispqs))
        .route("/api/public/emergency-sheets", get(list_public_emergency_sheets))
        .route("/api/public/equipment", get(list_public_equipment))
        .route("/api/public/statistics", get(get_public_statistics))
        .with_state(state)
}
