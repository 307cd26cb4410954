use axum::{
    extract::{Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::emergency_sheets::dtos::EmergencySheetListQuery;
use crate::features::equipment::dtos::EquipmentListQuery;
use crate::features::fispqs::dtos::FispqListQuery;
use crate::features::public::dto::{
    PublicEmergencySheetDto, PublicEquipmentDto, PublicFispqDto, PublicStatisticsDto,
    PublicTypeStatisticsDto,
};
use crate::features::public::routes::PublicState;
use crate::shared::expiration::ExpirationClassifier;
use crate::shared::types::{ApiResponse, Meta};

/// Public FISPQ consultation
#[utoipa::path(
    get,
    path = "/api/public/fispqs",
    tag = "public",
    params(FispqListQuery),
    responses(
        (status = 200, description = "List of FISPQs", body = ApiResponse<Vec<PublicFispqDto>>)
    )
)]
pub async fn list_public_fispqs(
    State(state): State<PublicState>,
    Query(query): Query<FispqListQuery>,
) -> Result<Json<ApiResponse<Vec<PublicFispqDto>>>> {
    let (items, total) = state
        .fispqs
        .list(&query, &ExpirationClassifier::today())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items.into_iter().map(Into::into).collect()),
        None,
        Some(Meta { total }),
    )))
}

/// Public emergency sheet consultation
#[utoipa::path(
    get,
    path = "/api/public/emergency-sheets",
    tag = "public",
    params(EmergencySheetListQuery),
    responses(
        (status = 200, description = "List of emergency sheets", body = ApiResponse<Vec<PublicEmergencySheetDto>>)
    )
)]
pub async fn list_public_emergency_sheets(
    State(state): State<PublicState>,
    Query(query): Query<EmergencySheetListQuery>,
) -> Result<Json<ApiResponse<Vec<PublicEmergencySheetDto>>>> {
    let (items, total) = state
        .emergency_sheets
        .list(&query, &ExpirationClassifier::today())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items.into_iter().map(Into::into).collect()),
        None,
        Some(Meta { total }),
    )))
}

/// Public equipment consultation with calibration status
#[utoipa::path(
    get,
    path = "/api/public/equipment",
    tag = "public",
    params(EquipmentListQuery),
    responses(
        (status = 200, description = "List of equipment", body = ApiResponse<Vec<PublicEquipmentDto>>)
    )
)]
pub async fn list_public_equipment(
    State(state): State<PublicState>,
    Query(query): Query<EquipmentListQuery>,
) -> Result<Json<ApiResponse<Vec<PublicEquipmentDto>>>> {
    let (items, total) = state
        .equipment
        .list(&query, &ExpirationClassifier::today())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items.into_iter().map(Into::into).collect()),
        None,
        Some(Meta { total }),
    )))
}

/// Public counters for the consultation page
#[utoipa::path(
    get,
    path = "/api/public/statistics",
    tag = "public",
    responses(
        (status = 200, description = "Public statistics", body = ApiResponse<PublicStatisticsDto>)
    )
)]
pub async fn get_public_statistics(
    State(state): State<PublicState>,
) -> Result<Json<ApiResponse<PublicStatisticsDto>>> {
    let classifier = ExpirationClassifier::today();
    let fispqs = state.fispqs.statistics(&classifier).await?;
    let sheets = state.emergency_sheets.statistics(&classifier).await?;
    let equipment = state.equipment.statistics(&classifier).await?;

    let stats = PublicStatisticsDto {
        fispqs: PublicTypeStatisticsDto::new(fispqs.summary, fispqs.sector_count),
        emergency_sheets: PublicTypeStatisticsDto::new(sheets.summary, sheets.sector_count),
        equipment: PublicTypeStatisticsDto::new(equipment.summary, equipment.sector_count),
    };
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::emergency_sheets::EmergencySheetService;
    use crate::features::equipment::EquipmentService;
    use crate::features::files::FileService;
    use crate::features::fispqs::FispqService;
    use crate::features::public::routes;
    use crate::shared::test_helpers::{lazy_pool, InMemoryStorage};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use std::sync::Arc;

    fn server() -> TestServer {
        let pool = lazy_pool();
        let files = Arc::new(FileService::new(Arc::new(InMemoryStorage::default())));
        let state = PublicState {
            fispqs: Arc::new(FispqService::new(pool.clone(), files.clone())),
            emergency_sheets: Arc::new(EmergencySheetService::new(pool.clone(), files)),
            equipment: Arc::new(EquipmentService::new(pool)),
        };
        TestServer::new(routes(state)).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_status_filter_is_rejected() {
        server()
            .get("/api/public/fispqs")
            .add_query_param("status", "archived")
            .expect_failure()
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_date_filter_is_rejected() {
        server()
            .get("/api/public/emergency-sheets")
            .add_query_param("expires_from", "31/12/2025")
            .expect_failure()
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_equipment_state_is_rejected() {
        server()
            .get("/api/public/equipment")
            .add_query_param("operational_status", "lost")
            .expect_failure()
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
