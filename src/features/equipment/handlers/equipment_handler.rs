use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireMetrology;
use crate::features::equipment::dtos::{
    EquipmentFormDto, EquipmentListQuery, EquipmentResponseDto, EquipmentStatisticsDto,
};
use crate::features::equipment::models::EquipmentFields;
use crate::features::equipment::services::EquipmentService;
use crate::shared::expiration::ExpirationClassifier;
use crate::shared::types::{ApiResponse, Meta};

fn validated_fields(dto: EquipmentFormDto) -> Result<EquipmentFields> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    dto.into_fields()
}

/// List registered equipment (filtered, paginated, soonest calibration first)
#[utoipa::path(
    get,
    path = "/api/equipment",
    tag = "equipment",
    params(EquipmentListQuery),
    responses(
        (status = 200, description = "List of equipment", body = ApiResponse<Vec<EquipmentResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Metrology access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_equipment(
    RequireMetrology(_user): RequireMetrology,
    State(service): State<Arc<EquipmentService>>,
    Query(query): Query<EquipmentListQuery>,
) -> Result<Json<ApiResponse<Vec<EquipmentResponseDto>>>> {
    let (items, total) = service
        .list(&query, &ExpirationClassifier::today())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Get one equipment record
#[utoipa::path(
    get,
    path = "/api/equipment/{id}",
    tag = "equipment",
    params(
        ("id" = Uuid, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Equipment found", body = ApiResponse<EquipmentResponseDto>),
        (status = 403, description = "Forbidden - Metrology access required"),
        (status = 404, description = "Equipment not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_equipment(
    RequireMetrology(_user): RequireMetrology,
    State(service): State<Arc<EquipmentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EquipmentResponseDto>>> {
    let equipment = service.get(id, &ExpirationClassifier::today()).await?;
    Ok(Json(ApiResponse::success(Some(equipment), None, None)))
}

/// Register equipment
#[utoipa::path(
    post,
    path = "/api/equipment",
    tag = "equipment",
    request_body = EquipmentFormDto,
    responses(
        (status = 201, description = "Equipment registered", body = ApiResponse<EquipmentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Metrology access required"),
        (status = 409, description = "Code already registered")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_equipment(
    RequireMetrology(user): RequireMetrology,
    State(service): State<Arc<EquipmentService>>,
    AppJson(dto): AppJson<EquipmentFormDto>,
) -> Result<(StatusCode, Json<ApiResponse<EquipmentResponseDto>>)> {
    let fields = validated_fields(dto)?;
    let equipment = service
        .create(&fields, &user.sub, &ExpirationClassifier::today())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(equipment),
            Some("Equipment registered".to_string()),
            None,
        )),
    ))
}

/// Replace every field of an equipment record
#[utoipa::path(
    put,
    path = "/api/equipment/{id}",
    tag = "equipment",
    params(
        ("id" = Uuid, Path, description = "Equipment ID")
    ),
    request_body = EquipmentFormDto,
    responses(
        (status = 200, description = "Equipment updated", body = ApiResponse<EquipmentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Metrology access required"),
        (status = 404, description = "Equipment not found"),
        (status = 409, description = "Code already registered")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_equipment(
    RequireMetrology(_user): RequireMetrology,
    State(service): State<Arc<EquipmentService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<EquipmentFormDto>,
) -> Result<Json<ApiResponse<EquipmentResponseDto>>> {
    let fields = validated_fields(dto)?;
    let equipment = service
        .update(id, &fields, &ExpirationClassifier::today())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(equipment),
        Some("Equipment updated".to_string()),
        None,
    )))
}

/// Delete an equipment record
#[utoipa::path(
    delete,
    path = "/api/equipment/{id}",
    tag = "equipment",
    params(
        ("id" = Uuid, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Equipment deleted"),
        (status = 403, description = "Forbidden - Metrology access required"),
        (status = 404, description = "Equipment not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_equipment(
    RequireMetrology(_user): RequireMetrology,
    State(service): State<Arc<EquipmentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Equipment deleted".to_string()),
        None,
    )))
}

/// Calibration status counts, sectors and equipment types
#[utoipa::path(
    get,
    path = "/api/equipment/statistics",
    tag = "equipment",
    responses(
        (status = 200, description = "Equipment statistics", body = ApiResponse<EquipmentStatisticsDto>),
        (status = 403, description = "Forbidden - Metrology access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_equipment_statistics(
    RequireMetrology(_user): RequireMetrology,
    State(service): State<Arc<EquipmentService>>,
) -> Result<Json<ApiResponse<EquipmentStatisticsDto>>> {
    let stats = service.statistics(&ExpirationClassifier::today()).await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}
