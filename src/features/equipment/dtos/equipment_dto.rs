use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::equipment::models::{Equipment, EquipmentFields, EquipmentStatus};
use crate::shared::expiration::{ExpirationClassifier, ExpirationStatus, StatusSummary};
use crate::shared::query::normalize_filter;
use crate::shared::types::{default_page, default_page_size, PaginationQuery};
use crate::shared::validation::parse_form_date;

/// Request body for registering or replacing an equipment record
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct EquipmentFormDto {
    /// Registry code, stored upper-case
    #[validate(length(min = 1, max = 50, message = "Code must be 1-50 characters"))]
    #[schema(example = "PAQ-001")]
    pub code: String,

    #[validate(length(min = 1, max = 100, message = "Equipment type must be 1-100 characters"))]
    #[schema(example = "Caliper")]
    pub equipment_type: String,

    #[validate(length(min = 1, max = 100, message = "Sector must be 1-100 characters"))]
    #[schema(example = "Quality")]
    pub sector: String,

    #[serde(default)]
    pub operational_status: EquipmentStatus,

    #[validate(length(max = 255, message = "Manufacturer must not exceed 255 characters"))]
    pub manufacturer: Option<String>,

    #[validate(length(max = 100, message = "Model must not exceed 100 characters"))]
    pub model: Option<String>,

    #[validate(length(max = 100, message = "Serial number must not exceed 100 characters"))]
    pub serial_number: Option<String>,

    #[validate(length(max = 100, message = "Measurement range must not exceed 100 characters"))]
    #[schema(example = "0-150 mm")]
    pub measurement_range: Option<String>,

    #[validate(length(max = 255, message = "Location must not exceed 255 characters"))]
    pub location: Option<String>,

    /// YYYY-MM-DD or DD/MM/YYYY
    #[schema(example = "2025-03-10")]
    pub last_calibration_date: String,

    #[schema(example = "2026-03-10")]
    pub next_calibration_date: String,
}

impl EquipmentFormDto {
    pub fn into_fields(self) -> Result<EquipmentFields> {
        let last_calibration_date =
            parse_form_date("last_calibration_date", &self.last_calibration_date)?;
        let next_calibration_date =
            parse_form_date("next_calibration_date", &self.next_calibration_date)?;

        if next_calibration_date < last_calibration_date {
            return Err(AppError::Validation(
                "Next calibration date must not be before the last calibration date".to_string(),
            ));
        }

        Ok(EquipmentFields {
            code: self.code.trim().to_uppercase(),
            equipment_type: self.equipment_type.trim().to_string(),
            sector: self.sector.trim().to_string(),
            operational_status: self.operational_status,
            manufacturer: normalize_filter(self.manufacturer.as_deref()),
            model: normalize_filter(self.model.as_deref()),
            serial_number: normalize_filter(self.serial_number.as_deref()),
            measurement_range: normalize_filter(self.measurement_range.as_deref()),
            location: normalize_filter(self.location.as_deref()),
            last_calibration_date,
            next_calibration_date,
        })
    }
}

/// Response DTO for equipment with its derived calibration status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EquipmentResponseDto {
    pub id: Uuid,
    pub code: String,
    pub equipment_type: String,
    pub sector: String,
    pub operational_status: EquipmentStatus,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub measurement_range: Option<String>,
    pub location: Option<String>,
    pub last_calibration_date: NaiveDate,
    pub next_calibration_date: NaiveDate,
    /// Calibration status: expired once the next calibration date has passed
    pub status: ExpirationStatus,
    pub days_remaining: i64,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EquipmentResponseDto {
    pub fn from_model(e: Equipment, classifier: &ExpirationClassifier) -> Self {
        Self {
            status: classifier.status_of(&e),
            days_remaining: classifier.days_remaining(&e),
            id: e.id,
            code: e.code,
            equipment_type: e.equipment_type,
            sector: e.sector,
            operational_status: e.operational_status,
            manufacturer: e.manufacturer,
            model: e.model,
            serial_number: e.serial_number,
            measurement_range: e.measurement_range,
            location: e.location,
            last_calibration_date: e.last_calibration_date,
            next_calibration_date: e.next_calibration_date,
            created_by: e.created_by,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// Query params for listing equipment
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct EquipmentListQuery {
    /// Substring match on code, type or serial number
    pub search: Option<String>,
    pub sector: Option<String>,
    pub equipment_type: Option<String>,
    pub operational_status: Option<EquipmentStatus>,
    /// Next calibration on or after this date
    pub due_from: Option<NaiveDate>,
    /// Next calibration on or before this date
    pub due_to: Option<NaiveDate>,
    /// Calibration status
    pub status: Option<ExpirationStatus>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl EquipmentListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.page_size)
    }
}

/// Calibration status counts of equipment in service, plus sectors and types
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EquipmentStatisticsDto {
    #[serde(flatten)]
    pub summary: StatusSummary,
    pub discarded: i64,
    pub sector_count: usize,
    pub sectors: Vec<String>,
    pub equipment_types: Vec<String>,
}
