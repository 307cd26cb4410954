use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::expiration::Expirable;

/// Operating state matching the `equipment_status` database enum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "equipment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EquipmentStatus {
    #[default]
    Available,
    Maintenance,
    Calibration,
    /// Out of service; no longer tracked for calibration
    Discarded,
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EquipmentStatus::Available => write!(f, "available"),
            EquipmentStatus::Maintenance => write!(f, "maintenance"),
            EquipmentStatus::Calibration => write!(f, "calibration"),
            EquipmentStatus::Discarded => write!(f, "discarded"),
        }
    }
}

/// Database model for a registered measuring instrument
#[derive(Debug, Clone, FromRow)]
pub struct Equipment {
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
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expirable for Equipment {
    fn expiration_date(&self) -> NaiveDate {
        self.next_calibration_date
    }
}

/// Validated field values written on create and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentFields {
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
}
