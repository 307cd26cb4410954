use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::emergency_sheets::dtos::EmergencySheetResponseDto;
use crate::features::equipment::dtos::EquipmentResponseDto;
use crate::features::equipment::models::EquipmentStatus;
use crate::features::fispqs::dtos::FispqResponseDto;
use crate::shared::expiration::{ExpirationStatus, StatusSummary};

/// FISPQ as shown to anonymous visitors: no storage keys or authors
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicFispqDto {
    pub id: Uuid,
    pub product: String,
    pub manufacturer: String,
    pub cas_number: Option<String>,
    pub sector: String,
    pub risk_type: Option<String>,
    pub expiration_date: NaiveDate,
    pub status: ExpirationStatus,
    pub days_remaining: i64,
    pub file_url: Option<String>,
}

impl From<FispqResponseDto> for PublicFispqDto {
    fn from(f: FispqResponseDto) -> Self {
        Self {
            id: f.id,
            product: f.product,
            manufacturer: f.manufacturer,
            cas_number: f.cas_number,
            sector: f.sector,
            risk_type: f.risk_type,
            expiration_date: f.expiration_date,
            status: f.status,
            days_remaining: f.days_remaining,
            file_url: f.file_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicEmergencySheetDto {
    pub id: Uuid,
    pub name: String,
    pub product: String,
    pub un_number: Option<String>,
    pub risk_class: Option<String>,
    pub sector: Option<String>,
    pub expiration_date: NaiveDate,
    pub status: ExpirationStatus,
    pub days_remaining: i64,
    pub file_url: Option<String>,
}

impl From<EmergencySheetResponseDto> for PublicEmergencySheetDto {
    fn from(s: EmergencySheetResponseDto) -> Self {
        Self {
            id: s.id,
            name: s.name,
            product: s.product,
            un_number: s.un_number,
            risk_class: s.risk_class,
            sector: s.sector,
            expiration_date: s.expiration_date,
            status: s.status,
            days_remaining: s.days_remaining,
            file_url: s.file_url,
        }
    }
}

/// Equipment with its calibration status, without registry internals
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicEquipmentDto {
    pub id: Uuid,
    pub code: String,
    pub equipment_type: String,
    pub sector: String,
    pub operational_status: EquipmentStatus,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub next_calibration_date: NaiveDate,
    pub status: ExpirationStatus,
    pub days_remaining: i64,
}

impl From<EquipmentResponseDto> for PublicEquipmentDto {
    fn from(e: EquipmentResponseDto) -> Self {
        Self {
            id: e.id,
            code: e.code,
            equipment_type: e.equipment_type,
            sector: e.sector,
            operational_status: e.operational_status,
            manufacturer: e.manufacturer,
            model: e.model,
            serial_number: e.serial_number,
            next_calibration_date: e.next_calibration_date,
            status: e.status,
            days_remaining: e.days_remaining,
        }
    }
}

/// Public counters for one document type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PublicTypeStatisticsDto {
    pub total: i64,
    pub expiring: i64,
    pub expired: i64,
    pub sector_count: usize,
}

impl PublicTypeStatisticsDto {
    pub fn new(summary: StatusSummary, sector_count: usize) -> Self {
        Self {
            total: summary.total,
            expiring: summary.expiring,
            expired: summary.expired,
            sector_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicStatisticsDto {
    pub fispqs: PublicTypeStatisticsDto,
    pub emergency_sheets: PublicTypeStatisticsDto,
    /// Equipment in service; `expired` counts overdue calibrations
    pub equipment: PublicTypeStatisticsDto,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_public_counters_hide_valid_breakdown() {
        let summary: StatusSummary = [
            ExpirationStatus::Valid,
            ExpirationStatus::Expiring,
            ExpirationStatus::Expired,
            ExpirationStatus::Valid,
        ]
        .into_iter()
        .collect();

        assert_eq!(
            PublicTypeStatisticsDto::new(summary, 3),
            PublicTypeStatisticsDto {
                total: 4,
                expiring: 1,
                expired: 1,
                sector_count: 3,
            }
        );
    }

    #[test]
    fn test_public_fispq_omits_author_and_storage_key() {
        let full = FispqResponseDto {
            id: Uuid::new_v4(),
            product: "Acetone".to_string(),
            manufacturer: "Acme".to_string(),
            cas_number: Some("67-64-1".to_string()),
            sector: "Laboratory".to_string(),
            risk_type: None,
            expiration_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            status: ExpirationStatus::Valid,
            days_remaining: 200,
            file_key: Some("public/fispqs/2025/a.pdf".to_string()),
            file_url: Some("http://storage.test/public/fispqs/2025/a.pdf".to_string()),
            created_by: Some("auth0|chemist".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(PublicFispqDto::from(full)).unwrap();
        let object = json.as_object().unwrap();

        assert!(!object.contains_key("created_by"));
        assert!(!object.contains_key("file_key"));
        assert!(!object.contains_key("created_at"));
        assert_eq!(json["product"], "Acetone");
        assert_eq!(json["status"], "valid");
        assert!(json["file_url"].is_string());
    }

    #[test]
    fn test_public_emergency_sheet_omits_author_and_storage_key() {
        let full = EmergencySheetResponseDto {
            id: Uuid::new_v4(),
            name: "Ethanol sheet".to_string(),
            product: "Ethanol".to_string(),
            un_number: Some("UN1170".to_string()),
            risk_class: Some("3".to_string()),
            sector: None,
            expiration_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            status: ExpirationStatus::Expired,
            days_remaining: -3,
            file_key: Some("public/emergency-sheets/2025/b.pdf".to_string()),
            file_url: None,
            created_by: Some("auth0|chemist".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(PublicEmergencySheetDto::from(full)).unwrap();
        let object = json.as_object().unwrap();

        assert!(!object.contains_key("created_by"));
        assert!(!object.contains_key("file_key"));
        assert_eq!(json["un_number"], "UN1170");
    }
}
