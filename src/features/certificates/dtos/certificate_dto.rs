use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::certificates::models::{CalibrationCertificate, CertificateFields};
use crate::shared::expiration::{
    parse_expiration_date, ExpirationClassifier, ExpirationStatus, StatusSummary,
};
use crate::shared::types::{default_page, default_page_size, PaginationQuery};
use crate::shared::validation::parse_form_date;

/// Text fields of the certificate create/update form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CertificateFormDto {
    #[validate(length(min = 1, max = 100, message = "Equipment ID must be 1-100 characters"))]
    pub equipment_id: String,

    #[validate(length(min = 1, max = 255, message = "Equipment name must be 1-255 characters"))]
    pub equipment_name: String,

    /// Issued by the server when absent
    #[validate(length(max = 32, message = "Certificate number must not exceed 32 characters"))]
    pub certificate_number: Option<String>,

    #[validate(length(max = 100, message = "Sector must not exceed 100 characters"))]
    pub sector: Option<String>,

    pub issue_date: String,
    pub calibration_date: String,
    pub expiration_date: String,
}

impl CertificateFormDto {
    pub fn into_fields(self) -> Result<CertificateFields> {
        let issue_date = parse_form_date("issue_date", &self.issue_date)?;
        let calibration_date = parse_form_date("calibration_date", &self.calibration_date)?;
        let expiration_date = parse_expiration_date(&self.expiration_date)?;

        if expiration_date < calibration_date {
            return Err(AppError::Validation(
                "Expiration date must not be before the calibration date".to_string(),
            ));
        }

        Ok(CertificateFields {
            equipment_id: self.equipment_id,
            equipment_name: self.equipment_name,
            certificate_number: self.certificate_number,
            sector: self.sector,
            issue_date,
            calibration_date,
            expiration_date,
        })
    }
}

/// Certificate multipart form, for OpenAPI documentation only
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CertificateFormSchema {
    #[schema(example = "BAL-0042")]
    pub equipment_id: String,
    #[schema(example = "Analytical balance")]
    pub equipment_name: String,
    /// Leave empty to have the next number issued
    #[schema(example = "0100125")]
    pub certificate_number: Option<String>,
    pub sector: Option<String>,
    #[schema(example = "2025-03-12")]
    pub issue_date: String,
    #[schema(example = "2025-03-10")]
    pub calibration_date: String,
    #[schema(example = "2026-03-10")]
    pub expiration_date: String,
    /// Certificate file (PDF, JPEG or PNG). Required on create, optional on update.
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: Option<String>,
}

/// Response DTO for a certificate with its derived expiration status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CertificateResponseDto {
    pub id: Uuid,
    pub equipment_id: String,
    pub equipment_name: String,
    pub certificate_number: String,
    pub sector: Option<String>,
    pub issue_date: NaiveDate,
    pub calibration_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub status: ExpirationStatus,
    pub days_remaining: i64,
    pub file_key: Option<String>,
    pub file_url: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CertificateResponseDto {
    pub fn from_model(c: CalibrationCertificate, classifier: &ExpirationClassifier) -> Self {
        Self {
            status: classifier.status_of(&c),
            days_remaining: classifier.days_remaining(&c),
            id: c.id,
            equipment_id: c.equipment_id,
            equipment_name: c.equipment_name,
            certificate_number: c.certificate_number,
            sector: c.sector,
            issue_date: c.issue_date,
            calibration_date: c.calibration_date,
            expiration_date: c.expiration_date,
            file_key: c.file_key,
            file_url: c.file_url,
            created_by: c.created_by,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Query params for listing certificates
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct CertificateListQuery {
    /// Substring match on equipment name
    pub equipment_name: Option<String>,
    pub equipment_id: Option<String>,
    pub sector: Option<String>,
    pub expires_from: Option<NaiveDate>,
    pub expires_to: Option<NaiveDate>,
    pub status: Option<ExpirationStatus>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl CertificateListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.page_size)
    }
}

/// Status counts plus the distinct sectors and equipment on file
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CertificateStatisticsDto {
    #[serde(flatten)]
    pub summary: StatusSummary,
    pub sector_count: usize,
    pub equipment_count: usize,
    pub sectors: Vec<String>,
}

/// Preview of the number the next certificate will receive
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NextCertificateNumberDto {
    #[schema(example = "0200325")]
    pub certificate_number: String,
    pub year: i32,
    pub semester: i16,
    pub sequence: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> CertificateFormDto {
        CertificateFormDto {
            equipment_id: "BAL-0042".to_string(),
            equipment_name: "Analytical balance".to_string(),
            certificate_number: None,
            sector: Some("Quality".to_string()),
            issue_date: "12/03/2025".to_string(),
            calibration_date: "2025-03-10".to_string(),
            expiration_date: "2026-03-10".to_string(),
        }
    }

    #[test]
    fn test_form_parses_all_dates() {
        let fields = form().into_fields().unwrap();
        assert_eq!(fields.issue_date, NaiveDate::from_ymd_opt(2025, 3, 12).unwrap());
        assert_eq!(fields.calibration_date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(fields.certificate_number, None);
    }

    #[test]
    fn test_expiration_before_calibration_is_rejected() {
        let mut dto = form();
        dto.expiration_date = "2025-01-01".to_string();
        assert!(matches!(dto.into_fields(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_bad_issue_date_names_field() {
        let mut dto = form();
        dto.issue_date = "yesterday".to_string();
        assert!(matches!(
            dto.into_fields(),
            Err(AppError::Validation(ref m)) if m.contains("issue_date")
        ));
    }
}
