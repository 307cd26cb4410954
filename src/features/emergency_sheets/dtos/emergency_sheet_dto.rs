use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::features::emergency_sheets::models::{EmergencySheet, EmergencySheetFields};
use crate::shared::expiration::{
    parse_expiration_date, ExpirationClassifier, ExpirationStatus, StatusSummary,
};
use crate::shared::types::{default_page, default_page_size, PaginationQuery};
use crate::shared::validation::normalize_un_number;

/// Text fields of the emergency sheet create/update form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmergencySheetFormDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 255, message = "Product must be 1-255 characters"))]
    pub product: String,

    #[validate(regex(
        path = "*crate::shared::validation::UN_NUMBER_REGEX",
        message = "UN number must be four digits, optionally prefixed with UN"
    ))]
    pub un_number: Option<String>,

    #[validate(length(max = 50, message = "Risk class must not exceed 50 characters"))]
    pub risk_class: Option<String>,

    #[validate(length(max = 100, message = "Sector must not exceed 100 characters"))]
    pub sector: Option<String>,

    pub expiration_date: String,
}

impl EmergencySheetFormDto {
    pub fn into_fields(self) -> Result<EmergencySheetFields> {
        let expiration_date = parse_expiration_date(&self.expiration_date)?;
        Ok(EmergencySheetFields {
            name: self.name,
            product: self.product,
            un_number: self.un_number.as_deref().and_then(normalize_un_number),
            risk_class: self.risk_class,
            sector: self.sector,
            expiration_date,
        })
    }
}

/// Emergency sheet multipart form, for OpenAPI documentation only
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct EmergencySheetFormSchema {
    #[schema(example = "Acetone road transport")]
    pub name: String,
    #[schema(example = "Acetone")]
    pub product: String,
    #[schema(example = "UN1090")]
    pub un_number: Option<String>,
    #[schema(example = "3")]
    pub risk_class: Option<String>,
    pub sector: Option<String>,
    #[schema(example = "2026-12-31")]
    pub expiration_date: String,
    /// Sheet file (PDF, JPEG or PNG). Required on create, optional on update.
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: Option<String>,
}

/// Response DTO for an emergency sheet with its derived expiration status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmergencySheetResponseDto {
    pub id: Uuid,
    pub name: String,
    pub product: String,
    pub un_number: Option<String>,
    pub risk_class: Option<String>,
    pub sector: Option<String>,
    pub expiration_date: NaiveDate,
    pub status: ExpirationStatus,
    pub days_remaining: i64,
    pub file_key: Option<String>,
    pub file_url: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmergencySheetResponseDto {
    pub fn from_model(s: EmergencySheet, classifier: &ExpirationClassifier) -> Self {
        Self {
            status: classifier.status_of(&s),
            days_remaining: classifier.days_remaining(&s),
            id: s.id,
            name: s.name,
            product: s.product,
            un_number: s.un_number,
            risk_class: s.risk_class,
            sector: s.sector,
            expiration_date: s.expiration_date,
            file_key: s.file_key,
            file_url: s.file_url,
            created_by: s.created_by,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Query params for listing emergency sheets
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct EmergencySheetListQuery {
    /// Substring match on name
    pub name: Option<String>,
    /// Substring match on product
    pub product: Option<String>,
    /// "1090" and "UN 1090" are equivalent
    pub un_number: Option<String>,
    pub risk_class: Option<String>,
    pub sector: Option<String>,
    pub expires_from: Option<NaiveDate>,
    pub expires_to: Option<NaiveDate>,
    pub status: Option<ExpirationStatus>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl EmergencySheetListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.page_size)
    }
}

/// Status counts plus the distinct sectors and risk classes on file
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmergencySheetStatisticsDto {
    #[serde(flatten)]
    pub summary: StatusSummary,
    pub sector_count: usize,
    pub risk_class_count: usize,
    pub sectors: Vec<String>,
    pub risk_classes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> EmergencySheetFormDto {
        EmergencySheetFormDto {
            name: "Acetone transport".to_string(),
            product: "Acetone".to_string(),
            un_number: Some("un 1090".to_string()),
            risk_class: Some("3".to_string()),
            sector: None,
            expiration_date: "2026-01-31".to_string(),
        }
    }

    #[test]
    fn test_form_normalizes_un_number() {
        let dto = form();
        assert!(dto.validate().is_ok());

        let fields = dto.into_fields().unwrap();
        assert_eq!(fields.un_number.as_deref(), Some("UN1090"));
        assert_eq!(
            fields.expiration_date,
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()
        );
    }

    #[test]
    fn test_form_rejects_malformed_un_number() {
        let mut dto = form();
        dto.un_number = Some("109".to_string());
        assert!(dto.validate().unwrap_err().field_errors().contains_key("un_number"));
    }

    #[test]
    fn test_response_marks_past_sheet_expired() {
        let classifier = ExpirationClassifier::new(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        let sheet = EmergencySheet {
            id: Uuid::new_v4(),
            name: "Chlorine".to_string(),
            product: "Chlorine".to_string(),
            un_number: Some("UN1017".to_string()),
            risk_class: Some("2.3".to_string()),
            sector: Some("Water treatment".to_string()),
            expiration_date: NaiveDate::from_ymd_opt(2025, 5, 30).unwrap(),
            file_key: None,
            file_url: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let dto = EmergencySheetResponseDto::from_model(sheet, &classifier);
        assert_eq!(dto.status, ExpirationStatus::Expired);
        assert_eq!(dto.days_remaining, -2);
    }
}
