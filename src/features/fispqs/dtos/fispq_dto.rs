use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::features::fispqs::models::{Fispq, FispqFields};
use crate::shared::constants::{
    IMPORT_DEFAULT_MANUFACTURER, IMPORT_DEFAULT_PRODUCT, IMPORT_DEFAULT_RISK_TYPE,
    IMPORT_DEFAULT_SECTOR, IMPORT_DEFAULT_VALIDITY_DAYS,
};
use crate::shared::expiration::{
    parse_expiration_date, ExpirationClassifier, ExpirationStatus, StatusSummary,
};
use crate::shared::query::normalize_filter;
use crate::shared::types::{default_page, default_page_size, PaginationQuery};
use crate::shared::validation::CAS_NUMBER_REGEX;

/// Text fields of the FISPQ create/update form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FispqFormDto {
    #[validate(length(min = 1, max = 255, message = "Product must be 1-255 characters"))]
    pub product: String,

    #[validate(length(min = 1, max = 255, message = "Manufacturer must be 1-255 characters"))]
    pub manufacturer: String,

    #[validate(regex(
        path = "*crate::shared::validation::CAS_NUMBER_REGEX",
        message = "CAS number must look like 7732-18-5"
    ))]
    pub cas_number: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Sector must be 1-100 characters"))]
    pub sector: String,

    #[validate(length(max = 100, message = "Risk type must not exceed 100 characters"))]
    pub risk_type: Option<String>,

    /// YYYY-MM-DD or DD/MM/YYYY
    pub expiration_date: String,
}

impl FispqFormDto {
    pub fn into_fields(self) -> Result<FispqFields> {
        let expiration_date = parse_expiration_date(&self.expiration_date)?;
        Ok(FispqFields {
            product: self.product,
            manufacturer: self.manufacturer,
            cas_number: self.cas_number,
            sector: self.sector,
            risk_type: self.risk_type,
            expiration_date,
        })
    }
}

/// FISPQ multipart form, for OpenAPI documentation only.
/// The handlers read the form with `read_document_form`.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct FispqFormSchema {
    #[schema(example = "Acetone")]
    pub product: String,
    pub manufacturer: String,
    #[schema(example = "67-64-1")]
    pub cas_number: Option<String>,
    #[schema(example = "Laboratory")]
    pub sector: String,
    #[schema(example = "Flammable")]
    pub risk_type: Option<String>,
    #[schema(example = "2026-12-31")]
    pub expiration_date: String,
    /// Sheet file (PDF, JPEG or PNG). Required on create, optional on update.
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: Option<String>,
}

/// Response DTO for a FISPQ with its derived expiration status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FispqResponseDto {
    pub id: Uuid,
    pub product: String,
    pub manufacturer: String,
    pub cas_number: Option<String>,
    pub sector: String,
    pub risk_type: Option<String>,
    pub expiration_date: NaiveDate,
    pub status: ExpirationStatus,
    /// Negative once expired
    pub days_remaining: i64,
    pub file_key: Option<String>,
    pub file_url: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FispqResponseDto {
    pub fn from_model(f: Fispq, classifier: &ExpirationClassifier) -> Self {
        Self {
            status: classifier.status_of(&f),
            days_remaining: classifier.days_remaining(&f),
            id: f.id,
            product: f.product,
            manufacturer: f.manufacturer,
            cas_number: f.cas_number,
            sector: f.sector,
            risk_type: f.risk_type,
            expiration_date: f.expiration_date,
            file_key: f.file_key,
            file_url: f.file_url,
            created_by: f.created_by,
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}

/// Query params for listing FISPQs
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct FispqListQuery {
    /// Substring match on product
    pub product: Option<String>,
    /// Substring match on manufacturer
    pub manufacturer: Option<String>,
    pub cas_number: Option<String>,
    pub sector: Option<String>,
    pub risk_type: Option<String>,
    /// Earliest expiration date (inclusive)
    pub expires_from: Option<NaiveDate>,
    /// Latest expiration date (inclusive)
    pub expires_to: Option<NaiveDate>,
    pub status: Option<ExpirationStatus>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl FispqListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.page_size)
    }
}

/// Status counts plus the distinct sectors and manufacturers on file
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FispqStatisticsDto {
    #[serde(flatten)]
    pub summary: StatusSummary,
    pub sector_count: usize,
    pub manufacturer_count: usize,
    pub sectors: Vec<String>,
    pub manufacturers: Vec<String>,
}

/// One row of a FISPQ batch import. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct FispqImportRowDto {
    pub product: Option<String>,
    pub manufacturer: Option<String>,
    pub cas_number: Option<String>,
    pub sector: Option<String>,
    pub risk_type: Option<String>,
    pub expiration_date: Option<String>,
}

impl FispqImportRowDto {
    /// Fill blank fields with defaults.
    ///
    /// A missing expiration date becomes one year after `reference`; a date
    /// that is present but unparseable rejects the row.
    pub fn into_fields(self, reference: NaiveDate) -> std::result::Result<FispqFields, String> {
        let text = |value: Option<String>, default: &str| {
            normalize_filter(value.as_deref()).unwrap_or_else(|| default.to_string())
        };

        let cas_number = normalize_filter(self.cas_number.as_deref());
        if let Some(ref cas) = cas_number {
            if !CAS_NUMBER_REGEX.is_match(cas) {
                return Err(format!("Invalid CAS number '{}'", cas));
            }
        }

        let expiration_date = match normalize_filter(self.expiration_date.as_deref()) {
            Some(raw) => parse_expiration_date(&raw).map_err(|e| e.to_string())?,
            None => reference
                .checked_add_days(Days::new(IMPORT_DEFAULT_VALIDITY_DAYS))
                .ok_or_else(|| "Expiration date out of range".to_string())?,
        };

        Ok(FispqFields {
            product: text(self.product, IMPORT_DEFAULT_PRODUCT),
            manufacturer: text(self.manufacturer, IMPORT_DEFAULT_MANUFACTURER),
            cas_number,
            sector: text(self.sector, IMPORT_DEFAULT_SECTOR),
            risk_type: Some(text(self.risk_type, IMPORT_DEFAULT_RISK_TYPE)),
            expiration_date,
        })
    }
}

/// Outcome of a batch import
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ImportResultDto {
    pub total: usize,
    pub imported: usize,
    pub failed: usize,
    /// One message per rejected row, prefixed with its 1-based row number
    pub errors: Vec<String>,
}

impl ImportResultDto {
    pub fn record_failure(&mut self, row: usize, message: impl std::fmt::Display) {
        self.failed += 1;
        self.errors.push(format!("Row {}: {}", row, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn form() -> FispqFormDto {
        FispqFormDto {
            product: "Acetone".to_string(),
            manufacturer: "Quimis".to_string(),
            cas_number: Some("67-64-1".to_string()),
            sector: "Laboratory".to_string(),
            risk_type: Some("Flammable".to_string()),
            expiration_date: "31/12/2026".to_string(),
        }
    }

    #[test]
    fn test_form_parses_brazilian_date() {
        let fields = form().into_fields().unwrap();
        assert_eq!(fields.expiration_date, date("2026-12-31"));
    }

    #[test]
    fn test_form_rejects_bad_cas_and_date() {
        let mut dto = form();
        dto.cas_number = Some("67641".to_string());
        assert!(dto.validate().unwrap_err().field_errors().contains_key("cas_number"));

        let mut dto = form();
        dto.expiration_date = "someday".to_string();
        assert!(matches!(dto.into_fields(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_import_row_defaults() {
        let fields = FispqImportRowDto::default()
            .into_fields(date("2025-06-01"))
            .unwrap();

        assert_eq!(fields.product, "Unnamed product");
        assert_eq!(fields.manufacturer, "Not specified");
        assert_eq!(fields.sector, "General");
        assert_eq!(fields.risk_type.as_deref(), Some("Unclassified"));
        assert_eq!(fields.cas_number, None);
        assert_eq!(fields.expiration_date, date("2026-06-01"));
    }

    #[test]
    fn test_import_row_keeps_given_values() {
        let row = FispqImportRowDto {
            product: Some(" Toluene ".to_string()),
            sector: Some("   ".to_string()),
            expiration_date: Some("2025-09-30".to_string()),
            ..Default::default()
        };

        let fields = row.into_fields(date("2025-06-01")).unwrap();
        assert_eq!(fields.product, "Toluene");
        assert_eq!(fields.sector, "General");
        assert_eq!(fields.expiration_date, date("2025-09-30"));
    }

    #[test]
    fn test_import_row_rejects_unparseable_date() {
        let row = FispqImportRowDto {
            expiration_date: Some("not-a-date".to_string()),
            ..Default::default()
        };

        let err = row.into_fields(date("2025-06-01")).unwrap_err();
        assert!(err.contains("not-a-date"));
    }

    #[test]
    fn test_response_carries_status() {
        let classifier = ExpirationClassifier::new(date("2025-06-01"));
        let fispq = Fispq {
            id: Uuid::new_v4(),
            product: "Acetone".to_string(),
            manufacturer: "Quimis".to_string(),
            cas_number: None,
            sector: "Laboratory".to_string(),
            risk_type: None,
            expiration_date: date("2025-06-15"),
            file_key: None,
            file_url: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let dto = FispqResponseDto::from_model(fispq, &classifier);
        assert_eq!(dto.status, ExpirationStatus::Expiring);
        assert_eq!(dto.days_remaining, 14);
    }

    #[test]
    fn test_import_result_numbers_rows() {
        let mut result = ImportResultDto {
            total: 3,
            imported: 2,
            ..Default::default()
        };
        result.record_failure(2, "Invalid expiration date 'x'");

        assert_eq!(result.failed, 1);
        assert_eq!(result.errors, vec!["Row 2: Invalid expiration date 'x'"]);
    }
}
