use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::shared::expiration::Expirable;

/// Database model for a calibration certificate
#[derive(Debug, Clone, FromRow)]
pub struct CalibrationCertificate {
    pub id: Uuid,
    pub equipment_id: String,
    pub equipment_name: String,
    pub certificate_number: String,
    pub sector: Option<String>,
    pub issue_date: NaiveDate,
    pub calibration_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub file_key: Option<String>,
    pub file_url: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expirable for CalibrationCertificate {
    fn expiration_date(&self) -> NaiveDate {
        self.expiration_date
    }
}

/// Validated field values written on create and update.
///
/// `certificate_number` is `None` when the server should issue one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateFields {
    pub equipment_id: String,
    pub equipment_name: String,
    pub certificate_number: Option<String>,
    pub sector: Option<String>,
    pub issue_date: NaiveDate,
    pub calibration_date: NaiveDate,
    pub expiration_date: NaiveDate,
}
