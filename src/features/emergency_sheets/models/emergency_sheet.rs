use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::shared::expiration::Expirable;

/// Database model for an emergency sheet
#[derive(Debug, Clone, FromRow)]
pub struct EmergencySheet {
    pub id: Uuid,
    pub name: String,
    pub product: String,
    pub un_number: Option<String>,
    pub risk_class: Option<String>,
    pub sector: Option<String>,
    pub expiration_date: NaiveDate,
    pub file_key: Option<String>,
    pub file_url: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expirable for EmergencySheet {
    fn expiration_date(&self) -> NaiveDate {
        self.expiration_date
    }
}

/// Validated field values written on create and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmergencySheetFields {
    pub name: String,
    pub product: String,
    pub un_number: Option<String>,
    pub risk_class: Option<String>,
    pub sector: Option<String>,
    pub expiration_date: NaiveDate,
}
