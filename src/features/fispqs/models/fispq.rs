use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::shared::expiration::Expirable;

/// Database model for a FISPQ safety data sheet
#[derive(Debug, Clone, FromRow)]
pub struct Fispq {
    pub id: Uuid,
    pub product: String,
    pub manufacturer: String,
    pub cas_number: Option<String>,
    pub sector: String,
    pub risk_type: Option<String>,
    pub expiration_date: NaiveDate,
    pub file_key: Option<String>,
    pub file_url: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expirable for Fispq {
    fn expiration_date(&self) -> NaiveDate {
        self.expiration_date
    }
}

/// Validated field values written on create, update and import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FispqFields {
    pub product: String,
    pub manufacturer: String,
    pub cas_number: Option<String>,
    pub sector: String,
    pub risk_type: Option<String>,
    pub expiration_date: NaiveDate,
}
