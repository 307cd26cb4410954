use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::auth::model::Role;
use crate::shared::expiration::{ExpirationClassifier, ExpirationStatus, StatusSummary};

/// Record types tracked for expiration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Fispq,
    EmergencySheet,
    Certificate,
    /// Equipment due for calibration
    Equipment,
}

impl DocumentKind {
    pub fn table(&self) -> &'static str {
        match self {
            DocumentKind::Fispq => "fispqs",
            DocumentKind::EmergencySheet => "emergency_sheets",
            DocumentKind::Certificate => "calibration_certificates",
            DocumentKind::Equipment => "equipment",
        }
    }

    /// Column holding the date the status is derived from
    pub fn date_column(&self) -> &'static str {
        match self {
            DocumentKind::Equipment => "next_calibration_date",
            _ => "expiration_date",
        }
    }

    /// Rows that count toward summaries and alerts
    pub fn tracked_rows(&self) -> &'static str {
        match self {
            DocumentKind::Equipment => "operational_status <> 'discarded'",
            _ => "TRUE",
        }
    }

    /// Dates of every tracked row
    pub(crate) fn dates_select(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE {}",
            self.date_column(),
            self.table(),
            self.tracked_rows()
        )
    }

    /// Columns projected into an alert row
    pub(crate) fn alert_select(&self) -> String {
        let (kind, title) = match self {
            DocumentKind::Fispq => ("fispq", "product"),
            DocumentKind::EmergencySheet => ("emergency_sheet", "name"),
            DocumentKind::Certificate => (
                "certificate",
                "equipment_name || ' (' || certificate_number || ')'",
            ),
            DocumentKind::Equipment => ("equipment", "equipment_type || ' (' || code || ')'"),
        };
        format!(
            "SELECT '{kind}' AS document_type, id, {title} AS title, sector, \
             {date} AS expiration_date FROM {table} WHERE {date} <= $1 AND {tracked}",
            kind = kind,
            title = title,
            date = self.date_column(),
            table = self.table(),
            tracked = self.tracked_rows()
        )
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "fispq" => Some(DocumentKind::Fispq),
            "emergency_sheet" => Some(DocumentKind::EmergencySheet),
            "certificate" => Some(DocumentKind::Certificate),
            "equipment" => Some(DocumentKind::Equipment),
            _ => None,
        }
    }
}

/// Row of the alert query across document tables
#[derive(Debug, Clone, FromRow)]
pub struct AlertRow {
    pub document_type: String,
    pub id: Uuid,
    pub title: String,
    pub sector: Option<String>,
    pub expiration_date: NaiveDate,
}

/// Expired or expiring document needing attention
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpirationAlertDto {
    pub document_type: DocumentKind,
    pub id: Uuid,
    pub title: String,
    pub sector: Option<String>,
    pub expiration_date: NaiveDate,
    pub status: ExpirationStatus,
    pub days_remaining: i64,
}

impl ExpirationAlertDto {
    pub fn from_row(row: AlertRow, classifier: &ExpirationClassifier) -> Option<Self> {
        let document_type = DocumentKind::parse(&row.document_type)?;
        Some(Self {
            document_type,
            status: classifier.status_of(&row.expiration_date),
            days_remaining: classifier.days_remaining(&row.expiration_date),
            id: row.id,
            title: row.title,
            sector: row.sector,
            expiration_date: row.expiration_date,
        })
    }
}

/// Number of user profiles per role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserCountsDto {
    pub total: i64,
    pub admin: i64,
    pub metrologist: i64,
    pub chemist: i64,
}

impl UserCountsDto {
    pub fn from_counts(counts: &[(String, i64)]) -> Self {
        let mut dto = Self::default();
        for (role, count) in counts {
            dto.total += count;
            match Role::parse(role) {
                Some(Role::Admin) => dto.admin += count,
                Some(Role::Metrologist) => dto.metrologist += count,
                Some(Role::Chemist) => dto.chemist += count,
                None => tracing::debug!("Counting user role '{}' only in total", role),
            }
        }
        dto
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminDashboardDto {
    pub fispqs: StatusSummary,
    pub emergency_sheets: StatusSummary,
    pub certificates: StatusSummary,
    /// Calibration status of equipment in service
    pub equipment: StatusSummary,
    pub users: UserCountsDto,
    /// Expired and expiring documents of every type, soonest first
    pub alerts: Vec<ExpirationAlertDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChemistryDashboardDto {
    pub fispqs: StatusSummary,
    pub emergency_sheets: StatusSummary,
    pub alerts: Vec<ExpirationAlertDto>,
}

/// Certificate created recently
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RecentCertificateDto {
    pub id: Uuid,
    pub certificate_number: String,
    pub equipment_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetrologyDashboardDto {
    pub certificates: StatusSummary,
    pub equipment: StatusSummary,
    /// Certificates created in the last 30 days
    pub created_last_30_days: i64,
    pub recent_certificates: Vec<RecentCertificateDto>,
    pub alerts: Vec<ExpirationAlertDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_user_counts_from_grouped_rows() {
        let counts = vec![
            ("admin".to_string(), 2),
            ("chemist".to_string(), 5),
            ("metrologist".to_string(), 3),
        ];

        assert_eq!(
            UserCountsDto::from_counts(&counts),
            UserCountsDto {
                total: 10,
                admin: 2,
                metrologist: 3,
                chemist: 5,
            }
        );
    }

    #[test]
    fn test_alert_from_row() {
        let classifier = ExpirationClassifier::new(date("2025-06-01"));
        let row = AlertRow {
            document_type: "certificate".to_string(),
            id: Uuid::new_v4(),
            title: "Balance (0100125)".to_string(),
            sector: None,
            expiration_date: date("2025-06-01"),
        };

        let alert = ExpirationAlertDto::from_row(row, &classifier).unwrap();
        assert_eq!(alert.document_type, DocumentKind::Certificate);
        assert_eq!(alert.status, ExpirationStatus::Expiring);
        assert_eq!(alert.days_remaining, 0);
    }

    #[test]
    fn test_alert_with_unknown_type_is_dropped() {
        let classifier = ExpirationClassifier::new(date("2025-06-01"));
        let row = AlertRow {
            document_type: "invoice".to_string(),
            id: Uuid::new_v4(),
            title: "x".to_string(),
            sector: None,
            expiration_date: date("2025-05-01"),
        };

        assert!(ExpirationAlertDto::from_row(row, &classifier).is_none());
    }

    #[test]
    fn test_alert_select_targets_table() {
        let sql = DocumentKind::EmergencySheet.alert_select();
        assert!(sql.contains("FROM emergency_sheets"));
        assert!(sql.contains("'emergency_sheet' AS document_type"));
    }

    #[test]
    fn test_equipment_alerts_use_next_calibration_date() {
        let sql = DocumentKind::Equipment.alert_select();
        assert!(sql.contains("next_calibration_date AS expiration_date"));
        assert!(sql.contains("next_calibration_date <= $1"));
        assert!(sql.contains("operational_status <> 'discarded'"));

        assert_eq!(
            DocumentKind::Equipment.dates_select(),
            "SELECT next_calibration_date FROM equipment WHERE operational_status <> 'discarded'"
        );
        assert_eq!(
            DocumentKind::Fispq.dates_select(),
            "SELECT expiration_date FROM fispqs WHERE TRUE"
        );
    }

    #[test]
    fn test_equipment_alert_row_is_recognised() {
        let classifier = ExpirationClassifier::new(date("2025-06-01"));
        let row = AlertRow {
            document_type: "equipment".to_string(),
            id: Uuid::new_v4(),
            title: "Caliper (PAQ-001)".to_string(),
            sector: Some("Quality".to_string()),
            expiration_date: date("2025-05-20"),
        };

        let alert = ExpirationAlertDto::from_row(row, &classifier).unwrap();
        assert_eq!(alert.document_type, DocumentKind::Equipment);
        assert_eq!(alert.status, ExpirationStatus::Expired);
    }
}
