use chrono::{Duration, NaiveDate, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::dashboard::dtos::*;
use crate::features::users::UserService;
use crate::shared::constants::MAX_ALERTS;
use crate::shared::expiration::{ExpirationClassifier, ExpirationStatus, StatusSummary};

/// Days looked back for recently created certificates
const RECENT_CERTIFICATE_DAYS: i64 = 30;

/// Service for dashboard aggregates
pub struct DashboardService {
    pool: PgPool,
    users: Arc<UserService>,
}

impl DashboardService {
    pub fn new(pool: PgPool, users: Arc<UserService>) -> Self {
        Self { pool, users }
    }

    /// Classify every document of one type
    pub async fn summary(
        &self,
        kind: DocumentKind,
        classifier: &ExpirationClassifier,
    ) -> Result<StatusSummary> {
        let sql = kind.dates_select();
        let dates: Vec<NaiveDate> = sqlx::query_scalar(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load {} expiration dates: {:?}", kind.table(), e);
                AppError::Database(e)
            })?;

        Ok(classifier.summarize(&dates))
    }

    /// Expired and expiring documents of the given types, soonest first
    pub async fn alerts(
        &self,
        kinds: &[DocumentKind],
        classifier: &ExpirationClassifier,
    ) -> Result<Vec<ExpirationAlertDto>> {
        if kinds.is_empty() {
            return Ok(Vec::new());
        }

        let Some(last_expiring) = classifier.window(ExpirationStatus::Expiring).to else {
            return Ok(Vec::new());
        };

        let union = kinds
            .iter()
            .map(|kind| kind.alert_select())
            .collect::<Vec<_>>()
            .join(" UNION ALL ");
        let sql = format!(
            "SELECT * FROM ({}) alerts ORDER BY expiration_date, title LIMIT $2",
            union
        );

        let rows = sqlx::query_as::<_, AlertRow>(&sql)
            .bind(last_expiring)
            .bind(MAX_ALERTS)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load expiration alerts: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(rows
            .into_iter()
            .filter_map(|row| ExpirationAlertDto::from_row(row, classifier))
            .collect())
    }

    pub async fn admin(&self, classifier: &ExpirationClassifier) -> Result<AdminDashboardDto> {
        let counts = self.users.count_by_role().await?;

        Ok(AdminDashboardDto {
            fispqs: self.summary(DocumentKind::Fispq, classifier).await?,
            emergency_sheets: self.summary(DocumentKind::EmergencySheet, classifier).await?,
            certificates: self.summary(DocumentKind::Certificate, classifier).await?,
            equipment: self.summary(DocumentKind::Equipment, classifier).await?,
            users: UserCountsDto::from_counts(&counts),
            alerts: self
                .alerts(
                    &[
                        DocumentKind::Fispq,
                        DocumentKind::EmergencySheet,
                        DocumentKind::Certificate,
                        DocumentKind::Equipment,
                    ],
                    classifier,
                )
                .await?,
        })
    }

    pub async fn chemistry(
        &self,
        classifier: &ExpirationClassifier,
    ) -> Result<ChemistryDashboardDto> {
        Ok(ChemistryDashboardDto {
            fispqs: self.summary(DocumentKind::Fispq, classifier).await?,
            emergency_sheets: self.summary(DocumentKind::EmergencySheet, classifier).await?,
            alerts: self
                .alerts(
                    &[DocumentKind::Fispq, DocumentKind::EmergencySheet],
                    classifier,
                )
                .await?,
        })
    }

    pub async fn metrology(
        &self,
        classifier: &ExpirationClassifier,
    ) -> Result<MetrologyDashboardDto> {
        let since = Utc::now() - Duration::days(RECENT_CERTIFICATE_DAYS);

        let created_last_30_days: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM calibration_certificates WHERE created_at >= $1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count recent certificates: {:?}", e);
            AppError::Database(e)
        })?;

        let recent_certificates = sqlx::query_as::<_, RecentCertificateDto>(
            r#"
            SELECT id, certificate_number, equipment_name, created_at
            FROM calibration_certificates
            WHERE created_at >= $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(since)
        .bind(MAX_ALERTS)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load recent certificates: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(MetrologyDashboardDto {
            certificates: self.summary(DocumentKind::Certificate, classifier).await?,
            equipment: self.summary(DocumentKind::Equipment, classifier).await?,
            created_last_30_days,
            recent_certificates,
            alerts: self
                .alerts(&[DocumentKind::Certificate, DocumentKind::Equipment], classifier)
                .await?,
        })
    }
}
