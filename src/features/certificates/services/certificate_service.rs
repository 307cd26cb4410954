use chrono::NaiveDate;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::certificates::dtos::{
    CertificateListQuery, CertificateResponseDto, CertificateStatisticsDto,
    NextCertificateNumberDto,
};
use crate::features::certificates::models::{CalibrationCertificate, CertificateFields};
use crate::features::certificates::numbering::NumberingPeriod;
use crate::features::files::dtos::DocumentFolder;
use crate::features::files::{FileService, UploadedFile};
use crate::shared::expiration::ExpirationClassifier;
use crate::shared::query::{like_pattern, normalize_filter};

const CERTIFICATE_COLUMNS: &str = "id, equipment_id, equipment_name, certificate_number, sector, \
     issue_date, calibration_date, expiration_date, file_key, file_url, created_by, \
     created_at, updated_at";

/// Optional list filters, bound as $1..$5
const CERTIFICATE_FILTERS: &str = r#"
    ($1::text IS NULL OR equipment_name ILIKE $1)
    AND ($2::text IS NULL OR equipment_id = $2)
    AND ($3::text IS NULL OR sector = $3)
    AND ($4::date IS NULL OR expiration_date >= $4)
    AND ($5::date IS NULL OR expiration_date <= $5)
"#;

const DUPLICATE_NUMBER: &str = "A certificate with this number already exists";

/// Service for calibration certificates
pub struct CertificateService {
    pool: PgPool,
    files: Arc<FileService>,
}

impl CertificateService {
    pub fn new(pool: PgPool, files: Arc<FileService>) -> Self {
        Self { pool, files }
    }

    /// List certificates newest first, filtered and annotated with their status
    pub async fn list(
        &self,
        query: &CertificateListQuery,
        classifier: &ExpirationClassifier,
    ) -> Result<(Vec<CertificateResponseDto>, i64)> {
        let page = query.pagination();
        let equipment_name = like_pattern(query.equipment_name.as_deref());
        let equipment_id = normalize_filter(query.equipment_id.as_deref());
        let sector = normalize_filter(query.sector.as_deref());
        let (from, to) = classifier.bounds(query.status, query.expires_from, query.expires_to);

        let count_sql = format!(
            "SELECT COUNT(*) FROM calibration_certificates WHERE {}",
            CERTIFICATE_FILTERS
        );
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&equipment_name)
            .bind(&equipment_id)
            .bind(&sector)
            .bind(from)
            .bind(to)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count certificates: {:?}", e);
                AppError::Database(e)
            })?;

        let list_sql = format!(
            "SELECT {} FROM calibration_certificates WHERE {} \
             ORDER BY created_at DESC OFFSET $6 LIMIT $7",
            CERTIFICATE_COLUMNS, CERTIFICATE_FILTERS
        );
        let rows = sqlx::query_as::<_, CalibrationCertificate>(&list_sql)
            .bind(&equipment_name)
            .bind(&equipment_id)
            .bind(&sector)
            .bind(from)
            .bind(to)
            .bind(page.offset())
            .bind(page.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list certificates: {:?}", e);
                AppError::Database(e)
            })?;

        let items = rows
            .into_iter()
            .map(|c| CertificateResponseDto::from_model(c, classifier))
            .collect();

        Ok((items, total))
    }

    async fn find(&self, id: Uuid) -> Result<CalibrationCertificate> {
        let sql = format!(
            "SELECT {} FROM calibration_certificates WHERE id = $1",
            CERTIFICATE_COLUMNS
        );
        sqlx::query_as::<_, CalibrationCertificate>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get certificate: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Certificate {} not found", id)))
    }

    pub async fn get(
        &self,
        id: Uuid,
        classifier: &ExpirationClassifier,
    ) -> Result<CertificateResponseDto> {
        let certificate = self.find(id).await?;
        Ok(CertificateResponseDto::from_model(certificate, classifier))
    }

    /// Number the next certificate would receive, without consuming it
    pub async fn preview_next_number(&self, today: NaiveDate) -> Result<NextCertificateNumberDto> {
        let period = NumberingPeriod::of(today);
        let last: Option<i32> = sqlx::query_scalar(
            "SELECT last_number FROM certificate_number_sequences WHERE year = $1 AND semester = $2",
        )
        .bind(period.year)
        .bind(period.semester)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read certificate number sequence: {:?}", e);
            AppError::Database(e)
        })?;

        let sequence = last.unwrap_or(0) + 1;
        Ok(NextCertificateNumberDto {
            certificate_number: period.format(sequence),
            year: period.year,
            semester: period.semester,
            sequence,
        })
    }

    /// Consume the next number of the current semester
    async fn issue_number(&self, today: NaiveDate) -> Result<String> {
        let period = NumberingPeriod::of(today);
        let sequence: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO certificate_number_sequences (year, semester, last_number)
            VALUES ($1, $2, 1)
            ON CONFLICT (year, semester) DO UPDATE
            SET last_number = certificate_number_sequences.last_number + 1,
                updated_at = NOW()
            RETURNING last_number
            "#,
        )
        .bind(period.year)
        .bind(period.semester)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to issue certificate number: {:?}", e);
            AppError::Database(e)
        })?;

        let number = period.format(sequence);
        tracing::debug!("Issued certificate number {}", number);
        Ok(number)
    }

    /// Store the certificate file, then insert the row. A missing number is
    /// issued only once the file is accepted; the file is removed again when
    /// numbering or the insert fails.
    pub async fn create(
        &self,
        fields: CertificateFields,
        file: UploadedFile,
        created_by: &str,
        classifier: &ExpirationClassifier,
    ) -> Result<CertificateResponseDto> {
        let stored = self.files.store(DocumentFolder::Certificates, file).await?;

        let certificate_number = match fields.certificate_number.clone() {
            Some(number) => number,
            None => match self.issue_number(classifier.reference_date()).await {
                Ok(number) => number,
                Err(e) => {
                    self.files.remove_best_effort(Some(&stored.key)).await;
                    return Err(e);
                }
            },
        };

        let sql = format!(
            r#"
            INSERT INTO calibration_certificates
                (equipment_id, equipment_name, certificate_number, sector, issue_date,
                 calibration_date, expiration_date, file_key, file_url, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            CERTIFICATE_COLUMNS
        );
        let result = sqlx::query_as::<_, CalibrationCertificate>(&sql)
            .bind(&fields.equipment_id)
            .bind(&fields.equipment_name)
            .bind(&certificate_number)
            .bind(&fields.sector)
            .bind(fields.issue_date)
            .bind(fields.calibration_date)
            .bind(fields.expiration_date)
            .bind(&stored.key)
            .bind(&stored.url)
            .bind(created_by)
            .fetch_one(&self.pool)
            .await;

        let certificate = match result {
            Ok(certificate) => certificate,
            Err(e) => {
                tracing::error!("Failed to create certificate: {:?}", e);
                self.files.remove_best_effort(Some(&stored.key)).await;
                return Err(AppError::from_db(e, DUPLICATE_NUMBER));
            }
        };

        tracing::info!(
            "Created certificate {} ({}) for equipment {}",
            certificate.id,
            certificate.certificate_number,
            certificate.equipment_id
        );
        Ok(CertificateResponseDto::from_model(certificate, classifier))
    }

    /// Replace every field; a new file replaces the stored one. The number
    /// is kept when the form leaves it empty.
    pub async fn update(
        &self,
        id: Uuid,
        fields: CertificateFields,
        file: Option<UploadedFile>,
        classifier: &ExpirationClassifier,
    ) -> Result<CertificateResponseDto> {
        let current = self.find(id).await?;
        let certificate_number = fields
            .certificate_number
            .clone()
            .unwrap_or_else(|| current.certificate_number.clone());

        let replacement = match file {
            Some(file) => Some(self.files.store(DocumentFolder::Certificates, file).await?),
            None => None,
        };
        let (file_key, file_url) = match replacement {
            Some(ref stored) => (Some(stored.key.clone()), Some(stored.url.clone())),
            None => (current.file_key.clone(), current.file_url.clone()),
        };

        let sql = format!(
            r#"
            UPDATE calibration_certificates
            SET equipment_id = $2, equipment_name = $3, certificate_number = $4, sector = $5,
                issue_date = $6, calibration_date = $7, expiration_date = $8,
                file_key = $9, file_url = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CERTIFICATE_COLUMNS
        );
        let result = sqlx::query_as::<_, CalibrationCertificate>(&sql)
            .bind(id)
            .bind(&fields.equipment_id)
            .bind(&fields.equipment_name)
            .bind(&certificate_number)
            .bind(&fields.sector)
            .bind(fields.issue_date)
            .bind(fields.calibration_date)
            .bind(fields.expiration_date)
            .bind(&file_key)
            .bind(&file_url)
            .fetch_optional(&self.pool)
            .await;

        let new_key = replacement.as_ref().map(|s| s.key.as_str());
        let updated = match result {
            Ok(Some(certificate)) => certificate,
            Ok(None) => {
                self.files.remove_best_effort(new_key).await;
                return Err(AppError::NotFound(format!("Certificate {} not found", id)));
            }
            Err(e) => {
                tracing::error!("Failed to update certificate: {:?}", e);
                self.files.remove_best_effort(new_key).await;
                return Err(AppError::from_db(e, DUPLICATE_NUMBER));
            }
        };

        if replacement.is_some() {
            self.files
                .remove_best_effort(current.file_key.as_deref())
                .await;
        }

        tracing::info!("Updated certificate {}", updated.id);
        Ok(CertificateResponseDto::from_model(updated, classifier))
    }

    /// Delete the row, then its file
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let file_key: Option<Option<String>> = sqlx::query_scalar(
            "DELETE FROM calibration_certificates WHERE id = $1 RETURNING file_key",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete certificate: {:?}", e);
            AppError::Database(e)
        })?;

        let file_key =
            file_key.ok_or_else(|| AppError::NotFound(format!("Certificate {} not found", id)))?;
        self.files.remove_best_effort(file_key.as_deref()).await;

        tracing::info!("Deleted certificate {}", id);
        Ok(())
    }

    pub async fn statistics(
        &self,
        classifier: &ExpirationClassifier,
    ) -> Result<CertificateStatisticsDto> {
        let dates: Vec<NaiveDate> =
            sqlx::query_scalar("SELECT expiration_date FROM calibration_certificates")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to load certificate expiration dates: {:?}", e);
                    AppError::Database(e)
                })?;

        let sectors: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT sector FROM calibration_certificates
            WHERE sector IS NOT NULL AND sector <> ''
            ORDER BY sector
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list certificate sectors: {:?}", e);
            AppError::Database(e)
        })?;

        let equipment_count: i64 =
            sqlx::query_scalar("SELECT COUNT(DISTINCT equipment_id) FROM calibration_certificates")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count certified equipment: {:?}", e);
                    AppError::Database(e)
                })?;

        Ok(CertificateStatisticsDto {
            summary: classifier.summarize(&dates),
            sector_count: sectors.len(),
            equipment_count: equipment_count as usize,
            sectors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{lazy_pool, InMemoryStorage};

    fn fields() -> CertificateFields {
        let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        CertificateFields {
            equipment_id: "PAQ-001".to_string(),
            equipment_name: "Paquímetro digital".to_string(),
            certificate_number: None,
            sector: None,
            issue_date: day,
            calibration_date: day,
            expiration_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        }
    }

    fn service(storage: Arc<InMemoryStorage>) -> CertificateService {
        CertificateService::new(lazy_pool(), Arc::new(FileService::new(storage)))
    }

    // Any query would fail against the unreachable pool with a database error,
    // so a file error proves the sequence was never touched
    #[tokio::test]
    async fn test_rejected_file_does_not_issue_a_number() {
        let storage = Arc::new(InMemoryStorage::default());
        let classifier = ExpirationClassifier::new(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());

        let empty = UploadedFile {
            file_name: "cert.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: Vec::new(),
        };
        let err = service(Arc::clone(&storage))
            .create(fields(), empty, "test-sub", &classifier)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let script = UploadedFile {
            file_name: "cert.exe".to_string(),
            content_type: "application/x-msdownload".to_string(),
            data: b"MZ".to_vec(),
        };
        let err = service(Arc::clone(&storage))
            .create(fields(), script, "test-sub", &classifier)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        assert_eq!(storage.object_count(), 0);
    }
}
