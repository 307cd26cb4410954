use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::DocumentFolder;
use crate::features::files::{FileService, UploadedFile};
use crate::features::fispqs::dtos::{
    FispqImportRowDto, FispqListQuery, FispqResponseDto, FispqStatisticsDto, ImportResultDto,
};
use crate::features::fispqs::models::{Fispq, FispqFields};
use crate::shared::expiration::ExpirationClassifier;
use crate::shared::query::{like_pattern, normalize_filter};

const FISPQ_COLUMNS: &str = "id, product, manufacturer, cas_number, sector, risk_type, \
     expiration_date, file_key, file_url, created_by, created_at, updated_at";

/// Optional list filters, bound as $1..$7
const FISPQ_FILTERS: &str = r#"
    ($1::text IS NULL OR product ILIKE $1)
    AND ($2::text IS NULL OR manufacturer ILIKE $2)
    AND ($3::text IS NULL OR cas_number = $3)
    AND ($4::text IS NULL OR sector = $4)
    AND ($5::text IS NULL OR risk_type = $5)
    AND ($6::date IS NULL OR expiration_date >= $6)
    AND ($7::date IS NULL OR expiration_date <= $7)
"#;

/// Service for FISPQ safety data sheets
pub struct FispqService {
    pool: PgPool,
    files: Arc<FileService>,
}

impl FispqService {
    pub fn new(pool: PgPool, files: Arc<FileService>) -> Self {
        Self { pool, files }
    }

    /// List sheets newest first, filtered and annotated with their status
    pub async fn list(
        &self,
        query: &FispqListQuery,
        classifier: &ExpirationClassifier,
    ) -> Result<(Vec<FispqResponseDto>, i64)> {
        let page = query.pagination();
        let product = like_pattern(query.product.as_deref());
        let manufacturer = like_pattern(query.manufacturer.as_deref());
        let cas_number = normalize_filter(query.cas_number.as_deref());
        let sector = normalize_filter(query.sector.as_deref());
        let risk_type = normalize_filter(query.risk_type.as_deref());
        let (from, to) = classifier.bounds(query.status, query.expires_from, query.expires_to);

        let count_sql = format!("SELECT COUNT(*) FROM fispqs WHERE {}", FISPQ_FILTERS);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&product)
            .bind(&manufacturer)
            .bind(&cas_number)
            .bind(&sector)
            .bind(&risk_type)
            .bind(from)
            .bind(to)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count FISPQs: {:?}", e);
                AppError::Database(e)
            })?;

        let list_sql = format!(
            "SELECT {} FROM fispqs WHERE {} ORDER BY created_at DESC OFFSET $8 LIMIT $9",
            FISPQ_COLUMNS, FISPQ_FILTERS
        );
        let rows = sqlx::query_as::<_, Fispq>(&list_sql)
            .bind(&product)
            .bind(&manufacturer)
            .bind(&cas_number)
            .bind(&sector)
            .bind(&risk_type)
            .bind(from)
            .bind(to)
            .bind(page.offset())
            .bind(page.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list FISPQs: {:?}", e);
                AppError::Database(e)
            })?;

        let items = rows
            .into_iter()
            .map(|f| FispqResponseDto::from_model(f, classifier))
            .collect();

        Ok((items, total))
    }

    async fn find(&self, id: Uuid) -> Result<Fispq> {
        let sql = format!("SELECT {} FROM fispqs WHERE id = $1", FISPQ_COLUMNS);
        sqlx::query_as::<_, Fispq>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get FISPQ: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("FISPQ {} not found", id)))
    }

    pub async fn get(&self, id: Uuid, classifier: &ExpirationClassifier) -> Result<FispqResponseDto> {
        let fispq = self.find(id).await?;
        Ok(FispqResponseDto::from_model(fispq, classifier))
    }

    async fn insert(
        &self,
        fields: &FispqFields,
        file_key: Option<&str>,
        file_url: Option<&str>,
        created_by: &str,
    ) -> std::result::Result<Fispq, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO fispqs
                (product, manufacturer, cas_number, sector, risk_type, expiration_date,
                 file_key, file_url, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            FISPQ_COLUMNS
        );
        sqlx::query_as::<_, Fispq>(&sql)
            .bind(&fields.product)
            .bind(&fields.manufacturer)
            .bind(&fields.cas_number)
            .bind(&fields.sector)
            .bind(&fields.risk_type)
            .bind(fields.expiration_date)
            .bind(file_key)
            .bind(file_url)
            .bind(created_by)
            .fetch_one(&self.pool)
            .await
    }

    /// Store the sheet file, then insert the row. The file is removed again
    /// when the insert fails.
    pub async fn create(
        &self,
        fields: FispqFields,
        file: UploadedFile,
        created_by: &str,
        classifier: &ExpirationClassifier,
    ) -> Result<FispqResponseDto> {
        let stored = self.files.store(DocumentFolder::Fispqs, file).await?;

        let fispq = match self
            .insert(&fields, Some(&stored.key), Some(&stored.url), created_by)
            .await
        {
            Ok(fispq) => fispq,
            Err(e) => {
                tracing::error!("Failed to create FISPQ: {:?}", e);
                self.files.remove_best_effort(Some(&stored.key)).await;
                return Err(AppError::Database(e));
            }
        };

        tracing::info!("Created FISPQ {} ({})", fispq.id, fispq.product);
        Ok(FispqResponseDto::from_model(fispq, classifier))
    }

    /// Replace every field; a new file replaces the stored one
    pub async fn update(
        &self,
        id: Uuid,
        fields: FispqFields,
        file: Option<UploadedFile>,
        classifier: &ExpirationClassifier,
    ) -> Result<FispqResponseDto> {
        let current = self.find(id).await?;

        let replacement = match file {
            Some(file) => Some(self.files.store(DocumentFolder::Fispqs, file).await?),
            None => None,
        };
        let (file_key, file_url) = match replacement {
            Some(ref stored) => (Some(stored.key.clone()), Some(stored.url.clone())),
            None => (current.file_key.clone(), current.file_url.clone()),
        };

        let sql = format!(
            r#"
            UPDATE fispqs
            SET product = $2, manufacturer = $3, cas_number = $4, sector = $5,
                risk_type = $6, expiration_date = $7, file_key = $8, file_url = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            FISPQ_COLUMNS
        );
        let result = sqlx::query_as::<_, Fispq>(&sql)
            .bind(id)
            .bind(&fields.product)
            .bind(&fields.manufacturer)
            .bind(&fields.cas_number)
            .bind(&fields.sector)
            .bind(&fields.risk_type)
            .bind(fields.expiration_date)
            .bind(&file_key)
            .bind(&file_url)
            .fetch_optional(&self.pool)
            .await;

        let updated = match result {
            Ok(Some(fispq)) => fispq,
            Ok(None) => {
                self.files
                    .remove_best_effort(replacement.as_ref().map(|s| s.key.as_str()))
                    .await;
                return Err(AppError::NotFound(format!("FISPQ {} not found", id)));
            }
            Err(e) => {
                tracing::error!("Failed to update FISPQ: {:?}", e);
                self.files
                    .remove_best_effort(replacement.as_ref().map(|s| s.key.as_str()))
                    .await;
                return Err(AppError::Database(e));
            }
        };

        if replacement.is_some() {
            self.files
                .remove_best_effort(current.file_key.as_deref())
                .await;
        }

        tracing::info!("Updated FISPQ {}", updated.id);
        Ok(FispqResponseDto::from_model(updated, classifier))
    }

    /// Delete the row, then its file
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let file_key: Option<Option<String>> =
            sqlx::query_scalar("DELETE FROM fispqs WHERE id = $1 RETURNING file_key")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to delete FISPQ: {:?}", e);
                    AppError::Database(e)
                })?;

        let file_key =
            file_key.ok_or_else(|| AppError::NotFound(format!("FISPQ {} not found", id)))?;
        self.files.remove_best_effort(file_key.as_deref()).await;

        tracing::info!("Deleted FISPQ {}", id);
        Ok(())
    }

    pub async fn statistics(&self, classifier: &ExpirationClassifier) -> Result<FispqStatisticsDto> {
        let dates: Vec<chrono::NaiveDate> = sqlx::query_scalar("SELECT expiration_date FROM fispqs")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load FISPQ expiration dates: {:?}", e);
                AppError::Database(e)
            })?;

        let sectors = self.distinct("sector").await?;
        let manufacturers = self.distinct("manufacturer").await?;

        Ok(FispqStatisticsDto {
            summary: classifier.summarize(&dates),
            sector_count: sectors.len(),
            manufacturer_count: manufacturers.len(),
            sectors,
            manufacturers,
        })
    }

    /// Distinct non-empty values of a text column, sorted
    async fn distinct(&self, column: &'static str) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT {0} FROM fispqs WHERE {0} IS NOT NULL AND {0} <> '' ORDER BY {0}",
            column
        );
        sqlx::query_scalar(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list distinct FISPQ {}: {:?}", column, e);
                AppError::Database(e)
            })
    }

    /// Import rows one by one. A failing row is reported and skipped.
    pub async fn import(
        &self,
        rows: Vec<FispqImportRowDto>,
        created_by: &str,
        classifier: &ExpirationClassifier,
    ) -> ImportResultDto {
        let mut result = ImportResultDto {
            total: rows.len(),
            ..Default::default()
        };

        for (index, row) in rows.into_iter().enumerate() {
            let row_number = index + 1;
            let fields = match row.into_fields(classifier.reference_date()) {
                Ok(fields) => fields,
                Err(message) => {
                    result.record_failure(row_number, message);
                    continue;
                }
            };

            match self.insert(&fields, None, None, created_by).await {
                Ok(_) => result.imported += 1,
                Err(e) => {
                    tracing::warn!("Failed to import FISPQ row {}: {:?}", row_number, e);
                    result.record_failure(row_number, "Could not be saved");
                }
            }
        }

        tracing::info!(
            "Imported {} of {} FISPQ rows ({} failed)",
            result.imported,
            result.total,
            result.failed
        );
        result
    }
}
